/*
 *  Canny - Discord bot relaying a competition's submission windows and leaderboards.
 *  Copyright (C) 2025  The Canny contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::error::RenderError;
use crate::format::{Row, HEADERS};
use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fmt::Write;
use std::io::Cursor;
use std::path::Path;

/* Image layout (pixels): */

const FONT_SIZE: f32 = 24.0;
const ROW_HEIGHT: u32 = 40;
const HEADER_HEIGHT: u32 = 60;
const BOTTOM_MARGIN: u32 = 20;
const IMAGE_WIDTH: u32 = 1200;

const BACKGROUND: Rgba<u8> = Rgba([0x2f, 0x31, 0x36, 0xff]);
const STRIPE: Rgba<u8> = Rgba([0x36, 0x39, 0x3f, 0xff]);
const DIVIDER: Rgba<u8> = Rgba([0x72, 0x76, 0x7d, 0xff]);
const HEADER_TEXT: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
// 0.9 grey.
const ROW_TEXT: Rgba<u8> = Rgba([0xe6, 0xe6, 0xe6, 0xff]);

/// Horizontal anchor of a column: the fraction of the text width left of the column's x.
#[derive(Clone, Copy)]
enum Anchor {
    Left,
    Centre,
}

impl Anchor {
    fn fraction(self) -> f32 {
        match self {
            Anchor::Left => 0.0,
            Anchor::Centre => 0.5,
        }
    }
}

/// X coordinate and anchor of each column, in the order of `HEADERS`.
const COLUMNS: [(f32, Anchor); 7] = [
    (20.0, Anchor::Left),
    (100.0, Anchor::Left),
    (400.0, Anchor::Centre),
    (550.0, Anchor::Centre),
    (700.0, Anchor::Left),
    (900.0, Anchor::Left),
    (1050.0, Anchor::Left),
];

/// Rows past this many are left out of the image.
pub const MAX_IMAGE_ROWS: usize = 50;

/// Discord's message length limit.
pub const MESSAGE_LIMIT: usize = 2000;
const COLUMN_SEPARATOR: &str = " | ";

/// Height of the image for a leaderboard of `rows` rows.
pub fn image_height(rows: usize) -> u32 {
    HEADER_HEIGHT + rows.min(MAX_IMAGE_ROWS) as u32 * ROW_HEIGHT + BOTTOM_MARGIN
}

/// The leading rows that make it into the image.
pub fn image_rows(rows: &[Row]) -> &[Row] {
    &rows[..rows.len().min(MAX_IMAGE_ROWS)]
}

/**
 * Draws everything in the leaderboard image except text: the background, the header divider and
 * the shading of every other row.
 */
fn draw_canvas(rows: usize) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(IMAGE_WIDTH, image_height(rows), BACKGROUND);

    let divider_y = (HEADER_HEIGHT - 10) as f32;
    draw_line_segment_mut(
        &mut image,
        (20.0, divider_y),
        ((IMAGE_WIDTH - 20) as f32, divider_y),
        DIVIDER,
    );

    for i in (1..rows).step_by(2) {
        let top = HEADER_HEIGHT + i as u32 * ROW_HEIGHT;
        draw_filled_rect_mut(
            &mut image,
            Rect::at(0, top as i32).of_size(IMAGE_WIDTH, ROW_HEIGHT),
            STRIPE,
        );
    }

    image
}

/**
 * Renders leaderboards as PNG images, with the font loaded once at startup.
 */
pub struct ImageRenderer {
    font: FontVec,
    scale: PxScale,
}

impl ImageRenderer {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let font_error = |reason: String| RenderError::Font {
            path: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| font_error(e.to_string()))?;

        Ok(Self {
            font,
            scale: PxScale::from(FONT_SIZE),
        })
    }

    /// Draws `text` with its left edge (or centre) at `x`, vertically centred on `y`.
    fn draw_anchored(
        &self,
        image: &mut RgbaImage,
        color: Rgba<u8>,
        text: &str,
        (x, anchor): (f32, Anchor),
        y: f32,
    ) {
        let (width, height) = text_size(self.scale, &self.font, text);
        let left = x - anchor.fraction() * width as f32;
        let top = y - height as f32 / 2.0;
        draw_text_mut(
            image,
            color,
            left.round() as i32,
            top.round() as i32,
            self.scale,
            &self.font,
            text,
        );
    }

    /// Draws the leaderboard. Only the first `MAX_IMAGE_ROWS` rows are drawn.
    pub fn render(&self, rows: &[Row]) -> RgbaImage {
        let rows = image_rows(rows);
        let mut image = draw_canvas(rows.len());

        let header_y = HEADER_HEIGHT as f32 / 2.0;
        for (title, column) in HEADERS.iter().zip(COLUMNS) {
            self.draw_anchored(&mut image, HEADER_TEXT, title, column, header_y);
        }

        for (i, row) in rows.iter().enumerate() {
            let y = (HEADER_HEIGHT + i as u32 * ROW_HEIGHT) as f32 + ROW_HEIGHT as f32 / 2.0;
            for (cell, column) in row.cells().iter().zip(COLUMNS) {
                self.draw_anchored(&mut image, ROW_TEXT, cell, column, y);
            }
        }

        image
    }

    /// Renders and encodes the leaderboard as PNG bytes.
    pub fn render_png(&self, rows: &[Row]) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.render(rows))
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/**
 * Renders the leaderboard as a monospace table inside a Discord code block.
 *
 * Rows that do not fit in a single message are left out, and the table ends with a note saying how
 * many.
 */
pub fn text_table(rows: &[Row]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: [&str; 7]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, width))| match COLUMNS[col].1 {
                Anchor::Centre => format!("{:>width$}", cell, width = width),
                Anchor::Left => format!("{:<width$}", cell, width = width),
            })
            .collect();
        padded.join(COLUMN_SEPARATOR).trim_end().to_string()
    };

    let header = format_line(HEADERS);
    let rule = "-".repeat(header.chars().count());
    let mut table = format!("```\n{}\n{}\n", header, rule);

    // Room for the closing fence and the longest possible omission note.
    let reserve = "```".len() + format!("... and {} more\n", rows.len()).len();

    for (i, row) in rows.iter().enumerate() {
        let line = format_line(row.cells());
        if table.len() + line.len() + 1 + reserve > MESSAGE_LIMIT {
            // Writing to a String cannot fail.
            let _ = writeln!(table, "... and {} more", rows.len() - i);
            break;
        }
        table.push_str(&line);
        table.push('\n');
    }

    table.push_str("```");
    table
}
