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
use crate::error::FetchError;
use crate::utils::reply_failure;
use crate::{format, render};
use crate::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use poise::CreateReply;

#[poise::command(
    prefix_command,
    slash_command,
    description_localized("en-US", "Show the current competition leaderboard.")
)]
#[canny::log_cmd]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    // Fetching and drawing can take longer than Discord waits for a slash command reply.
    ctx.defer().await?;

    let entries = match ctx.data().api.fetch_leaderboard().await {
        Ok(entries) => entries,
        Err(e @ FetchError::Token(_)) => {
            reply_failure!(ctx, "Error getting token", e);
            return Ok(());
        }
        Err(e @ FetchError::Request(_)) => {
            reply_failure!(ctx, "Failed to fetch leaderboard", e);
            return Ok(());
        }
    };

    if entries.is_empty() {
        ctx.say("No leaderboard data available.").await?;
        return Ok(());
    }

    let rows = format::rows(&entries, Utc::now());

    let Some(renderer) = ctx.data().renderer.clone() else {
        ctx.say(render::text_table(&rows)).await?;
        return Ok(());
    };

    let total = rows.len();
    let png = match tokio::task::spawn_blocking(move || renderer.render_png(&rows)).await {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => {
            reply_failure!(ctx, "Failed to generate leaderboard image.", e);
            return Ok(());
        }
        Err(e) => {
            reply_failure!(ctx, "Failed to generate leaderboard image.", e);
            return Ok(());
        }
    };

    let mut reply =
        CreateReply::default().attachment(serenity::CreateAttachment::bytes(png, "leaderboard.png"));
    if total > render::MAX_IMAGE_ROWS {
        reply = reply.content(format!(
            "Showing the top {} of {} players.",
            render::MAX_IMAGE_ROWS,
            total
        ));
    }
    ctx.send(reply).await?;

    Ok(())
}
