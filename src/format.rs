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
use crate::api::LeaderboardEntry;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Longest username shown in full.
const MAX_USERNAME_CHARS: usize = 20;
/// Characters kept from a longer username, before the ellipsis.
const TRUNCATED_USERNAME_CHARS: usize = 17;

/// Placeholder for fields that cannot be computed for a row.
pub const MISSING: &str = "-";

/// Column titles, in display order.
pub const HEADERS: [&str; 7] = [
    "Rank",
    "User",
    "Points",
    "Subs",
    "Last Submission",
    "Diff",
    "Total Diff",
];

/**
 * A leaderboard entry with every field already turned into display text.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub rank: String,
    pub username: String,
    pub points: String,
    pub submissions: String,
    pub last_submission: String,
    /// Time since the previous row with a known submission time.
    pub diff: String,
    /// Time since the leader's submission.
    pub total_diff: String,
}

impl Row {
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.rank,
            &self.username,
            &self.points,
            &self.submissions,
            &self.last_submission,
            &self.diff,
            &self.total_diff,
        ]
    }
}

/// Timestamps at or before 2000-01-01 are placeholders, not real submissions.
fn is_valid_submission(ts: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single()?;
    ts.filter(|t| *t > epoch)
}

/**
 * Shortens usernames longer than 20 characters to 17 characters and an ellipsis.
 */
pub fn truncate_username(name: &str) -> String {
    if name.chars().count() <= MAX_USERNAME_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(TRUNCATED_USERNAME_CHARS).collect();
    short.push_str("...");
    short
}

/**
 * Describes how long ago `then` was, relative to `now`.
 *
 * Less than a minute (including times in the future) is `now`; then minutes, hours and days;
 * anything from a week on is shown as a date, such as `Jan 2`.
 */
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;

    if elapsed < TimeDelta::minutes(1) {
        "now".to_string()
    } else if elapsed < TimeDelta::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < TimeDelta::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed < TimeDelta::days(7) {
        format!("{}d ago", elapsed.num_days())
    } else {
        then.format("%b %-d").to_string()
    }
}

/**
 * Formats the gap between two submissions, e.g. `+1d 2h 5m`.
 *
 * The sign is dropped. Seconds only show when the gap is under a minute, and a zero gap is `+0s`.
 */
pub fn format_time_diff(delta: TimeDelta) -> String {
    let delta = delta.abs();

    let days = delta.num_days();
    let hours = delta.num_hours() % 24;
    let minutes = delta.num_minutes() % 60;
    let seconds = delta.num_seconds() % 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 && parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    if parts.is_empty() {
        return "+0s".to_string();
    }
    format!("+{}", parts.join(" "))
}

/**
 * Computes the display rows for a leaderboard, in the order given.
 *
 * `diff` compares each row with the closest earlier row that has a valid submission time, and
 * `total_diff` compares it with the first row. Rows without a valid time get `-` for both.
 */
pub fn rows(entries: &[LeaderboardEntry], now: DateTime<Utc>) -> Vec<Row> {
    let leader_time = entries
        .first()
        .and_then(|leader| is_valid_submission(leader.last_submission()));
    let mut previous: Option<DateTime<Utc>> = None;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let valid = is_valid_submission(entry.last_submission());

            let last_submission = entry
                .last_submission()
                .map(|t| relative_time(t, now))
                .unwrap_or_else(|| MISSING.to_string());

            let diff = match (i, valid, previous) {
                (0, _, _) => MISSING.to_string(),
                (_, Some(t), Some(prev)) => format_time_diff(t - prev),
                _ => MISSING.to_string(),
            };
            let total_diff = match (i, valid, leader_time) {
                (0, _, _) => MISSING.to_string(),
                (_, Some(t), Some(leader)) => format_time_diff(t - leader),
                _ => MISSING.to_string(),
            };

            if valid.is_some() {
                previous = valid;
            }

            Row {
                rank: format!("{}.", i + 1),
                username: truncate_username(entry.username()),
                points: format!("{:.1}", entry.total_points()),
                submissions: entry.total_submissions().to_string(),
                last_submission,
                diff,
                total_diff,
            }
        })
        .collect()
}
