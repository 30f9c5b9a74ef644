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
/**
 * Macro for logging the usage of a command. Inserted into every command by `#[canny::log_cmd]`.
 */
macro_rules! log_cmd {
    ($ctx:ident) => {
        tracing::info!(
            "Executing command `{}`, triggered by <@{}> ({}) in channel {}.",
            $ctx.invocation_string(),
            $ctx.author().id,
            $ctx.author().tag(),
            $ctx.channel_id()
        );
    };
}
pub(crate) use log_cmd;

/**
 * Macro for replying to a command with a failure message, logging the error behind it.
 */
macro_rules! reply_failure {
    ($ctx:ident, $reply:expr, $err:expr) => {{
        tracing::error!("[{}] {}: {}", $ctx.command().name, $reply, $err);
        $ctx.say($reply).await?;
    }};
}
pub(crate) use reply_failure;

