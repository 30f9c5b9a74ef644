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
use crate::poller::window_status;
use crate::utils::reply_failure;
use crate::{Context, Error};

#[poise::command(
    prefix_command,
    slash_command,
    description_localized("en-US", "Show today's submission window.")
)]
#[canny::log_cmd]
pub async fn window(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().api.fetch_current_window().await {
        Ok(window) => {
            let mut reply = window_status(&window);
            if !window.enabled() {
                reply.push_str(" (submissions closed)");
            }
            ctx.say(reply).await?;
        }
        Err(e) => reply_failure!(ctx, "Failed to fetch the submission window", e),
    }

    Ok(())
}
