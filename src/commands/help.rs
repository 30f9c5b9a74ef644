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
use crate::{Context, Error};

#[poise::command(
    prefix_command,
    slash_command,
    ephemeral,
    description_localized("en-US", "List the commands of the bot.")
)]
#[canny::log_cmd]
pub async fn help(
    ctx: Context<'_>,
    #[description = "A specific command to show help about."] command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Day changes of the competition are announced automatically.",
            ..Default::default()
        },
    )
    .await?;

    Ok(())
}
