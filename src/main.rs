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
mod api;
mod commands;
mod config;
mod error;
mod format;
mod poller;
mod render;
#[cfg(test)]
mod testing;
mod utils;

use crate::api::ApiClient;
use crate::config::Config;
use crate::poller::DayTracker;
use crate::render::ImageRenderer;
use poise::serenity_prelude as serenity;
use std::env;
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::EnvFilter;

/* Poise-required data types: */

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;
// User data:
pub struct Data {
    api: ApiClient,
    /// `None` when the font could not be loaded: leaderboards are then sent as text.
    renderer: Option<Arc<ImageRenderer>>,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        match data_about_bot.user.discriminator {
            Some(discriminator) => tracing::info!(
                "{}#{:04} is connected.",
                data_about_bot.user.name,
                discriminator
            ),
            None => tracing::info!("{} is connected.", data_about_bot.user.name),
        }
        ctx.set_presence(None, serenity::OnlineStatus::Online);
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                "Command `{}` failed: {}",
                ctx.command().qualified_name,
                error
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling a framework error: {}", e);
            }
        }
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where there is such a thing.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let api = ApiClient::new(&config)?;

    let renderer = match ImageRenderer::load(config.font_path()) {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            tracing::warn!("{}. Leaderboards will be sent as text tables.", e);
            None
        }
    };

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let channel = config.channel_id();
    let tracker = DayTracker::new(config.ping().clone(), config.initial_ping());
    let poll_interval = config.poll_interval();
    let poller_handle: Arc<OnceLock<tokio::task::AbortHandle>> = Arc::new(OnceLock::new());
    let setup_poller_handle = poller_handle.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::leaderboard::leaderboard(),
                commands::window::window(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let task = tokio::spawn(poller::run(
                    ctx.http.clone(),
                    api.clone(),
                    channel,
                    tracker,
                    poll_interval,
                ));
                // Setup runs once, so the handle is always unset here.
                let _ = setup_poller_handle.set(task.abort_handle());

                Ok(Data { api, renderer })
            })
        })
        .build();

    let mut client = serenity::Client::builder(config.discord_token(), intents)
        .framework(framework) // For command handling, using poise.
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutting down.");
        shard_manager.shutdown_all().await;
    });

    tracing::info!("Bot is now running. Press CTRL-C to exit.");
    let result = client.start().await;
    if let Some(handle) = poller_handle.get() {
        handle.abort();
    }

    Ok(result?)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loaded before the subscriber is set up, so the file can provide RUST_LOG.
    let env_file = config::env_file(env::var("ENV").ok().as_deref());
    let env_loaded = env_file.map(|file| (file, dotenvy::from_filename(file)));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match env_loaded {
        Some((file, Ok(_))) => tracing::info!("Loaded environment from {}.", file),
        Some((file, Err(e))) => tracing::warn!("Could not load {}: {}", file, e),
        None => {}
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("The Discord bot crashed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
