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
use crate::error::ConfigError;
use getset::{CopyGetters, Getters};
use poise::serenity_prelude::ChannelId;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_FONT_PATH: &str = "Roboto-Regular.ttf";

/**
 * Competition API credentials. Kept apart from the rest of the configuration so they are never
 * printed along with it.
 */
#[derive(Clone, Getters)]
pub struct Credentials {
    #[getset(get = "pub")]
    email: String,
    #[getset(get = "pub")]
    password: String,
}

impl Credentials {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/**
 * Runtime configuration of the bot, read from the environment once at startup.
 */
#[derive(Clone, Getters, CopyGetters)]
pub struct Config {
    /// Discord bot token.
    #[getset(get = "pub")]
    discord_token: String,
    #[getset(get = "pub")]
    credentials: Credentials,
    /// Endpoint issuing bearer tokens for the competition API.
    #[getset(get = "pub")]
    auth_url: String,
    #[getset(get = "pub")]
    leaderboard_url: String,
    #[getset(get = "pub")]
    windows_url: String,
    /// Channel where day changes are announced.
    #[getset(get_copy = "pub")]
    channel_id: ChannelId,
    /// Mention prepended to every announcement.
    #[getset(get = "pub")]
    ping: String,
    /// Whether to announce the first window observed after startup.
    #[getset(get_copy = "pub")]
    initial_ping: bool,
    #[getset(get_copy = "pub")]
    poll_interval: Duration,
    /// TTF font used to draw leaderboard images.
    #[getset(get = "pub")]
    font_path: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("credentials", &self.credentials)
            .field("auth_url", &self.auth_url)
            .field("leaderboard_url", &self.leaderboard_url)
            .field("windows_url", &self.windows_url)
            .field("channel_id", &self.channel_id)
            .field("ping", &self.ping)
            .field("initial_ping", &self.initial_ping)
            .field("poll_interval", &self.poll_interval)
            .field("font_path", &self.font_path)
            .finish()
    }
}

/**
 * The `.env` file selected by the value of the `ENV` environment variable, if any.
 *
 * `testing` selects `.env.test` and `production` selects `.env.prod`.
 */
pub fn env_file(env: Option<&str>) -> Option<&'static str> {
    match env {
        Some("testing") => Some(".env.test"),
        Some("production") => Some(".env.prod"),
        _ => None,
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps variable names to their values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::MissingEnvVar(name));

        let discord_token = required("TOKEN")?;

        let (Some(email), Some(password)) = (var("EMAIL"), var("PASSWORD")) else {
            return Err(ConfigError::MissingCredentials);
        };

        let leaderboard_url = required("LEADERBOARDURL")?;
        let windows_url = required("WINDOWSURL")?;

        let channel = required("CHANNELID")?;
        let channel_id = channel
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(ChannelId::new)
            .ok_or_else(|| ConfigError::InvalidEnvVar {
                name: "CHANNELID",
                value: channel.clone(),
                reason: "expected a Discord channel ID".to_string(),
            })?;

        let auth_url = required("AUTHURL")?;
        let ping = required("PING")?;
        let initial_ping = var("INITIALPING").as_deref() == Some("true");

        let poll_interval = match var("POLLINTERVAL") {
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidEnvVar {
                        name: "POLLINTERVAL",
                        value,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
        };

        let font_path = var("FONTPATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_PATH));

        Ok(Self {
            discord_token,
            credentials: Credentials::new(email, password),
            auth_url,
            leaderboard_url,
            windows_url,
            channel_id,
            ping,
            initial_ping,
            poll_interval,
            font_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        [
            ("TOKEN", "discord-token"),
            ("EMAIL", "bot@example.com"),
            ("PASSWORD", "hunter2"),
            ("LEADERBOARDURL", "http://localhost:5000/api/submissions/leaderboard"),
            ("WINDOWSURL", "http://localhost:5000/api/submissions/windows"),
            ("CHANNELID", "123456789012345678"),
            ("AUTHURL", "http://localhost:5000/api/auth/token"),
            ("PING", "@everyone"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn loads_required_variables_with_defaults() {
        let config = load(&full_env()).unwrap();

        assert_eq!(config.discord_token(), "discord-token");
        assert_eq!(config.credentials().email(), "bot@example.com");
        assert_eq!(config.credentials().password(), "hunter2");
        assert_eq!(config.channel_id(), ChannelId::new(123456789012345678));
        assert_eq!(config.ping(), "@everyone");
        assert!(!config.initial_ping());
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.font_path(), &PathBuf::from("Roboto-Regular.ttf"));
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        let mut env = full_env();
        env.remove("WINDOWSURL");

        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("WINDOWSURL")));
        assert_eq!(err.to_string(), "WINDOWSURL is not set");
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        let mut env = full_env();
        env.insert("PING", String::new());

        assert!(matches!(load(&env), Err(ConfigError::MissingEnvVar("PING"))));
    }

    #[test]
    fn credentials_are_reported_together() {
        let mut env = full_env();
        env.remove("PASSWORD");

        assert!(matches!(load(&env), Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn initial_ping_only_for_exact_true() {
        let mut env = full_env();
        env.insert("INITIALPING", "true".to_string());
        assert!(load(&env).unwrap().initial_ping());

        env.insert("INITIALPING", "TRUE".to_string());
        assert!(!load(&env).unwrap().initial_ping());

        env.insert("INITIALPING", "1".to_string());
        assert!(!load(&env).unwrap().initial_ping());
    }

    #[test]
    fn rejects_bad_channel_ids() {
        for bad in ["general", "0", "-5"] {
            let mut env = full_env();
            env.insert("CHANNELID", bad.to_string());

            assert!(
                matches!(
                    load(&env),
                    Err(ConfigError::InvalidEnvVar { name: "CHANNELID", .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn poll_interval_and_font_overrides() {
        let mut env = full_env();
        env.insert("POLLINTERVAL", "15".to_string());
        env.insert("FONTPATH", "/usr/share/fonts/DejaVuSans.ttf".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(
            config.font_path(),
            &PathBuf::from("/usr/share/fonts/DejaVuSans.ttf")
        );

        env.insert("POLLINTERVAL", "0".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::InvalidEnvVar { name: "POLLINTERVAL", .. })
        ));
    }

    #[test]
    fn env_file_selection() {
        assert_eq!(env_file(Some("testing")), Some(".env.test"));
        assert_eq!(env_file(Some("production")), Some(".env.prod"));
        assert_eq!(env_file(Some("staging")), None);
        assert_eq!(env_file(None), None);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let config = load(&full_env()).unwrap();
        let printed = format!("{:?}", config.credentials());

        assert!(printed.contains("bot@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn config_debug_hides_secrets() {
        let config = load(&full_env()).unwrap();
        let printed = format!("{:?}", config);

        assert!(!printed.contains("discord-token"), "{printed}");
        assert!(!printed.contains("hunter2"), "{printed}");
        assert!(printed.contains("discord_token: \"<redacted>\""));
        assert!(printed.contains("123456789012345678"));
        assert!(printed.contains("@everyone"));
    }
}
