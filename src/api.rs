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
use crate::config::{Config, Credentials};
use crate::error::{ApiError, FetchError};
use chrono::{DateTime, NaiveDateTime, Utc};
use getset::{CopyGetters, Getters};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/* Wire types: */

/// One row of the competition leaderboard. The API returns rows already ranked.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters, CopyGetters)]
pub struct LeaderboardEntry {
    #[getset(get = "pub")]
    pub(crate) username: String,
    #[getset(get_copy = "pub")]
    pub(crate) total_submissions: i64,
    #[getset(get_copy = "pub")]
    pub(crate) challenge_points: f64,
    #[getset(get_copy = "pub")]
    pub(crate) total_points: f64,
    /// Time of the user's latest submission, if they ever submitted.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    #[getset(get_copy = "pub")]
    pub(crate) last_submission: Option<DateTime<Utc>>,
}

/// A day of the competition, and how many submissions it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Window {
    pub(crate) day: i64,
    pub(crate) enabled: bool,
    pub(crate) max_submissions: i64,
    pub(crate) current_submissions: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: String,
}

#[derive(Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

/**
 * Accepts RFC 3339 timestamps, and also timestamps without an offset, which are taken as UTC.
 */
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp `{}`: {}", raw, e)))
}

/* Client: */

/**
 * Client for the competition's REST API.
 *
 * Tokens are not cached. Callers authenticate right before each batch of requests, and drop the
 * token afterwards.
 */
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    credentials: Credentials,
    auth_url: String,
    leaderboard_url: String,
    windows_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_endpoints(
            config.credentials().clone(),
            config.auth_url().clone(),
            config.leaderboard_url().clone(),
            config.windows_url().clone(),
        )
    }

    pub fn with_endpoints(
        credentials: Credentials,
        auth_url: String,
        leaderboard_url: String,
        windows_url: String,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            credentials,
            auth_url,
            leaderboard_url,
            windows_url,
        })
    }

    /// Logs into the competition API and returns a fresh bearer token.
    pub async fn authenticate(&self) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.auth_url)
            .header(ACCEPT, "*/*")
            .form(&LoginForm {
                username: self.credentials.email(),
                password: self.credentials.password(),
            })
            .send()
            .await?;

        let token: TokenResponse = parse_body(response, "token").await?;
        Ok(token.access_token)
    }

    pub async fn leaderboard(&self, token: &str) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.get_authorized(&self.leaderboard_url, token, "leaderboard")
            .await
    }

    pub async fn windows(&self, token: &str) -> Result<Vec<Window>, ApiError> {
        self.get_authorized(&self.windows_url, token, "windows").await
    }

    /// The window currently in effect, which the API lists first.
    pub async fn current_window(&self, token: &str) -> Result<Window, ApiError> {
        self.windows(token)
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::NoWindows)
    }

    /// Authenticates, then fetches the current window.
    pub async fn fetch_current_window(&self) -> Result<Window, ApiError> {
        let token = self.authenticate().await?;
        self.current_window(&token).await
    }

    /// Authenticates, then fetches the leaderboard. The error tells which of the two failed.
    pub async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, FetchError> {
        let token = self.authenticate().await.map_err(FetchError::Token)?;
        self.leaderboard(&token).await.map_err(FetchError::Request)
    }

    async fn get_authorized<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "*/*")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        parse_body(response, endpoint).await
    }
}

async fn parse_body<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<T, ApiError> {
    let body = response.error_for_status()?.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| ApiError::Json { endpoint, source })
}
