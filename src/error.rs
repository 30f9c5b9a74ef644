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
use thiserror::Error;

/// Errors found while reading the bot's configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set, or is empty.
    #[error("{0} is not set")]
    MissingEnvVar(&'static str),

    /// The competition credentials are incomplete.
    #[error("EMAIL or PASSWORD is not set")]
    MissingCredentials,

    /// An environment variable is set, but its value cannot be used.
    #[error("{name} has an invalid value `{value}`: {reason}")]
    InvalidEnvVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors talking to the competition API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure, or a non-success status code.
    #[error("request to the competition API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not what the endpoint is expected to return.
    #[error("could not parse the {endpoint} response: {source}")]
    Json {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The windows endpoint answered with an empty list.
    #[error("the competition API returned no submission windows")]
    NoWindows,
}

/// Errors drawing a leaderboard image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The font file could not be read or is not a usable font.
    #[error("could not load font {path}: {reason}")]
    Font { path: String, reason: String },

    /// The image could not be encoded as PNG.
    #[error("could not encode the leaderboard image: {0}")]
    Encode(#[from] image::ImageError),
}

/// A failed fetch through an authenticated session, split by the step that failed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No token could be obtained.
    #[error("could not get a token: {0}")]
    Token(#[source] ApiError),

    /// A token was obtained, but the protected request failed.
    #[error(transparent)]
    Request(ApiError),
}
