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
//! In-process stand-in for the competition API, used by the tests.
//!
//! Serves the same routes as the development test server: the leaderboard, the submission
//! windows, and `POST /test/day` to advance the competition by one day. It also issues tokens.

use crate::api::ApiClient;
use crate::config::Credentials;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const STUB_EMAIL: &str = "bot@example.com";
pub const STUB_PASSWORD: &str = "hunter2";
pub const STUB_TOKEN: &str = "stub-access-token";

#[derive(Default)]
struct StubState {
    day: i64,
    submissions: i64,
    no_windows: bool,
    broken_leaderboard: bool,
}

type Shared = Arc<Mutex<StubState>>;

#[derive(Deserialize)]
struct Login {
    username: String,
    password: String,
}

pub struct StubServer {
    addr: SocketAddr,
    state: Shared,
    task: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            day: 5,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/token", post(token))
            .route("/api/submissions/leaderboard", get(leaderboard))
            .route("/api/submissions/windows", get(windows))
            .route("/test/day", post(next_day))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server crashed");
        });

        Self { addr, state, task }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn client(&self) -> ApiClient {
        self.client_with_password(STUB_PASSWORD)
    }

    pub fn client_with_password(&self, password: &str) -> ApiClient {
        ApiClient::with_endpoints(
            Credentials::new(STUB_EMAIL.to_string(), password.to_string()),
            self.url("/api/auth/token"),
            self.url("/api/submissions/leaderboard"),
            self.url("/api/submissions/windows"),
        )
        .expect("build API client")
    }

    /// Same effect as `POST /test/day`.
    pub fn advance_day(&self) {
        let mut state = self.state.lock().unwrap();
        state.day += 1;
        state.submissions = 0;
    }

    pub fn submit(&self) {
        self.state.lock().unwrap().submissions += 1;
    }

    pub fn clear_windows(&self) {
        self.state.lock().unwrap().no_windows = true;
    }

    pub fn restore_windows(&self) {
        self.state.lock().unwrap().no_windows = false;
    }

    pub fn break_leaderboard(&self) {
        self.state.lock().unwrap().broken_leaderboard = true;
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {}", STUB_TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn token(Form(login): Form<Login>) -> Result<Json<Value>, StatusCode> {
    if login.username != STUB_EMAIL || login.password != STUB_PASSWORD {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "access_token": STUB_TOKEN,
        "token_type": "bearer",
    })))
}

async fn leaderboard(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    if state.lock().unwrap().broken_leaderboard {
        return Ok(Json(json!({ "detail": "maintenance" })));
    }
    Ok(Json(json!([
        {
            "username": "Player1",
            "total_submissions": 15,
            "challenge_points": 450.5,
            "total_points": 1250.0,
            "last_submission": "2025-12-08T20:00:00",
        },
        {
            "username": "Player2",
            "total_submissions": 12,
            "challenge_points": 400.0,
            "total_points": 1100.0,
            "last_submission": "2025-12-08T19:30:00",
        },
    ])))
}

async fn windows(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&headers)?;
    let state = state.lock().unwrap();
    if state.no_windows {
        return Ok(Json(json!([])));
    }
    Ok(Json(json!([
        {
            "day": state.day,
            "enabled": true,
            "max_submissions": 50,
            "current_submissions": state.submissions,
        }
    ])))
}

async fn next_day(State(state): State<Shared>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.day += 1;
    state.submissions = 0;
    Json(json!({ "day": state.day }))
}
