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
use crate::api::{ApiClient, Window};
use crate::error::ApiError;
use poise::serenity_prelude as serenity;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/**
 * A message for the announcement channel about a submission window.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    ping: String,
    window: Window,
}

impl Announcement {
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ping, window_status(&self.window))
    }
}

/// One-line summary of a window, as shown on Discord.
pub fn window_status(window: &Window) -> String {
    format!(
        "Day {}: Max submissions: {}, Current submissions: {}",
        window.day(),
        window.max_submissions(),
        window.current_submissions()
    )
}

/**
 * Remembers the last day seen, and decides which windows deserve an announcement.
 */
#[derive(Debug)]
pub struct DayTracker {
    day: Option<i64>,
    ping: String,
    initial_ping: bool,
}

impl DayTracker {
    pub fn new(ping: String, initial_ping: bool) -> Self {
        Self {
            day: None,
            ping,
            initial_ping,
        }
    }

    pub fn day(&self) -> Option<i64> {
        self.day
    }

    /**
     * Records `window` and returns the announcement it triggers, if any.
     *
     * The first window seen is only announced when the initial ping is enabled. After that, any
     * change of day is announced, whichever direction it goes.
     */
    pub fn observe(&mut self, window: &Window) -> Option<Announcement> {
        let announce = match self.day {
            None => self.initial_ping,
            Some(day) => day != window.day(),
        };
        self.day = Some(window.day());

        announce.then(|| Announcement {
            ping: self.ping.clone(),
            window: *window,
        })
    }
}

/// Runs one poll: authenticates, fetches the current window and feeds it to the tracker.
pub async fn poll_once(
    api: &ApiClient,
    tracker: &mut DayTracker,
) -> Result<Option<Announcement>, ApiError> {
    let window = api.fetch_current_window().await?;

    tracing::info!(
        "Day {} Max submissions: {} Current submissions: {}",
        window.day(),
        window.max_submissions(),
        window.current_submissions()
    );

    let previous = tracker.day();
    let announcement = tracker.observe(&window);
    if let (Some(previous), Some(_)) = (previous, &announcement) {
        tracing::info!("Day changed from {} to {}.", previous, window.day());
    }

    Ok(announcement)
}

/**
 * Polls the submission windows forever, announcing day changes in `channel`.
 *
 * The first poll happens right away. A failed poll is logged and retried on the next tick; until
 * one succeeds, the tracker has not seen a window, so the first success counts as the initial one.
 */
pub async fn run(
    http: Arc<serenity::Http>,
    api: ApiClient,
    channel: serenity::ChannelId,
    mut tracker: DayTracker,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Polling submission windows every {}s, announcing in channel {}.",
        interval.as_secs(),
        channel
    );

    loop {
        ticker.tick().await;

        let announcement = match poll_once(&api, &mut tracker).await {
            Ok(Some(announcement)) => announcement,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!("Failed to poll the submission windows: {}", e);
                continue;
            }
        };

        tracing::info!("Announcing: {}", announcement);
        if let Err(e) = channel.say(&http, announcement.to_string()).await {
            tracing::error!(
                "Failed to announce day {} in channel {}: {}",
                announcement.window().day(),
                channel,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;

    fn window(day: i64, current: i64) -> Window {
        Window {
            day,
            enabled: true,
            max_submissions: 50,
            current_submissions: current,
        }
    }

    #[test]
    fn announcement_text() {
        let mut tracker = DayTracker::new("<@&42>".to_string(), true);
        let announcement = tracker.observe(&window(5, 3)).unwrap();

        assert_eq!(
            announcement.to_string(),
            "<@&42> Day 5: Max submissions: 50, Current submissions: 3"
        );
    }

    #[test]
    fn first_window_is_silent_without_initial_ping() {
        let mut tracker = DayTracker::new("@everyone".to_string(), false);

        assert_eq!(tracker.observe(&window(5, 0)), None);
        assert_eq!(tracker.day(), Some(5));
    }

    #[test]
    fn first_window_is_announced_with_initial_ping() {
        let mut tracker = DayTracker::new("@everyone".to_string(), true);

        let announcement = tracker.observe(&window(5, 0)).unwrap();
        assert_eq!(announcement.window().day(), 5);
        // Only once.
        assert_eq!(tracker.observe(&window(5, 1)), None);
    }

    #[test]
    fn announces_every_day_change() {
        let mut tracker = DayTracker::new("@everyone".to_string(), false);
        tracker.observe(&window(5, 10));

        // Submission counts alone do not trigger anything.
        assert_eq!(tracker.observe(&window(5, 20)), None);

        let next = tracker.observe(&window(6, 0)).unwrap();
        assert_eq!(next.window(), &window(6, 0));
        assert_eq!(tracker.observe(&window(6, 0)), None);

        // Going back is a change too.
        assert!(tracker.observe(&window(4, 0)).is_some());
        assert_eq!(tracker.day(), Some(4));
    }

    #[tokio::test]
    async fn polling_detects_day_changes_on_the_server() {
        let server = StubServer::start().await;
        let api = server.client();
        let mut tracker = DayTracker::new("@everyone".to_string(), false);

        assert_eq!(poll_once(&api, &mut tracker).await.unwrap(), None);

        server.submit();
        assert_eq!(poll_once(&api, &mut tracker).await.unwrap(), None);

        server.advance_day();
        let announcement = poll_once(&api, &mut tracker).await.unwrap().unwrap();
        assert_eq!(
            announcement.to_string(),
            "@everyone Day 6: Max submissions: 50, Current submissions: 0"
        );
    }

    #[tokio::test]
    async fn day_route_advances_the_window() {
        let server = StubServer::start().await;
        let api = server.client();
        let mut tracker = DayTracker::new("@everyone".to_string(), false);
        assert_eq!(poll_once(&api, &mut tracker).await.unwrap(), None);
        server.submit();

        let response = reqwest::Client::new()
            .post(server.url("/test/day"))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(&response.bytes().await.unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "day": 6 }));

        let window = api.fetch_current_window().await.unwrap();
        assert_eq!(window.day(), 6);
        assert_eq!(window.current_submissions(), 0);

        let announcement = poll_once(&api, &mut tracker).await.unwrap().unwrap();
        assert_eq!(announcement.window().day(), 6);
        assert_eq!(tracker.day(), Some(6));
    }

    #[tokio::test]
    async fn failed_polls_leave_the_tracker_untouched() {
        let server = StubServer::start().await;
        let api = server.client();
        let mut tracker = DayTracker::new("@everyone".to_string(), true);

        server.clear_windows();
        assert!(matches!(
            poll_once(&api, &mut tracker).await,
            Err(ApiError::NoWindows)
        ));
        assert_eq!(tracker.day(), None);

        // The first successful poll is still the initial one.
        server.restore_windows();
        let announcement = poll_once(&api, &mut tracker).await.unwrap();
        assert!(announcement.is_some());
        assert_eq!(tracker.day(), Some(5));
    }

    #[tokio::test]
    async fn bad_credentials_fail_the_poll() {
        let server = StubServer::start().await;
        let api = server.client_with_password("wrong");
        let mut tracker = DayTracker::new("@everyone".to_string(), false);

        assert!(matches!(
            poll_once(&api, &mut tracker).await,
            Err(ApiError::Http(_))
        ));
    }
}
