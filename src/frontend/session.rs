// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-tracker session state.

use std::time::Instant;

/// State accumulated between `start_session` and `end_session`.
///
/// Event counting and screen history keep running without an active
/// session; they are reset by the next `start`.
#[derive(Debug, Default)]
pub struct SessionState {
    session_id: Option<String>,
    start_time: Option<Instant>,
    screen_history: Vec<String>,
    event_count: u64,
}

/// Totals computed when a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub duration_ms: u64,
    pub screens_visited: u64,
    pub total_events: u64,
    pub last_screen: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session, discarding any previous counters.
    pub fn start(&mut self, session_id: String) {
        self.session_id = Some(session_id);
        self.start_time = Some(Instant::now());
        self.screen_history.clear();
        self.event_count = 0;
    }

    /// Count an event on `screen_name`.
    ///
    /// The screen is appended only if it differs from the last one recorded.
    pub fn record_event(&mut self, screen_name: &str) {
        self.event_count += 1;
        if self.screen_history.last().map(String::as_str) != Some(screen_name) {
            self.screen_history.push(screen_name.to_string());
        }
    }

    /// Close the active session and summarize it.
    ///
    /// Returns `None` when no session is active.
    pub fn end(&mut self) -> Option<SessionSummary> {
        let session_id = self.session_id.take()?;
        let duration_ms = self
            .start_time
            .take()
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0);

        Some(SessionSummary {
            session_id,
            duration_ms,
            screens_visited: self.screen_history.len() as u64,
            total_events: self.event_count,
            last_screen: self.screen_history.last().cloned(),
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn screen_history(&self) -> &[String] {
        &self.screen_history
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}
