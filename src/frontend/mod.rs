// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! UI telemetry with session tracking.
//!
//! [`FrontendTracker`] sends eight event kinds and keeps a small amount of
//! session state: the current session id, when it started, the sequence of
//! screens visited, and how many events have been tracked. Every screen event
//! updates that state before it is sent, and `end_session` reports the
//! accumulated totals.
//!
//! Session state sits behind a mutex so a tracker can be shared across tasks.
//! The lock is never held across a network send.

mod session;
mod types;

pub use session::{SessionState, SessionSummary};
pub use types::{
    AppLoadErrorPayload, AppLoadSuccessPayload, ButtonClickOptions, ButtonClickPayload, Direction,
    ElementFocusPayload, FrontendEventType, LoadErrorOptions, LoadErrorType, LoadSuccessOptions,
    ScreenEvent, ScrollPayload, SessionEndPayload, SessionStart, SessionStartPayload,
    SwipePayload,
};

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::classify::TrackedError;
use crate::config::FrontendConfig;
use crate::error::ConfigError;
use crate::ids::{generate_session_id, timestamp_now};
use crate::telemetry::DeliveryStats;
use crate::transport::{Dispatcher, ReqwestTransport, Transport};

const DEFAULT_ERROR_CODE: &str = "Error";

/// Client for UI events.
#[derive(Debug)]
pub struct FrontendTracker {
    config: FrontendConfig,
    dispatcher: Dispatcher,
    state: Mutex<SessionState>,
}

impl FrontendTracker {
    /// Create a tracker that delivers over HTTP with `reqwest`.
    pub fn new(config: FrontendConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a tracker with a custom transport.
    pub fn with_transport(
        config: FrontendConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let headers = vec![("anon-project-id".to_string(), config.project_id.clone())];
        let dispatcher = Dispatcher::new(
            config.endpoint_url(),
            headers,
            config.timeout_ms,
            config.disabled,
            transport,
        );

        Ok(Self {
            config,
            dispatcher,
            state: Mutex::new(SessionState::new()),
        })
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// URL events are posted to.
    pub fn endpoint(&self) -> &str {
        self.dispatcher.endpoint()
    }

    pub fn stats(&self) -> &Arc<DeliveryStats> {
        self.dispatcher.stats()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Start a session and send `session_start`. Returns the session id.
    pub async fn start_session(&self, start: SessionStart) -> String {
        let session_id = start
            .session_id
            .clone()
            .unwrap_or_else(generate_session_id);

        self.state().start(session_id.clone());
        debug!(session_id = %session_id, "Session started");

        let payload = SessionStartPayload::from_start(start, session_id.clone(), timestamp_now());
        self.send_session_start(payload).await;
        session_id
    }

    /// End the active session and send `session_end`.
    ///
    /// Without an active session this only logs a warning.
    pub async fn end_session(&self, exit_reason: impl Into<String>) {
        let summary = self.state().end();
        let Some(summary) = summary else {
            warn!("end_session called without an active session");
            return;
        };

        debug!(
            session_id = %summary.session_id,
            duration_ms = summary.duration_ms,
            total_events = summary.total_events,
            "Session ended"
        );

        let payload = SessionEndPayload {
            session_id: summary.session_id,
            session_duration_ms: summary.duration_ms,
            screens_visited: summary.screens_visited,
            total_events: summary.total_events,
            last_screen: summary.last_screen,
            exit_reason: exit_reason.into(),
            timestamp: timestamp_now(),
        };
        self.send_session_end(payload).await;
    }

    /// Id of the active session, if any.
    pub fn session_id(&self) -> Option<String> {
        self.state().session_id().map(str::to_string)
    }

    /// Screens visited since the session started, consecutive repeats collapsed.
    pub fn screen_history(&self) -> Vec<String> {
        self.state().screen_history().to_vec()
    }

    /// Screen events tracked since the session started.
    pub fn event_count(&self) -> u64 {
        self.state().event_count()
    }

    // ------------------------------------------------------------------
    // Convenience tracking
    // ------------------------------------------------------------------

    pub async fn track_button_click(
        &self,
        button_id: &str,
        screen_name: &str,
        options: ButtonClickOptions,
    ) {
        let payload = ButtonClickPayload {
            button_id: button_id.to_string(),
            screen_name: screen_name.to_string(),
            button_text: options.button_text,
            x: options.x,
            y: options.y,
            timestamp: timestamp_now(),
        };
        self.send_button_click(payload).await;
    }

    pub async fn track_swipe(&self, payload: SwipePayload) {
        self.track_screen_event(&payload).await;
    }

    pub async fn track_scroll(&self, payload: ScrollPayload) {
        self.track_screen_event(&payload).await;
    }

    pub async fn track_element_focus(&self, payload: ElementFocusPayload) {
        self.track_screen_event(&payload).await;
    }

    pub async fn track_load_success(
        &self,
        screen_name: &str,
        load_time_ms: u64,
        options: LoadSuccessOptions,
    ) {
        let payload = AppLoadSuccessPayload {
            screen_name: screen_name.to_string(),
            load_time_ms,
            is_cold_start: options.is_cold_start.unwrap_or(false),
            network_type: options.network_type,
            ttfb_ms: options.ttfb_ms,
            resource_count: options.resource_count,
            cache_hit: options.cache_hit,
            timestamp: timestamp_now(),
        };
        self.send_app_load_success(payload).await;
    }

    /// Track a failed screen load.
    ///
    /// `error_code` defaults to the error's name, then `"Error"`.
    pub async fn track_load_error(
        &self,
        screen_name: &str,
        error: impl Into<TrackedError>,
        options: LoadErrorOptions,
    ) {
        let error = error.into();
        let error_code = options
            .error_code
            .or_else(|| error.name().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string());

        let payload = AppLoadErrorPayload {
            screen_name: screen_name.to_string(),
            error_type: options.error_type.unwrap_or_default(),
            error_message: error.message().to_string(),
            error_code: Some(error_code),
            http_status: options.http_status,
            retry_count: options.retry_count,
            stack_trace: error.stack_trace().map(str::to_string),
            timestamp: timestamp_now(),
        };
        self.send_app_load_error(payload).await;
    }

    // ------------------------------------------------------------------
    // Raw sends
    // ------------------------------------------------------------------

    /// Send a prepared `button_click` payload.
    pub async fn send_button_click(&self, payload: ButtonClickPayload) {
        self.track_screen_event(&payload).await;
    }

    /// Send a prepared `app_load_success` payload.
    pub async fn send_app_load_success(&self, payload: AppLoadSuccessPayload) {
        self.track_screen_event(&payload).await;
    }

    /// Send a prepared `app_load_error` payload.
    pub async fn send_app_load_error(&self, payload: AppLoadErrorPayload) {
        self.track_screen_event(&payload).await;
    }

    /// Send a prepared `session_start` payload. Session state is untouched.
    pub async fn send_session_start(&self, payload: SessionStartPayload) {
        self.dispatcher
            .send(FrontendEventType::SessionStart.as_str(), &payload)
            .await;
    }

    /// Send a prepared `session_end` payload. Session state is untouched.
    pub async fn send_session_end(&self, payload: SessionEndPayload) {
        self.dispatcher
            .send(FrontendEventType::SessionEnd.as_str(), &payload)
            .await;
    }

    async fn track_screen_event<E: ScreenEvent>(&self, event: &E) {
        self.state().record_event(event.screen_name());
        self.dispatcher.send(E::EVENT_TYPE.as_str(), event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportResponse};

    fn config() -> FrontendConfig {
        FrontendConfig::new("http://metrics.test", "proj_fe")
    }

    fn disabled_tracker() -> FrontendTracker {
        let mut transport = MockTransport::new();
        transport.expect_post().times(0);
        FrontendTracker::with_transport(config().with_disabled(true), Arc::new(transport)).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let tracker = FrontendTracker::new(config()).unwrap();
        assert_eq!(tracker.endpoint(), "http://metrics.test/v1/frontend-metrics/write/");
    }

    #[tokio::test]
    async fn test_start_session_generates_id() {
        let tracker = disabled_tracker();
        let id = tracker.start_session(SessionStart::new("mobile", "ios", "17.0", "1.0.0")).await;
        assert!(!id.is_empty());
        assert_eq!(tracker.session_id(), Some(id));
    }

    #[tokio::test]
    async fn test_start_session_keeps_supplied_id() {
        let tracker = disabled_tracker();
        let id = tracker
            .start_session(SessionStart::new("web", "macos", "14", "2.0").with_session_id("sess-42"))
            .await;
        assert_eq!(id, "sess-42");
    }

    #[tokio::test]
    async fn test_session_events_are_not_counted() {
        let tracker = disabled_tracker();
        tracker.start_session(SessionStart::default()).await;
        tracker.track_button_click("ok", "home", ButtonClickOptions::default()).await;
        tracker.end_session("user_exit").await;
        tracker.start_session(SessionStart::default()).await;
        assert_eq!(tracker.event_count(), 0);
        assert!(tracker.screen_history().is_empty());
    }

    #[tokio::test]
    async fn test_end_session_without_start_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(0);
        let tracker = FrontendTracker::with_transport(config(), Arc::new(transport)).unwrap();

        tracker.end_session("user_exit").await;
        assert_eq!(tracker.session_id(), None);
    }

    #[tokio::test]
    async fn test_load_error_uses_error_name() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|req| {
                let payload = req.envelope().and_then(|e| e.payload()).unwrap();
                payload["error_code"] == "ChunkLoadError"
                    && payload["error_type"] == "unknown"
                    && payload["error_message"] == "chunk 7 failed"
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(200, "")));
        let tracker = FrontendTracker::with_transport(config(), Arc::new(transport)).unwrap();

        let error = TrackedError::structured("Error", "chunk 7 failed").with_name("ChunkLoadError");
        tracker.track_load_error("home", error, LoadErrorOptions::default()).await;
        assert_eq!(tracker.event_count(), 1);
    }

    #[tokio::test]
    async fn test_load_success_defaults_cold_start() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|req| {
                let envelope = req.envelope().unwrap();
                let payload = envelope.payload().unwrap();
                envelope.event_type == "app_load_success"
                    && payload["is_cold_start"] == false
                    && payload["load_time_ms"] == 850
                    && payload.get("ttfb_ms").is_none()
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(200, "")));
        let tracker = FrontendTracker::with_transport(config(), Arc::new(transport)).unwrap();

        tracker.track_load_success("home", 850, LoadSuccessOptions::default()).await;
    }
}
