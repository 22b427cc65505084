// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Server-side tool-call telemetry.
//!
//! [`BackendTracker`] is stateless apart from its configuration: every call
//! builds one `tool_call` or `tool_error` event and hands it to the
//! dispatcher. Delivery problems are logged, never returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use anonmetrics::backend::{BackendTracker, SuccessOptions};
//! use anonmetrics::config::BackendConfig;
//!
//! let tracker = BackendTracker::new(BackendConfig::new(
//!     "https://metrics.example.com",
//!     "proj_123",
//!     "sk_live_abc",
//! ))?;
//!
//! tracker
//!     .track_success("search", 42, SuccessOptions::default().with_response_size(512))
//!     .await;
//! ```

mod types;

pub use types::{
    BackendEventType, ErrorOptions, SuccessOptions, ToolCallPayload, ToolCallStatus,
    ToolErrorPayload,
};

use std::sync::Arc;

use tracing::debug;

use crate::classify::{ToolErrorType, TrackedError};
use crate::config::BackendConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::ids::{generate_call_id, timestamp_now};
use crate::telemetry::DeliveryStats;
use crate::transport::{Delivery, Dispatcher, ReqwestTransport, Transport};

/// Fallback error code when nothing better is known.
const DEFAULT_ERROR_CODE: &str = "Error";

/// Client for `tool_call` / `tool_error` events.
#[derive(Debug)]
pub struct BackendTracker {
    config: BackendConfig,
    dispatcher: Dispatcher,
}

impl BackendTracker {
    /// Create a tracker that delivers over HTTP with `reqwest`.
    pub fn new(config: BackendConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a tracker with a custom transport.
    pub fn with_transport(
        config: BackendConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let headers = vec![
            ("anon-project-id".to_string(), config.project_id.clone()),
            ("api-key".to_string(), config.api_key.clone()),
        ];
        let dispatcher = Dispatcher::new(
            config.endpoint_url(),
            headers,
            config.timeout_ms,
            config.disabled,
            transport,
        );

        Ok(Self { config, dispatcher })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// URL events are posted to.
    pub fn endpoint(&self) -> &str {
        self.dispatcher.endpoint()
    }

    pub fn stats(&self) -> &Arc<DeliveryStats> {
        self.dispatcher.stats()
    }

    /// Send a prepared `tool_call` payload.
    pub async fn track_tool_call(&self, payload: ToolCallPayload) {
        debug!(tool = %payload.tool_name, call_id = %payload.call_id, "Tracking tool call");
        self.dispatcher
            .send(BackendEventType::ToolCall.as_str(), &payload)
            .await;
    }

    /// Send a prepared `tool_error` payload.
    pub async fn track_tool_error(&self, payload: ToolErrorPayload) {
        debug!(
            tool = %payload.tool_name,
            call_id = %payload.call_id,
            error_type = %payload.error_type,
            "Tracking tool error"
        );
        self.dispatcher
            .send(BackendEventType::ToolError.as_str(), &payload)
            .await;
    }

    /// Report a successful tool call.
    pub async fn track_success(&self, tool_name: &str, duration_ms: u64, options: SuccessOptions) {
        let payload = build_success_payload(tool_name, duration_ms, options);
        self.track_tool_call(payload).await;
    }

    /// Report a failed tool call.
    ///
    /// `error_type` defaults to `unknown`; classification is the caller's job.
    pub async fn track_error(
        &self,
        tool_name: &str,
        error: impl Into<TrackedError>,
        options: ErrorOptions,
    ) {
        let payload = build_error_payload(tool_name, &error.into(), options);
        self.track_tool_error(payload).await;
    }

    /// Send a `tool_call` payload and return the delivery outcome.
    pub async fn try_track_tool_call(&self, payload: &ToolCallPayload) -> Result<Delivery, DeliveryError> {
        self.dispatcher
            .try_send(BackendEventType::ToolCall.as_str(), payload)
            .await
    }

    /// Send a `tool_error` payload and return the delivery outcome.
    pub async fn try_track_tool_error(&self, payload: &ToolErrorPayload) -> Result<Delivery, DeliveryError> {
        self.dispatcher
            .try_send(BackendEventType::ToolError.as_str(), payload)
            .await
    }
}

/// Build a `tool_call` payload with status `success` and the current time.
pub fn build_success_payload(
    tool_name: &str,
    duration_ms: u64,
    options: SuccessOptions,
) -> ToolCallPayload {
    ToolCallPayload {
        tool_name: tool_name.to_string(),
        call_id: options.call_id.unwrap_or_else(generate_call_id),
        status: ToolCallStatus::Success,
        duration_ms,
        timestamp: timestamp_now(),
        parameters: options.parameters,
        response_size_bytes: options.response_size_bytes,
    }
}

/// Build a `tool_error` payload.
///
/// `error_code` is the explicit override, else the error's type name, else `"Error"`.
pub fn build_error_payload(
    tool_name: &str,
    error: &TrackedError,
    options: ErrorOptions,
) -> ToolErrorPayload {
    let error_code = options
        .error_code
        .or_else(|| error.type_name().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string());

    ToolErrorPayload {
        tool_name: tool_name.to_string(),
        call_id: options.call_id.unwrap_or_else(generate_call_id),
        error_type: options.error_type.unwrap_or(ToolErrorType::Unknown),
        error_message: error.message().to_string(),
        error_code,
        timestamp: timestamp_now(),
        duration_ms: options.duration_ms,
        stack_trace: error.stack_trace().map(str::to_string),
        parameters: options.parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportResponse};

    fn config() -> BackendConfig {
        BackendConfig::new("http://metrics.test/", "proj_1", "key_1")
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = BackendTracker::new(BackendConfig::new("http://metrics.test", "", "k"));
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_endpoint() {
        let tracker = BackendTracker::new(config()).unwrap();
        assert_eq!(tracker.endpoint(), "http://metrics.test/v1/backend-metrics/write/");
    }

    #[test]
    fn test_success_payload() {
        let payload = build_success_payload(
            "search",
            120,
            SuccessOptions::default()
                .with_call_id("call-1")
                .with_parameters(r#"{"q":"rust"}"#)
                .with_response_size(64),
        );
        assert_eq!(payload.call_id, "call-1");
        assert_eq!(payload.status, ToolCallStatus::Success);
        assert_eq!(payload.duration_ms, 120);
        assert_eq!(payload.parameters.as_deref(), Some(r#"{"q":"rust"}"#));
        assert_eq!(payload.response_size_bytes, Some(64));

        let generated = build_success_payload("search", 1, SuccessOptions::default());
        assert!(generated.call_id.contains('-'));
    }

    #[test]
    fn test_error_payload_from_plain_message() {
        let payload = build_error_payload("search", &TrackedError::plain("boom"), ErrorOptions::default());
        assert_eq!(payload.error_message, "boom");
        assert_eq!(payload.error_code, "Error");
        assert_eq!(payload.error_type, ToolErrorType::Unknown);
        assert!(payload.stack_trace.is_none());
    }

    #[test]
    fn test_error_payload_uses_type_name() {
        let error = TrackedError::structured("HttpError", "bad gateway")
            .with_name("GatewayError")
            .with_stack_trace("at fetch()");
        let payload = build_error_payload("search", &error, ErrorOptions::default());
        assert_eq!(payload.error_code, "HttpError");
        assert_eq!(payload.stack_trace.as_deref(), Some("at fetch()"));

        let overridden = build_error_payload(
            "search",
            &error,
            ErrorOptions::default()
                .with_error_code("E502")
                .with_error_type(ToolErrorType::External),
        );
        assert_eq!(overridden.error_code, "E502");
        assert_eq!(overridden.error_type, ToolErrorType::External);
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = build_success_payload("search", 5, SuccessOptions::default());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("parameters").is_none());
        assert!(json.get("response_size_bytes").is_none());
    }

    #[tokio::test]
    async fn test_disabled_makes_no_request() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(0);

        let tracker =
            BackendTracker::with_transport(config().with_disabled(true), Arc::new(transport)).unwrap();
        tracker.track_success("search", 10, SuccessOptions::default()).await;
        tracker.track_error("search", "boom", ErrorOptions::default()).await;
    }

    #[tokio::test]
    async fn test_headers_include_api_key() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .withf(|req| {
                req.header("api-key") == Some("key_1")
                    && req.header("anon-project-id") == Some("proj_1")
                    && req.envelope().map(|e| e.event_type == "tool_error").unwrap_or(false)
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(200, "")));

        let tracker = BackendTracker::with_transport(config(), Arc::new(transport)).unwrap();
        tracker
            .track_error("search", TrackedError::structured("Error", "boom"), ErrorOptions::default())
            .await;
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_raised() {
        let mut transport = MockTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(DeliveryError::Network("connection reset".to_string())));

        let tracker = BackendTracker::with_transport(config(), Arc::new(transport)).unwrap();
        // Returns normally.
        tracker.track_success("search", 10, SuccessOptions::default()).await;
    }
}
