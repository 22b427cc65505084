// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Anonmetrics - best-effort telemetry for anonymous metrics endpoints.
//!
//! Applications report what their tools and screens are doing; the client
//! wraps each event in a small JSON envelope and posts it to the metrics
//! service. Delivery never affects the caller: failures, non-2xx responses
//! and timeouts are logged and dropped.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`backend`] - Server-side tool call success/error events
//! - [`frontend`] - UI events and session tracking
//! - [`call`] - Automatic timing and reporting around arbitrary operations
//! - [`classify`] - Error descriptions and error-type inference
//! - [`transport`] - HTTP delivery, timeouts and the `Transport` seam
//! - [`envelope`] - The double-encoded wire envelope
//! - [`config`] - Tracker configuration, loading and merging
//! - [`error`] - Error types and result aliases
//! - [`ids`] - Call ids, session ids and timestamps
//! - [`telemetry`] - Local logging setup and delivery statistics
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use anonmetrics::{BackendConfig, BackendTracker, CallTracker, TrackOptions};
//!
//! let tracker = Arc::new(BackendTracker::new(BackendConfig::new(
//!     "https://metrics.example.com",
//!     "proj_123",
//!     "sk_live_abc",
//! ))?);
//!
//! let calls = CallTracker::new(tracker);
//! let rows = calls.track("load_rows", || load_rows(), TrackOptions::default()).await?;
//! ```

pub mod backend;
pub mod call;
pub mod classify;
pub mod config;
pub mod envelope;
pub mod error;
pub mod frontend;
pub mod ids;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types at crate root
pub use backend::{BackendTracker, ErrorOptions, SuccessOptions, ToolCallPayload, ToolErrorPayload};
pub use call::{CallArgs, CallTracker, TrackOptions, TrackedCall, TrackedFn};
pub use classify::{infer_error_type, DescribeError, ToolErrorType, TrackedError};
pub use config::{BackendConfig, FrontendConfig, PartialConfig};
pub use envelope::EventEnvelope;
pub use error::{ConfigError, DeliveryError, Result};
pub use frontend::{FrontendEventType, FrontendTracker, SessionStart};
pub use transport::{Delivery, ReqwestTransport, Transport, TransportRequest, TransportResponse};

/// Anonmetrics version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        let config = BackendConfig::new("http://localhost:8080", "proj", "key");
        assert!(BackendTracker::new(config).is_ok());
        assert_eq!(infer_error_type(&TrackedError::plain("boom")), ToolErrorType::Unknown);
    }
}
