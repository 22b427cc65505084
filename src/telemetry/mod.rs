// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local observability for the client itself.
//!
//! - **Logging**: `tracing` subscriber setup for binaries embedding the client
//! - **Delivery statistics**: per-event counters and latency histograms kept
//!   in-process by each tracker
//!
//! # Usage
//!
//! ```rust,ignore
//! use anonmetrics::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::development())?;
//!
//! // ... later
//! println!("{}", tracker.stats().snapshot().format_report());
//! ```

mod init;
mod stats;

pub use init::{init_telemetry, TelemetryConfig};
pub use stats::{DeliveryStats, EventStats, LatencyHistogram, StatsSnapshot};
