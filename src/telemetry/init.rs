// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local log subscriber setup.
//!
//! The library only emits `tracing` events. Binaries decide where they go;
//! the `anonmetrics` CLI calls [`init_telemetry`] once at startup.

use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default log level if RUST_LOG is not set.
    pub default_level: Level,

    /// Whether to include span close events.
    pub include_span_events: bool,

    /// Whether to include file/line information.
    pub include_file_line: bool,

    /// Whether to include target module path.
    pub include_target: bool,

    /// Whether to use ANSI colors in output.
    pub ansi_colors: bool,

    /// Whether to use compact log format.
    pub compact: bool,

    /// Custom filter directive (overrides RUST_LOG and default_level).
    pub filter_directive: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            include_span_events: false,
            include_file_line: false,
            include_target: true,
            ansi_colors: true,
            compact: true,
            filter_directive: None,
        }
    }
}

impl TelemetryConfig {
    /// Verbose output for local development.
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_span_events: true,
            include_file_line: true,
            compact: false,
            ..Self::default()
        }
    }

    /// Warnings and errors only, no colors.
    pub fn production() -> Self {
        Self {
            include_target: false,
            ansi_colors: false,
            ..Self::default()
        }
    }

    /// Everything from this crate, for test runs.
    pub fn testing() -> Self {
        Self {
            default_level: Level::TRACE,
            include_span_events: true,
            include_file_line: true,
            ansi_colors: false,
            compact: false,
            filter_directive: Some("anonmetrics=trace".to_string()),
            ..Self::default()
        }
    }

    /// Pick a level from command-line verbosity flags.
    pub fn from_flags(debug: bool, trace: bool) -> Self {
        let level = if trace {
            Level::TRACE
        } else if debug {
            Level::DEBUG
        } else {
            Level::WARN
        };
        Self::default().with_level(level)
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set a custom filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_directive = Some(filter.into());
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi_colors = ansi;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.default_level.to_string());
        match &self.filter_directive {
            Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<()> {
    let span_events = if config.include_span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(config.env_filter());
    let result = if config.compact {
        registry.with(fmt_layer.compact()).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };

    result.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.default_level, Level::WARN);
        assert!(config.compact);
        assert!(config.filter_directive.is_none());
    }

    #[test]
    fn test_telemetry_config_presets() {
        assert_eq!(TelemetryConfig::development().default_level, Level::DEBUG);
        assert!(!TelemetryConfig::production().ansi_colors);
        assert_eq!(
            TelemetryConfig::testing().filter_directive.as_deref(),
            Some("anonmetrics=trace")
        );
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(TelemetryConfig::from_flags(false, false).default_level, Level::WARN);
        assert_eq!(TelemetryConfig::from_flags(true, false).default_level, Level::DEBUG);
        assert_eq!(TelemetryConfig::from_flags(true, true).default_level, Level::TRACE);
    }

    #[test]
    fn test_telemetry_config_builder() {
        let config = TelemetryConfig::default()
            .with_level(Level::DEBUG)
            .with_filter("anonmetrics=trace")
            .with_ansi(false);

        assert_eq!(config.default_level, Level::DEBUG);
        assert_eq!(config.filter_directive, Some("anonmetrics=trace".to_string()));
        assert!(!config.ansi_colors);
    }
}
