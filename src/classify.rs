// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error description and classification.
//!
//! Tracking methods accept failures as a [`TrackedError`]: either a structured
//! error with a type tag, message, and optional trace, or a plain message.
//! [`DescribeError`] converts caller error types into that shape, and
//! [`infer_error_type`] maps it onto a [`ToolErrorType`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error category reported with `tool_error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorType {
    Validation,
    Timeout,
    Internal,
    External,
    RateLimit,
    Unknown,
}

impl ToolErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
            Self::External => "external",
            Self::RateLimit => "rate_limit",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ToolErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolErrorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "validation" => Ok(Self::Validation),
            "timeout" => Ok(Self::Timeout),
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "rate_limit" | "rate-limit" => Ok(Self::RateLimit),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown error type: {}", other)),
        }
    }
}

/// A failure as seen by the trackers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedError {
    /// An error value with a type tag.
    ///
    /// `name` is the error's display name and `type_name` its concrete type.
    /// They are usually the same; the frontend reports `name` as the error
    /// code and the backend reports `type_name`.
    Structured {
        name: String,
        type_name: String,
        message: String,
        stack_trace: Option<String>,
    },
    /// A bare message with no error type behind it.
    Plain(String),
}

impl TrackedError {
    /// Create a structured error whose name and type are both `name`.
    pub fn structured(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self::Structured {
            type_name: name.clone(),
            name,
            message: message.into(),
            stack_trace: None,
        }
    }

    /// Create a plain message.
    pub fn plain(message: impl Into<String>) -> Self {
        Self::Plain(message.into())
    }

    /// Describe any standard error, tagging it with its Rust type name.
    ///
    /// The `source()` chain, if any, is recorded as the stack trace.
    pub fn from_std<E: std::error::Error + 'static>(err: &E) -> Self {
        let type_name = short_type_name::<E>();
        Self::Structured {
            name: type_name.clone(),
            type_name,
            message: err.to_string(),
            stack_trace: source_chain(err),
        }
    }

    /// Override the display name, keeping the type name.
    pub fn with_name(self, new_name: impl Into<String>) -> Self {
        match self {
            Self::Structured {
                type_name,
                message,
                stack_trace,
                ..
            } => Self::Structured {
                name: new_name.into(),
                type_name,
                message,
                stack_trace,
            },
            plain => plain,
        }
    }

    /// Attach a stack trace to a structured error.
    pub fn with_stack_trace(self, trace: impl Into<String>) -> Self {
        match self {
            Self::Structured {
                name,
                type_name,
                message,
                ..
            } => Self::Structured {
                name,
                type_name,
                message,
                stack_trace: Some(trace.into()),
            },
            plain => plain,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Structured { message, .. } => message,
            Self::Plain(message) => message,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Structured { name, .. } => Some(name),
            Self::Plain(_) => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Structured { type_name, .. } => Some(type_name),
            Self::Plain(_) => None,
        }
    }

    pub fn stack_trace(&self) -> Option<&str> {
        match self {
            Self::Structured { stack_trace, .. } => stack_trace.as_deref(),
            Self::Plain(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }
}

impl fmt::Display for TrackedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured { name, message, .. } => write!(f, "{}: {}", name, message),
            Self::Plain(message) => f.write_str(message),
        }
    }
}

impl From<String> for TrackedError {
    fn from(message: String) -> Self {
        Self::Plain(message)
    }
}

impl From<&str> for TrackedError {
    fn from(message: &str) -> Self {
        Self::Plain(message.to_string())
    }
}

/// Conversion of a failure value into a [`TrackedError`].
///
/// Implement this for your own error types to use them with
/// [`CallTracker`](crate::call::CallTracker); for types implementing
/// `std::error::Error`, [`TrackedError::from_std`] does the work.
pub trait DescribeError {
    fn describe(&self) -> TrackedError;
}

impl DescribeError for TrackedError {
    fn describe(&self) -> TrackedError {
        self.clone()
    }
}

impl DescribeError for String {
    fn describe(&self) -> TrackedError {
        TrackedError::Plain(self.clone())
    }
}

impl DescribeError for &str {
    fn describe(&self) -> TrackedError {
        TrackedError::Plain((*self).to_string())
    }
}

impl DescribeError for anyhow::Error {
    fn describe(&self) -> TrackedError {
        let backtrace = self.backtrace();
        let stack_trace = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };
        TrackedError::Structured {
            name: "Error".to_string(),
            type_name: "Error".to_string(),
            message: format!("{:#}", self),
            stack_trace,
        }
    }
}

impl DescribeError for std::io::Error {
    fn describe(&self) -> TrackedError {
        TrackedError::Structured {
            name: "IoError".to_string(),
            type_name: "io::Error".to_string(),
            message: self.to_string(),
            stack_trace: source_chain(self),
        }
    }
}

impl DescribeError for Box<dyn std::error::Error + Send + Sync> {
    fn describe(&self) -> TrackedError {
        TrackedError::Structured {
            name: "Error".to_string(),
            type_name: "Error".to_string(),
            message: self.to_string(),
            stack_trace: source_chain(self.as_ref()),
        }
    }
}

impl DescribeError for crate::error::DeliveryError {
    fn describe(&self) -> TrackedError {
        TrackedError::from_std(self)
    }
}

impl DescribeError for crate::error::ConfigError {
    fn describe(&self) -> TrackedError {
        TrackedError::from_std(self)
    }
}

const TIMEOUT_TERMS: &[&str] = &["timeout", "timed out", "etimedout", "deadline exceeded"];
const VALIDATION_TERMS: &[&str] = &["validation", "invalid", "required"];
const RATE_LIMIT_TERMS: &[&str] = &["rate limit", "rate_limit", "ratelimit", "too many requests", "429"];
const NETWORK_TERMS: &[&str] = &[
    "network",
    "fetch",
    "econnrefused",
    "econnreset",
    "enotfound",
    "connection",
    "socket",
];

/// Infer an error category from an error's name and message.
///
/// Matching is case-insensitive and ordered; the first match wins. Plain
/// messages are not error-shaped and always classify as `unknown`.
pub fn infer_error_type(error: &TrackedError) -> ToolErrorType {
    let (name, message) = match error {
        TrackedError::Structured { name, message, .. } => (name, message),
        TrackedError::Plain(_) => return ToolErrorType::Unknown,
    };

    let name = name.to_lowercase();
    let message = message.to_lowercase();
    let mentions = |terms: &[&str]| {
        terms
            .iter()
            .any(|term| name.contains(term) || message.contains(term))
    };

    if mentions(TIMEOUT_TERMS) {
        ToolErrorType::Timeout
    } else if mentions(VALIDATION_TERMS) {
        ToolErrorType::Validation
    } else if mentions(RATE_LIMIT_TERMS) {
        ToolErrorType::RateLimit
    } else if mentions(NETWORK_TERMS) {
        ToolErrorType::External
    } else {
        ToolErrorType::Internal
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

fn source_chain(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(format!("Caused by: {}", cause));
        current = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(message: &str) -> TrackedError {
        TrackedError::structured("Error", message)
    }

    #[test]
    fn test_classify_timeout() {
        assert_eq!(infer_error_type(&err("Request timed out")), ToolErrorType::Timeout);
        assert_eq!(
            infer_error_type(&TrackedError::structured("TimeoutError", "gave up")),
            ToolErrorType::Timeout
        );
    }

    #[test]
    fn test_classify_validation() {
        assert_eq!(infer_error_type(&err("Invalid input required")), ToolErrorType::Validation);
    }

    #[test]
    fn test_classify_rate_limit() {
        assert_eq!(infer_error_type(&err("429 too many requests")), ToolErrorType::RateLimit);
        assert_eq!(infer_error_type(&err("Rate Limit exceeded")), ToolErrorType::RateLimit);
    }

    #[test]
    fn test_classify_external() {
        assert_eq!(
            infer_error_type(&err("fetch failed: ECONNREFUSED")),
            ToolErrorType::External
        );
    }

    #[test]
    fn test_classify_internal_and_unknown() {
        assert_eq!(infer_error_type(&err("boom")), ToolErrorType::Internal);
        assert_eq!(infer_error_type(&TrackedError::plain("boom")), ToolErrorType::Unknown);
        assert_eq!(infer_error_type(&"timed out".describe()), ToolErrorType::Unknown);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // Both timeout and network terms; timeout is checked first.
        assert_eq!(
            infer_error_type(&err("network timeout while connecting")),
            ToolErrorType::Timeout
        );
    }

    #[test]
    fn test_from_std_uses_type_name() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let tracked = TrackedError::from_std(&io);
        assert_eq!(tracked.type_name(), Some("Error"));
        assert_eq!(tracked.message(), "disk full");

        let delivery = crate::error::DeliveryError::Timeout(10);
        assert_eq!(delivery.describe().type_name(), Some("DeliveryError"));
    }

    #[test]
    fn test_io_error_describe() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let tracked = io.describe();
        assert_eq!(tracked.name(), Some("IoError"));
        assert_eq!(infer_error_type(&tracked), ToolErrorType::External);
    }

    #[test]
    fn test_anyhow_describe_includes_context() {
        let error = anyhow::anyhow!("deadline exceeded").context("calling search");
        let tracked = error.describe();
        assert!(tracked.message().contains("calling search"));
        assert!(tracked.message().contains("deadline exceeded"));
        assert_eq!(infer_error_type(&tracked), ToolErrorType::Timeout);
    }

    #[test]
    fn test_with_name_keeps_type() {
        let tracked = TrackedError::structured("HttpError", "bad").with_name("NotFound");
        assert_eq!(tracked.name(), Some("NotFound"));
        assert_eq!(tracked.type_name(), Some("HttpError"));
        assert_eq!(TrackedError::plain("x").with_name("Y"), TrackedError::plain("x"));
    }

    #[test]
    fn test_error_type_parse_and_display() {
        assert_eq!("rate_limit".parse::<ToolErrorType>().unwrap(), ToolErrorType::RateLimit);
        assert_eq!(ToolErrorType::RateLimit.to_string(), "rate_limit");
        assert!("bogus".parse::<ToolErrorType>().is_err());
        assert_eq!(
            serde_json::to_string(&ToolErrorType::External).unwrap(),
            "\"external\""
        );
    }
}
