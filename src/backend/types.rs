// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Backend event payloads and tracking options.

use serde::{Deserialize, Serialize};

use crate::classify::ToolErrorType;

/// Backend event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendEventType {
    ToolCall,
    ToolError,
}

impl BackendEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolCall => "tool_call",
            Self::ToolError => "tool_error",
        }
    }
}

/// Outcome recorded on a `tool_call` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Success,
    Error,
}

/// Payload of a `tool_call` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub tool_name: String,
    pub call_id: String,
    pub status: ToolCallStatus,
    pub duration_ms: u64,
    pub timestamp: String,
    /// JSON-encoded call parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size_bytes: Option<u64>,
}

/// Payload of a `tool_error` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolErrorPayload {
    pub tool_name: String,
    pub call_id: String,
    pub error_type: ToolErrorType,
    pub error_message: String,
    pub error_code: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// JSON-encoded call parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

/// Optional fields for [`BackendTracker::track_success`](super::BackendTracker::track_success).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessOptions {
    pub call_id: Option<String>,
    pub parameters: Option<String>,
    pub response_size_bytes: Option<u64>,
}

impl SuccessOptions {
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn with_response_size(mut self, bytes: u64) -> Self {
        self.response_size_bytes = Some(bytes);
        self
    }
}

/// Optional fields for [`BackendTracker::track_error`](super::BackendTracker::track_error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorOptions {
    pub call_id: Option<String>,
    pub parameters: Option<String>,
    /// Defaults to `unknown`.
    pub error_type: Option<ToolErrorType>,
    /// Defaults to the error's type name.
    pub error_code: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ErrorOptions {
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn with_error_type(mut self, error_type: ToolErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
