// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Frontend event payloads and tracking options.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frontend event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendEventType {
    ButtonClick,
    MotionSwipe,
    MotionScroll,
    SessionStart,
    SessionEnd,
    ElementFocus,
    AppLoadSuccess,
    AppLoadError,
}

impl FrontendEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ButtonClick => "button_click",
            Self::MotionSwipe => "motion_swipe",
            Self::MotionScroll => "motion_scroll",
            Self::SessionStart => "session_start",
            Self::SessionEnd => "session_end",
            Self::ElementFocus => "element_focus",
            Self::AppLoadSuccess => "app_load_success",
            Self::AppLoadError => "app_load_error",
        }
    }
}

impl fmt::Display for FrontendEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payloads that happen on a screen and count toward the session.
pub trait ScreenEvent: Serialize + Sync {
    const EVENT_TYPE: FrontendEventType;

    fn screen_name(&self) -> &str;
}

/// Gesture or scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Caller-supplied session attributes for `start_session`.
///
/// Leave `session_id` empty to have one generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub device_type: String,
    pub os_name: String,
    pub os_version: String,
    pub app_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
}

impl SessionStart {
    pub fn new(
        device_type: impl Into<String>,
        os_name: impl Into<String>,
        os_version: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            os_name: os_name.into(),
            os_version: os_version.into(),
            app_version: app_version.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartPayload {
    pub session_id: String,
    pub device_type: String,
    pub os_name: String,
    pub os_version: String,
    pub app_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    pub timestamp: String,
}

impl SessionStartPayload {
    pub(crate) fn from_start(start: SessionStart, session_id: String, timestamp: String) -> Self {
        Self {
            session_id,
            device_type: start.device_type,
            os_name: start.os_name,
            os_version: start.os_version,
            app_version: start.app_version,
            device_model: start.device_model,
            locale: start.locale,
            timezone: start.timezone,
            screen_width: start.screen_width,
            screen_height: start.screen_height,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndPayload {
    pub session_id: String,
    pub session_duration_ms: u64,
    pub screens_visited: u64,
    pub total_events: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_screen: Option<String>,
    pub exit_reason: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonClickPayload {
    pub button_id: String,
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub timestamp: String,
}

impl ScreenEvent for ButtonClickPayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::ButtonClick;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

/// Optional fields for `track_button_click`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonClickOptions {
    pub button_text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl ButtonClickOptions {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.button_text = Some(text.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipePayload {
    pub screen_name: String,
    pub direction: Direction,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: String,
}

impl ScreenEvent for SwipePayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::MotionSwipe;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollPayload {
    pub screen_name: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_depth_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: String,
}

impl ScreenEvent for ScrollPayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::MotionScroll;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFocusPayload {
    pub element_id: String,
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_duration_ms: Option<u64>,
    pub timestamp: String,
}

impl ScreenEvent for ElementFocusPayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::ElementFocus;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLoadSuccessPayload {
    pub screen_name: String,
    pub load_time_ms: u64,
    pub is_cold_start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfb_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    pub timestamp: String,
}

impl ScreenEvent for AppLoadSuccessPayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::AppLoadSuccess;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

/// Optional fields for `track_load_success`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSuccessOptions {
    /// Defaults to `false`.
    pub is_cold_start: Option<bool>,
    pub network_type: Option<String>,
    pub ttfb_ms: Option<u64>,
    pub resource_count: Option<u32>,
    pub cache_hit: Option<bool>,
}

impl LoadSuccessOptions {
    pub fn cold_start(mut self) -> Self {
        self.is_cold_start = Some(true);
        self
    }

    pub fn with_network_type(mut self, network_type: impl Into<String>) -> Self {
        self.network_type = Some(network_type.into());
        self
    }

    pub fn with_ttfb_ms(mut self, ttfb_ms: u64) -> Self {
        self.ttfb_ms = Some(ttfb_ms);
        self
    }

    pub fn with_resource_count(mut self, count: u32) -> Self {
        self.resource_count = Some(count);
        self
    }

    pub fn with_cache_hit(mut self, hit: bool) -> Self {
        self.cache_hit = Some(hit);
        self
    }
}

/// Category of an app load failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorType {
    Network,
    Timeout,
    Http,
    Parse,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLoadErrorPayload {
    pub screen_name: String,
    pub error_type: LoadErrorType,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: String,
}

impl ScreenEvent for AppLoadErrorPayload {
    const EVENT_TYPE: FrontendEventType = FrontendEventType::AppLoadError;

    fn screen_name(&self) -> &str {
        &self.screen_name
    }
}

/// Optional fields for `track_load_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadErrorOptions {
    pub error_type: Option<LoadErrorType>,
    /// Defaults to the error's name.
    pub error_code: Option<String>,
    pub http_status: Option<u16>,
    pub retry_count: Option<u32>,
}

impl LoadErrorOptions {
    pub fn with_error_type(mut self, error_type: LoadErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = Some(retries);
        self
    }
}
