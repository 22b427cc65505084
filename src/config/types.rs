// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the partial configuration read from files and the environment,
//! and the two resolved tracker configurations built from it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default per-request delivery timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Path appended to the base URL for backend events.
pub const BACKEND_ENDPOINT_SUFFIX: &str = "/v1/backend-metrics/write/";

/// Path appended to the base URL for frontend events.
pub const FRONTEND_ENDPOINT_SUFFIX: &str = "/v1/frontend-metrics/write/";

/// Partial configuration, as found in a config file or the environment.
/// Every field is optional; sources are merged before resolving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    /// Base URL of the metrics service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Anonymous project identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// API key (backend only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Skip all network delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl PartialConfig {
    /// Resolve into a backend configuration.
    pub fn into_backend(self) -> Result<BackendConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConfigError::MissingField("baseUrl".to_string()))?;
        let project_id = self
            .project_id
            .ok_or_else(|| ConfigError::MissingField("projectId".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| ConfigError::MissingField("apiKey".to_string()))?;

        let config = BackendConfig {
            base_url,
            project_id,
            api_key,
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            disabled: self.disabled.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve into a frontend configuration. Any `api_key` is ignored.
    pub fn into_frontend(self) -> Result<FrontendConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConfigError::MissingField("baseUrl".to_string()))?;
        let project_id = self
            .project_id
            .ok_or_else(|| ConfigError::MissingField("projectId".to_string()))?;

        let config = FrontendConfig {
            base_url,
            project_id,
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            disabled: self.disabled.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for a [`BackendTracker`](crate::backend::BackendTracker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub disabled: bool,
}

impl BackendConfig {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            api_key: api_key.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            disabled: false,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable delivery.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Full URL that backend events are posted to.
    pub fn endpoint_url(&self) -> String {
        endpoint_url(&self.base_url, BACKEND_ENDPOINT_SUFFIX)
    }

    /// Check required fields and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(&self.base_url, &self.project_id, self.timeout_ms)?;
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("apiKey".to_string()));
        }
        Ok(())
    }

    /// Copy of this config with the API key masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: mask_secret(&self.api_key),
            ..self.clone()
        }
    }
}

/// Configuration for a [`FrontendTracker`](crate::frontend::FrontendTracker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    pub base_url: String,
    pub project_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub disabled: bool,
}

impl FrontendConfig {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            disabled: false,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable delivery.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Full URL that frontend events are posted to.
    pub fn endpoint_url(&self) -> String {
        endpoint_url(&self.base_url, FRONTEND_ENDPOINT_SUFFIX)
    }

    /// Check required fields and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(&self.base_url, &self.project_id, self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Join a base URL and an endpoint suffix.
///
/// Only a single trailing slash is removed from `base_url`.
pub fn endpoint_url(base_url: &str, suffix: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}{}", base, suffix)
}

fn validate_common(base_url: &str, project_id: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if base_url.trim().is_empty() {
        return Err(ConfigError::MissingField("baseUrl".to_string()));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::invalid(
            "baseUrl",
            format!("expected an http(s) URL, got '{}'", base_url),
        ));
    }
    if project_id.trim().is_empty() {
        return Err(ConfigError::MissingField("projectId".to_string()));
    }
    if timeout_ms == 0 {
        return Err(ConfigError::invalid("timeoutMs", "must be greater than zero"));
    }
    Ok(())
}

/// Mask all but the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_without_trailing_slash() {
        let config = BackendConfig::new("https://metrics.example.com", "proj", "key");
        assert_eq!(
            config.endpoint_url(),
            "https://metrics.example.com/v1/backend-metrics/write/"
        );
    }

    #[test]
    fn test_endpoint_url_with_trailing_slash() {
        let config = FrontendConfig::new("https://metrics.example.com/", "proj");
        assert_eq!(
            config.endpoint_url(),
            "https://metrics.example.com/v1/frontend-metrics/write/"
        );
    }

    #[test]
    fn test_endpoint_url_strips_only_one_slash() {
        assert_eq!(
            endpoint_url("http://host//", BACKEND_ENDPOINT_SUFFIX),
            "http://host//v1/backend-metrics/write/"
        );
    }

    #[test]
    fn test_defaults() {
        let config = BackendConfig::new("http://localhost", "p", "k");
        assert_eq!(config.timeout_ms, 5000);
        assert!(!config.disabled);

        let parsed: FrontendConfig =
            serde_json::from_str(r#"{"baseUrl": "http://localhost", "projectId": "p"}"#).unwrap();
        assert_eq!(parsed.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!parsed.disabled);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(matches!(
            BackendConfig::new("", "p", "k").validate(),
            Err(ConfigError::MissingField(_))
        ));
        assert!(matches!(
            BackendConfig::new("http://localhost", "", "k").validate(),
            Err(ConfigError::MissingField(_))
        ));
        assert!(matches!(
            BackendConfig::new("http://localhost", "p", " ").validate(),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            FrontendConfig::new("localhost:8080", "p").validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            FrontendConfig::new("http://localhost", "p").with_timeout_ms(0).validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_partial_into_backend() {
        let partial = PartialConfig {
            base_url: Some("http://localhost".to_string()),
            project_id: Some("p".to_string()),
            api_key: Some("k".to_string()),
            timeout_ms: Some(250),
            disabled: None,
        };
        let config = partial.into_backend().unwrap();
        assert_eq!(config.timeout_ms, 250);
        assert!(!config.disabled);
    }

    #[test]
    fn test_partial_into_backend_requires_api_key() {
        let partial = PartialConfig {
            base_url: Some("http://localhost".to_string()),
            project_id: Some("p".to_string()),
            ..Default::default()
        };
        assert!(matches!(partial.clone().into_backend(), Err(ConfigError::MissingField(f)) if f == "apiKey"));
        assert!(partial.into_frontend().is_ok());
    }

    #[test]
    fn test_redacted() {
        let config = BackendConfig::new("http://localhost", "p", "sk_live_12345");
        assert_eq!(config.redacted().api_key, "sk_l****");
        assert_eq!(BackendConfig::new("http://localhost", "p", "abc").redacted().api_key, "****");
    }
}
