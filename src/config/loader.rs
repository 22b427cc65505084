// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files and the environment.
//!
//! Handles loading partial configuration from JSON and YAML files and from
//! `ANONMETRICS_*` environment variables.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::PartialConfig;

/// Config file names to search for in a workspace (in order).
pub const CONFIG_FILES: &[&str] = &[
    ".anonmetrics.json",
    ".anonmetrics.yaml",
    ".anonmetrics/config.json",
];

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".anonmetrics";

/// Global config file names (in order).
pub const GLOBAL_CONFIG_FILES: &[&str] = &["config.json", "config.yaml"];

/// Environment variable names.
pub const ENV_BASE_URL: &str = "ANONMETRICS_BASE_URL";
pub const ENV_PROJECT_ID: &str = "ANONMETRICS_PROJECT_ID";
pub const ENV_API_KEY: &str = "ANONMETRICS_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "ANONMETRICS_TIMEOUT_MS";
pub const ENV_DISABLED: &str = "ANONMETRICS_DISABLED";

/// Get the global config directory path.
pub fn get_global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR))
}

/// Load global configuration from ~/.anonmetrics/.
pub fn load_global_config() -> Result<Option<PartialConfig>, ConfigError> {
    match get_global_config_dir() {
        Some(dir) => load_first_existing(&dir, GLOBAL_CONFIG_FILES),
        None => Ok(None),
    }
}

/// Load workspace configuration from the given directory.
///
/// Searches for config files in the following order:
/// 1. .anonmetrics.json
/// 2. .anonmetrics.yaml
/// 3. .anonmetrics/config.json
pub fn load_workspace_config(workspace_root: &Path) -> Result<Option<PartialConfig>, ConfigError> {
    load_first_existing(workspace_root, CONFIG_FILES)
}

fn load_first_existing(dir: &Path, names: &[&str]) -> Result<Option<PartialConfig>, ConfigError> {
    for filename in names {
        let path = dir.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> Result<PartialConfig, ConfigError> {
    env_config_from(|key| std::env::var(key).ok())
}

/// Build a partial config from an environment lookup function.
///
/// Empty values are treated as unset.
pub fn env_config_from<F>(lookup: F) -> Result<PartialConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let timeout_ms = match get(ENV_TIMEOUT_MS) {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
            ConfigError::invalid(ENV_TIMEOUT_MS, format!("'{}' is not a number: {}", raw, e))
        })?),
        None => None,
    };

    let disabled = match get(ENV_DISABLED) {
        Some(raw) => Some(parse_bool(&raw).ok_or_else(|| {
            ConfigError::invalid(ENV_DISABLED, format!("'{}' is not a boolean", raw))
        })?),
        None => None,
    };

    Ok(PartialConfig {
        base_url: get(ENV_BASE_URL),
        project_id: get(ENV_PROJECT_ID),
        api_key: get(ENV_API_KEY),
        timeout_ms,
        disabled,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_json_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"baseUrl": "https://metrics.example.com", "projectId": "proj_1", "timeoutMs": 1500}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://metrics.example.com"));
        assert_eq!(config.project_id.as_deref(), Some("proj_1"));
        assert_eq!(config.timeout_ms, Some(1500));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_load_yaml_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "baseUrl: http://localhost:9000\napiKey: secret\ndisabled: true\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.disabled, Some(true));
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config_file(&path), Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_load_workspace_config_order() {
        let temp = TempDir::new().unwrap();
        assert!(load_workspace_config(temp.path()).unwrap().is_none());

        std::fs::write(temp.path().join(".anonmetrics.yaml"), "projectId: from-yaml\n").unwrap();
        std::fs::write(temp.path().join(".anonmetrics.json"), r#"{"projectId": "from-json"}"#).unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.project_id.as_deref(), Some("from-json"));
    }

    #[test]
    fn test_env_config() {
        let config = env_config_from(lookup(&[
            (ENV_BASE_URL, "http://localhost:8080"),
            (ENV_PROJECT_ID, "proj"),
            (ENV_API_KEY, ""),
            (ENV_TIMEOUT_MS, "750"),
            (ENV_DISABLED, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_ms, Some(750));
        assert_eq!(config.disabled, Some(true));
    }

    #[test]
    fn test_env_config_invalid_values() {
        assert!(matches!(
            env_config_from(lookup(&[(ENV_TIMEOUT_MS, "soon")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            env_config_from(lookup(&[(ENV_DISABLED, "maybe")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
