// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for the metrics client.
//!
//! Trackers take an explicit [`BackendConfig`] or [`FrontendConfig`]. For
//! programs that prefer ambient configuration, partial settings can also be
//! gathered from several sources:
//! - Global config: ~/.anonmetrics/config.json
//! - Workspace config: .anonmetrics.json, .anonmetrics.yaml, or .anonmetrics/config.json
//! - Environment: ANONMETRICS_BASE_URL, ANONMETRICS_PROJECT_ID, ...
//! - Explicit overrides: command-line flags
//!
//! Configuration is merged with precedence (overrides > env > workspace > global > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{
    env_config_from, get_global_config_dir, load_config_file, load_env_config,
    load_global_config, load_workspace_config, CONFIG_FILES, ENV_API_KEY, ENV_BASE_URL,
    ENV_DISABLED, ENV_PROJECT_ID, ENV_TIMEOUT_MS, GLOBAL_CONFIG_DIR,
};

pub use merger::merge_config;

pub use types::{
    endpoint_url, mask_secret, BackendConfig, FrontendConfig, PartialConfig, BACKEND_ENDPOINT_SUFFIX,
    DEFAULT_TIMEOUT_MS, FRONTEND_ENDPOINT_SUFFIX,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a workspace.
///
/// `overrides` wins over every other source. The result is still partial;
/// resolve it with [`PartialConfig::into_backend`] or
/// [`PartialConfig::into_frontend`].
pub fn load_config(
    workspace_root: &Path,
    overrides: PartialConfig,
) -> Result<PartialConfig, ConfigError> {
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;
    let env = load_env_config()?;

    Ok(merge_config([global, workspace, Some(env), Some(overrides)]))
}
