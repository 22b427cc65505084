// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging partial configurations from different sources with proper precedence.

use super::types::PartialConfig;

/// Merge partial configurations with precedence.
///
/// Sources are given lowest precedence first:
/// 1. Global config (~/.anonmetrics/config.json)
/// 2. Workspace config (.anonmetrics.json)
/// 3. Environment (ANONMETRICS_*)
/// 4. Explicit overrides (CLI flags)
///
/// A later `Some` value replaces an earlier one; `None` leaves it untouched.
pub fn merge_config<I>(sources: I) -> PartialConfig
where
    I: IntoIterator<Item = Option<PartialConfig>>,
{
    let mut result = PartialConfig::default();
    for config in sources.into_iter().flatten() {
        apply_partial(&mut result, config);
    }
    result
}

fn apply_partial(result: &mut PartialConfig, config: PartialConfig) {
    if config.base_url.is_some() {
        result.base_url = config.base_url;
    }

    if config.project_id.is_some() {
        result.project_id = config.project_id;
    }

    if config.api_key.is_some() {
        result.api_key = config.api_key;
    }

    if config.timeout_ms.is_some() {
        result.timeout_ms = config.timeout_ms;
    }

    if config.disabled.is_some() {
        result.disabled = config.disabled;
    }
}
