// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from JSON and YAML files.

use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;

use super::types::ClientConfig;

/// Config file names searched for by [`find_config_file`], in order.
pub const CONFIG_FILES: &[&str] = &[
    "influxstats.json",
    "influxstats.yaml",
    "influxstats.yml",
    ".influxstats.json",
];

/// Find the first config file present in `dir`.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Load a configuration file (JSON or YAML, chosen by extension).
pub fn load_config_file(path: &Path) -> Result<ClientConfig, ConfigurationError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigurationError::from),
        _ => serde_json::from_str(&content).map_err(ConfigurationError::from),
    }
}

/// Save a configuration as pretty-printed JSON.
pub fn save_config_file(path: &Path, config: &ClientConfig) -> Result<(), ConfigurationError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
