// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client configuration.
//!
//! A [`ClientConfig`] comes from code, from a JSON/YAML file, or both, with
//! `STATSD_HOST` / `STATSD_PORT` overriding where the metrics are sent.
//! Precedence: environment > file > defaults.

mod loader;
mod types;

pub use loader::{find_config_file, load_config_file, save_config_file, CONFIG_FILES};
pub use types::{ClientConfig, ENV_HOST, ENV_PORT};

use std::path::Path;

use crate::error::ConfigurationError;

/// Load a config file, apply environment overrides and validate the result.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigurationError> {
    let config = load_config_file(path)?.apply_env()?;
    config.validate()?;
    Ok(config)
}
