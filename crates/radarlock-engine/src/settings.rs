// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration resolution for the binary
//!
//! Unlike [`radarlock_config::load_config`], a missing file is not an error
//! here: the built-in defaults are used and the usual overrides still apply.

use radarlock_config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    validate_config, ConfigError, ConfigResult, RadarlockConfig,
};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// A validated configuration and the file it came from (`None` = defaults)
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: RadarlockConfig,
    pub source: Option<PathBuf>,
}

/// Load, override and validate the configuration
///
/// An explicit `path` must exist; without one the usual search applies and
/// falls back to defaults when nothing is found. Runs before logging is
/// initialized, so it reports through its return value only.
pub fn resolve_config(
    path: Option<&Path>,
    cli_overrides: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => match find_config_file() {
            Ok(found) => Some(found),
            // an explicit RADARLOCK_CONFIG_PATH that does not exist stays an error
            Err(ConfigError::FileNotFound(_)) if env::var_os("RADARLOCK_CONFIG_PATH").is_none() => {
                None
            }
            Err(e) => return Err(e),
        },
    };

    let config = match &source {
        Some(file) => load_config(Some(file), Some(cli_overrides))?,
        None => {
            let mut config = RadarlockConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, cli_overrides)?;
            config
        }
    };

    validate_config(&config)?;
    Ok(ResolvedConfig { config, source })
}
