// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, RadarlockConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the radarlock configuration file
///
/// Search order:
/// 1. `RADARLOCK_CONFIG_PATH` environment variable
/// 2. Current working directory: `./radarlock.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("RADARLOCK_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by RADARLOCK_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "radarlock configuration file '{}' not found in any of these locations:\n{}\n\nSet RADARLOCK_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<RadarlockConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: RadarlockConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `RADARLOCK_LOG_LEVEL` -> `logging.level`
/// - `RADARLOCK_WAVE_THRESHOLD` -> `radar.wave_threshold`
/// - `RADARLOCK_SIGNAL_TIMEOUT` -> `radar.signal_timeout_secs`
/// - `RADARLOCK_STARTUP_DELAY` -> `runtime.startup_delay_secs`
/// - `RADARLOCK_STOP_KEY` -> `runtime.stop_key`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut RadarlockConfig) {
    if let Ok(value) = env::var("RADARLOCK_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("RADARLOCK_WAVE_THRESHOLD") {
        if let Ok(threshold) = value.parse::<f32>() {
            config.radar.wave_threshold = threshold;
        }
    }
    if let Ok(value) = env::var("RADARLOCK_SIGNAL_TIMEOUT") {
        if let Ok(secs) = value.parse::<f64>() {
            config.radar.signal_timeout_secs = secs;
        }
    }
    if let Ok(value) = env::var("RADARLOCK_STARTUP_DELAY") {
        if let Ok(secs) = value.parse::<f64>() {
            config.runtime.startup_delay_secs = secs;
        }
    }
    if let Ok(value) = env::var("RADARLOCK_STOP_KEY") {
        config.runtime.stop_key = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"wave_threshold": "0.5", "seed": "7"}`)
///
/// # Errors
///
/// Unlike environment overrides, a CLI value that does not parse is reported
/// as `ConfigError::InvalidValue`, since the user typed it explicitly.
pub fn apply_cli_overrides(
    config: &mut RadarlockConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("wave_threshold") {
        config.radar.wave_threshold = parse_cli("wave_threshold", value)?;
    }
    if let Some(value) = cli_args.get("signal_timeout") {
        config.radar.signal_timeout_secs = parse_cli("signal_timeout", value)?;
    }
    if let Some(value) = cli_args.get("startup_delay") {
        config.runtime.startup_delay_secs = parse_cli("startup_delay", value)?;
    }
    if let Some(value) = cli_args.get("stop_key") {
        config.runtime.stop_key = value.clone();
    }
    if let Some(value) = cli_args.get("seed") {
        config.simulation.seed = Some(parse_cli("seed", value)?);
    }
    Ok(())
}

fn parse_cli<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}'", name, value)))
}
