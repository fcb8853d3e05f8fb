// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Console logging initialization

use anyhow::{anyhow, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Install the global console subscriber
///
/// `RUST_LOG` wins when set; otherwise the filter is built from the debug
/// flags on top of `default_level`.
///
/// # Errors
///
/// Fails if the directive string is malformed or a global subscriber is
/// already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<()> {
    let env_filter = build_filter(debug_flags, default_level)?;
    let directives = env_filter.to_string();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    debug!("[OBSERVABILITY] Log filter: {}", directives);
    Ok(())
}

/// Resolve the filter without installing anything
pub fn build_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !directives.trim().is_empty() {
            return EnvFilter::try_new(&directives)
                .map_err(|e| anyhow!("Invalid RUST_LOG '{}': {}", directives, e));
        }
    }

    let filter = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&filter).map_err(|e| anyhow!("Invalid log filter '{}': {}", filter, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_rejects_garbage_level() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let flags = CrateDebugFlags::default();
        assert!(build_filter(&flags, "info").is_ok());
        assert!(build_filter(&flags, "radarlock_vision=loud").is_err());
    }

    #[test]
    fn test_init_logging_installs_once() {
        let flags = CrateDebugFlags::default();
        // Only test in this crate that touches the global subscriber
        assert!(init_logging(&flags, "debug").is_ok());
        assert!(init_logging(&flags, "debug").is_err());
    }
}
