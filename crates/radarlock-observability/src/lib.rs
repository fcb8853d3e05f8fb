// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock-observability
//!
//! Logging setup shared by every radarlock binary and test harness.
//!
//! Provides one console subscriber filtered per crate, driven by
//! `--debug-<crate>` flags and the `RADARLOCK_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known radarlock crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "radarlock-config",
    "radarlock-state",
    "radarlock-vision",
    "radarlock-control",
    "radarlock-engine",
];
