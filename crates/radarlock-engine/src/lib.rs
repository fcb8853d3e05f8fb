// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock Engine
//!
//! Wires the signal pipeline and the controller together and runs them until
//! a stop is requested.
//!
//! - [`Engine`]: spawns and joins the `radarlock-vision` and `radarlock-control` threads
//! - [`StopListener`]s: stop key on stdin, fixed run time
//! - [`SimulatedRadar`]: self-contained backend providing both a
//!   [`radarlock_vision::FrameSource`] and a [`radarlock_control::Actuator`]

pub mod error;
pub mod settings;
pub mod simulator;
pub mod stop;
pub mod supervisor;

pub use error::{EngineError, EngineResult};
pub use settings::{resolve_config, ResolvedConfig};
pub use simulator::{SimulatedPointer, SimulatedRadar, SimulatedScreen};
pub use stop::{spawn_stop_listener, KeyStopListener, StopListener, TimedStopListener};
pub use supervisor::Engine;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
