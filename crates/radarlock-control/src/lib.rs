// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock Controller
//!
//! Drives a pointer around the radar circle to find and hold the direction
//! of strongest signal.
//!
//! ```text
//!              collect_ready (any mode)
//!        ┌──────────────────────────────────┐
//!        │   release, click, re-grab at 0°  │
//!        ▼                                  │
//! ┌─────────────┐  strength > 0.7 / marker ┌┴────────────┐
//! │  SEARCHING  │ ───────────────────────► │  TRACKING   │
//! │  step 15°   │  window peak > 0.45      │ sweep ±16°  │
//! └─────────────┘ ◄─────────────────────── └─────────────┘
//!                   no healthy reading for 3 s
//! ```
//!
//! Decisions live in [`fsm`] as pure functions; [`Controller`] performs them.

pub mod actuator;
pub mod controller;
pub mod error;
pub mod fsm;

pub use actuator::{Actuator, ActuatorError, Point, RadarGeometry};
pub use controller::{Controller, ControllerSettings};
pub use error::{ControlError, ControlResult};
pub use fsm::{
    advance_search_angle, assess_health, ControlMode, Health, HealthPolicy, SearchDecision,
    SearchPolicy, SearchWindow, SweepPlan, SweepTracker,
};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
