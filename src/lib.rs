// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock - closed-loop radar tracker
//!
//! Reads a radar-style minigame off the screen and steers a pointer to lock
//! onto and follow the strongest signal, collecting the target when the
//! collect button lights up.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! radarlock = "0.1"  # Default: engine (supervisor + simulator)
//! ```
//!
//! ```rust,no_run
//! use radarlock::prelude::*;
//! use std::sync::Arc;
//!
//! let config = RadarlockConfig::default();
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
//! let radar = SimulatedRadar::new(&config, Arc::clone(&clock));
//!
//! let engine = Engine::new(config, clock);
//! engine.run(radar.screen(), radar.pointer())?;
//! # Ok::<(), EngineError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`engine`** (default): thread supervisor, stop listeners, simulated radar
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: radarlock-config, radarlock-observability  │
//! │  (TOML + overrides, tracing subscriber)                 │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: radarlock-state                        │
//! │  (Signal snapshot, control label, stop token, clocks)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: radarlock-vision, radarlock-control        │
//! │  (HSV/morphology/contours, search/track state machine)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application: radarlock-engine                          │
//! │  (Threads, stop key, simulator, `radarlock` binary)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use radarlock_config as config;
pub use radarlock_observability as observability;
pub use radarlock_state as state;

pub use radarlock_control as control;
pub use radarlock_vision as vision;

#[cfg(feature = "engine")]
pub use radarlock_engine as engine;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{load_config, validate_config, RadarlockConfig};
    pub use crate::control::{Actuator, ActuatorError, Controller, ControllerSettings, Point};
    pub use crate::state::{
        Clock, ControlStateLabel, ManualClock, SharedSignalState, SignalSnapshot, StopToken,
        SystemClock,
    };
    pub use crate::vision::{CaptureError, CaptureRegion, FrameSource, ImageFrame, SignalPipeline};

    #[cfg(feature = "engine")]
    pub use crate::engine::{Engine, EngineError, SimulatedRadar};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let state = SharedSignalState::new();
        assert_eq!(state.control_state(), ControlStateLabel::Idle);
        assert!(!StopToken::new().is_cancelled());
    }
}
