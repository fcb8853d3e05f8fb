// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the engine supervisor

use radarlock_control::ControlError;
use radarlock_vision::VisionError;

/// Result type alias using EngineError
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The controller hit a fatal actuator failure
    #[error("Controller failed: {0}")]
    Control(#[from] ControlError),

    /// The signal pipeline could not be built from the configuration
    #[error("Signal pipeline setup failed: {0}")]
    Vision(#[from] VisionError),

    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Thread {name} panicked: {message}")]
    ThreadPanicked { name: String, message: String },
}
