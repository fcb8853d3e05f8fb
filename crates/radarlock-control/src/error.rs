// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the controller

use crate::actuator::ActuatorError;

/// Result type alias using ControlError
pub type ControlResult<T> = std::result::Result<T, ControlError>;

/// Fatal controller failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("Actuator command failed: {0}")]
    Actuator(#[from] ActuatorError),
}
