// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pointer actuator abstraction
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Controller (search / track / collect)        │
//! └─────────────────┬────────────────────────────┘
//!                   │ angle -> RadarGeometry::point_at
//! ┌─────────────────▼────────────────────────────┐
//! │ Actuator trait (THIS FILE)                   │
//! │ - move_to() / press() / release() / click()  │
//! └─────────────────┬────────────────────────────┘
//!                   │ implements
//! ┌─────────────────▼────────────────────────────┐
//! │ Backend: simulated radar, OS pointer driver  │
//! └──────────────────────────────────────────────┘
//! ```

use radarlock_config::{CollectConfig, RadarConfig};

/// Screen position in pixels (sub-pixel values are rounded by backends)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<&CollectConfig> for Point {
    fn from(config: &CollectConfig) -> Self {
        Point::new(config.click_x as f64, config.click_y as f64)
    }
}

/// Actuator command failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActuatorError {
    /// Target lies outside the addressable surface
    #[error("Pointer target ({x:.1}, {y:.1}) is outside the screen")]
    OutOfBounds { x: f64, y: f64 },

    /// Backend refused or failed the command
    #[error("Actuator backend error: {0}")]
    Backend(String),
}

/// Pointer driver owned by the controller thread
///
/// Every command is synchronous; a returned error is fatal for the control loop.
pub trait Actuator {
    /// Move the pointer, keeping the current button state (drags while pressed)
    fn move_to(&mut self, point: Point) -> Result<(), ActuatorError>;

    /// Press and hold the primary button at the current position
    fn press(&mut self) -> Result<(), ActuatorError>;

    /// Release the primary button
    fn release(&mut self) -> Result<(), ActuatorError>;

    /// Move to `point` and click (press + release)
    fn click(&mut self, point: Point) -> Result<(), ActuatorError>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn move_to(&mut self, point: Point) -> Result<(), ActuatorError> {
        (**self).move_to(point)
    }

    fn press(&mut self) -> Result<(), ActuatorError> {
        (**self).press()
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        (**self).release()
    }

    fn click(&mut self, point: Point) -> Result<(), ActuatorError> {
        (**self).click(point)
    }
}

/// Maps actuator angles to points on the radar circle
///
/// 0 degrees is to the right of the center; angles grow clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarGeometry {
    pub center: Point,
    pub radius: f64,
}

impl RadarGeometry {
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn from_config(config: &RadarConfig) -> Self {
        Self::new(
            Point::new(config.center_x as f64, config.center_y as f64),
            config.radius as f64,
        )
    }

    pub fn point_at(&self, angle_deg: f32) -> Point {
        let rads = (angle_deg as f64).to_radians();
        Point::new(
            self.center.x + self.radius * rads.cos(),
            self.center.y + self.radius * rads.sin(),
        )
    }
}
