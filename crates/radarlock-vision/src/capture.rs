// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Screen regions and the frame source abstraction

use radarlock_config::RegionConfig;

use crate::error::CaptureError;
use crate::image_frame::ImageFrame;

/// Screen-space rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Square of side `2 * half_side` centered on a screen point
    pub fn centered_square(center_x: i32, center_y: i32, half_side: u32) -> Self {
        let half = half_side as i32;
        Self::new(center_x - half, center_y - half, half_side * 2, half_side * 2)
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl From<&RegionConfig> for CaptureRegion {
    fn from(config: &RegionConfig) -> Self {
        CaptureRegion::new(config.left, config.top, config.width, config.height)
    }
}

/// Grabs pixels from the environment
///
/// Implementations are driven from the pipeline thread only.
pub trait FrameSource {
    /// Capture `region` (screen coordinates) into a frame of the same size
    fn capture(&mut self, region: &CaptureRegion) -> Result<ImageFrame, CaptureError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self, region: &CaptureRegion) -> Result<ImageFrame, CaptureError> {
        (**self).capture(region)
    }
}
