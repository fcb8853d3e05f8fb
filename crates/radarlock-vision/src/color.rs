// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pixel classification against HSV color ranges

use ndarray::{Array2, Array3, Axis, Zip};
use radarlock_config::HsvRangeConfig;
use rayon::prelude::*;

/// Binary classification result, true = pixel matched
pub type Mask = Array2<bool>;

/// Anything that can decide whether one HSV pixel is "in"
pub trait PixelClassifier: Sync {
    fn matches(&self, hsv: [u8; 3]) -> bool;
}

/// Inclusive lower/upper HSV bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

impl From<&HsvRangeConfig> for HsvRange {
    fn from(config: &HsvRangeConfig) -> Self {
        HsvRange::new(config.lower, config.upper)
    }
}

impl PixelClassifier for HsvRange {
    fn matches(&self, hsv: [u8; 3]) -> bool {
        self.contains(hsv)
    }
}

/// Union of ranges; a pixel inside several bands still counts once
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HsvBands {
    bands: Vec<HsvRange>,
}

impl HsvBands {
    pub fn new(bands: Vec<HsvRange>) -> Self {
        Self { bands }
    }

    pub fn from_config(bands: &[HsvRangeConfig]) -> Self {
        Self::new(bands.iter().map(HsvRange::from).collect())
    }

    pub fn bands(&self) -> &[HsvRange] {
        &self.bands
    }
}

impl PixelClassifier for HsvBands {
    fn matches(&self, hsv: [u8; 3]) -> bool {
        self.bands.iter().any(|band| band.contains(hsv))
    }
}

/// Classify every pixel of an HSV image (height x width x 3)
pub fn classify<C: PixelClassifier>(hsv: &Array3<u8>, classifier: &C) -> Mask {
    Zip::from(hsv.lanes(Axis(2))).par_map_collect(|px| classifier.matches([px[0], px[1], px[2]]))
}

pub fn count_matches(mask: &Mask) -> usize {
    mask.par_iter().filter(|&&hit| hit).count()
}

/// Per-channel mean of an HSV image, truncated to integers
pub fn mean_hsv(hsv: &Array3<u8>) -> [u8; 3] {
    let pixel_count = hsv.shape()[0] * hsv.shape()[1];
    if pixel_count == 0 {
        return [0, 0, 0];
    }
    let mut mean = [0u8; 3];
    for (c, channel) in hsv.axis_iter(Axis(2)).enumerate() {
        let sum: u64 = channel.iter().map(|&v| v as u64).sum();
        mean[c] = (sum / pixel_count as u64) as u8;
    }
    mean
}
