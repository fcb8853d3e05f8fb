// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `radarlock.toml`. Every section carries `#[serde(default)]`, so a partial
//! file only overrides the values it names.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarlockConfig {
    pub vision: VisionConfig,
    pub radar: RadarConfig,
    pub collect: CollectConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

/// Screen-space rectangle to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegionConfig {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl RegionConfig {
    /// Same argument order as `CaptureRegion::new`
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Inclusive HSV bounds, OpenCV 8-bit convention (H in 0..180, S and V in 0..=255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HsvRangeConfig {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRangeConfig {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// True if some channel has `lower > upper`, which matches nothing
    pub fn is_empty(&self) -> bool {
        (0..3).any(|c| self.lower[c] > self.upper[c])
    }
}

/// Signal pipeline configuration (capture regions, colors, thresholds)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Bounding box of the histogram whose fill ratio is the signal strength
    pub strength_region: RegionConfig,
    /// Region watched for the collect button
    pub button_region: RegionConfig,

    pub signal_color: HsvRangeConfig,
    /// Higher saturation than `signal_color` so the dot separates from the pale cone
    pub marker_color: HsvRangeConfig,
    /// Collectable button, two hue bands to handle red wrap-around
    pub button_bright: Vec<HsvRangeConfig>,
    /// Approaching button, two hue bands
    pub button_dark: Vec<HsvRangeConfig>,

    /// Closing kernel used to merge histogram bars into one shape
    pub closing_kernel_width: u32,
    pub closing_kernel_height: u32,

    /// Fraction of the button region that must match for a per-frame hit
    pub button_pixel_fraction: f32,
    /// Bright condition must hold this long before `collect_ready`
    pub collect_confirm_secs: f64,

    /// Margin added around the radar circle for the marker capture square
    pub marker_capture_margin: u32,
    /// Disk zeroed at the capture center (player glyph)
    pub marker_center_mask_radius: u32,
    /// Exclusive contour area band
    pub marker_min_area: f64,
    pub marker_max_area: f64,
    /// Exclusive lower bound on `4*pi*area/perimeter^2`
    pub marker_min_circularity: f64,

    /// Minimum time between pipeline cycles (0 = run back to back)
    pub cycle_period_secs: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            strength_region: RegionConfig::new(800, 835, 1090, 160),
            button_region: RegionConfig::new(1650, 290, 350, 60),
            signal_color: HsvRangeConfig::new([120, 50, 150], [170, 255, 255]),
            marker_color: HsvRangeConfig::new([130, 150, 150], [170, 255, 255]),
            button_bright: vec![
                HsvRangeConfig::new([0, 160, 172], [10, 255, 255]),
                HsvRangeConfig::new([170, 160, 172], [180, 255, 255]),
            ],
            button_dark: vec![
                HsvRangeConfig::new([0, 70, 50], [10, 255, 171]),
                HsvRangeConfig::new([170, 70, 50], [180, 255, 171]),
            ],
            closing_kernel_width: 25,
            closing_kernel_height: 1,
            button_pixel_fraction: 0.3,
            collect_confirm_secs: 0.25,
            marker_capture_margin: 20,
            marker_center_mask_radius: 30,
            marker_min_area: 40.0,
            marker_max_area: 600.0,
            marker_min_circularity: 0.6,
            cycle_period_secs: 0.0,
        }
    }
}

impl VisionConfig {
    pub fn collect_confirm_delay(&self) -> Duration {
        Duration::from_secs_f64(self.collect_confirm_secs)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_period_secs)
    }
}

/// Actuator geometry and control-loop timing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadarConfig {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: u32,

    // --- SEARCH ---
    /// Degrees advanced per search iteration
    pub search_step_deg: f32,
    /// Sleep after each search step (0 = none)
    pub search_step_delay_secs: f64,
    /// Time spent gathering samples before forcing a decision
    pub search_window_secs: f64,
    /// Strength above which the search locks without waiting for the window
    pub instant_lock_threshold: f32,
    /// Minimum peak strength for a window decision to lock
    pub wave_threshold: f32,

    // --- TRACKING ---
    /// Sweep strength at or above `healthy_fraction * wave_threshold` counts as signal
    pub healthy_fraction: f32,
    /// Time without a healthy reading before falling back to search
    pub signal_timeout_secs: f64,
    /// Half-width of the tracking sweep, degrees
    pub tracking_sweep_deg: i32,
    pub tracking_step_deg: i32,
    /// Wait after each sweep candidate so the histogram catches up
    pub candidate_settle_secs: f64,
    /// Hold on the best candidate after a sweep
    pub hold_secs: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            center_x: 1585,
            center_y: 565,
            radius: 140,
            search_step_deg: 15.0,
            search_step_delay_secs: 0.0,
            search_window_secs: 3.0,
            instant_lock_threshold: 0.7,
            wave_threshold: 0.45,
            healthy_fraction: 0.8,
            signal_timeout_secs: 3.0,
            tracking_sweep_deg: 16,
            tracking_step_deg: 3,
            candidate_settle_secs: 0.05,
            hold_secs: 0.5,
        }
    }
}

impl RadarConfig {
    pub fn search_step_delay(&self) -> Duration {
        Duration::from_secs_f64(self.search_step_delay_secs)
    }

    pub fn search_window(&self) -> Duration {
        Duration::from_secs_f64(self.search_window_secs)
    }

    pub fn signal_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.signal_timeout_secs)
    }

    pub fn candidate_settle(&self) -> Duration {
        Duration::from_secs_f64(self.candidate_settle_secs)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_secs_f64(self.hold_secs)
    }
}

/// Collect action target and the pauses around it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectConfig {
    pub click_x: i32,
    pub click_y: i32,
    /// Pause after clicking collect, before grabbing the radar again
    pub settle_secs: f64,
    /// Pause after every press so the game registers the grab
    pub grab_settle_secs: f64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            click_x: 1750,
            click_y: 320,
            settle_secs: 0.2,
            grab_settle_secs: 0.1,
        }
    }
}

impl CollectConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs)
    }

    pub fn grab_settle(&self) -> Duration {
        Duration::from_secs_f64(self.grab_settle_secs)
    }
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Wait before the first grab so the operator can focus the target window
    pub startup_delay_secs: f64,
    /// Line typed on stdin that stops the engine
    pub stop_key: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: 3.0,
            stop_key: "q".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.startup_delay_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Simulated radar world used when no real screen backend is attached
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Addressable pointer surface; moves outside it fail
    pub screen_width: u32,
    pub screen_height: u32,
    /// Fixed seed for reproducible target placement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Target bearing drift, degrees per second
    pub drift_deg_per_sec: f32,
    /// Angular half-width of the histogram response, degrees
    pub beam_half_width_deg: f32,
    /// Distance closed per second while aimed within the beam (distance is 0..=1)
    pub approach_per_sec: f32,
    /// Distance below which the marker dot is drawn on the radar
    pub marker_distance: f32,
    /// Distance below which the button turns dark red
    pub approaching_distance: f32,
    /// Distance below which the button turns bright red
    pub collectable_distance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            screen_width: 2560,
            screen_height: 1440,
            seed: None,
            drift_deg_per_sec: 4.0,
            beam_half_width_deg: 45.0,
            approach_per_sec: 0.12,
            marker_distance: 0.3,
            approaching_distance: 0.2,
            collectable_distance: 0.05,
        }
    }
}
