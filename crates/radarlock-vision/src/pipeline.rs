// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The per-cycle signal pipeline and its loop
//!
//! One cycle captures three regions and fuses them into a
//! [`SignalSnapshot`]:
//!
//! 1. strength region -> signal color mask -> closing -> fill ratio
//! 2. button region -> bright/dark band tests -> debounced `collect_ready`
//! 3. marker region -> marker color mask -> contour filter -> bearing
//!
//! A failed or empty capture zeroes its part of the snapshot and never stops
//! the loop.

use std::time::Duration;

use radarlock_config::{RadarConfig, VisionConfig};
use radarlock_state::{Clock, SharedSignalState, SignalSnapshot, StopToken};
use tracing::{debug, info, warn};

use crate::capture::{CaptureRegion, FrameSource};
use crate::color::{classify, count_matches, mean_hsv, HsvBands, HsvRange};
use crate::debounce::CollectDebouncer;
use crate::error::{CaptureError, VisionError, VisionResult};
use crate::image_frame::ImageFrame;
use crate::marker::MarkerDetector;
use crate::morphology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureTarget {
    Strength = 0,
    Button = 1,
    Marker = 2,
}

impl CaptureTarget {
    fn name(&self) -> &'static str {
        match self {
            CaptureTarget::Strength => "strength",
            CaptureTarget::Button => "button",
            CaptureTarget::Marker => "marker",
        }
    }
}

/// Result of the button test for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ButtonReading {
    collect_ready: bool,
    approaching: bool,
    mean_hsv: [u8; 3],
}

/// Turns captured frames into signal snapshots
pub struct SignalPipeline<S: FrameSource> {
    source: S,

    strength_region: CaptureRegion,
    button_region: CaptureRegion,
    marker_region: CaptureRegion,

    signal_color: HsvRange,
    closing_kernel: (usize, usize),

    button_bright: HsvBands,
    button_dark: HsvBands,
    button_pixel_fraction: f64,
    debouncer: CollectDebouncer,

    marker: MarkerDetector,

    cycle_period: Duration,
    cycle: u64,
    failing: [bool; 3],
}

impl<S: FrameSource> SignalPipeline<S> {
    /// Build a pipeline from configuration
    ///
    /// The marker region is the square around the radar center with side
    /// `2 * (radius + marker_capture_margin)`.
    pub fn new(source: S, vision: &VisionConfig, radar: &RadarConfig) -> VisionResult<Self> {
        let kernel_width = vision.closing_kernel_width as usize;
        let kernel_height = vision.closing_kernel_height as usize;
        if kernel_width == 0 || kernel_height == 0 {
            return Err(VisionError::InvalidKernel {
                width: kernel_width,
                height: kernel_height,
            });
        }

        Ok(Self {
            source,
            strength_region: CaptureRegion::from(&vision.strength_region),
            button_region: CaptureRegion::from(&vision.button_region),
            marker_region: CaptureRegion::centered_square(
                radar.center_x,
                radar.center_y,
                radar.radius + vision.marker_capture_margin,
            ),
            signal_color: HsvRange::from(&vision.signal_color),
            closing_kernel: (kernel_width, kernel_height),
            button_bright: HsvBands::from_config(&vision.button_bright),
            button_dark: HsvBands::from_config(&vision.button_dark),
            button_pixel_fraction: vision.button_pixel_fraction as f64,
            debouncer: CollectDebouncer::new(vision.collect_confirm_delay()),
            marker: MarkerDetector::from_config(vision),
            cycle_period: vision.cycle_period(),
            cycle: 0,
            failing: [false; 3],
        })
    }

    pub fn marker_region(&self) -> CaptureRegion {
        self.marker_region
    }

    /// Number of completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Run one full cycle; `now` drives the collect debounce
    pub fn process_cycle(&mut self, now: Duration) -> SignalSnapshot {
        let signal_strength = self.measure_strength();
        let button = self.read_button(now);
        let target_angle = self.locate_marker();

        self.cycle += 1;
        SignalSnapshot {
            signal_strength,
            collect_ready: button.collect_ready,
            approaching: button.approaching,
            target_angle,
            button_mean_hsv: button.mean_hsv,
            cycle: self.cycle,
        }
    }

    /// Publish a snapshot every cycle until `stop` is cancelled
    pub fn run(&mut self, state: &SharedSignalState, clock: &dyn Clock, stop: &StopToken) {
        info!("[VISION] Signal pipeline started");

        while !stop.is_cancelled() {
            let started = clock.now();
            let snapshot = self.process_cycle(started);
            state.publish(snapshot);

            if !self.cycle_period.is_zero() {
                let elapsed = clock.now().saturating_sub(started);
                if elapsed < self.cycle_period {
                    clock.sleep(self.cycle_period - elapsed);
                }
            }
        }

        info!("[VISION] Signal pipeline stopped after {} cycles", self.cycle);
    }

    fn grab(&mut self, target: CaptureTarget) -> Option<ImageFrame> {
        let region = match target {
            CaptureTarget::Strength => self.strength_region,
            CaptureTarget::Button => self.button_region,
            CaptureTarget::Marker => self.marker_region,
        };

        let result = self.source.capture(&region).and_then(|frame| {
            if frame.is_empty() {
                Err(CaptureError::EmptyFrame)
            } else {
                Ok(frame)
            }
        });

        let slot = target as usize;
        match result {
            Ok(frame) => {
                if self.failing[slot] {
                    debug!("[VISION] {} capture recovered", target.name());
                    self.failing[slot] = false;
                }
                Some(frame)
            }
            Err(e) => {
                if !self.failing[slot] {
                    warn!("[VISION] ⚠️ {} capture failed, reading as zero signal: {}", target.name(), e);
                    self.failing[slot] = true;
                } else {
                    debug!("[VISION] {} capture still failing: {}", target.name(), e);
                }
                None
            }
        }
    }

    fn measure_strength(&mut self) -> f32 {
        let Some(frame) = self.grab(CaptureTarget::Strength) else {
            return 0.0;
        };

        let mask = classify(&frame.to_hsv(), &self.signal_color);
        let (kernel_width, kernel_height) = self.closing_kernel;
        let closed = match morphology::close(&mask, kernel_width, kernel_height) {
            Ok(closed) => closed,
            Err(e) => {
                debug!("[VISION] closing skipped: {}", e);
                mask
            }
        };
        if closed.is_empty() {
            return 0.0;
        }

        count_matches(&closed) as f32 / closed.len() as f32
    }

    fn read_button(&mut self, now: Duration) -> ButtonReading {
        let Some(frame) = self.grab(CaptureTarget::Button) else {
            self.debouncer.reset();
            return ButtonReading::default();
        };

        let hsv = frame.to_hsv();
        let total = frame.get_pixel_count() as f64;
        let threshold = self.button_pixel_fraction * total;

        let bright_pixels = count_matches(&classify(&hsv, &self.button_bright));
        let is_bright_now = bright_pixels as f64 > threshold;

        let was_confirmed = self.debouncer.is_confirmed();
        let collect_ready = self.debouncer.update(is_bright_now, now);
        let mean = mean_hsv(&hsv);

        if collect_ready && !was_confirmed {
            info!(
                "[VISION] ✅ Collect confirmed ({} bright pixels, button HSV {:?})",
                bright_pixels, mean
            );
        }

        let approaching = collect_ready || {
            let dark_pixels = count_matches(&classify(&hsv, &self.button_dark));
            dark_pixels as f64 > threshold
        };

        ButtonReading {
            collect_ready,
            approaching,
            mean_hsv: mean,
        }
    }

    fn locate_marker(&mut self) -> Option<f32> {
        let frame = self.grab(CaptureTarget::Marker)?;
        self.marker.detect(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_frame::ChannelLayout;
    use std::collections::HashMap;

    /// Paints whole regions with one color; unknown regions fail
    struct FlatSource {
        fills: HashMap<CaptureRegion, [u8; 3]>,
    }

    impl FrameSource for FlatSource {
        fn capture(&mut self, region: &CaptureRegion) -> Result<ImageFrame, CaptureError> {
            let rgb = self
                .fills
                .get(region)
                .ok_or_else(|| CaptureError::Unavailable("no fill".to_string()))?;
            let mut frame =
                ImageFrame::new(ChannelLayout::Bgra, region.width as usize, region.height as usize);
            for y in 0..region.height as usize {
                for x in 0..region.width as usize {
                    frame.set_rgb(x, y, *rgb);
                }
            }
            Ok(frame)
        }
    }

    fn small_config() -> (VisionConfig, RadarConfig) {
        let mut vision = VisionConfig::default();
        vision.strength_region = radarlock_config::RegionConfig::new(0, 0, 40, 10);
        vision.button_region = radarlock_config::RegionConfig::new(100, 0, 20, 10);
        let mut radar = RadarConfig::default();
        radar.center_x = 200;
        radar.center_y = 200;
        radar.radius = 40;
        (vision, radar)
    }

    #[test]
    fn test_failed_captures_read_as_zero() {
        let (vision, radar) = small_config();
        let source = FlatSource {
            fills: HashMap::new(),
        };
        let mut pipeline = SignalPipeline::new(source, &vision, &radar).unwrap();

        let snap = pipeline.process_cycle(Duration::ZERO);
        assert_eq!(snap.signal_strength, 0.0);
        assert!(!snap.collect_ready);
        assert!(!snap.approaching);
        assert_eq!(snap.target_angle, None);
        assert_eq!(snap.cycle, 1);
    }

    #[test]
    fn test_full_purple_strength_is_one() {
        let (vision, radar) = small_config();
        let strength_region = CaptureRegion::from(&vision.strength_region);
        let source = FlatSource {
            fills: HashMap::from([(strength_region, [160, 60, 220])]),
        };
        let mut pipeline = SignalPipeline::new(source, &vision, &radar).unwrap();
        assert_eq!(pipeline.process_cycle(Duration::ZERO).signal_strength, 1.0);
    }

    #[test]
    fn test_bright_button_debounces() {
        let (vision, radar) = small_config();
        let button_region = CaptureRegion::from(&vision.button_region);
        let source = FlatSource {
            fills: HashMap::from([(button_region, [230, 20, 20])]),
        };
        let mut pipeline = SignalPipeline::new(source, &vision, &radar).unwrap();

        let first = pipeline.process_cycle(Duration::from_millis(0));
        assert!(!first.collect_ready);
        assert!(!first.approaching);

        let later = pipeline.process_cycle(Duration::from_millis(300));
        assert!(later.collect_ready);
        assert!(later.approaching);
        assert_eq!(later.button_mean_hsv, crate::hsv::rgb_to_hsv([230, 20, 20]));
    }

    #[test]
    fn test_dark_button_means_approaching() {
        let (vision, radar) = small_config();
        let button_region = CaptureRegion::from(&vision.button_region);
        let source = FlatSource {
            fills: HashMap::from([(button_region, [140, 20, 20])]),
        };
        let mut pipeline = SignalPipeline::new(source, &vision, &radar).unwrap();
        let snap = pipeline.process_cycle(Duration::ZERO);
        assert!(snap.approaching);
        assert!(!snap.collect_ready);
    }

    #[test]
    fn test_marker_region_geometry() {
        let (vision, radar) = small_config();
        let source = FlatSource {
            fills: HashMap::new(),
        };
        let pipeline = SignalPipeline::new(source, &vision, &radar).unwrap();
        assert_eq!(pipeline.marker_region(), CaptureRegion::new(140, 140, 120, 120));
    }

    #[test]
    fn test_zero_kernel_rejected() {
        let (mut vision, radar) = small_config();
        vision.closing_kernel_width = 0;
        let source = FlatSource {
            fills: HashMap::new(),
        };
        assert!(SignalPipeline::new(source, &vision, &radar).is_err());
    }
}
