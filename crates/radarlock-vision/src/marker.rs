// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Target-marker detection on the radar

use ndarray::Zip;
use radarlock_config::VisionConfig;
use radarlock_state::normalize_degrees;
use tracing::trace;

use crate::color::{classify, HsvRange, Mask};
use crate::contours::{find_external_contours, ContourFilter, ContourMetrics};
use crate::image_frame::ImageFrame;

/// Finds the marker dot and reports its bearing from the frame center
#[derive(Debug, Clone)]
pub struct MarkerDetector {
    color: HsvRange,
    center_mask_radius: u32,
    filter: ContourFilter,
}

impl MarkerDetector {
    pub fn new(color: HsvRange, center_mask_radius: u32, filter: ContourFilter) -> Self {
        Self {
            color,
            center_mask_radius,
            filter,
        }
    }

    pub fn from_config(config: &VisionConfig) -> Self {
        Self::new(
            HsvRange::from(&config.marker_color),
            config.marker_center_mask_radius,
            ContourFilter {
                min_area: config.marker_min_area,
                max_area: config.marker_max_area,
                min_circularity: config.marker_min_circularity,
            },
        )
    }

    /// Bearing in degrees [0, 360) of the first marker-shaped blob, if any
    ///
    /// 0 degrees points right and angles grow clockwise on screen (y down).
    pub fn detect(&self, frame: &ImageFrame) -> Option<f32> {
        if frame.is_empty() {
            return None;
        }

        let center = (frame.get_width() / 2, frame.get_height() / 2);
        let mut mask = classify(&frame.to_hsv(), &self.color);
        mask_center_disk(&mut mask, center, self.center_mask_radius);

        find_external_contours(&mask)
            .iter()
            .map(ContourMetrics::from_contour)
            .find(|metrics| {
                let accepted = self.filter.accepts(metrics);
                trace!(
                    "[VISION] marker candidate area={:.1} circularity={:.2} accepted={}",
                    metrics.area,
                    metrics.circularity(),
                    accepted
                );
                accepted
            })
            .map(|metrics| bearing_degrees(metrics.centroid, center))
    }
}

/// Clear a filled disk (the player glyph sits at the radar center)
fn mask_center_disk(mask: &mut Mask, center: (usize, usize), radius: u32) {
    let r2 = radius as i64 * radius as i64;
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    Zip::indexed(mask).par_for_each(|(y, x), hit| {
        let dx = x as i64 - cx;
        let dy = y as i64 - cy;
        if dx * dx + dy * dy <= r2 {
            *hit = false;
        }
    });
}

/// atan2 bearing of `point` around `center`, normalized to [0, 360)
pub fn bearing_degrees(point: (f64, f64), center: (usize, usize)) -> f32 {
    let dx = point.0 - center.0 as f64;
    let dy = point.1 - center.1 as f64;
    normalize_degrees(dy.atan2(dx).to_degrees() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_frame::ChannelLayout;
    use proptest::prelude::*;

    const MARKER_RGB: [u8; 3] = [160, 60, 220];

    fn radar_with_dots(size: usize, dots: &[(f64, f64, f64)]) -> ImageFrame {
        let mut frame = ImageFrame::new(ChannelLayout::Bgra, size, size);
        for y in 0..size {
            for x in 0..size {
                let inside = dots.iter().any(|&(cx, cy, r)| {
                    let dx = x as f64 - cx;
                    let dy = y as f64 - cy;
                    dx * dx + dy * dy <= r * r
                });
                if inside {
                    frame.set_rgb(x, y, MARKER_RGB);
                }
            }
        }
        frame
    }

    fn detector() -> MarkerDetector {
        MarkerDetector::from_config(&VisionConfig::default())
    }

    #[test]
    fn test_marker_to_the_right_is_zero_degrees() {
        let frame = radar_with_dots(320, &[(260.0, 160.0, 7.0)]);
        let angle = detector().detect(&frame).unwrap();
        assert!(angle < 0.5 || angle > 359.5, "angle {}", angle);
    }

    #[test]
    fn test_marker_below_is_ninety_degrees() {
        let frame = radar_with_dots(320, &[(160.0, 250.0, 7.0)]);
        let angle = detector().detect(&frame).unwrap();
        assert!((angle - 90.0).abs() < 0.5, "angle {}", angle);
    }

    #[test]
    fn test_marker_up_left_wraps_positive() {
        let frame = radar_with_dots(320, &[(100.0, 100.0, 7.0)]);
        let angle = detector().detect(&frame).unwrap();
        assert!((angle - 225.0).abs() < 0.5, "angle {}", angle);
    }

    #[test]
    fn test_center_glyph_is_masked() {
        let frame = radar_with_dots(320, &[(160.0, 160.0, 12.0)]);
        assert_eq!(detector().detect(&frame), None);
    }

    #[test]
    fn test_small_and_large_blobs_rejected() {
        let frame = radar_with_dots(320, &[(60.0, 60.0, 2.0), (250.0, 250.0, 20.0)]);
        assert_eq!(detector().detect(&frame), None);
    }

    #[test]
    fn test_first_accepted_blob_in_raster_order_wins() {
        // Top blob is too small, second is valid, third is valid but later
        let frame = radar_with_dots(
            320,
            &[(160.0, 20.0, 2.0), (260.0, 60.0, 7.0), (60.0, 260.0, 7.0)],
        );
        let angle = detector().detect(&frame).unwrap();
        let expected = bearing_degrees((260.0, 60.0), (160, 160));
        assert!((angle - expected).abs() < 0.5);
    }

    #[test]
    fn test_empty_frame() {
        let frame = ImageFrame::new(ChannelLayout::Bgra, 0, 0);
        assert_eq!(detector().detect(&frame), None);
    }

    proptest! {
        #[test]
        fn prop_bearing_in_range(x in -500.0f64..500.0, y in -500.0f64..500.0) {
            let angle = bearing_degrees((x, y), (0, 0));
            prop_assert!((0.0..360.0).contains(&angle));
        }
    }
}
