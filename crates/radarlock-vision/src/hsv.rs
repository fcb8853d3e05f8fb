// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! RGB to HSV conversion, 8-bit OpenCV convention
//!
//! H is in half-degrees (0..180), S and V span 0..=255. The fixed-point
//! arithmetic reproduces OpenCV's results bit for bit, so color ranges tuned
//! against OpenCV tooling carry over unchanged.

const HSV_SHIFT: i32 = 12;
const HALF: i32 = 1 << (HSV_SHIFT - 1);
const HUE_RANGE: i32 = 180;

#[inline]
fn sdiv(v: i32) -> i32 {
    if v == 0 {
        0
    } else {
        ((255 << HSV_SHIFT) as f64 / v as f64).round() as i32
    }
}

#[inline]
fn hdiv(diff: i32) -> i32 {
    if diff == 0 {
        0
    } else {
        ((HUE_RANGE << HSV_SHIFT) as f64 / (6.0 * diff as f64)).round() as i32
    }
}

/// Convert one `[r, g, b]` pixel to `[h, s, v]`
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (rgb[0] as i32, rgb[1] as i32, rgb[2] as i32);

    let v = r.max(g).max(b);
    let vmin = r.min(g).min(b);
    let diff = v - vmin;

    let s = (diff * sdiv(v) + HALF) >> HSV_SHIFT;

    // Red wins ties, then green
    let h_raw = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let mut h = (h_raw * hdiv(diff) + HALF) >> HSV_SHIFT;
    if h < 0 {
        h += HUE_RANGE;
    }

    [h as u8, s as u8, v as u8]
}
