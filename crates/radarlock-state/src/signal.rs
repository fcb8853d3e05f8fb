// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Latest fused sensor readings plus the controller's display label

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Controller state as shown to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ControlStateLabel {
    /// Before the controller's first iteration
    #[default]
    Idle = 0,
    Searching = 1,
    Tracking = 2,
}

impl ControlStateLabel {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ControlStateLabel::Searching,
            2 => ControlStateLabel::Tracking,
            _ => ControlStateLabel::Idle,
        }
    }
}

impl fmt::Display for ControlStateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlStateLabel::Idle => "IDLE",
            ControlStateLabel::Searching => "SEARCHING",
            ControlStateLabel::Tracking => "TRACKING",
        };
        f.write_str(name)
    }
}

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// One pipeline cycle's worth of readings
///
/// All fields of a snapshot come from the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalSnapshot {
    /// Fraction of the strength region matching the signal color, in [0, 1]
    pub signal_strength: f32,
    /// Bright button held for the confirmation delay
    pub collect_ready: bool,
    /// Dark button this frame, or `collect_ready`
    pub approaching: bool,
    /// Bearing of the visible marker in degrees, [0, 360)
    pub target_angle: Option<f32>,
    /// Mean HSV of the button region (diagnostics)
    pub button_mean_hsv: [u8; 3],
    /// Pipeline cycle that produced this snapshot, 0 = nothing published yet
    pub cycle: u64,
}

/// Single-writer/single-reader state record
///
/// The pipeline replaces the snapshot wholesale; the controller copies it
/// out. The control label lives outside the lock so label writes never
/// contend with snapshot swaps.
#[derive(Debug, Default)]
pub struct SharedSignalState {
    snapshot: RwLock<SignalSnapshot>,
    control_state: AtomicU8,
}

impl SharedSignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the latest snapshot
    pub fn snapshot(&self) -> SignalSnapshot {
        *self.snapshot.read()
    }

    /// Replace the snapshot
    ///
    /// `collect_ready` implies `approaching`; the stored value is corrected if
    /// a caller violates that.
    pub fn publish(&self, mut snapshot: SignalSnapshot) {
        if snapshot.collect_ready {
            snapshot.approaching = true;
        }
        *self.snapshot.write() = snapshot;
    }

    pub fn control_state(&self) -> ControlStateLabel {
        ControlStateLabel::from_u8(self.control_state.load(Ordering::Acquire))
    }

    pub fn set_control_state(&self, label: ControlStateLabel) {
        self.control_state.store(label as u8, Ordering::Release);
    }
}
