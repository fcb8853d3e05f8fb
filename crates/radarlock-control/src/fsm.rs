// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pure decision logic for the search/track state machine
//!
//! Nothing in this module touches the actuator or the clock; the
//! [`Controller`](crate::Controller) feeds it timestamps and snapshots and
//! performs whatever it decides.

use radarlock_config::RadarConfig;
use radarlock_state::{normalize_degrees, ControlStateLabel, SignalSnapshot};
use std::time::Duration;

/// Controller mode (the collect interrupt is not a mode, it always ends in `Searching`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Searching,
    Tracking,
}

impl ControlMode {
    pub fn label(self) -> ControlStateLabel {
        match self {
            ControlMode::Searching => ControlStateLabel::Searching,
            ControlMode::Tracking => ControlStateLabel::Tracking,
        }
    }
}

/// Thresholds governing the search window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPolicy {
    pub step_deg: f32,
    pub window: Duration,
    pub instant_lock_threshold: f32,
    pub wave_threshold: f32,
}

impl SearchPolicy {
    pub fn from_config(config: &RadarConfig) -> Self {
        Self {
            step_deg: config.search_step_deg,
            window: config.search_window(),
            instant_lock_threshold: config.instant_lock_threshold,
            wave_threshold: config.wave_threshold,
        }
    }
}

/// Outcome of one search iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchDecision {
    /// Keep sweeping, window still open
    Continue,
    /// Strong reading or visible marker at the current angle
    LockHere,
    /// Window expired with a good enough peak at this angle
    LockAt(f32),
    /// Window expired without a usable peak
    RestartWindow,
}

/// Samples collected since the current search window opened
#[derive(Debug, Clone, PartialEq)]
pub struct SearchWindow {
    started: Duration,
    samples: Vec<(f32, f32)>,
}

impl SearchWindow {
    pub fn new(started: Duration) -> Self {
        Self {
            started,
            samples: Vec::new(),
        }
    }

    pub fn started(&self) -> Duration {
        self.started
    }

    pub fn samples(&self) -> &[(f32, f32)] {
        &self.samples
    }

    pub fn record(&mut self, angle: f32, strength: f32) {
        self.samples.push((angle, strength));
    }

    /// Strongest sample; the earliest one wins ties
    pub fn best(&self) -> Option<(f32, f32)> {
        let mut best: Option<(f32, f32)> = None;
        for &(angle, strength) in &self.samples {
            match best {
                Some((_, top)) if strength <= top => {}
                _ => best = Some((angle, strength)),
            }
        }
        best
    }

    /// Decide after a sample has been recorded for `latest`
    pub fn decide(
        &self,
        now: Duration,
        latest: &SignalSnapshot,
        policy: &SearchPolicy,
    ) -> SearchDecision {
        if latest.signal_strength > policy.instant_lock_threshold || latest.target_angle.is_some()
        {
            return SearchDecision::LockHere;
        }

        if now.saturating_sub(self.started) <= policy.window {
            return SearchDecision::Continue;
        }

        match self.best() {
            Some((angle, strength)) if strength > policy.wave_threshold => {
                SearchDecision::LockAt(angle)
            }
            _ => SearchDecision::RestartWindow,
        }
    }
}

/// Next search angle, wrapped into [0, 360)
pub fn advance_search_angle(angle: f32, step_deg: f32) -> f32 {
    normalize_degrees(angle + step_deg)
}

/// Integer candidate angles for one blind hill-climb sweep
///
/// Candidates run from `trunc(angle - half_width)` up to, but excluding,
/// `trunc(angle + half_width)`. They are not wrapped; the geometry handles
/// any angle and only the winner is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    start: i32,
    end: i32,
    step: i32,
}

impl SweepPlan {
    pub fn around(angle: f32, half_width: i32, step: i32) -> Self {
        Self {
            start: (angle - half_width as f32).trunc() as i32,
            end: (angle + half_width as f32).trunc() as i32,
            step: step.max(1),
        }
    }

    pub fn from_config(angle: f32, config: &RadarConfig) -> Self {
        Self::around(angle, config.tracking_sweep_deg, config.tracking_step_deg)
    }

    pub fn candidates(&self) -> impl Iterator<Item = i32> {
        (self.start..self.end).step_by(self.step as usize)
    }

    pub fn len(&self) -> usize {
        self.candidates().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Running maximum over one sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepTracker {
    best_angle: f32,
    best_strength: f32,
}

impl SweepTracker {
    /// Starts at the current angle with zero strength, so a silent sweep stays put
    pub fn starting_at(angle: f32) -> Self {
        Self {
            best_angle: angle,
            best_strength: 0.0,
        }
    }

    pub fn observe(&mut self, angle: f32, strength: f32) {
        if strength > self.best_strength {
            self.best_angle = angle;
            self.best_strength = strength;
        }
    }

    pub fn best_angle(&self) -> f32 {
        normalize_degrees(self.best_angle)
    }

    pub fn best_strength(&self) -> f32 {
        self.best_strength
    }
}

/// Signal health after a tracking sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Signal confirmed, refresh "last seen"
    Healthy,
    /// Weak, but still within the loss timeout
    Degraded,
    /// Weak for longer than the loss timeout
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthPolicy {
    pub wave_threshold: f32,
    pub healthy_fraction: f32,
    pub signal_timeout: Duration,
}

impl HealthPolicy {
    pub fn from_config(config: &RadarConfig) -> Self {
        Self {
            wave_threshold: config.wave_threshold,
            healthy_fraction: config.healthy_fraction,
            signal_timeout: config.signal_timeout(),
        }
    }
}

pub fn assess_health(
    best_strength: f32,
    approaching: bool,
    since_last_seen: Duration,
    policy: &HealthPolicy,
) -> Health {
    if best_strength >= policy.wave_threshold * policy.healthy_fraction || approaching {
        Health::Healthy
    } else if since_last_seen > policy.signal_timeout {
        Health::Lost
    } else {
        Health::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(wave_threshold: f32) -> SearchPolicy {
        SearchPolicy {
            wave_threshold,
            ..SearchPolicy::from_config(&RadarConfig::default())
        }
    }

    fn window_with(samples: &[(f32, f32)]) -> SearchWindow {
        let mut window = SearchWindow::new(Duration::ZERO);
        for &(angle, strength) in samples {
            window.record(angle, strength);
        }
        window
    }

    fn weak(strength: f32) -> SignalSnapshot {
        SignalSnapshot {
            signal_strength: strength,
            ..SignalSnapshot::default()
        }
    }

    #[test]
    fn test_instant_lock_on_strength() {
        let window = window_with(&[(15.0, 0.75)]);
        let decision = window.decide(Duration::from_millis(10), &weak(0.75), &policy(0.45));
        assert_eq!(decision, SearchDecision::LockHere);

        let at_threshold = window.decide(Duration::from_millis(10), &weak(0.7), &policy(0.45));
        assert_eq!(at_threshold, SearchDecision::Continue);
    }

    #[test]
    fn test_instant_lock_on_marker() {
        let window = window_with(&[(15.0, 0.0)]);
        let snapshot = SignalSnapshot {
            target_angle: Some(123.0),
            ..SignalSnapshot::default()
        };
        assert_eq!(
            window.decide(Duration::ZERO, &snapshot, &policy(0.45)),
            SearchDecision::LockHere
        );
    }

    #[test]
    fn test_window_expiry_locks_on_peak() {
        let window = window_with(&[(0.0, 0.1), (60.0, 0.5), (120.0, 0.3)]);
        let now = Duration::from_millis(3100);
        assert_eq!(
            window.decide(now, &weak(0.3), &policy(0.45)),
            SearchDecision::LockAt(60.0)
        );
        assert_eq!(
            window.decide(now, &weak(0.3), &policy(0.55)),
            SearchDecision::RestartWindow
        );
    }

    #[test]
    fn test_window_open_until_strictly_past_duration() {
        let window = window_with(&[(0.0, 0.9 * 0.7)]);
        let weak_reading = weak(0.1);
        assert_eq!(
            window.decide(Duration::from_secs(3), &weak_reading, &policy(0.45)),
            SearchDecision::Continue
        );
        assert_eq!(
            window.decide(Duration::from_millis(3001), &weak_reading, &policy(0.45)),
            SearchDecision::LockAt(0.0)
        );
    }

    #[test]
    fn test_best_prefers_first_occurrence() {
        let window = window_with(&[(30.0, 0.2), (45.0, 0.6), (90.0, 0.6), (105.0, 0.1)]);
        assert_eq!(window.best(), Some((45.0, 0.6)));
        assert_eq!(SearchWindow::new(Duration::ZERO).best(), None);
    }

    #[test]
    fn test_empty_window_restarts() {
        let window = SearchWindow::new(Duration::ZERO);
        assert_eq!(
            window.decide(Duration::from_secs(4), &weak(0.0), &policy(0.45)),
            SearchDecision::RestartWindow
        );
    }

    #[test]
    fn test_search_angle_wraps() {
        assert_eq!(advance_search_angle(0.0, 15.0), 15.0);
        assert_eq!(advance_search_angle(350.0, 15.0), 5.0);
        assert_eq!(advance_search_angle(345.0, 15.0), 0.0);
    }

    #[test]
    fn test_sweep_candidates_truncate_bounds() {
        let plan = SweepPlan::around(10.7, 16, 3);
        let candidates: Vec<i32> = plan.candidates().collect();
        assert_eq!(candidates, vec![-5, -2, 1, 4, 7, 10, 13, 16, 19, 22, 25]);
        assert_eq!(plan.len(), 11);

        let plan = SweepPlan::around(100.0, 16, 3);
        assert_eq!(plan.candidates().next(), Some(84));
        assert_eq!(plan.candidates().last(), Some(114));
    }

    #[test]
    fn test_sweep_tracker_keeps_strict_maximum() {
        let mut tracker = SweepTracker::starting_at(100.0);
        tracker.observe(84.0, 0.0);
        assert_eq!(tracker.best_angle(), 100.0);

        tracker.observe(90.0, 0.4);
        tracker.observe(93.0, 0.4);
        tracker.observe(96.0, 0.2);
        assert_eq!(tracker.best_angle(), 90.0);
        assert_eq!(tracker.best_strength(), 0.4);
    }

    #[test]
    fn test_sweep_tracker_normalizes_winner() {
        let mut tracker = SweepTracker::starting_at(2.0);
        tracker.observe(-7.0, 0.5);
        assert_eq!(tracker.best_angle(), 353.0);
    }

    #[test]
    fn test_health_assessment() {
        let policy = HealthPolicy::from_config(&RadarConfig::default());
        let short = Duration::from_millis(2900);
        let long = Duration::from_millis(3100);

        assert_eq!(assess_health(0.37, false, long, &policy), Health::Healthy);
        assert_eq!(assess_health(0.1, true, long, &policy), Health::Healthy);
        assert_eq!(assess_health(0.2, false, short, &policy), Health::Degraded);
        assert_eq!(assess_health(0.2, false, long, &policy), Health::Lost);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ControlMode::Searching.label(), ControlStateLabel::Searching);
        assert_eq!(ControlMode::Tracking.label(), ControlStateLabel::Tracking);
    }

    proptest! {
        #[test]
        fn prop_search_angle_stays_in_range(angle in 0.0f32..360.0, step in 0.5f32..359.0) {
            let next = advance_search_angle(angle, step);
            prop_assert!((0.0..360.0).contains(&next));
        }

        #[test]
        fn prop_sweep_spans_half_width(angle in 0.0f32..360.0, half in 1i32..40, step in 1i32..10) {
            let plan = SweepPlan::around(angle, half, step);
            for candidate in plan.candidates() {
                prop_assert!((candidate as f32 - angle).abs() <= half as f32 + 1.0);
            }
            prop_assert!(!plan.is_empty());
        }
    }
}
