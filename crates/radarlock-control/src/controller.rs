// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Control loop: performs the decisions from [`crate::fsm`] through an [`Actuator`]
//!
//! Each iteration reads one consistent [`SignalSnapshot`], checks the collect
//! interrupt, then runs a search step or a tracking sweep. The grab held on
//! the radar is released on every exit path.

use crate::actuator::{Actuator, Point, RadarGeometry};
use crate::error::ControlResult;
use crate::fsm::{
    advance_search_angle, assess_health, ControlMode, Health, HealthPolicy, SearchDecision,
    SearchPolicy, SearchWindow, SweepPlan, SweepTracker,
};
use radarlock_config::RadarlockConfig;
use radarlock_state::{Clock, ControlStateLabel, SharedSignalState, SignalSnapshot, StopToken};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest uninterrupted sleep; long pauses are split so stop requests are seen promptly
const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Everything the controller needs from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub geometry: RadarGeometry,
    pub search: SearchPolicy,
    pub search_step_delay: Duration,
    pub health: HealthPolicy,
    pub sweep_half_width: i32,
    pub sweep_step: i32,
    pub candidate_settle: Duration,
    pub hold: Duration,
    pub collect_point: Point,
    pub collect_settle: Duration,
    pub grab_settle: Duration,
    pub startup_delay: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &RadarlockConfig) -> Self {
        let radar = &config.radar;
        Self {
            geometry: RadarGeometry::from_config(radar),
            search: SearchPolicy::from_config(radar),
            search_step_delay: radar.search_step_delay(),
            health: HealthPolicy::from_config(radar),
            sweep_half_width: radar.tracking_sweep_deg,
            sweep_step: radar.tracking_step_deg,
            candidate_settle: radar.candidate_settle(),
            hold: radar.hold(),
            collect_point: Point::from(&config.collect),
            collect_settle: config.collect.settle(),
            grab_settle: config.collect.grab_settle(),
            startup_delay: config.runtime.startup_delay(),
        }
    }
}

/// Search/track controller owning the actuator
pub struct Controller<A: Actuator> {
    actuator: A,
    settings: ControllerSettings,
    mode: ControlMode,
    angle: f32,
    /// Opened lazily by the first search step after entering `Searching`
    window: Option<SearchWindow>,
    last_signal_seen: Duration,
    grabbed: bool,
}

impl<A: Actuator> Controller<A> {
    pub fn new(actuator: A, settings: ControllerSettings) -> Self {
        Self {
            actuator,
            settings,
            mode: ControlMode::Searching,
            angle: 0.0,
            window: None,
            last_signal_seen: Duration::ZERO,
            grabbed: false,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Current actuator angle in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Run until `stop` is cancelled or the actuator fails
    ///
    /// Waits the startup delay, grabs the radar at 0 degrees, then iterates.
    /// The grab is released before returning, whatever the outcome.
    pub fn run(
        &mut self,
        state: &SharedSignalState,
        clock: &dyn Clock,
        stop: &StopToken,
    ) -> ControlResult<()> {
        info!(
            "[CONTROL] Waiting {:.1}s before grabbing the radar",
            self.settings.startup_delay.as_secs_f64()
        );
        pause(clock, stop, self.settings.startup_delay);

        let result = self.run_until_stopped(state, clock, stop);

        if self.grabbed {
            match self.actuator.release() {
                Ok(()) => self.grabbed = false,
                Err(e) => {
                    warn!("[CONTROL] ⚠️ Failed to release grab on exit: {}", e);
                    if result.is_ok() {
                        return Err(e.into());
                    }
                }
            }
        }
        state.set_control_state(ControlStateLabel::Idle);

        match &result {
            Ok(()) => info!("[CONTROL] ✅ Controller stopped"),
            Err(e) => warn!("[CONTROL] ⚠️ Controller aborted: {}", e),
        }
        result
    }

    fn run_until_stopped(
        &mut self,
        state: &SharedSignalState,
        clock: &dyn Clock,
        stop: &StopToken,
    ) -> ControlResult<()> {
        if stop.is_cancelled() {
            return Ok(());
        }

        self.grab(clock)?;
        self.angle = 0.0;
        self.enter_searching(state);
        info!("[CONTROL] ✅ Radar grabbed, searching");

        while !stop.is_cancelled() {
            self.step(state, clock, stop)?;
        }
        Ok(())
    }

    /// One controller iteration
    ///
    /// Exposed for callers that drive the loop themselves on virtual time.
    pub fn step(
        &mut self,
        state: &SharedSignalState,
        clock: &dyn Clock,
        stop: &StopToken,
    ) -> ControlResult<()> {
        state.set_control_state(self.mode.label());
        let snapshot = state.snapshot();

        if snapshot.collect_ready {
            return self.collect(state, &snapshot, clock);
        }

        match self.mode {
            ControlMode::Searching => self.search_step(state, clock),
            ControlMode::Tracking => self.track_step(state, &snapshot, clock, stop),
        }
    }

    fn search_step(&mut self, state: &SharedSignalState, clock: &dyn Clock) -> ControlResult<()> {
        let mut window = self
            .window
            .take()
            .unwrap_or_else(|| SearchWindow::new(clock.now()));

        self.angle = advance_search_angle(self.angle, self.settings.search.step_deg);
        self.move_to_angle(self.angle)?;

        let latest = state.snapshot();
        window.record(self.angle, latest.signal_strength);

        match window.decide(clock.now(), &latest, &self.settings.search) {
            SearchDecision::LockHere => {
                info!(
                    "[CONTROL] Signal {:.2} at {:.0}°, locking",
                    latest.signal_strength, self.angle
                );
                self.enter_tracking(state, clock.now());
                return Ok(());
            }
            SearchDecision::LockAt(angle) => {
                info!(
                    "[CONTROL] Search window closed, best signal at {:.0}° ({} samples)",
                    angle,
                    window.samples().len()
                );
                self.angle = angle;
                self.enter_tracking(state, clock.now());
                return Ok(());
            }
            SearchDecision::RestartWindow => {
                debug!(
                    "[CONTROL] No usable signal in {} samples, restarting window at {:.0}°",
                    window.samples().len(),
                    self.angle
                );
            }
            SearchDecision::Continue => self.window = Some(window),
        }

        clock.sleep(self.settings.search_step_delay);
        Ok(())
    }

    fn track_step(
        &mut self,
        state: &SharedSignalState,
        snapshot: &SignalSnapshot,
        clock: &dyn Clock,
        stop: &StopToken,
    ) -> ControlResult<()> {
        if let Some(target) = snapshot.target_angle {
            self.angle = target;
            self.move_to_angle(target)?;
            self.last_signal_seen = clock.now();
            return Ok(());
        }

        let plan = SweepPlan::around(
            self.angle,
            self.settings.sweep_half_width,
            self.settings.sweep_step,
        );
        let mut tracker = SweepTracker::starting_at(self.angle);
        for candidate in plan.candidates() {
            if stop.is_cancelled() {
                return Ok(());
            }
            let candidate = candidate as f32;
            self.move_to_angle(candidate)?;
            tracker.observe(candidate, state.snapshot().signal_strength);
            clock.sleep(self.settings.candidate_settle);
        }

        self.angle = tracker.best_angle();
        self.move_to_angle(self.angle)?;
        pause(clock, stop, self.settings.hold);

        let now = clock.now();
        let approaching = state.snapshot().approaching;
        let since_last_seen = now.saturating_sub(self.last_signal_seen);
        match assess_health(
            tracker.best_strength(),
            approaching,
            since_last_seen,
            &self.settings.health,
        ) {
            Health::Healthy => self.last_signal_seen = now,
            Health::Degraded => debug!(
                "[CONTROL] Weak signal {:.2} at {:.0}°, {:.1}s since last seen",
                tracker.best_strength(),
                self.angle,
                since_last_seen.as_secs_f64()
            ),
            Health::Lost => {
                info!(
                    "[CONTROL] Signal lost for {:.1}s, searching from {:.0}°",
                    since_last_seen.as_secs_f64(),
                    self.angle
                );
                self.enter_searching(state);
            }
        }
        Ok(())
    }

    fn collect(
        &mut self,
        state: &SharedSignalState,
        snapshot: &SignalSnapshot,
        clock: &dyn Clock,
    ) -> ControlResult<()> {
        info!(
            "[CONTROL] 🎯 Collecting (button HSV {:?}, cycle {})",
            snapshot.button_mean_hsv, snapshot.cycle
        );

        self.actuator.release()?;
        self.grabbed = false;
        self.actuator.click(self.settings.collect_point)?;
        clock.sleep(self.settings.collect_settle);

        self.grab(clock)?;
        self.angle = 0.0;
        self.enter_searching(state);
        Ok(())
    }

    /// Move to angle 0, press, wait for the grab to register
    fn grab(&mut self, clock: &dyn Clock) -> ControlResult<()> {
        self.move_to_angle(0.0)?;
        self.actuator.press()?;
        self.grabbed = true;
        clock.sleep(self.settings.grab_settle);
        Ok(())
    }

    fn move_to_angle(&mut self, angle: f32) -> ControlResult<()> {
        let point = self.settings.geometry.point_at(angle);
        self.actuator.move_to(point)?;
        Ok(())
    }

    fn enter_searching(&mut self, state: &SharedSignalState) {
        self.mode = ControlMode::Searching;
        self.window = None;
        state.set_control_state(self.mode.label());
    }

    fn enter_tracking(&mut self, state: &SharedSignalState, now: Duration) {
        self.mode = ControlMode::Tracking;
        self.window = None;
        self.last_signal_seen = now;
        state.set_control_state(self.mode.label());
    }
}

/// Sleep for `duration`, returning early once `stop` is cancelled
fn pause(clock: &dyn Clock, stop: &StopToken, duration: Duration) {
    let mut remaining = duration;
    while !remaining.is_zero() && !stop.is_cancelled() {
        let slice = remaining.min(PAUSE_SLICE);
        clock.sleep(slice);
        remaining -= slice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorError;
    use radarlock_state::ManualClock;

    #[derive(Default)]
    struct CountingActuator {
        moves: usize,
        presses: usize,
        releases: usize,
    }

    impl Actuator for CountingActuator {
        fn move_to(&mut self, _point: Point) -> Result<(), ActuatorError> {
            self.moves += 1;
            Ok(())
        }
        fn press(&mut self) -> Result<(), ActuatorError> {
            self.presses += 1;
            Ok(())
        }
        fn release(&mut self) -> Result<(), ActuatorError> {
            self.releases += 1;
            Ok(())
        }
        fn click(&mut self, _point: Point) -> Result<(), ActuatorError> {
            Ok(())
        }
    }

    #[test]
    fn test_pause_splits_and_stops_early() {
        let clock = ManualClock::new();
        let stop = StopToken::new();
        pause(&clock, &stop, Duration::from_millis(120));
        assert_eq!(clock.now(), Duration::from_millis(120));

        stop.cancel();
        pause(&clock, &stop, Duration::from_secs(5));
        assert_eq!(clock.now(), Duration::from_millis(120));
    }

    #[test]
    fn test_settings_follow_config() {
        let settings = ControllerSettings::from_config(&RadarlockConfig::default());
        assert_eq!(settings.sweep_half_width, 16);
        assert_eq!(settings.sweep_step, 3);
        assert_eq!(settings.hold, Duration::from_millis(500));
        assert_eq!(settings.collect_point, Point::new(1750.0, 320.0));
        assert_eq!(settings.startup_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_cancelled_before_start_never_grabs() {
        let stop = StopToken::new();
        stop.cancel();
        let state = SharedSignalState::new();
        let clock = ManualClock::new();
        let mut controller = Controller::new(
            CountingActuator::default(),
            ControllerSettings::from_config(&RadarlockConfig::default()),
        );

        controller.run(&state, &clock, &stop).unwrap();

        let actuator = controller.into_actuator();
        assert_eq!(actuator.moves, 0);
        assert_eq!(actuator.presses, 0);
        assert_eq!(actuator.releases, 0);
        assert_eq!(state.control_state(), ControlStateLabel::Idle);
    }
}
