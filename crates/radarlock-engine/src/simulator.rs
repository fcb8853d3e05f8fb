// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulated radar minigame
//!
//! A target sits at a bearing that drifts over time. While the radar is
//! grabbed and the pointer aims near the bearing, the target gets closer.
//! The screen is rendered on demand for whatever region is captured:
//!
//! - strength region: histogram bars filling `strength * width` columns
//! - around the radar center: the player glyph and, once close enough, the marker dot
//! - button region: gray, dark red while approaching, bright red when collectable
//!
//! [`SimulatedScreen`] and [`SimulatedPointer`] are two handles on the same
//! world, one per engine thread.

use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use radarlock_config::{RadarlockConfig, SimulationConfig};
use radarlock_control::{Actuator, ActuatorError, Point};
use radarlock_state::{normalize_degrees, Clock};
use radarlock_vision::{CaptureError, CaptureRegion, FrameSource, ImageFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Histogram bar color: in the signal range, below the marker saturation floor
pub const SIGNAL_RGB: [u8; 3] = [170, 120, 220];
/// Marker dot and player glyph color
pub const MARKER_RGB: [u8; 3] = [160, 60, 220];
pub const BUTTON_IDLE_RGB: [u8; 3] = [90, 90, 90];
pub const BUTTON_APPROACHING_RGB: [u8; 3] = [140, 20, 20];
pub const BUTTON_COLLECTABLE_RGB: [u8; 3] = [240, 20, 20];
pub const BACKGROUND_RGB: [u8; 3] = [24, 24, 32];

const BAR_PITCH: u32 = 12;
const BAR_WIDTH: u32 = 8;
const DOT_RADIUS: f64 = 7.0;
const GLYPH_RADIUS: f64 = 10.0;
/// Closest the dot is drawn to the radar center, clear of the center mask
const DOT_INNER_RADIUS: f64 = 45.0;

/// Handle on the simulated world; clones share it
#[derive(Clone)]
pub struct SimulatedRadar {
    world: Arc<Mutex<World>>,
}

impl SimulatedRadar {
    pub fn new(config: &RadarlockConfig, clock: Arc<dyn Clock>) -> Self {
        let mut rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bearing = rng.gen_range(0.0..360.0);
        let last_update = clock.now();

        info!(
            "[SIM] Target spawned at {:.0}°, screen {}x{}",
            bearing, config.simulation.screen_width, config.simulation.screen_height
        );

        let world = World {
            clock,
            last_update,
            rng,
            sim: config.simulation.clone(),
            center: (config.radar.center_x as f64, config.radar.center_y as f64),
            radius: config.radar.radius as f64,
            strength_region: CaptureRegion::from(&config.vision.strength_region),
            button_region: CaptureRegion::from(&config.vision.button_region),
            bearing,
            distance: 1.0,
            pointer: Point::new(0.0, 0.0),
            grabbed: false,
            collected: 0,
        };
        Self {
            world: Arc::new(Mutex::new(world)),
        }
    }

    /// Frame source half, for the pipeline thread
    pub fn screen(&self) -> SimulatedScreen {
        SimulatedScreen {
            world: Arc::clone(&self.world),
        }
    }

    /// Actuator half, for the controller thread
    pub fn pointer(&self) -> SimulatedPointer {
        SimulatedPointer {
            world: Arc::clone(&self.world),
        }
    }

    /// Place the target explicitly
    pub fn set_target(&self, bearing: f32, distance: f32) {
        let mut world = self.world.lock();
        world.advance();
        world.bearing = normalize_degrees(bearing);
        world.distance = distance.clamp(0.0, 1.0);
    }

    pub fn bearing(&self) -> f32 {
        let mut world = self.world.lock();
        world.advance();
        world.bearing
    }

    pub fn distance(&self) -> f32 {
        let mut world = self.world.lock();
        world.advance();
        world.distance
    }

    pub fn collected(&self) -> u32 {
        self.world.lock().collected
    }

    pub fn is_grabbed(&self) -> bool {
        self.world.lock().grabbed
    }

    /// Histogram fill the screen shows right now
    pub fn signal_strength(&self) -> f32 {
        let mut world = self.world.lock();
        world.advance();
        world.strength()
    }
}

struct World {
    clock: Arc<dyn Clock>,
    last_update: Duration,
    rng: StdRng,
    sim: SimulationConfig,

    center: (f64, f64),
    radius: f64,
    strength_region: CaptureRegion,
    button_region: CaptureRegion,

    bearing: f32,
    /// 1.0 = just spawned, 0.0 = reached
    distance: f32,
    pointer: Point,
    grabbed: bool,
    collected: u32,
}

impl World {
    fn advance(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_sub(self.last_update).as_secs_f32();
        self.last_update = now;
        if dt == 0.0 {
            return;
        }

        self.bearing = normalize_degrees(self.bearing + self.sim.drift_deg_per_sec * dt);
        if self.grabbed && self.aim_error() <= self.sim.beam_half_width_deg / 3.0 {
            self.distance = (self.distance - self.sim.approach_per_sec * dt).max(0.0);
        }
    }

    fn pointer_angle(&self) -> f32 {
        let dx = self.pointer.x - self.center.0;
        let dy = self.pointer.y - self.center.1;
        normalize_degrees(dy.atan2(dx).to_degrees() as f32)
    }

    fn aim_error(&self) -> f32 {
        angular_distance(self.pointer_angle(), self.bearing)
    }

    fn strength(&self) -> f32 {
        if !self.grabbed {
            return 0.0;
        }
        (1.0 - self.aim_error() / self.sim.beam_half_width_deg).clamp(0.0, 1.0)
    }

    fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.sim.screen_width as f64
            && point.y < self.sim.screen_height as f64
    }

    fn respawn(&mut self) {
        self.bearing = self.rng.gen_range(0.0..360.0);
        self.distance = 1.0;
    }

    fn scene(&self) -> Scene {
        let button = if self.distance < self.sim.collectable_distance {
            BUTTON_COLLECTABLE_RGB
        } else if self.distance < self.sim.approaching_distance {
            BUTTON_APPROACHING_RGB
        } else {
            BUTTON_IDLE_RGB
        };

        let dot = (self.distance < self.sim.marker_distance).then(|| {
            let reach = (self.radius - DOT_RADIUS - 3.0).max(DOT_INNER_RADIUS);
            let r = DOT_INNER_RADIUS
                + (reach - DOT_INNER_RADIUS) * (self.distance / self.sim.marker_distance) as f64;
            let rads = (self.bearing as f64).to_radians();
            (self.center.0 + r * rads.cos(), self.center.1 + r * rads.sin())
        });

        Scene {
            strength_region: self.strength_region,
            fill_columns: (self.strength() * self.strength_region.width as f32).round() as i32,
            button_region: self.button_region,
            button,
            center: self.center,
            dot,
        }
    }
}

/// Everything needed to render one capture, taken under the lock
struct Scene {
    strength_region: CaptureRegion,
    fill_columns: i32,
    button_region: CaptureRegion,
    button: [u8; 3],
    center: (f64, f64),
    dot: Option<(f64, f64)>,
}

impl Scene {
    fn pixel(&self, x: i32, y: i32) -> [u8; 3] {
        if self.button_region.contains(x, y) {
            return self.button;
        }
        if self.strength_region.contains(x, y) {
            let column = x - self.strength_region.left;
            let on_bar = (column as u32 % BAR_PITCH) < BAR_WIDTH;
            return if column < self.fill_columns && on_bar {
                SIGNAL_RGB
            } else {
                BACKGROUND_RGB
            };
        }

        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        if within(px, py, self.center, GLYPH_RADIUS) {
            return MARKER_RGB;
        }
        if let Some(dot) = self.dot {
            if within(px, py, dot, DOT_RADIUS) {
                return MARKER_RGB;
            }
        }
        BACKGROUND_RGB
    }
}

fn within(x: f64, y: f64, center: (f64, f64), radius: f64) -> bool {
    let dx = x - center.0;
    let dy = y - center.1;
    dx * dx + dy * dy <= radius * radius
}

/// Shortest unsigned angle between two bearings, in [0, 180]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = normalize_degrees(a - b);
    d.min(360.0 - d)
}

/// Renders captures from the simulated world
pub struct SimulatedScreen {
    world: Arc<Mutex<World>>,
}

impl FrameSource for SimulatedScreen {
    fn capture(&mut self, region: &CaptureRegion) -> Result<ImageFrame, CaptureError> {
        let scene = {
            let mut world = self.world.lock();
            let on_screen = region.left >= 0
                && region.top >= 0
                && region.right() <= world.sim.screen_width as i32
                && region.bottom() <= world.sim.screen_height as i32;
            if !on_screen {
                return Err(CaptureError::OutOfScreen {
                    left: region.left,
                    top: region.top,
                    width: region.width,
                    height: region.height,
                });
            }
            world.advance();
            world.scene()
        };

        let image = RgbImage::from_fn(region.width, region.height, |x, y| {
            Rgb(scene.pixel(region.left + x as i32, region.top + y as i32))
        });
        Ok(ImageFrame::from_dynamic_image(image.into())?)
    }
}

/// Pointer and grab state of the simulated world
pub struct SimulatedPointer {
    world: Arc<Mutex<World>>,
}

impl Actuator for SimulatedPointer {
    fn move_to(&mut self, point: Point) -> Result<(), ActuatorError> {
        let mut world = self.world.lock();
        if !world.in_bounds(point) {
            return Err(ActuatorError::OutOfBounds {
                x: point.x,
                y: point.y,
            });
        }
        world.advance();
        world.pointer = point;
        Ok(())
    }

    fn press(&mut self) -> Result<(), ActuatorError> {
        let mut world = self.world.lock();
        world.advance();
        world.grabbed = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        let mut world = self.world.lock();
        world.advance();
        world.grabbed = false;
        Ok(())
    }

    fn click(&mut self, point: Point) -> Result<(), ActuatorError> {
        let mut world = self.world.lock();
        if !world.in_bounds(point) {
            return Err(ActuatorError::OutOfBounds {
                x: point.x,
                y: point.y,
            });
        }
        world.advance();
        world.pointer = point;

        let on_button = world.button_region.contains(point.x as i32, point.y as i32);
        if on_button && world.distance < world.sim.collectable_distance {
            world.collected += 1;
            world.respawn();
            info!(
                "[SIM] 🎯 Target collected ({} total), next one at {:.0}°",
                world.collected, world.bearing
            );
        } else {
            debug!(
                "[SIM] Click at ({:.0}, {:.0}) ignored (distance {:.2})",
                point.x, point.y, world.distance
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarlock_config::VisionConfig;
    use radarlock_control::RadarGeometry;
    use radarlock_state::ManualClock;
    use radarlock_vision::{rgb_to_hsv, HsvBands, HsvRange, PixelClassifier};

    fn seeded(clock: &ManualClock) -> (RadarlockConfig, SimulatedRadar) {
        let mut config = RadarlockConfig::default();
        config.simulation.seed = Some(7);
        let radar = SimulatedRadar::new(&config, Arc::new(clock.clone()));
        (config, radar)
    }

    #[test]
    fn test_palette_matches_default_color_ranges() {
        let vision = VisionConfig::default();
        let signal = HsvRange::from(&vision.signal_color);
        let marker = HsvRange::from(&vision.marker_color);
        let bright = HsvBands::from_config(&vision.button_bright);
        let dark = HsvBands::from_config(&vision.button_dark);

        assert!(signal.matches(rgb_to_hsv(SIGNAL_RGB)));
        assert!(!marker.matches(rgb_to_hsv(SIGNAL_RGB)));
        assert!(marker.matches(rgb_to_hsv(MARKER_RGB)));
        assert!(bright.matches(rgb_to_hsv(BUTTON_COLLECTABLE_RGB)));
        assert!(!bright.matches(rgb_to_hsv(BUTTON_APPROACHING_RGB)));
        assert!(dark.matches(rgb_to_hsv(BUTTON_APPROACHING_RGB)));
        assert!(!dark.matches(rgb_to_hsv(BUTTON_IDLE_RGB)));
        assert!(!signal.matches(rgb_to_hsv(BACKGROUND_RGB)));
    }

    #[test]
    fn test_strength_follows_aim() {
        let clock = ManualClock::new();
        let (config, radar) = seeded(&clock);
        let geometry = RadarGeometry::from_config(&config.radar);
        let mut pointer = radar.pointer();
        radar.set_target(90.0, 1.0);

        pointer.move_to(geometry.point_at(90.0)).unwrap();
        assert_eq!(radar.signal_strength(), 0.0);

        pointer.press().unwrap();
        assert!((radar.signal_strength() - 1.0).abs() < 1e-4);

        pointer.move_to(geometry.point_at(112.5)).unwrap();
        assert!((radar.signal_strength() - 0.5).abs() < 1e-3);

        pointer.move_to(geometry.point_at(270.0)).unwrap();
        assert_eq!(radar.signal_strength(), 0.0);
    }

    #[test]
    fn test_target_closes_in_while_aimed() {
        let clock = ManualClock::new();
        let (config, radar) = seeded(&clock);
        let geometry = RadarGeometry::from_config(&config.radar);
        let mut pointer = radar.pointer();
        radar.set_target(180.0, 1.0);

        pointer.move_to(geometry.point_at(180.0)).unwrap();
        pointer.press().unwrap();
        clock.advance(Duration::from_secs(2));
        let distance = radar.distance();
        assert!(distance < 0.8 && distance > 0.7);
        // drift moved the target by drift * 2 s
        assert!((radar.bearing() - 188.0).abs() < 1e-3);
    }

    #[test]
    fn test_out_of_bounds_pointer() {
        let clock = ManualClock::new();
        let (_, radar) = seeded(&clock);
        let mut pointer = radar.pointer();
        let err = pointer.move_to(Point::new(-1.0, 10.0)).unwrap_err();
        assert!(matches!(err, ActuatorError::OutOfBounds { .. }));
        assert!(pointer.click(Point::new(10.0, 5000.0)).is_err());
    }

    #[test]
    fn test_click_collects_only_when_bright() {
        let clock = ManualClock::new();
        let (config, radar) = seeded(&clock);
        let mut pointer = radar.pointer();
        let button = Point::from(&config.collect);

        radar.set_target(10.0, 0.1);
        pointer.click(button).unwrap();
        assert_eq!(radar.collected(), 0);

        radar.set_target(10.0, 0.01);
        pointer.click(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(radar.collected(), 0);

        pointer.click(button).unwrap();
        assert_eq!(radar.collected(), 1);
        assert_eq!(radar.distance(), 1.0);
    }

    #[test]
    fn test_capture_renders_button_and_rejects_offscreen() {
        let clock = ManualClock::new();
        let (config, radar) = seeded(&clock);
        let mut screen = radar.screen();
        let button_region = CaptureRegion::from(&config.vision.button_region);

        radar.set_target(0.0, 0.01);
        let frame = screen.capture(&button_region).unwrap();
        assert_eq!(frame.get_width(), button_region.width as usize);
        assert_eq!(frame.get_rgb(3, 3), Some(BUTTON_COLLECTABLE_RGB));

        let offscreen = CaptureRegion::new(2500, 0, 100, 100);
        assert!(matches!(
            screen.capture(&offscreen),
            Err(CaptureError::OutOfScreen { .. })
        ));
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_eq!(angular_distance(350.0, 10.0), 20.0);
        assert_eq!(angular_distance(10.0, 350.0), 20.0);
        assert_eq!(angular_distance(0.0, 180.0), 180.0);
    }
}
