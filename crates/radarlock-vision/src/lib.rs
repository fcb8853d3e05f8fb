// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock-vision
//!
//! Signal extraction from captured screen regions.
//!
//! Turns raw frames into one [`radarlock_state::SignalSnapshot`] per cycle:
//! a signal strength scalar, the debounced collect/approaching flags and an
//! optional marker bearing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use radarlock_config::RadarlockConfig;
//! use radarlock_state::{SharedSignalState, StopToken, SystemClock};
//! use radarlock_vision::{CaptureError, CaptureRegion, FrameSource, ImageFrame, SignalPipeline};
//!
//! struct Screen;
//! impl FrameSource for Screen {
//!     fn capture(&mut self, _region: &CaptureRegion) -> Result<ImageFrame, CaptureError> {
//!         Err(CaptureError::Unavailable("no display".into()))
//!     }
//! }
//!
//! let config = RadarlockConfig::default();
//! let mut pipeline = SignalPipeline::new(Screen, &config.vision, &config.radar)?;
//! pipeline.run(&SharedSignalState::new(), &SystemClock::new(), &StopToken::new());
//! # Ok::<(), radarlock_vision::VisionError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod capture;
pub mod color;
pub mod contours;
pub mod debounce;
pub mod error;
pub mod hsv;
pub mod image_frame;
pub mod marker;
pub mod morphology;
pub mod pipeline;

pub use capture::{CaptureRegion, FrameSource};
pub use color::{classify, count_matches, mean_hsv, HsvBands, HsvRange, Mask, PixelClassifier};
pub use contours::{find_external_contours, Contour, ContourFilter, ContourMetrics};
pub use debounce::CollectDebouncer;
pub use error::{CaptureError, VisionError, VisionResult};
pub use hsv::rgb_to_hsv;
pub use image_frame::{ChannelLayout, ImageFrame};
pub use marker::{bearing_degrees, MarkerDetector};
pub use pipeline::SignalPipeline;
