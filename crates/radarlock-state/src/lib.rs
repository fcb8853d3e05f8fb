// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # radarlock-state
//!
//! Runtime state shared between the signal pipeline and the controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   SignalSnapshot                    │  ← RwLock, swapped whole once per pipeline cycle
//! ├─────────────────────────────────────┤
//! │   ControlStateLabel                 │  ← AtomicU8, written by the controller only
//! └─────────────────────────────────────┘
//!   StopToken  (Arc<AtomicBool>, polled by both loops)
//!   Clock      (SystemClock in production, ManualClock in tests)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use radarlock_state::{ControlStateLabel, SharedSignalState, SignalSnapshot};
//!
//! let state = SharedSignalState::new();
//! state.publish(SignalSnapshot { signal_strength: 0.5, ..Default::default() });
//! state.set_control_state(ControlStateLabel::Tracking);
//!
//! assert_eq!(state.snapshot().signal_strength, 0.5);
//! assert_eq!(state.control_state(), ControlStateLabel::Tracking);
//! ```

pub mod clock;
pub mod signal;
pub mod stop;

pub use clock::{Clock, ManualClock, SystemClock};
pub use signal::{normalize_degrees, ControlStateLabel, SharedSignalState, SignalSnapshot};
pub use stop::StopToken;
