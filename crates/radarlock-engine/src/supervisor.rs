// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle supervisor
//!
//! Runs the signal pipeline and the controller on dedicated named threads,
//! connected only through [`SharedSignalState`] and a shared [`StopToken`].
//!
//! ```text
//!   ┌───────────────────┐  publish   ┌───────────────────┐  snapshot  ┌────────────────────┐
//!   │ radarlock-vision  │ ─────────► │ SharedSignalState │ ─────────► │ radarlock-control  │
//!   │ SignalPipeline    │            │ (RwLock + atomic) │            │ Controller         │
//!   └─────────▲─────────┘            └───────────────────┘            └─────────┬──────────┘
//!             │ FrameSource                                            Actuator │
//!             └──────────────── screen / simulator ◄────────────────────────────┘
//! ```
//!
//! Either thread cancels the token when it exits, whether by returning or
//! by unwinding, so a failed or panicked loop also stops its peer. Both
//! threads are always joined before [`Engine::run`] returns.

use crate::error::{EngineError, EngineResult};
use radarlock_config::RadarlockConfig;
use radarlock_control::{Actuator, Controller, ControllerSettings};
use radarlock_state::{Clock, SharedSignalState, StopToken};
use radarlock_vision::{FrameSource, SignalPipeline};
use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

const VISION_THREAD: &str = "radarlock-vision";
const CONTROL_THREAD: &str = "radarlock-control";

/// Owns the shared state and stop token for one run
pub struct Engine {
    config: RadarlockConfig,
    clock: Arc<dyn Clock>,
    state: Arc<SharedSignalState>,
    stop: StopToken,
}

impl Engine {
    pub fn new(config: RadarlockConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Arc::new(SharedSignalState::new()),
            stop: StopToken::new(),
        }
    }

    /// Token that ends the run when cancelled (stop key, Ctrl+C, tests)
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn state(&self) -> Arc<SharedSignalState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &RadarlockConfig {
        &self.config
    }

    /// Block until the stop token is cancelled or the controller fails
    ///
    /// # Errors
    ///
    /// - `EngineError::Vision` if the pipeline cannot be built
    /// - `EngineError::Control` on a fatal actuator failure
    /// - `EngineError::ThreadPanicked` if either loop panicked
    pub fn run<S, A>(&self, source: S, actuator: A) -> EngineResult<()>
    where
        S: FrameSource + Send + 'static,
        A: Actuator + Send + 'static,
    {
        let mut pipeline = SignalPipeline::new(source, &self.config.vision, &self.config.radar)?;
        let mut controller = Controller::new(actuator, ControllerSettings::from_config(&self.config));

        info!(
            "[ENGINE] Starting (radar center ({}, {}), radius {}, stop key '{}')",
            self.config.radar.center_x,
            self.config.radar.center_y,
            self.config.radar.radius,
            self.config.runtime.stop_key
        );

        let vision_handle = {
            let state = Arc::clone(&self.state);
            let clock = Arc::clone(&self.clock);
            let stop = self.stop.clone();
            spawn_named(VISION_THREAD, move || {
                let _guard = CancelOnExit(stop.clone());
                pipeline.run(&state, clock.as_ref(), &stop);
                pipeline.cycles()
            })?
        };

        let control_handle = {
            let state = Arc::clone(&self.state);
            let clock = Arc::clone(&self.clock);
            let stop = self.stop.clone();
            let spawned = spawn_named(CONTROL_THREAD, move || {
                let _guard = CancelOnExit(stop.clone());
                controller.run(&state, clock.as_ref(), &stop)
            });
            match spawned {
                Ok(handle) => handle,
                Err(e) => {
                    self.stop.cancel();
                    let _ = vision_handle.join();
                    return Err(e);
                }
            }
        };

        let control_outcome = control_handle.join();
        // The controller is done either way; the pipeline has nothing left to feed
        self.stop.cancel();
        let vision_outcome = vision_handle.join();

        let control_result = control_outcome.map_err(|payload| panicked(CONTROL_THREAD, payload))?;
        let cycles = vision_outcome.map_err(|payload| panicked(VISION_THREAD, payload))?;

        match control_result {
            Ok(()) => {
                info!("[ENGINE] ✅ Stopped cleanly after {} pipeline cycles", cycles);
                Ok(())
            }
            Err(e) => {
                error!("[ENGINE] Controller failed after {} pipeline cycles: {}", cycles, e);
                Err(e.into())
            }
        }
    }
}

/// Cancels the run when dropped, including during a panic unwind
struct CancelOnExit(StopToken);

impl Drop for CancelOnExit {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(
                "[ENGINE] Thread {} panicked, stopping the run",
                thread::current().name().unwrap_or("unnamed")
            );
        }
        self.0.cancel();
    }
}

fn spawn_named<F, T>(name: &str, body: F) -> EngineResult<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|source| EngineError::ThreadSpawn {
            name: name.to_string(),
            source,
        })
}

fn panicked(name: &str, payload: Box<dyn Any + Send>) -> EngineError {
    let message = if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };
    warn!("[ENGINE] ⚠️ Thread {} panicked: {}", name, message);
    EngineError::ThreadPanicked {
        name: name.to_string(),
        message,
    }
}
