// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stop listeners: things that decide when a run ends

use radarlock_state::{Clock, StopToken};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Blocks until a stop is requested, then cancels the token
pub trait StopListener: Send {
    /// Returns once the token is cancelled, by this listener or anyone else,
    /// or when the listener's input is exhausted
    fn listen(&mut self, stop: &StopToken);
}

/// Cancels when a line equal to the stop key is read
///
/// Surrounding whitespace is ignored. End of input is not a stop request.
pub struct KeyStopListener<R> {
    reader: R,
    key: String,
}

impl<R: BufRead> KeyStopListener<R> {
    pub fn new(reader: R, key: impl Into<String>) -> Self {
        Self {
            reader,
            key: key.into(),
        }
    }
}

impl KeyStopListener<io::BufReader<io::Stdin>> {
    pub fn stdin(key: impl Into<String>) -> Self {
        Self::new(io::BufReader::new(io::stdin()), key)
    }
}

impl<R: BufRead + Send> StopListener for KeyStopListener<R> {
    fn listen(&mut self, stop: &StopToken) {
        let mut line = String::new();
        while !stop.is_cancelled() {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    debug!("[ENGINE] Stop key input closed, relying on Ctrl+C");
                    return;
                }
                Ok(_) => {
                    if line.trim() == self.key {
                        info!("[ENGINE] Stop key '{}' pressed", self.key);
                        stop.cancel();
                        return;
                    }
                }
                Err(e) => {
                    debug!("[ENGINE] Stop key input failed: {}", e);
                    return;
                }
            }
        }
    }
}

/// Cancels after a fixed run time on the given clock
pub struct TimedStopListener {
    clock: Arc<dyn Clock>,
    run_for: Duration,
}

impl TimedStopListener {
    const POLL: Duration = Duration::from_millis(50);

    pub fn new(clock: Arc<dyn Clock>, run_for: Duration) -> Self {
        Self { clock, run_for }
    }
}

impl StopListener for TimedStopListener {
    fn listen(&mut self, stop: &StopToken) {
        let deadline = self.clock.now() + self.run_for;
        while !stop.is_cancelled() {
            let now = self.clock.now();
            if now >= deadline {
                info!("[ENGINE] Run time of {:.1}s elapsed", self.run_for.as_secs_f64());
                stop.cancel();
                return;
            }
            self.clock.sleep((deadline - now).min(Self::POLL));
        }
    }
}

/// Run a listener on its own named thread
///
/// The handle may be dropped: a listener blocked on stdin cannot be joined.
pub fn spawn_stop_listener<L>(mut listener: L, stop: StopToken) -> io::Result<JoinHandle<()>>
where
    L: StopListener + 'static,
{
    thread::Builder::new()
        .name("radarlock-stop".to_string())
        .spawn(move || listener.listen(&stop))
}
