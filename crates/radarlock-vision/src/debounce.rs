// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Flash protection for the collect button

use std::time::Duration;

/// Confirms a condition only after it has held continuously for `confirm_delay`
///
/// A single false sample resets the timer and clears the confirmation.
#[derive(Debug, Clone)]
pub struct CollectDebouncer {
    confirm_delay: Duration,
    true_since: Option<Duration>,
    confirmed: bool,
}

impl CollectDebouncer {
    pub fn new(confirm_delay: Duration) -> Self {
        Self {
            confirm_delay,
            true_since: None,
            confirmed: false,
        }
    }

    /// Feed one sample taken at `now`; returns the confirmed state
    pub fn update(&mut self, condition: bool, now: Duration) -> bool {
        if !condition {
            self.reset();
            return false;
        }

        let since = *self.true_since.get_or_insert(now);
        self.confirmed = now.saturating_sub(since) >= self.confirm_delay;
        self.confirmed
    }

    pub fn reset(&mut self) {
        self.true_since = None;
        self.confirmed = false;
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}
