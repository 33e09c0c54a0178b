// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use super::Clock;

/// Clock that only moves when told to.
///
/// Used for deterministic pacing tests and for offline drivers that feed
/// synthetic tick times.
pub struct ManualClock {
    now_ns: AtomicI64,
    description: String,
}

impl ManualClock {
    pub fn new(start_ns: i64) -> Self {
        Self {
            now_ns: AtomicI64::new(start_ns),
            description: "Manual Clock".to_string(),
        }
    }

    /// Advance by `delta`. Returns the new reading.
    pub fn advance(&self, delta: Duration) -> i64 {
        let delta_ns = delta.as_nanos() as i64;
        self.now_ns.fetch_add(delta_ns, Ordering::AcqRel) + delta_ns
    }

    /// Jump to `ns`. Ignored when it would move the clock backwards.
    pub fn set_ns(&self, ns: i64) {
        self.now_ns.fetch_max(ns, Ordering::AcqRel);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now_ns.load(Ordering::Acquire)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
