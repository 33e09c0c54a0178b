// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shared stream timebase.
//!
//! One timebase exists per active stream. The producer stamps every frame with
//! [`Timebase::time_ns`] and the display surface receives the very same
//! `Arc<Timebase>` as its control timebase, so both read one timeline.

use std::fmt;
use std::sync::Arc;

use super::Clock;

/// Controllable monotonic clock reference shared with the display surface.
pub struct Timebase {
    source: Arc<dyn Clock>,
    rate: f64,
    anchor_host_ns: i64,
    anchor_time_ns: i64,
}

impl Timebase {
    /// Create a timebase bound to `source`.
    ///
    /// Construction follows the display-surface contract in a fixed order:
    /// bind the source clock, set the rate to 1.0, then set the timebase time
    /// to the source's current reading. The anchor is taken exactly once.
    pub fn new(source: Arc<dyn Clock>) -> Arc<Self> {
        let rate = 1.0;
        let anchor_host_ns = source.now_ns();
        let timebase = Self {
            source,
            rate,
            anchor_host_ns,
            anchor_time_ns: anchor_host_ns,
        };
        tracing::debug!(
            clock = timebase.source.description(),
            anchor_ns = anchor_host_ns,
            "Timebase anchored"
        );
        Arc::new(timebase)
    }

    /// Current timebase time in nanoseconds.
    #[inline]
    pub fn time_ns(&self) -> i64 {
        let host_elapsed = self.source.now_ns() - self.anchor_host_ns;
        self.anchor_time_ns + (host_elapsed as f64 * self.rate) as i64
    }

    /// Nanoseconds of stream time since the anchor.
    #[inline]
    pub fn elapsed_ns(&self) -> i64 {
        self.time_ns() - self.anchor_time_ns
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn anchor_ns(&self) -> i64 {
        self.anchor_time_ns
    }

    /// The host clock this timebase reads.
    pub fn source(&self) -> &Arc<dyn Clock> {
        &self.source
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timebase")
            .field("source", &self.source.description())
            .field("rate", &self.rate)
            .field("anchor_ns", &self.anchor_time_ns)
            .finish()
    }
}
