// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide monotonic host clock.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Monotonic host time since the first query in this process.
///
/// This is the "hardware clock" every [`Timebase`](crate::core::clocks::Timebase)
/// anchors to. All readings share one origin, so values taken on different
/// threads are directly comparable.
pub struct MediaClock;

impl MediaClock {
    #[inline]
    pub fn now() -> Duration {
        static START: OnceLock<Instant> = OnceLock::new();
        let start = START.get_or_init(Instant::now);
        start.elapsed()
    }

    /// Host time in nanoseconds.
    #[inline]
    pub fn now_ns() -> i64 {
        Self::now().as_nanos() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_clock_monotonic() {
        let mut last = MediaClock::now_ns();
        for _ in 0..1000 {
            let now = MediaClock::now_ns();
            assert!(now >= last, "host clock must never go backwards");
            last = now;
        }
    }
}
