// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Clock trait - passive time reference for frame stamping.
//!
//! Clocks provide **passive time references** that the pacing controller and
//! timebase query. They never schedule or wake anything.

use std::time::Duration;

/// Passive monotonic clock.
///
/// ## Design
///
/// - **Passive**: the clock provides `now_ns()`, callers decide what to do
/// - **No callbacks**: the clock never calls into the pipeline
/// - **Thread-safe**: all methods can be called from any thread
///
/// ## Implementations
///
/// - `HostClock`: process-wide monotonic host time (production)
/// - `ManualClock`: advanced explicitly (deterministic tests, offline drivers)
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds (monotonic).
    ///
    /// Guaranteed never to decrease between two calls, on any thread.
    fn now_ns(&self) -> i64;

    /// Current time as Duration (convenience).
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns().max(0) as u64)
    }

    /// Clock rate in Hz for tick-driven clocks, None for free-running ones.
    fn rate_hz(&self) -> Option<f64> {
        None
    }

    /// Human-readable clock description, used for logging.
    fn description(&self) -> &str;
}
