// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Stream session notifications and usage tracking.

mod usage_tracker;

pub use usage_tracker::{OpenSession, SessionRecord, UsageTracker};

/// Notified when a stream starts or stops, with the provider tag of its
/// source (`"clock"`, `"stopwatch"`, `"camera"`, ...).
pub trait SessionObserver: Send + Sync {
    fn stream_started(&self, provider: &str);

    fn stream_stopped(&self, provider: &str);
}
