// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::core::sinks::{SinkState, SinkStats};

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub running: bool,
    pub frame_rate: u32,
    /// Rasterized frames accepted by the surface.
    pub frames_rendered: u64,
    /// Decoded frames accepted by the surface.
    pub frames_passed_through: u64,
    /// Ticks skipped because every pooled buffer was leased.
    pub pool_exhausted: u64,
    /// Frames that failed to render or wrap.
    pub render_failed: u64,
    /// Deliveries that arrived after stop.
    pub dropped_after_stop: u64,
    pub sink_state: SinkState,
    pub sink: SinkStats,
}

impl PipelineStats {
    pub fn frames_enqueued(&self) -> u64 {
        self.sink.enqueued
    }
}
