// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::SinkSignals;
use crate::core::Result;
use crate::core::clocks::Timebase;
use crate::core::frames::TimedFrame;

/// Rendering status reported by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceStatus {
    #[default]
    Unknown,
    Rendering,
    Failed,
}

/// Platform timed-image display surface (a sample-buffer display layer, a
/// compositor video plane, ...).
///
/// All methods take `&self`; the surface synchronizes internally and may be
/// called from the producer and from decode threads.
pub trait TimedDisplaySink: Send + Sync {
    /// Queue a frame for display at its presentation time.
    fn enqueue(&self, frame: TimedFrame) -> Result<()>;

    fn status(&self) -> SurfaceStatus;

    fn is_ready_for_more_data(&self) -> bool;

    /// Discard queued frames that have not been displayed yet.
    fn flush(&self);

    /// Timebase the surface presents against. `None` detaches it.
    fn set_control_timebase(&self, timebase: Option<Arc<Timebase>>);

    /// Install the signal sink. The surface calls it from any thread when it
    /// becomes ready for more data or its status changes.
    fn register_signals(&self, signals: SinkSignals);

    fn set_preferred_frame_rate(&self, frame_rate: u32);

    fn description(&self) -> &str {
        "display surface"
    }
}
