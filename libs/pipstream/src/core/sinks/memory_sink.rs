// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{SinkSignals, SurfaceStatus, TimedDisplaySink};
use crate::core::clocks::Timebase;
use crate::core::frames::TimedFrame;
use crate::core::rhi::RhiPixelBuffer;
use crate::core::{Result, StreamError};

/// What the surface saw for one enqueued frame.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub frame_number: u64,
    pub presentation_ns: i64,
    pub duration_ns: i64,
    pub buffer: RhiPixelBuffer,
}

/// Records kept by default.
const DEFAULT_HISTORY: usize = 4096;

#[derive(Default)]
struct SurfaceState {
    status: SurfaceStatus,
    ready: bool,
    displayed: Option<TimedFrame>,
    enqueued: usize,
    records: VecDeque<FrameRecord>,
    history_limit: usize,
    signals: Option<SinkSignals>,
    timebase: Option<Arc<Timebase>>,
    frame_rate: u32,
    flushes: u64,
}

/// In-process display surface.
///
/// Holds only the most recently enqueued frame (the one "on screen") and keeps
/// a bounded record of what it was given, oldest first. Status and readiness
/// can be driven by the host to exercise failure handling.
pub struct MemoryDisplaySink {
    name: String,
    state: Mutex<SurfaceState>,
}

impl Default for MemoryDisplaySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDisplaySink {
    pub fn new() -> Self {
        Self::with_name("memory surface")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(SurfaceState {
                ready: true,
                history_limit: DEFAULT_HISTORY,
                ..Default::default()
            }),
        }
    }

    /// Keep at most `limit` records. Older records are discarded first.
    pub fn with_history_limit(self, limit: usize) -> Self {
        {
            let mut state = self.state.lock();
            state.history_limit = limit.max(1);
            while state.records.len() > state.history_limit {
                state.records.pop_front();
            }
        }
        self
    }

    /// Change status and signal it, as a platform surface would.
    pub fn set_status(&self, status: SurfaceStatus) {
        let signals = {
            let mut state = self.state.lock();
            state.status = status;
            state.signals.clone()
        };
        if let Some(signals) = signals {
            signals.status_changed(status);
        }
    }

    /// Change readiness. Becoming ready fires the ready-for-more-data signal.
    pub fn set_ready(&self, ready: bool) {
        let signals = {
            let mut state = self.state.lock();
            state.ready = ready;
            state.signals.clone()
        };
        if ready {
            if let Some(signals) = signals {
                signals.ready_for_more_data();
            }
        }
    }

    /// Frames accepted over the surface's lifetime, including those no
    /// longer in the history.
    pub fn enqueued_count(&self) -> usize {
        self.state.lock().enqueued
    }

    pub fn records(&self) -> Vec<FrameRecord> {
        self.state.lock().records.iter().cloned().collect()
    }

    pub fn presentation_times(&self) -> Vec<i64> {
        self.state
            .lock()
            .records
            .iter()
            .map(|record| record.presentation_ns)
            .collect()
    }

    pub fn last_record(&self) -> Option<FrameRecord> {
        self.state.lock().records.back().cloned()
    }

    /// Whether a frame is currently on screen.
    pub fn is_displaying(&self) -> bool {
        self.state.lock().displayed.is_some()
    }

    pub fn flush_count(&self) -> u64 {
        self.state.lock().flushes
    }

    pub fn control_timebase(&self) -> Option<Arc<Timebase>> {
        self.state.lock().timebase.clone()
    }

    pub fn preferred_frame_rate(&self) -> u32 {
        self.state.lock().frame_rate
    }

    /// Drop the on-screen frame, releasing its buffer.
    pub fn clear_display(&self) {
        self.state.lock().displayed = None;
    }
}

impl TimedDisplaySink for MemoryDisplaySink {
    fn enqueue(&self, frame: TimedFrame) -> Result<()> {
        let mut state = self.state.lock();
        if state.status == SurfaceStatus::Failed {
            return Err(StreamError::SinkFailed(format!("{} is in failed state", self.name)));
        }
        if state.records.len() >= state.history_limit {
            state.records.pop_front();
        }
        state.records.push_back(FrameRecord {
            frame_number: frame.frame_number,
            presentation_ns: frame.presentation_ns,
            duration_ns: frame.duration_ns,
            buffer: frame.buffer.clone(),
        });
        state.enqueued += 1;
        state.status = SurfaceStatus::Rendering;
        state.displayed = Some(frame);
        Ok(())
    }

    fn status(&self) -> SurfaceStatus {
        self.state.lock().status
    }

    fn is_ready_for_more_data(&self) -> bool {
        self.state.lock().ready
    }

    fn flush(&self) {
        let mut state = self.state.lock();
        state.displayed = None;
        state.flushes += 1;
        if state.status == SurfaceStatus::Failed {
            state.status = SurfaceStatus::Unknown;
        }
    }

    fn set_control_timebase(&self, timebase: Option<Arc<Timebase>>) {
        self.state.lock().timebase = timebase;
    }

    fn register_signals(&self, signals: SinkSignals) {
        self.state.lock().signals = Some(signals);
    }

    fn set_preferred_frame_rate(&self, frame_rate: u32) {
        self.state.lock().frame_rate = frame_rate;
    }

    fn description(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::frame_at;

    #[test]
    fn test_enqueue_records_and_displays() {
        let sink = MemoryDisplaySink::new();
        sink.enqueue(frame_at(5)).unwrap();
        sink.enqueue(frame_at(9)).unwrap();

        assert_eq!(sink.presentation_times(), vec![5, 9]);
        assert!(sink.is_displaying());
        assert_eq!(sink.status(), SurfaceStatus::Rendering);
    }

    #[test]
    fn test_failed_surface_rejects_until_flushed() {
        let sink = MemoryDisplaySink::new();
        sink.set_status(SurfaceStatus::Failed);
        assert!(sink.enqueue(frame_at(1)).is_err());

        sink.flush();
        assert_eq!(sink.flush_count(), 1);
        assert!(sink.enqueue(frame_at(2)).is_ok());
    }

    #[test]
    fn test_history_is_bounded() {
        let sink = MemoryDisplaySink::new().with_history_limit(2);
        for pts in [1, 2, 3] {
            sink.enqueue(frame_at(pts)).unwrap();
        }
        assert_eq!(sink.enqueued_count(), 3);
        assert_eq!(sink.presentation_times(), vec![2, 3]);
        assert_eq!(sink.last_record().unwrap().presentation_ns, 3);
    }
}
