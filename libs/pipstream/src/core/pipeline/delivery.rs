// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! State shared between the producer, decode threads and stop handles.
//!
//! Everything that reaches the display surface goes through [`Output`] under
//! one lock. Clearing `running` under that same lock is what makes `stop`
//! final: no enqueue can start after it returns.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::clocks::Timebase;
use crate::core::frames::RenderedFrame;
use crate::core::render::PassthroughRenderer;
use crate::core::rhi::RhiPixelBuffer;
use crate::core::scheduling::FrameTrigger;
use crate::core::sinks::{EnqueueOutcome, SinkAdapter};
use crate::core::{Result, StreamError};

#[derive(Default)]
pub(crate) struct Output {
    pub(crate) running: bool,
    pub(crate) adapter: SinkAdapter,
    pub(crate) timebase: Option<Arc<Timebase>>,
    pub(crate) passthrough: PassthroughRenderer,
    pub(crate) frame_duration_ns: i64,
    pub(crate) next_frame_number: u64,
    pub(crate) frames_rendered: u64,
    pub(crate) frames_passed_through: u64,
    pub(crate) passthrough_failed: u64,
    pub(crate) dropped_after_stop: u64,
}

impl Output {
    /// Stamp `rendered` with the current timebase time and enqueue it.
    pub(crate) fn submit(&mut self, rendered: RenderedFrame) -> Result<EnqueueOutcome> {
        let presentation_ns = self
            .timebase
            .as_ref()
            .map(|timebase| timebase.time_ns())
            .ok_or_else(|| StreamError::ClockError("stream has no timebase".into()))?;

        let frame = rendered.stamp(presentation_ns, self.frame_duration_ns, self.next_frame_number);
        self.next_frame_number += 1;
        self.adapter.enqueue(frame)
    }
}

#[derive(Default)]
pub(crate) struct PipelineShared {
    pub(crate) output: Mutex<Output>,
    pub(crate) trigger: Mutex<Option<Arc<dyn FrameTrigger>>>,
}

impl PipelineShared {
    /// Invalidate the trigger, then clear the running flag and detach the
    /// timebase. Returns whether the stream was running.
    pub(crate) fn halt(&self) -> bool {
        let trigger = self.trigger.lock().take();
        if let Some(trigger) = trigger {
            trigger.stop();
        }

        let mut output = self.output.lock();
        let was_running = output.running;
        output.running = false;
        output.timebase = None;
        output.adapter.set_timebase(None);
        was_running
    }

    pub(crate) fn is_running(&self) -> bool {
        self.output.lock().running
    }
}

/// Handle through which hardware-decoded sources push buffers.
///
/// Callable from any thread. Buffers are wrapped without copying, stamped and
/// enqueued directly; the sink lock serializes them with the producer.
#[derive(Clone)]
pub struct FrameDelivery {
    shared: Arc<PipelineShared>,
}

impl FrameDelivery {
    pub(crate) fn new(shared: Arc<PipelineShared>) -> Self {
        Self { shared }
    }

    /// Push a decoded buffer. Returns whether the surface accepted it.
    ///
    /// Buffers arriving after the pipeline stopped are dropped.
    pub fn deliver(&self, buffer: RhiPixelBuffer) -> bool {
        let mut output = self.shared.output.lock();
        if !output.running {
            output.dropped_after_stop += 1;
            tracing::trace!("FrameDelivery: pipeline stopped, dropping buffer");
            return false;
        }

        let rendered = match output.passthrough.wrap(buffer) {
            Ok(rendered) => rendered,
            Err(e) => {
                output.passthrough_failed += 1;
                tracing::debug!("FrameDelivery: {}", e);
                return false;
            }
        };

        match output.submit(rendered) {
            Ok(EnqueueOutcome::Enqueued) => {
                output.frames_passed_through += 1;
                true
            }
            Ok(outcome) => {
                tracing::trace!("FrameDelivery: frame not enqueued ({:?})", outcome);
                false
            }
            Err(e) => {
                tracing::debug!("FrameDelivery: {}", e);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }
}

impl std::fmt::Debug for FrameDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDelivery")
            .field("running", &self.is_running())
            .finish()
    }
}

/// Stops a pipeline from any thread.
///
/// After [`stop`](Self::stop) returns the trigger is invalidated and nothing
/// more reaches the surface. The owning [`StreamPipeline`](super::StreamPipeline)
/// releases the source, pools and session on its next `tick` or when its
/// `run` loop returns.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<PipelineShared>,
}

impl StopHandle {
    pub(crate) fn new(shared: Arc<PipelineShared>) -> Self {
        Self { shared }
    }

    /// Idempotent. Returns whether this call stopped a running stream.
    pub fn stop(&self) -> bool {
        let was_running = self.shared.halt();
        if was_running {
            tracing::debug!("StopHandle: stream halted");
        }
        was_running
    }
}
