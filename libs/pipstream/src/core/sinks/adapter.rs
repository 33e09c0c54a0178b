// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Adapter between the producer and one bound display surface.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use super::{SinkEvent, SinkSignals, SurfaceStatus, TimedDisplaySink};
use crate::core::clocks::Timebase;
use crate::core::frames::TimedFrame;
use crate::core::{Result, StreamError};

/// Sink state as seen by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkState {
    /// Bound (or unbound) with nothing enqueued since.
    #[default]
    Idle,
    /// Accepting frames.
    ReadyForData,
    /// Surface reported back-pressure; frames are skipped until it signals
    /// readiness.
    Stalled,
    /// Surface reported failure; the next enqueue flushes it.
    Failed,
}

impl std::fmt::Display for SinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::ReadyForData => write!(f, "ReadyForData"),
            Self::Stalled => write!(f, "Stalled"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Result of a non-failing [`SinkAdapter::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Enqueued,
    /// Skipped: surface not ready for more data.
    Stalled,
    /// Dropped: presentation time earlier than the last enqueued frame.
    OutOfOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStats {
    pub enqueued: u64,
    pub failed_skips: u64,
    pub stalled_skips: u64,
    pub out_of_order: u64,
    pub flushes: u64,
}

pub struct SinkAdapter {
    surface: Option<Arc<dyn TimedDisplaySink>>,
    state: SinkState,
    generation: u64,
    events_tx: Sender<(u64, SinkEvent)>,
    events_rx: Receiver<(u64, SinkEvent)>,
    timebase: Option<Arc<Timebase>>,
    frame_rate: u32,
    last_presentation_ns: Option<i64>,
    /// Nothing reached the current surface since it was bound or since a
    /// frame was skipped.
    starved: bool,
    stats: SinkStats,
}

impl Default for SinkAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkAdapter {
    pub fn new() -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            surface: None,
            state: SinkState::Idle,
            generation: 0,
            events_tx,
            events_rx,
            timebase: None,
            frame_rate: 0,
            last_presentation_ns: None,
            starved: true,
            stats: SinkStats::default(),
        }
    }

    /// Replace the bound surface. Returns the previous one, already detached
    /// from the timebase and flushed.
    ///
    /// The new surface receives the current timebase and frame rate, so stream
    /// continuity survives the switch.
    pub fn bind(&mut self, surface: Arc<dyn TimedDisplaySink>) -> Option<Arc<dyn TimedDisplaySink>> {
        let previous = self.detach();

        self.generation += 1;
        surface.register_signals(SinkSignals::new(self.generation, self.events_tx.clone()));
        surface.set_control_timebase(self.timebase.clone());
        if self.frame_rate > 0 {
            surface.set_preferred_frame_rate(self.frame_rate);
        }
        surface.flush();
        self.starved = true;
        tracing::info!(
            "SinkAdapter: bound '{}' (generation {})",
            surface.description(),
            self.generation
        );
        self.surface = Some(surface);
        previous
    }

    /// Detach the current surface, if any.
    pub fn unbind(&mut self) -> Option<Arc<dyn TimedDisplaySink>> {
        self.detach()
    }

    fn detach(&mut self) -> Option<Arc<dyn TimedDisplaySink>> {
        // Stale signals from the old surface are ignored from here on.
        self.generation += 1;
        self.state = SinkState::Idle;
        let previous = self.surface.take()?;
        previous.set_control_timebase(None);
        previous.flush();
        tracing::debug!("SinkAdapter: detached '{}'", previous.description());
        Some(previous)
    }

    /// Share `timebase` with the surface. A different timebase starts a new
    /// timeline, so ordering restarts with it.
    pub fn set_timebase(&mut self, timebase: Option<Arc<Timebase>>) {
        let changed = match (&self.timebase, &timebase) {
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return;
        }
        if timebase.is_some() {
            self.last_presentation_ns = None;
        }
        if let Some(surface) = &self.surface {
            surface.set_control_timebase(timebase.clone());
        }
        self.timebase = timebase;
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.frame_rate = frame_rate;
        if let Some(surface) = &self.surface {
            surface.set_preferred_frame_rate(frame_rate);
        }
    }

    /// Push one frame. Never blocks.
    ///
    /// A failed surface is flushed and the frame skipped with
    /// [`StreamError::SinkFailed`]; the following enqueue proceeds normally
    /// once the surface no longer reports failure.
    pub fn enqueue(&mut self, frame: TimedFrame) -> Result<EnqueueOutcome> {
        self.starved = true;
        let Some(surface) = self.surface.clone() else {
            self.stats.failed_skips += 1;
            return Err(StreamError::SinkFailed("no display surface bound".into()));
        };

        if surface.status() == SurfaceStatus::Failed {
            return Err(self.recover_from_failure(surface.as_ref(), "surface reported failure"));
        }
        if self.state == SinkState::Failed {
            tracing::info!("SinkAdapter: '{}' recovered", surface.description());
            self.state = SinkState::Idle;
        }

        if self.state == SinkState::Stalled {
            self.stats.stalled_skips += 1;
            return Ok(EnqueueOutcome::Stalled);
        }
        if !surface.is_ready_for_more_data() {
            tracing::debug!("SinkAdapter: '{}' not ready, stalling", surface.description());
            self.state = SinkState::Stalled;
            self.stats.stalled_skips += 1;
            return Ok(EnqueueOutcome::Stalled);
        }

        let presentation_ns = frame.presentation_ns;
        if let Some(last) = self.last_presentation_ns {
            if presentation_ns < last {
                tracing::debug!(
                    "SinkAdapter: dropping frame {} at {}ns, behind {}ns",
                    frame.frame_number,
                    presentation_ns,
                    last
                );
                self.stats.out_of_order += 1;
                return Ok(EnqueueOutcome::OutOfOrder);
            }
        }

        if let Err(e) = surface.enqueue(frame) {
            let reason = format!("enqueue rejected: {}", e);
            return Err(self.recover_from_failure(surface.as_ref(), &reason));
        }

        self.last_presentation_ns = Some(presentation_ns);
        self.starved = false;
        self.state = SinkState::ReadyForData;
        self.stats.enqueued += 1;
        Ok(EnqueueOutcome::Enqueued)
    }

    fn recover_from_failure(&mut self, surface: &dyn TimedDisplaySink, reason: &str) -> StreamError {
        tracing::warn!("SinkAdapter: '{}' {}, flushing", surface.description(), reason);
        self.state = SinkState::Failed;
        surface.flush();
        self.stats.flushes += 1;
        self.stats.failed_skips += 1;
        StreamError::SinkFailed(reason.to_string())
    }

    /// Discard frames queued on the surface but not yet displayed.
    pub fn flush(&mut self) {
        if let Some(surface) = &self.surface {
            surface.flush();
            self.stats.flushes += 1;
        }
    }

    /// Apply signals queued by the surface since the last call. Returns the
    /// number of events applied.
    pub fn drain_signals(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if generation != self.generation {
                continue;
            }
            applied += 1;
            let next = match (event, self.state) {
                (SinkEvent::StatusChanged(SurfaceStatus::Failed), _) => SinkState::Failed,
                (SinkEvent::StatusChanged(SurfaceStatus::Rendering), SinkState::Failed) => SinkState::Idle,
                (SinkEvent::ReadyForMoreData, SinkState::Stalled | SinkState::Idle) => SinkState::ReadyForData,
                (_, state) => state,
            };
            if next != self.state {
                tracing::debug!("SinkAdapter: {} -> {} on {:?}", self.state, next, event);
                self.state = next;
            }
        }
        applied
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Whether the bound surface is missing a frame and could take one now:
    /// a surface was bound or a frame was skipped since the last successful
    /// enqueue, and the surface is not stalled.
    pub fn wants_frame(&self) -> bool {
        self.starved && self.surface.is_some() && self.state != SinkState::Stalled
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&Arc<dyn TimedDisplaySink>> {
        self.surface.as_ref()
    }

    pub fn timebase(&self) -> Option<&Arc<Timebase>> {
        self.timebase.as_ref()
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn last_presentation_ns(&self) -> Option<i64> {
        self.last_presentation_ns
    }
}

impl std::fmt::Debug for SinkAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkAdapter")
            .field("surface", &self.surface.as_ref().map(|s| s.description().to_string()))
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("frame_rate", &self.frame_rate)
            .field("stats", &self.stats)
            .finish()
    }
}
