// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crossbeam_channel::Sender;

use super::SurfaceStatus;

/// Notification from a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    ReadyForMoreData,
    StatusChanged(SurfaceStatus),
}

/// Handle a display surface uses to notify the pipeline.
///
/// Signals only queue an event; the adapter applies them on the producer
/// context at the start of the next tick. Events carry the binding generation
/// so that a surface replaced by `bind` cannot affect its successor.
#[derive(Clone, Debug)]
pub struct SinkSignals {
    generation: u64,
    tx: Sender<(u64, SinkEvent)>,
}

impl SinkSignals {
    pub(crate) fn new(generation: u64, tx: Sender<(u64, SinkEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn ready_for_more_data(&self) {
        self.send(SinkEvent::ReadyForMoreData);
    }

    pub fn status_changed(&self, status: SurfaceStatus) {
        self.send(SinkEvent::StatusChanged(status));
    }

    fn send(&self, event: SinkEvent) {
        if self.tx.send((self.generation, event)).is_err() {
            tracing::trace!("SinkSignals: adapter gone, dropping {:?}", event);
        }
    }
}
