// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Timed-image display surfaces and the adapter that feeds them.

mod adapter;
mod display_sink;
mod memory_sink;
mod signals;

pub use adapter::{EnqueueOutcome, SinkAdapter, SinkState, SinkStats};
pub use display_sink::{SurfaceStatus, TimedDisplaySink};
pub use memory_sink::{FrameRecord, MemoryDisplaySink};
pub use signals::{SinkEvent, SinkSignals};
