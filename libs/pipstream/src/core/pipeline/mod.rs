// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The stream pipeline: source, renderer, pacing and sink wired together.

mod delivery;
mod stats;
mod stream_pipeline;

pub(crate) use delivery::PipelineShared;
pub use delivery::{FrameDelivery, StopHandle};
pub use stats::PipelineStats;
pub use stream_pipeline::{StreamPipeline, TickOutcome};
