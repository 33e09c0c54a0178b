// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod clocks;
pub mod config;
pub mod error;
pub mod frames;
pub mod media_clock;
pub mod pipeline;
pub mod render;
pub mod rhi;
pub mod scheduling;
pub mod session;
pub mod sinks;
pub mod sources;

#[cfg(test)]
pub(crate) mod test_support;

pub use clocks::*;
pub use config::PipelineConfig;
pub use error::*;
pub use frames::*;
pub use pipeline::*;
pub use render::*;
pub use rhi::*;
pub use scheduling::*;
pub use session::*;
pub use sinks::*;
pub use sources::*;
