// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame pacing and the periodic triggers that drive it.

mod pacing;
mod trigger;

pub use pacing::{PacingController, PacingState, TickDecision};
pub use trigger::{DisplayLinkDriver, FrameTrigger};
