// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod timed_frame;

pub use timed_frame::{RenderedFrame, TimedFrame};
