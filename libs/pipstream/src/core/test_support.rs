// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for unit tests.

use crate::core::frames::{RenderedFrame, TimedFrame};
use crate::core::rhi::{FormatDescription, HostPixelBuffer, PixelFormat, RhiPixelBuffer};

pub(crate) fn small_buffer() -> RhiPixelBuffer {
    RhiPixelBuffer::from_buffer(HostPixelBuffer::new(4, 4, PixelFormat::Bgra32).unwrap())
}

/// Unpooled 4x4 frame presented at `presentation_ns`.
pub(crate) fn frame_at(presentation_ns: i64) -> TimedFrame {
    let buffer = small_buffer();
    let format = FormatDescription::for_buffer(&buffer);
    RenderedFrame {
        buffer,
        lease: None,
        format,
    }
    .stamp(presentation_ns, 33_333_333, 0)
}
