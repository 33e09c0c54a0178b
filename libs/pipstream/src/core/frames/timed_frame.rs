// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::rhi::{FormatDescription, PooledPixelBuffer, RhiPixelBuffer};

/// Output of a renderer: a populated buffer plus its format description, not
/// yet placed on the stream timeline.
#[derive(Debug)]
pub struct RenderedFrame {
    pub buffer: RhiPixelBuffer,
    /// Pool lease for rasterized frames. `None` for passthrough buffers, which
    /// are owned by the decode layer.
    pub lease: Option<PooledPixelBuffer>,
    pub format: FormatDescription,
}

impl RenderedFrame {
    /// Place the frame on the stream timeline.
    pub fn stamp(self, presentation_ns: i64, duration_ns: i64, frame_number: u64) -> TimedFrame {
        TimedFrame {
            buffer: self.buffer,
            pooled_handle: self.lease,
            format: self.format,
            presentation_ns,
            duration_ns,
            frame_number,
        }
    }
}

/// A buffer stamped with a presentation time and duration on the stream's
/// shared [`Timebase`](crate::core::clocks::Timebase).
///
/// Presentation timestamps within one stream never decrease.
#[derive(Clone)]
pub struct TimedFrame {
    pub buffer: RhiPixelBuffer,

    /// Pooled buffer lease (keeps the buffer out of the pool until every clone
    /// of this frame is dropped).
    pooled_handle: Option<PooledPixelBuffer>,

    pub format: FormatDescription,

    /// Presentation time in timebase nanoseconds.
    pub presentation_ns: i64,

    /// Nominal display duration in nanoseconds.
    pub duration_ns: i64,

    /// Sequential frame number within the stream.
    pub frame_number: u64,
}

impl TimedFrame {
    /// Check if this frame holds a pool lease.
    pub fn is_pooled(&self) -> bool {
        self.pooled_handle.is_some()
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }
}

impl std::fmt::Debug for TimedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedFrame")
            .field("frame_number", &self.frame_number)
            .field("presentation_ns", &self.presentation_ns)
            .field("duration_ns", &self.duration_ns)
            .field("width", &self.buffer.width)
            .field("height", &self.buffer.height)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}
