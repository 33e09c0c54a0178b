// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::{PixelFormat, RhiPixelBuffer};

/// Format metadata that travels with every frame handed to the display sink.
///
/// Created lazily and cached: per pool for rasterized frames, per buffer
/// geometry for passthrough frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescription {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub bytes_per_row: usize,
}

impl FormatDescription {
    pub fn for_buffer(buffer: &RhiPixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            format: buffer.format(),
            bytes_per_row: buffer.bytes_per_row(),
        }
    }

    /// Whether `buffer` can be described by this description without
    /// recreating it.
    pub fn matches(&self, buffer: &RhiPixelBuffer) -> bool {
        self.width == buffer.width
            && self.height == buffer.height
            && self.format == buffer.format()
            && self.bytes_per_row == buffer.bytes_per_row()
    }
}
