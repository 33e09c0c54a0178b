// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pixel buffer with cached dimensions.

use std::sync::Arc;

use super::{HardwareBuffer, PixelFormat};

/// Pixel buffer with cached dimensions.
///
/// Wraps a [`HardwareBuffer`] in an Arc for cheap cloning. Clone only
/// increments the Arc refcount, never the platform buffer's own refcount: the
/// platform buffer is retained once when wrapped and released once when the
/// last handle drops.
#[derive(Clone)]
pub struct RhiPixelBuffer {
    buffer: Arc<dyn HardwareBuffer>,
    /// Cached width (queried once at construction).
    pub width: u32,
    /// Cached height (queried once at construction).
    pub height: u32,
}

impl RhiPixelBuffer {
    /// Wrap a platform buffer.
    pub fn new(buffer: Arc<dyn HardwareBuffer>) -> Self {
        let width = buffer.width();
        let height = buffer.height();
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn from_buffer<B: HardwareBuffer + 'static>(buffer: B) -> Self {
        Self::new(Arc::new(buffer))
    }

    pub fn format(&self) -> PixelFormat {
        self.buffer.format()
    }

    pub fn bytes_per_row(&self) -> usize {
        self.buffer.bytes_per_row()
    }

    /// The underlying platform buffer.
    pub fn buffer(&self) -> &dyn HardwareBuffer {
        self.buffer.as_ref()
    }

    /// Whether both handles refer to the same platform buffer.
    pub fn ptr_eq(&self, other: &RhiPixelBuffer) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl std::fmt::Debug for RhiPixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhiPixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format())
            .finish()
    }
}
