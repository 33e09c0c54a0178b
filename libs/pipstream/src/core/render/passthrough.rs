// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::frames::RenderedFrame;
use crate::core::rhi::{FormatDescription, PixelFormat, RhiPixelBuffer};
use crate::core::{Result, StreamError};

/// Wraps buffers delivered by a decode layer. Never touches pixel data.
#[derive(Debug, Default)]
pub struct PassthroughRenderer {
    cached: Option<FormatDescription>,
}

impl PassthroughRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `buffer` with its format description.
    ///
    /// The description is reused while buffer geometry stays the same.
    pub fn wrap(&mut self, buffer: RhiPixelBuffer) -> Result<RenderedFrame> {
        if buffer.format() != PixelFormat::Bgra32 {
            return Err(StreamError::RenderFailed(format!(
                "passthrough expects BGRA buffers, got {}",
                buffer.format().fourcc_string()
            )));
        }

        let format = match self.cached {
            Some(desc) if desc.matches(&buffer) => desc,
            _ => {
                let desc = FormatDescription::for_buffer(&buffer);
                tracing::debug!(
                    "PassthroughRenderer: new format description {}x{} stride {}",
                    desc.width,
                    desc.height,
                    desc.bytes_per_row
                );
                self.cached = Some(desc);
                desc
            }
        };

        Ok(RenderedFrame {
            buffer,
            lease: None,
            format,
        })
    }

    /// Forget the cached description.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn cached_format(&self) -> Option<FormatDescription> {
        self.cached
    }
}
