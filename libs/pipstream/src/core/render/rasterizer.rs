// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Canvas;
use crate::core::frames::RenderedFrame;
use crate::core::rhi::BufferPoolManager;
use crate::core::sources::{ContentSize, RasterContent};
use crate::core::{Result, StreamError};

/// Largest buffer edge the renderer will size a pool for.
pub const MAX_PIXEL_DIMENSION: u32 = 16_384;

/// Draws [`RasterContent`] into buffers leased from a [`BufferPoolManager`].
#[derive(Debug, Clone, Copy)]
pub struct RasterizingRenderer {
    scale_factor: f64,
}

impl RasterizingRenderer {
    pub fn new(scale_factor: f64) -> Self {
        Self { scale_factor }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Pixel dimensions for content of `bounds` points at this renderer's scale.
    pub fn pixel_size(&self, bounds: ContentSize) -> Result<(u32, u32)> {
        if bounds.is_empty() {
            return Err(StreamError::RenderFailed(format!(
                "content has zero-area bounds {}x{}",
                bounds.width, bounds.height
            )));
        }
        let width = (bounds.width * self.scale_factor).round();
        let height = (bounds.height * self.scale_factor).round();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(StreamError::RenderFailed(format!(
                "content {}x{} at scale {} has no drawable pixels",
                bounds.width, bounds.height, self.scale_factor
            )));
        }
        let max = MAX_PIXEL_DIMENSION as f64;
        if !(width <= max && height <= max) {
            return Err(StreamError::RenderFailed(format!(
                "content {}x{} at scale {} exceeds {} pixels per edge",
                bounds.width, bounds.height, self.scale_factor, MAX_PIXEL_DIMENSION
            )));
        }
        Ok((width as u32, height as u32))
    }

    /// Render one frame of `content`.
    ///
    /// Forces a layout pass, sizes the pool to the content, leases a buffer and
    /// draws into it. Fails with [`StreamError::PoolExhausted`] when no buffer
    /// is free and with [`StreamError::RenderFailed`] when the content has no
    /// area or the buffer cannot be mapped for drawing.
    pub fn render(
        &self,
        content: &mut dyn RasterContent,
        pools: &mut BufferPoolManager,
    ) -> Result<RenderedFrame> {
        content.layout();
        let (width, height) = self.pixel_size(content.bounds())?;

        pools.ensure_pool(width, height).map_err(|e| match e {
            StreamError::BufferError(msg) => StreamError::RenderFailed(msg),
            other => other,
        })?;
        let lease = pools.acquire()?;
        let format = pools.format_description()?;
        let buffer = lease.buffer().clone();

        let scale = self.scale_factor;
        let mut drawn: Result<()> = Ok(());
        buffer
            .buffer()
            .lock_base_address_mut(&mut |bytes| {
                drawn = Canvas::new(bytes, width, height, format.bytes_per_row, scale)
                    .map(|mut canvas| content.draw(&mut canvas));
            })
            .map_err(|e| StreamError::RenderFailed(format!("cannot map buffer: {}", e)))?;
        drawn?;

        tracing::trace!("RasterizingRenderer: drew '{}' into {}x{}", content.kind(), width, height);

        Ok(RenderedFrame {
            buffer,
            lease: Some(lease),
            format,
        })
    }
}
