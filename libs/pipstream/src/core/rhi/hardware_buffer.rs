// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Opaque hardware-addressable image buffers.

use parking_lot::Mutex;

use super::PixelFormat;
use crate::core::{Result, StreamError};

/// Row alignment used for host-allocated buffers, matching what GPU-backed
/// platform pools hand out.
const ROW_ALIGNMENT: usize = 64;

/// Capability interface over a platform image buffer (IOSurface-backed pixel
/// buffer, DMA-BUF, shared D3D texture, or plain host memory).
///
/// Buffers are shared across threads and may be read by the display surface
/// while the producer holds another handle; CPU access is therefore scoped
/// through the lock methods, mirroring base-address locking on the platforms.
pub trait HardwareBuffer: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Byte stride between rows. At least `width * bytes_per_pixel`.
    fn bytes_per_row(&self) -> usize;

    fn format(&self) -> PixelFormat;

    /// Lock the buffer for CPU writes and run `f` over its bytes.
    ///
    /// Fails with [`StreamError::BufferError`] for buffers that are not CPU
    /// mappable (e.g. GPU-private decoder output).
    fn lock_base_address_mut(&self, f: &mut dyn FnMut(&mut [u8])) -> Result<()>;

    /// Lock the buffer for CPU reads and run `f` over its bytes.
    fn lock_base_address(&self, f: &mut dyn FnMut(&[u8])) -> Result<()>;
}

/// Host-memory buffer with row-aligned stride.
pub struct HostPixelBuffer {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: PixelFormat,
    data: Mutex<Vec<u8>>,
}

impl HostPixelBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let bytes_per_pixel = format.bytes_per_pixel();
        if bytes_per_pixel == 0 {
            return Err(StreamError::BufferError(format!(
                "Host buffers only support packed formats, got {}",
                format.fourcc_string()
            )));
        }
        if width == 0 || height == 0 {
            return Err(StreamError::BufferError(format!(
                "Cannot allocate a {}x{} buffer",
                width, height
            )));
        }

        let too_large = || {
            StreamError::BufferError(format!(
                "{}x{} {} buffer exceeds addressable memory",
                width,
                height,
                format.fourcc_string()
            ))
        };
        let bytes_per_row = (width as usize)
            .checked_mul(bytes_per_pixel)
            .and_then(|tight| tight.checked_next_multiple_of(ROW_ALIGNMENT))
            .ok_or_else(too_large)?;
        let len = bytes_per_row
            .checked_mul(height as usize)
            .ok_or_else(too_large)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            StreamError::BufferError(format!(
                "Cannot allocate {} bytes for a {}x{} buffer: {}",
                len, width, height, e
            ))
        })?;
        data.resize(len, 0u8);

        Ok(Self {
            width,
            height,
            bytes_per_row,
            format,
            data: Mutex::new(data),
        })
    }
}

impl HardwareBuffer for HostPixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn lock_base_address_mut(&self, f: &mut dyn FnMut(&mut [u8])) -> Result<()> {
        let mut data = self.data.lock();
        f(data.as_mut_slice());
        Ok(())
    }

    fn lock_base_address(&self, f: &mut dyn FnMut(&[u8])) -> Result<()> {
        let data = self.data.lock();
        f(data.as_slice());
        Ok(())
    }
}

impl std::fmt::Debug for HostPixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostPixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_per_row", &self.bytes_per_row)
            .field("format", &self.format)
            .finish()
    }
}
