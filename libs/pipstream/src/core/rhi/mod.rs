// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod format_description;
mod hardware_buffer;
mod pixel_buffer;
mod pixel_buffer_pool;
mod pixel_format;
mod pool_manager;

pub use format_description::FormatDescription;
pub use hardware_buffer::{HardwareBuffer, HostPixelBuffer};
pub use pixel_buffer::RhiPixelBuffer;
pub use pixel_buffer_pool::{
    BufferAllocator, HostBufferAllocator, PixelBufferDescriptor, PixelBufferPool,
    PixelBufferPoolId, PixelBufferPoolStats, PoolHandle, PooledPixelBuffer,
};
pub use pixel_format::PixelFormat;
pub use pool_manager::BufferPoolManager;
