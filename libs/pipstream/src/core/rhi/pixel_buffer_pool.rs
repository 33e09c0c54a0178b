// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Fixed-capacity pool of reusable pixel buffers.
//!
//! Every buffer is allocated when the pool is created. Acquisition afterwards
//! is a lock-free scan over the slots: it never allocates and never blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use super::{FormatDescription, HostPixelBuffer, PixelFormat, RhiPixelBuffer};
use crate::core::{Result, StreamError};

/// Descriptor for creating pixel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBufferDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
}

impl PixelBufferDescriptor {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// BGRA descriptor, the only format the pipeline produces.
    pub fn bgra(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelFormat::Bgra32)
    }
}

/// Platform allocator for hardware-backed buffers.
///
/// Called only from [`PixelBufferPool::new`]; that is the single allocation
/// hotspot of the pipeline.
pub trait BufferAllocator: Send + Sync {
    fn allocate(&self, desc: &PixelBufferDescriptor) -> Result<RhiPixelBuffer>;

    fn description(&self) -> &str {
        "buffer allocator"
    }
}

/// Allocates [`HostPixelBuffer`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostBufferAllocator;

impl BufferAllocator for HostBufferAllocator {
    fn allocate(&self, desc: &PixelBufferDescriptor) -> Result<RhiPixelBuffer> {
        let buffer = HostPixelBuffer::new(desc.width, desc.height, desc.format)?;
        Ok(RhiPixelBuffer::from_buffer(buffer))
    }

    fn description(&self) -> &str {
        "host memory"
    }
}

/// Unique identifier for a pool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBufferPoolId(Uuid);

impl std::fmt::Display for PixelBufferPoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Statistics about pool usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelBufferPoolStats {
    pub capacity: usize,
    pub in_use: usize,
    pub available: usize,
}

struct PoolSlot {
    buffer: RhiPixelBuffer,
    /// Live lease handles for this slot. Zero means free.
    leases: AtomicUsize,
}

impl PoolSlot {
    fn try_acquire(&self) -> bool {
        self.leases
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn retain(&self) {
        self.leases.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop one handle. Returns true when that freed the slot.
    fn release(&self) -> bool {
        self.leases.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

struct PoolInner {
    id: PixelBufferPoolId,
    descriptor: PixelBufferDescriptor,
    slots: Box<[PoolSlot]>,
    outstanding: AtomicUsize,
}

impl PoolInner {
    fn retain(&self, slot_index: usize) {
        if let Some(slot) = self.slots.get(slot_index) {
            slot.retain();
        }
    }

    fn release(&self, slot_index: usize) {
        if let Some(slot) = self.slots.get(slot_index) {
            if slot.release() {
                self.outstanding.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }
}

/// Pool for reusable pixel buffers of one size and format.
///
/// Cloning yields another handle to the same pool. Buffers stay valid for as
/// long as any lease is alive, even after every pool handle is dropped.
#[derive(Clone)]
pub struct PixelBufferPool {
    inner: Arc<PoolInner>,
}

/// Handle returned by [`BufferPoolManager::ensure_pool`](super::BufferPoolManager::ensure_pool).
pub type PoolHandle = PixelBufferPool;

impl PixelBufferPool {
    /// Create a pool and allocate all `capacity` buffers up front.
    pub fn new(
        desc: &PixelBufferDescriptor,
        capacity: usize,
        allocator: &dyn BufferAllocator,
    ) -> Result<Self> {
        if desc.format != PixelFormat::Bgra32 {
            return Err(StreamError::BufferError(format!(
                "Pixel buffer pools are BGRA only, got {}",
                desc.format.fourcc_string()
            )));
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(StreamError::BufferError(format!(
                "Cannot create a {}x{} pixel buffer pool",
                desc.width, desc.height
            )));
        }
        if capacity == 0 {
            return Err(StreamError::Configuration(
                "Pixel buffer pool capacity must be at least 1".into(),
            ));
        }

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let buffer = allocator.allocate(desc)?;
            if buffer.width != desc.width || buffer.height != desc.height {
                return Err(StreamError::BufferError(format!(
                    "Allocator '{}' returned {}x{} for a {}x{} request",
                    allocator.description(),
                    buffer.width,
                    buffer.height,
                    desc.width,
                    desc.height
                )));
            }
            slots.push(PoolSlot {
                buffer,
                leases: AtomicUsize::new(0),
            });
        }

        let id = PixelBufferPoolId(Uuid::new_v4());
        tracing::debug!(
            pool = %id,
            "PixelBufferPool: created {}x{} {} x{} ({})",
            desc.width,
            desc.height,
            desc.format.fourcc_string(),
            capacity,
            allocator.description()
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                id,
                descriptor: *desc,
                slots: slots.into_boxed_slice(),
                outstanding: AtomicUsize::new(0),
            }),
        })
    }

    /// Lease a free buffer.
    ///
    /// Returns [`StreamError::PoolExhausted`] immediately when every buffer is
    /// leased; the caller skips the frame.
    pub fn acquire(&self) -> Result<PooledPixelBuffer> {
        for (slot_index, slot) in self.inner.slots.iter().enumerate() {
            if slot.try_acquire() {
                self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
                return Ok(PooledPixelBuffer {
                    buffer: slot.buffer.clone(),
                    pool: Arc::clone(&self.inner),
                    slot_index,
                });
            }
        }
        Err(StreamError::PoolExhausted)
    }

    pub fn id(&self) -> PixelBufferPoolId {
        self.inner.id
    }

    pub fn descriptor(&self) -> PixelBufferDescriptor {
        self.inner.descriptor
    }

    pub fn width(&self) -> u32 {
        self.inner.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.inner.descriptor.height
    }

    pub fn capacity(&self) -> usize {
        self.inner.slots.len()
    }

    /// Number of buffers currently leased.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PixelBufferPoolStats {
        let in_use = self.outstanding();
        PixelBufferPoolStats {
            capacity: self.capacity(),
            in_use,
            available: self.capacity().saturating_sub(in_use),
        }
    }

    /// Describe the buffers this pool hands out. Does not lease anything.
    pub fn describe(&self) -> FormatDescription {
        // Pools are never empty, see `new`.
        let buffer = &self.inner.slots[0].buffer;
        FormatDescription::for_buffer(buffer)
    }

    /// Whether both handles refer to the same pool instance.
    pub fn ptr_eq(&self, other: &PixelBufferPool) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for PixelBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("PixelBufferPool")
            .field("id", &self.inner.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("capacity", &stats.capacity)
            .field("in_use", &stats.in_use)
            .finish()
    }
}

/// A leased pool buffer. Returns the buffer to its pool when the last clone
/// of the lease drops.
///
/// Cloning only bumps counters, so frames carrying a lease can be copied on
/// the hot path without allocating.
pub struct PooledPixelBuffer {
    buffer: RhiPixelBuffer,
    pool: Arc<PoolInner>,
    slot_index: usize,
}

impl PooledPixelBuffer {
    pub fn buffer(&self) -> &RhiPixelBuffer {
        &self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Id of the pool this lease came from.
    pub fn pool_id(&self) -> PixelBufferPoolId {
        self.pool.id
    }
}

impl Clone for PooledPixelBuffer {
    fn clone(&self) -> Self {
        self.pool.retain(self.slot_index);
        Self {
            buffer: self.buffer.clone(),
            pool: Arc::clone(&self.pool),
            slot_index: self.slot_index,
        }
    }
}

impl Drop for PooledPixelBuffer {
    fn drop(&mut self) {
        self.pool.release(self.slot_index);
    }
}

impl std::fmt::Debug for PooledPixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledPixelBuffer")
            .field("pool", &self.pool.id)
            .field("slot", &self.slot_index)
            .field("width", &self.buffer.width)
            .field("height", &self.buffer.height)
            .finish()
    }
}
