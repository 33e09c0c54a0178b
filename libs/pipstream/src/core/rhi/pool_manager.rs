// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Owns the single live pool for the current content size.

use std::sync::Arc;

use super::{
    BufferAllocator, FormatDescription, PixelBufferDescriptor, PixelBufferPool, PoolHandle,
    PooledPixelBuffer,
};
use crate::core::{Result, StreamError};

/// Keeps exactly one active [`PixelBufferPool`] per content size.
///
/// A size change replaces the pool instead of resizing it. The previous pool
/// is retired: its outstanding leases stay valid and it is dropped once they
/// have all been returned.
pub struct BufferPoolManager {
    allocator: Arc<dyn BufferAllocator>,
    capacity: usize,
    active: Option<PixelBufferPool>,
    format_description: Option<FormatDescription>,
    retired: Vec<PixelBufferPool>,
    pools_created: u64,
}

impl BufferPoolManager {
    pub fn new(allocator: Arc<dyn BufferAllocator>, capacity: usize) -> Self {
        Self {
            allocator,
            capacity,
            active: None,
            format_description: None,
            retired: Vec::new(),
            pools_created: 0,
        }
    }

    /// Return the pool for `width` x `height`, creating it if the dimensions
    /// differ from the active pool's.
    ///
    /// Repeated calls with identical dimensions return the same pool and
    /// allocate nothing.
    pub fn ensure_pool(&mut self, width: u32, height: u32) -> Result<PoolHandle> {
        if let Some(active) = &self.active {
            if active.width() == width && active.height() == height {
                return Ok(active.clone());
            }
        }

        let desc = PixelBufferDescriptor::bgra(width, height);
        let pool = PixelBufferPool::new(&desc, self.capacity, self.allocator.as_ref())?;
        self.pools_created += 1;

        if let Some(previous) = self.active.replace(pool.clone()) {
            tracing::debug!(
                "BufferPoolManager: {}x{} -> {}x{}, retiring pool {} ({} leased)",
                previous.width(),
                previous.height(),
                width,
                height,
                previous.id(),
                previous.outstanding()
            );
            self.retired.push(previous);
        }
        self.format_description = None;
        self.prune_retired();

        Ok(pool)
    }

    /// Lease a buffer from the active pool.
    pub fn acquire(&mut self) -> Result<PooledPixelBuffer> {
        self.prune_retired();
        let pool = self.active.as_ref().ok_or_else(|| {
            StreamError::BufferError("acquire called before ensure_pool".into())
        })?;
        pool.acquire()
    }

    /// Format description for the active pool, created on first use and
    /// invalidated whenever the pool is recreated.
    pub fn format_description(&mut self) -> Result<FormatDescription> {
        if let Some(desc) = self.format_description {
            return Ok(desc);
        }
        let pool = self.active.as_ref().ok_or_else(|| {
            StreamError::BufferError("no active pool to describe".into())
        })?;
        let desc = pool.describe();
        self.format_description = Some(desc);
        Ok(desc)
    }

    /// Drop retired pools whose leases have all been returned.
    pub fn prune_retired(&mut self) {
        self.retired.retain(|pool| {
            let draining = pool.outstanding() > 0;
            if !draining {
                tracing::trace!("BufferPoolManager: discarding drained pool {}", pool.id());
            }
            draining
        });
    }

    /// Release every pool reference held by the manager.
    ///
    /// Outstanding leases keep their buffers alive until they drop.
    pub fn release_all(&mut self) {
        self.active = None;
        self.format_description = None;
        self.retired.clear();
    }

    pub fn active_pool(&self) -> Option<&PixelBufferPool> {
        self.active.as_ref()
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Number of pools allocated over the manager's lifetime.
    pub fn pools_created(&self) -> u64 {
        self.pools_created
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("allocator", &self.allocator.description())
            .field("capacity", &self.capacity)
            .field("active", &self.active)
            .field("retired", &self.retired.len())
            .finish()
    }
}
