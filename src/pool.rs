//! Reusable scratch buffers for the frame read and write paths.
//!
//! A [`PooledBuffer`] is a lease: it derefs to a `Vec<u8>` and goes back to its pool when dropped.
//! Leases never outlive the call that took them, so bytes handed out to callers are never pooled.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::common::MAX_SNAP_LENGTH;

/// Number of idle buffers kept by [`BufferPool::default`].
pub const DEFAULT_MAX_IDLE: usize = 8;


/// Concurrency-safe free list of byte buffers sized for a full frame.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
}

impl BufferPool {
    /// Creates an empty pool retaining at most `max_idle` buffers.
    pub fn new(max_idle: usize) -> Self {
        BufferPool {
            free: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Leases an empty buffer, allocating one if the free list is empty.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(MAX_SNAP_LENGTH as usize));

        PooledBuffer { buf, pool: self }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        buf.clear();

        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}


/// A buffer leased from a [`BufferPool`].
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
