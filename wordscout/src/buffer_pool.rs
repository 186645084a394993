//! Reusable text buffers for the pipeline stages.
//!
//! Every stage that rebuilds text (lowercasing, punctuation stripping) borrows a
//! pre-allocated `String` from the pool, writes into it, copies the result out
//! and drops the guard. Dropping clears the buffer and hands it back, keeping its
//! capacity, so steady-state processing allocates only the output strings.
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

use crate::metrics::AnalysisMetrics;

/// Capacity each new buffer is allocated with
pub const BUFFER_CAPACITY: usize = 64 * 1024;
/// Upper bound on idle buffers kept around
const MAX_POOLED_BUFFERS: usize = 64;

/// Thread-safe pool of `String` buffers
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<String>>,
    capacity: usize,
    metrics: AnalysisMetrics,
}

impl BufferPool {
    pub fn new(metrics: AnalysisMetrics) -> Self {
        Self::with_capacity(BUFFER_CAPACITY, metrics)
    }

    pub fn with_capacity(capacity: usize, metrics: AnalysisMetrics) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            capacity,
            metrics,
        }
    }

    /// Takes an empty buffer, allocating one if the pool is dry
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let reused = self.buffers.lock().pop();
        self.metrics.record_buffer_acquire(reused.is_some());
        let buffer = reused.unwrap_or_else(|| String::with_capacity(self.capacity));
        PooledBuffer {
            pool: self,
            buffer,
        }
    }

    /// Number of idle buffers currently pooled
    pub fn idle(&self) -> usize {
        self.buffers.lock().len()
    }

    fn release(&self, mut buffer: String) {
        buffer.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < MAX_POOLED_BUFFERS {
            buffers.push(buffer);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(AnalysisMetrics::new())
    }
}

/// A buffer on loan from a `BufferPool`; returned on drop
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: String,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.release(buffer);
    }
}
