use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks throughput and buffer reuse across a run.
///
/// Clones share the same counters, so the pool, the chunk engine and the
/// buffer pool can each hold one and record from any thread.
#[derive(Debug, Clone)]
pub struct AnalysisMetrics {
    // File metrics
    files_processed: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,

    // Chunk metrics
    chunks_processed: Arc<AtomicU64>,
    tokens_counted: Arc<AtomicU64>,

    // Buffer pool metrics
    buffer_hits: Arc<AtomicU64>,
    buffer_misses: Arc<AtomicU64>,
}

impl AnalysisMetrics {
    /// Creates a new AnalysisMetrics instance
    pub fn new() -> Self {
        Self {
            files_processed: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            chunks_processed: Arc::new(AtomicU64::new(0)),
            tokens_counted: Arc::new(AtomicU64::new(0)),
            buffer_hits: Arc::new(AtomicU64::new(0)),
            buffer_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a file that produced a result
    pub fn record_file_processed(&self, bytes: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a file that produced an error
    pub fn record_file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one counted chunk and the tokens it contributed
    pub fn record_chunk(&self, tokens: u64) {
        self.chunks_processed.fetch_add(1, Ordering::Relaxed);
        self.tokens_counted.fetch_add(tokens, Ordering::Relaxed);
    }

    /// Records a buffer acquisition; `reused` is false when a new buffer was allocated
    pub fn record_buffer_acquire(&self, reused: bool) {
        if reused {
            self.buffer_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.buffer_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> AnalysisStats {
        AnalysisStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            chunks_processed: self.chunks_processed.load(Ordering::Relaxed),
            tokens_counted: self.tokens_counted.load(Ordering::Relaxed),
            buffer_hits: self.buffer_hits.load(Ordering::Relaxed),
            buffer_misses: self.buffer_misses.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Analysis stats:\n\
             Files processed/failed: {}/{}\n\
             Bytes read: {}\n\
             Chunks processed: {}\n\
             Tokens counted: {}\n\
             Buffer hits/misses: {}/{}",
            stats.files_processed,
            stats.files_failed,
            stats.bytes_read,
            stats.chunks_processed,
            stats.tokens_counted,
            stats.buffer_hits,
            stats.buffer_misses
        );
    }
}

impl Default for AnalysisMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of `AnalysisMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub bytes_read: u64,
    pub chunks_processed: u64,
    pub tokens_counted: u64,
    pub buffer_hits: u64,
    pub buffer_misses: u64,
}
