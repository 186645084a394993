use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use std::thread;
use tracing::{debug, trace};

use crate::counter::count_chunk;
use crate::frequency::FrequencyMap;
use crate::metrics::AnalysisMetrics;
use crate::pipeline::TextPipeline;

/// Texts shorter than this are counted as a single chunk
pub const MIN_FANOUT_LEN: usize = 100;

/// A group of lines waiting for a counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkJob {
    pub text: String,
    pub index: usize,
}

/// Partial frequencies for one chunk.
///
/// `index` identifies the chunk in logs; merging ignores it.
#[derive(Debug)]
pub struct ChunkResult {
    pub frequencies: FrequencyMap,
    pub index: usize,
}

/// Splits `text` into at most `counters` line-aligned chunks.
///
/// Each group holds `max(1, lines / counters)` lines and the last group takes
/// whatever remains. Groups that start past the end, or are empty, are dropped.
pub fn split_into_chunks(text: &str, counters: usize) -> Vec<ChunkJob> {
    let counters = counters.max(1);
    let lines: Vec<&str> = text.split('\n').collect();
    let size = (lines.len() / counters).max(1);

    (0..counters)
        .filter_map(|index| {
            let start = index * size;
            if start >= lines.len() {
                return None;
            }
            let end = if index == counters - 1 {
                lines.len()
            } else {
                (start + size).min(lines.len())
            };
            let text = lines[start..end].join("\n");
            (!text.is_empty()).then_some(ChunkJob { text, index })
        })
        .collect()
}

/// Fans one file's text out to a fixed set of counters and merges what comes back
#[derive(Debug, Clone)]
pub struct ChunkEngine {
    pipeline: TextPipeline,
    counters: usize,
    metrics: AnalysisMetrics,
}

impl ChunkEngine {
    pub fn new(pipeline: TextPipeline, counters: usize, metrics: AnalysisMetrics) -> Self {
        Self {
            pipeline,
            counters,
            metrics,
        }
    }

    /// Word frequencies for the whole text
    pub fn count(&self, text: &str) -> FrequencyMap {
        if text.len() < MIN_FANOUT_LEN || self.counters <= 1 {
            debug!(
                "Counting {} bytes as a single chunk (counters: {})",
                text.len(),
                self.counters
            );
            let frequencies = count_chunk(&self.pipeline, text);
            self.metrics.record_chunk(frequencies.total() as u64);
            return frequencies;
        }

        self.fan_out(text)
    }

    fn fan_out(&self, text: &str) -> FrequencyMap {
        let (job_tx, job_rx) = unbounded::<ChunkJob>();
        let (result_tx, result_rx) = unbounded::<ChunkResult>();

        thread::scope(|s| {
            for counter_id in 0..self.counters {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    for job in job_rx.iter() {
                        trace!("Counter {} took chunk {}", counter_id, job.index);
                        let frequencies = count_chunk(&self.pipeline, &job.text);
                        self.metrics.record_chunk(frequencies.total() as u64);
                        let _ = result_tx.send(ChunkResult {
                            frequencies,
                            index: job.index,
                        });
                    }
                });
            }

            // Dispatcher; dropping job_tx closes the queue
            s.spawn(move || {
                let chunks = split_into_chunks(text, self.counters);
                debug!(
                    "Dispatching {} chunks to {} counters",
                    chunks.len(),
                    self.counters
                );
                for job in chunks {
                    if job_tx.send(job).is_err() {
                        break;
                    }
                }
            });
        });

        // Every counter has exited; close the results queue before draining it
        drop(result_tx);

        let merged = Mutex::new(FrequencyMap::new());
        for result in result_rx.iter() {
            trace!(
                "Merging chunk {} ({} distinct words)",
                result.index,
                result.frequencies.len()
            );
            merged.lock().merge(result.frequencies);
        }
        merged.into_inner()
    }
}
