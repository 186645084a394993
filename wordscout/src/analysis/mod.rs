//! Concurrent word-frequency analysis.
//!
//! Three levels of parallelism nest here:
//! - `pool`: W file workers share one queue of paths
//! - `chunks`: each file is split into up to K line-aligned chunks, counted by K threads
//! - `crate::pipeline`: each chunk flows through four stage threads
//!
//! `shutdown` provides the barrier the pool uses to know when every worker has exited.
pub mod chunks;
pub mod pool;
pub mod processor;
pub mod shutdown;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::discovery::discover_files;
use crate::errors::AnalysisResult;
use crate::metrics::AnalysisMetrics;
use crate::results::AnalysisReport;
use crate::stopwords::Stopwords;
use pool::FileWorkerPool;

/// Runs a full analysis: validate, discover, count, report.
///
/// Only configuration problems are returned as errors. Files that cannot be
/// read or decoded end up in `AnalysisReport::failures`.
pub fn analyze(config: &AnalysisConfig) -> AnalysisResult<AnalysisReport> {
    let parallelism = config.validate()?;
    info!(
        "Starting analysis of {} with {} workers and {} counters",
        config.root_path.display(),
        parallelism.workers,
        parallelism.counters
    );

    let stopwords = Arc::new(Stopwords::from_path(config.stopwords_path.as_deref()));
    let files = discover_files(config)?;
    debug!("Discovered {} files", files.len());

    let metrics = AnalysisMetrics::new();
    let pool = FileWorkerPool::new(parallelism, stopwords, metrics.clone())
        .with_encoding(config.encoding_mode);

    let mut report = pool.run(files);
    report.sort_by_file_name();

    metrics.log_stats();
    info!(
        "Analysis complete. {} files analyzed, {} failed, {} words counted",
        report.files_analyzed, report.files_failed, report.total_words
    );

    Ok(report)
}
