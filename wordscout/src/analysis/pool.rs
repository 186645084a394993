use crossbeam_channel::{unbounded, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::chunks::ChunkEngine;
use super::processor::{FileProcessor, FileSource, FsSource};
use super::shutdown::ShutdownCoordinator;
use crate::buffer_pool::BufferPool;
use crate::config::{EncodingMode, Parallelism};
use crate::errors::AnalysisError;
use crate::metrics::AnalysisMetrics;
use crate::pipeline::TextPipeline;
use crate::results::{AnalysisReport, FileFailure, FileResult};
use crate::stopwords::Stopwords;

/// A fixed set of workers pulling paths from one shared queue.
///
/// Workers are load-balanced rather than assigned files up front: whichever
/// worker is free takes the next path, and every path is taken exactly once.
/// A failing file, including one whose processing panics, produces a
/// `FileFailure` and the worker moves on.
pub struct FileWorkerPool {
    parallelism: Parallelism,
    engine: ChunkEngine,
    source: Arc<dyn FileSource>,
    encoding_mode: EncodingMode,
    metrics: AnalysisMetrics,
}

impl FileWorkerPool {
    pub fn new(
        parallelism: Parallelism,
        stopwords: Arc<Stopwords>,
        metrics: AnalysisMetrics,
    ) -> Self {
        let buffers = Arc::new(BufferPool::new(metrics.clone()));
        let pipeline = TextPipeline::new(stopwords, buffers);
        let engine = ChunkEngine::new(pipeline, parallelism.counters, metrics.clone());
        Self {
            parallelism,
            engine,
            source: Arc::new(FsSource),
            encoding_mode: EncodingMode::default(),
            metrics,
        }
    }

    /// Reads files through `source` instead of the filesystem
    pub fn with_source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_encoding(mut self, encoding_mode: EncodingMode) -> Self {
        self.encoding_mode = encoding_mode;
        self
    }

    pub fn metrics(&self) -> &AnalysisMetrics {
        &self.metrics
    }

    /// Starts the workers and a dispatcher for `paths`, returning immediately
    pub fn spawn(&self, paths: Vec<PathBuf>) -> PoolHandle {
        let (path_tx, path_rx) = unbounded::<PathBuf>();
        let (result_tx, result_rx) = unbounded::<FileResult>();
        let (failure_tx, failure_rx) = unbounded::<FileFailure>();
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let processor = Arc::new(FileProcessor::new(
            self.engine.clone(),
            Arc::clone(&self.source),
            self.encoding_mode,
            self.metrics.clone(),
        ));

        debug!(
            "Starting {} workers for {} files",
            self.parallelism.workers,
            paths.len()
        );

        for worker_id in 0..self.parallelism.workers {
            // Registered here, before the thread exists, so wait() can never
            // observe a zero count while a worker is still starting up
            let guard = coordinator.register();
            let processor = Arc::clone(&processor);
            let metrics = self.metrics.clone();
            let path_rx = path_rx.clone();
            let result_tx = result_tx.clone();
            let failure_tx = failure_tx.clone();
            thread::spawn(move || {
                let _guard = guard;
                run_worker(
                    worker_id,
                    &processor,
                    &metrics,
                    path_rx,
                    result_tx,
                    failure_tx,
                );
            });
        }

        thread::spawn(move || {
            for path in paths {
                if path_tx.send(path).is_err() {
                    break;
                }
            }
        });

        PoolHandle {
            results: result_rx,
            failures: failure_rx,
            coordinator,
        }
    }

    /// Processes every path and blocks until all of them are accounted for
    pub fn run(&self, paths: Vec<PathBuf>) -> AnalysisReport {
        self.spawn(paths).wait()
    }
}

fn run_worker(
    worker_id: usize,
    processor: &FileProcessor,
    metrics: &AnalysisMetrics,
    paths: Receiver<PathBuf>,
    results: Sender<FileResult>,
    failures: Sender<FileFailure>,
) {
    let mut processed = 0usize;
    for path in paths.iter() {
        // A panic in the source or in a counter thread fails this file only
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.process_file(&path)))
            .unwrap_or_else(|payload| {
                metrics.record_file_failed();
                Err(AnalysisError::worker_panic(&path, panic_message(payload)))
            });

        match outcome {
            Ok(result) => {
                let _ = results.send(result);
            }
            Err(error) => {
                warn!("Failed to analyze {}: {}", path.display(), error);
                let _ = failures.send(FileFailure { path, error });
            }
        }
        processed += 1;
    }
    debug!("Worker {} finished after {} files", worker_id, processed);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Live view of a running pool
#[derive(Debug)]
pub struct PoolHandle {
    results: Receiver<FileResult>,
    failures: Receiver<FileFailure>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl PoolHandle {
    /// Results as they complete, in no particular order
    pub fn results(&self) -> &Receiver<FileResult> {
        &self.results
    }

    /// Failures as they happen, separate from results
    pub fn failures(&self) -> &Receiver<FileFailure> {
        &self.failures
    }

    /// Workers that have not exited yet
    pub fn active_workers(&self) -> usize {
        self.coordinator.active()
    }

    /// Blocks until every worker has exited, then collects what is left
    pub fn wait(self) -> AnalysisReport {
        self.coordinator.wait();
        self.collect()
    }

    /// Like `wait`, but hands the handle back if workers are still running after `timeout`
    pub fn wait_timeout(self, timeout: Duration) -> Result<AnalysisReport, PoolHandle> {
        if self.coordinator.wait_timeout(timeout) {
            Ok(self.collect())
        } else {
            Err(self)
        }
    }

    fn collect(self) -> AnalysisReport {
        let mut report = AnalysisReport::new();
        for result in self.results.try_iter() {
            report.add_file_result(result);
        }
        for failure in self.failures.try_iter() {
            report.add_failure(failure);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AnalysisError, AnalysisResult};
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    /// In-memory files; paths not in the map fail to read
    struct MemorySource {
        files: HashMap<PathBuf, String>,
    }

    impl FileSource for MemorySource {
        fn read(&self, path: &Path) -> AnalysisResult<Vec<u8>> {
            self.files
                .get(path)
                .map(|text| text.clone().into_bytes())
                .ok_or_else(|| {
                    AnalysisError::read_error(path, io::Error::from(io::ErrorKind::NotFound))
                })
        }
    }

    fn pool(workers: usize, counters: usize, files: HashMap<PathBuf, String>) -> FileWorkerPool {
        FileWorkerPool::new(
            Parallelism::new(workers, counters).unwrap(),
            Arc::new(Stopwords::default()),
            AnalysisMetrics::new(),
        )
        .with_source(Arc::new(MemorySource { files }))
    }

    #[test]
    fn test_partial_failure_isolation() {
        let files = HashMap::from([
            (PathBuf::from("one.txt"), "alpha beta".to_string()),
            (PathBuf::from("three.txt"), "gamma gamma".to_string()),
        ]);
        let paths = vec![
            PathBuf::from("one.txt"),
            PathBuf::from("two.txt"),
            PathBuf::from("three.txt"),
        ];

        let mut report = pool(2, 2, files).run(paths);
        report.sort_by_file_name();

        assert_eq!(report.files_analyzed, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.file_results[0].file_name, "one.txt");
        assert_eq!(report.file_results[1].file_name, "three.txt");
        assert_eq!(report.failures[0].path, PathBuf::from("two.txt"));
        assert!(matches!(
            report.failures[0].error,
            AnalysisError::ReadError { .. }
        ));
    }

    #[test]
    fn test_every_path_processed_once() {
        let files: HashMap<PathBuf, String> = (0..200)
            .map(|i| (PathBuf::from(format!("f{:03}.txt", i)), format!("word{} shared", i)))
            .collect();
        let paths: Vec<PathBuf> = files.keys().cloned().collect();

        let report = pool(10, 1, files).run(paths);

        assert_eq!(report.files_analyzed, 200);
        assert_eq!(report.files_failed, 0);
        assert_eq!(report.total_words, 400);
        let mut names: Vec<_> = report.file_results.iter().map(|r| &r.file_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 200);
    }

    /// Panics when asked for `boom.txt`, serves everything else
    struct PanickingSource;

    impl FileSource for PanickingSource {
        fn read(&self, path: &Path) -> AnalysisResult<Vec<u8>> {
            if path == Path::new("boom.txt") {
                panic!("disk on fire");
            }
            Ok(b"steady words".to_vec())
        }
    }

    #[test]
    fn test_panicking_file_is_reported_as_failure() {
        let metrics = AnalysisMetrics::new();
        let pool = FileWorkerPool::new(
            Parallelism::new(2, 2).unwrap(),
            Arc::new(Stopwords::default()),
            metrics.clone(),
        )
        .with_source(Arc::new(PanickingSource));
        let paths = vec![
            PathBuf::from("a.txt"),
            PathBuf::from("boom.txt"),
            PathBuf::from("c.txt"),
        ];

        let mut report = pool.run(paths);
        report.sort_by_file_name();

        assert_eq!(report.files_seen(), 3);
        assert_eq!(report.files_analyzed, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.failures[0].path, PathBuf::from("boom.txt"));
        match &report.failures[0].error {
            AnalysisError::WorkerPanic { message, .. } => assert_eq!(message, "disk on fire"),
            other => panic!("expected WorkerPanic, got {:?}", other),
        }
        assert_eq!(metrics.get_stats().files_failed, 1);
    }

    #[test]
    fn test_worker_survives_repeated_panics() {
        let pool = FileWorkerPool::new(
            Parallelism::new(1, 1).unwrap(),
            Arc::new(Stopwords::default()),
            AnalysisMetrics::new(),
        )
        .with_source(Arc::new(PanickingSource));
        let paths = vec![
            PathBuf::from("boom.txt"),
            PathBuf::from("boom.txt"),
            PathBuf::from("after.txt"),
        ];

        let report = pool.run(paths);
        assert_eq!(report.files_failed, 2);
        assert_eq!(report.files_analyzed, 1);
        assert_eq!(report.file_results[0].file_name, "after.txt");
    }

    #[test]
    fn test_empty_input() {
        let report = pool(3, 2, HashMap::new()).run(Vec::new());
        assert_eq!(report.files_seen(), 0);
    }

    #[test]
    fn test_streaming_results() {
        let files = HashMap::from([(PathBuf::from("a.txt"), "x y z".to_string())]);
        let handle = pool(1, 1, files).spawn(vec![PathBuf::from("a.txt")]);

        let first = handle
            .results()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(first.file_name, "a.txt");
        assert!(handle.failures().try_recv().is_err());
        assert!(handle.active_workers() <= 1);

        let report = handle.wait_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(report.files_seen(), 0, "already-received results are not re-reported");
    }
}
