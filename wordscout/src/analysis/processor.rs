use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{trace, warn};

use super::chunks::ChunkEngine;
use crate::config::EncodingMode;
use crate::errors::{AnalysisError, AnalysisResult};
use crate::metrics::AnalysisMetrics;
use crate::results::FileResult;

/// Supplies raw file contents to the workers
pub trait FileSource: Send + Sync {
    /// Reads the whole file, failing with `AnalysisError::ReadError`
    fn read(&self, path: &Path) -> AnalysisResult<Vec<u8>>;
}

/// Reads from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FileSource for FsSource {
    fn read(&self, path: &Path) -> AnalysisResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| AnalysisError::read_error(path, e))
    }
}

/// Helper function to decode bytes into a String according to encoding mode
fn decode_bytes(
    bytes: Vec<u8>,
    path: &Path,
    encoding_mode: EncodingMode,
) -> AnalysisResult<String> {
    match encoding_mode {
        EncodingMode::FailFast => {
            String::from_utf8(bytes).map_err(|e| AnalysisError::encoding_error(path, e))
        }
        EncodingMode::Lossy => match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        },
    }
}

/// Turns one path into a `FileResult`: read, decode, count
pub struct FileProcessor {
    engine: ChunkEngine,
    source: Arc<dyn FileSource>,
    encoding_mode: EncodingMode,
    metrics: AnalysisMetrics,
}

impl FileProcessor {
    pub fn new(
        engine: ChunkEngine,
        source: Arc<dyn FileSource>,
        encoding_mode: EncodingMode,
        metrics: AnalysisMetrics,
    ) -> Self {
        Self {
            engine,
            source,
            encoding_mode,
            metrics,
        }
    }

    /// Processes a file and returns its word frequencies
    pub fn process_file(&self, path: &Path) -> AnalysisResult<FileResult> {
        trace!("Processing file: {}", path.display());

        let outcome = self.source.read(path).and_then(|bytes| {
            let size = bytes.len() as u64;
            decode_bytes(bytes, path, self.encoding_mode).map(|text| (size, text))
        });

        match outcome {
            Ok((size, text)) => {
                let frequencies = self.engine.count(&text);
                self.metrics.record_file_processed(size);
                trace!(
                    "Counted {} words ({} distinct) in {}",
                    frequencies.total(),
                    frequencies.len(),
                    path.display()
                );
                Ok(FileResult::from_frequencies(path, frequencies))
            }
            Err(e) => {
                self.metrics.record_file_failed();
                Err(e)
            }
        }
    }
}

impl fmt::Debug for FileProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProcessor")
            .field("engine", &self.engine)
            .field("encoding_mode", &self.encoding_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_pool::BufferPool;
    use crate::pipeline::TextPipeline;
    use crate::stopwords::Stopwords;
    use std::fs;
    use tempfile::tempdir;

    fn processor(encoding_mode: EncodingMode, metrics: &AnalysisMetrics) -> FileProcessor {
        let pipeline = TextPipeline::new(
            Arc::new(Stopwords::from_words(["and"])),
            Arc::new(BufferPool::new(metrics.clone())),
        );
        FileProcessor::new(
            ChunkEngine::new(pipeline, 2, metrics.clone()),
            Arc::new(FsSource),
            encoding_mode,
            metrics.clone(),
        )
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poem.txt");
        fs::write(&path, "Roses and violets\nroses, ROSES!\n").unwrap();

        let metrics = AnalysisMetrics::new();
        let result = processor(EncodingMode::Lossy, &metrics)
            .process_file(&path)
            .unwrap();

        assert_eq!(result.file_name, "poem.txt");
        assert_eq!(result.to_display(), "poem.txt:\n\troses: 3\n\tviolets: 1\n");
        assert_eq!(metrics.get_stats().files_processed, 1);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let metrics = AnalysisMetrics::new();
        let err = processor(EncodingMode::Lossy, &metrics)
            .process_file(&dir.path().join("missing.txt"))
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ReadError { .. }));
        assert_eq!(metrics.get_stats().files_failed, 1);
    }

    #[test]
    fn test_encoding_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 bar caf\xe9").unwrap();

        let metrics = AnalysisMetrics::new();
        let err = processor(EncodingMode::FailFast, &metrics)
            .process_file(&path)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EncodingError { .. }));

        let result = processor(EncodingMode::Lossy, &metrics)
            .process_file(&path)
            .unwrap();
        // U+FFFD is neither letter nor digit, so it splits like punctuation
        assert_eq!(result.to_display(), "latin1.txt:\n\tcaf: 2\n\tbar: 1\n");
    }
}
