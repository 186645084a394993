//! Error types for wordscout.
//!
//! Per-file failures (`ReadError`, `EncodingError`, `WorkerPanic`) are reported
//! next to the successful results and never abort a run. `ConfigError` is raised before any
//! file is touched, so a bad worker count fails fast with no partial output.
//!
//! ```rust,ignore
//! match analyze(&config) {
//!     Ok(report) => println!("{} files analyzed", report.files_analyzed),
//!     Err(AnalysisError::ConfigError(msg)) => eprintln!("bad config: {msg}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while analyzing files
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[error("Worker panicked while analyzing {path}: {message}")]
    WorkerPanic { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn worker_panic(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WorkerPanic {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors that belong to a single file rather than the whole run
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::ReadError { .. } | Self::EncodingError { .. } | Self::WorkerPanic { .. }
        )
    }
}
