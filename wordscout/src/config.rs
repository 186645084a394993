use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::{AnalysisError, AnalysisResult};

/// Number of file workers used when none is configured
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Hard cap on file workers; larger values are clamped, not rejected
pub const MAX_WORKER_COUNT: usize = 10;
/// Number of chunk counters per file used when none is configured
pub const DEFAULT_COUNTER_COUNT: usize = 2;
/// Stopword list read from the working directory when none is configured
pub const DEFAULT_STOPWORDS_FILE: &str = "stopwords.txt";

/// How to handle invalid UTF-8 in input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Report the file as failed
    FailFast,
    /// Replace invalid sequences with U+FFFD and keep going
    #[default]
    Lossy,
}

/// Configuration for an analysis run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.wordscout.yaml` in the current directory
/// 3. Global `$HOME/.config/wordscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Directory to analyze
/// root_path: "corpus"
///
/// # File extensions to include
/// file_extensions: ["txt", "md"]
///
/// # Patterns to ignore (glob syntax)
/// ignore_patterns: ["drafts/**"]
///
/// # File workers (capped at 10) and chunk counters per file
/// worker_count: 4
/// counter_count: 2
///
/// # One stopword per line; missing file means no filtering
/// stopwords_path: "stopwords.txt"
///
/// # failfast | lossy
/// encoding_mode: lossy
///
/// log_level: "info"
/// output_path: "results.json"
/// ```
///
/// When using the CLI, command-line arguments take precedence over config file values.
/// The merging behavior is defined in the `merge_with_cli` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root directory to discover files in
    pub root_path: PathBuf,

    /// File extensions to include; `None` includes every file
    pub file_extensions: Option<Vec<String>>,

    /// Patterns to ignore (supports glob syntax)
    pub ignore_patterns: Vec<String>,

    /// Number of concurrent file workers
    pub worker_count: usize,

    /// Number of chunk counters fanned out per file
    pub counter_count: usize,

    /// Stopword list, one word per line. A missing file filters nothing;
    /// `None` skips loading entirely
    pub stopwords_path: Option<PathBuf>,

    /// Invalid UTF-8 handling
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Where to write the JSON report, if anywhere
    pub output_path: Option<PathBuf>,

    /// Whether to only show statistics instead of per-file word lists
    pub stats_only: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            file_extensions: default_file_extensions(),
            ignore_patterns: Vec::new(),
            worker_count: DEFAULT_WORKER_COUNT,
            counter_count: DEFAULT_COUNTER_COUNT,
            stopwords_path: Some(PathBuf::from(DEFAULT_STOPWORDS_FILE)),
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
            output_path: None,
            stats_only: false,
        }
    }
}

fn default_file_extensions() -> Option<Vec<String>> {
    Some(vec!["txt".to_string()])
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Worker counts that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parallelism {
    /// File workers, in `1..=MAX_WORKER_COUNT`
    pub workers: usize,
    /// Chunk counters per file, at least 1
    pub counters: usize,
}

impl Parallelism {
    /// Validates raw worker counts. Zero is rejected; too many workers are capped.
    pub fn new(workers: usize, counters: usize) -> AnalysisResult<Self> {
        if workers == 0 {
            return Err(AnalysisError::config_error(
                "worker_count must be at least 1",
            ));
        }
        if counters == 0 {
            return Err(AnalysisError::config_error(
                "counter_count must be at least 1",
            ));
        }

        let workers = if workers > MAX_WORKER_COUNT {
            warn!(
                "worker_count {} exceeds maximum, capping at {}",
                workers, MAX_WORKER_COUNT
            );
            MAX_WORKER_COUNT
        } else {
            workers
        };

        Ok(Self { workers, counters })
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            counters: DEFAULT_COUNTER_COUNT,
        }
    }
}

impl AnalysisConfig {
    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> AnalysisResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(AnalysisError::config_error(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("wordscout/config.yaml")),
            Some(PathBuf::from(".wordscout.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AnalysisError::config_error(e.to_string()))
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: AnalysisConfig) -> Self {
        let defaults = AnalysisConfig::default();

        if cli_config.root_path != defaults.root_path {
            self.root_path = cli_config.root_path;
        }
        if cli_config.file_extensions != defaults.file_extensions {
            self.file_extensions = cli_config.file_extensions;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.worker_count != defaults.worker_count {
            self.worker_count = cli_config.worker_count;
        }
        if cli_config.counter_count != defaults.counter_count {
            self.counter_count = cli_config.counter_count;
        }
        if cli_config.stopwords_path != defaults.stopwords_path {
            self.stopwords_path = cli_config.stopwords_path;
        }
        if cli_config.encoding_mode != defaults.encoding_mode {
            self.encoding_mode = cli_config.encoding_mode;
        }
        if cli_config.log_level != defaults.log_level {
            self.log_level = cli_config.log_level;
        }
        if cli_config.output_path.is_some() {
            self.output_path = cli_config.output_path;
        }
        if cli_config.stats_only {
            self.stats_only = true;
        }
        self
    }

    /// Checks worker counts before any work starts
    pub fn validate(&self) -> AnalysisResult<Parallelism> {
        Parallelism::new(self.worker_count, self.counter_count)
    }
}
