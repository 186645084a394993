//! Result types produced by an analysis run.
//!
//! Per-file results and per-file failures travel separately, so a caller can
//! report "2 of 3 files failed" without losing the two that worked. Results
//! arrive in completion order; `AnalysisReport::sort_by_file_name` restores a
//! stable order for output.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AnalysisError, AnalysisResult};
use crate::frequency::FrequencyMap;

/// One word and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Sorts by count descending, ties broken by word ascending
pub fn sort_word_counts(words: &mut [WordCount]) {
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
}

/// Word frequencies for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Base name of the file, not the full path
    pub file_name: String,
    /// Words in display order
    pub words: Vec<WordCount>,
}

impl FileResult {
    pub fn new(file_name: impl Into<String>, words: Vec<WordCount>) -> Self {
        Self {
            file_name: file_name.into(),
            words,
        }
    }

    /// Builds the result for `path` from its merged frequencies
    pub fn from_frequencies(path: &Path, frequencies: FrequencyMap) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut words = frequencies.into_word_counts();
        sort_word_counts(&mut words);
        Self { file_name, words }
    }

    /// Words ordered by count descending, then word ascending
    pub fn sorted_words(&self) -> Vec<WordCount> {
        let mut words = self.words.clone();
        sort_word_counts(&mut words);
        words
    }

    pub fn total_words(&self) -> usize {
        self.words.iter().map(|w| w.count).sum()
    }

    /// Renders `"<file>:\n\t<word>: <count>\n..."` in display order
    pub fn to_display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.file_name)?;
        for w in self.sorted_words() {
            writeln!(f, "\t{}: {}", w.word, w.count)?;
        }
        Ok(())
    }
}

/// A file that could not be analyzed
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AnalysisError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Everything one run produced
#[derive(Debug, Default)]
pub struct AnalysisReport {
    /// Results per successfully analyzed file
    pub file_results: Vec<FileResult>,
    /// Files that failed, with their errors
    pub failures: Vec<FileFailure>,
    /// Number of files that produced a result
    pub files_analyzed: usize,
    /// Number of files that failed
    pub files_failed: usize,
    /// Sum of all word counts across results
    pub total_words: usize,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_file_result(&mut self, file_result: FileResult) {
        self.files_analyzed += 1;
        self.total_words += file_result.total_words();
        self.file_results.push(file_result);
    }

    pub fn add_failure(&mut self, failure: FileFailure) {
        self.files_failed += 1;
        self.failures.push(failure);
    }

    /// Merges another report into this one
    pub fn merge(&mut self, other: AnalysisReport) {
        self.files_analyzed += other.files_analyzed;
        self.files_failed += other.files_failed;
        self.total_words += other.total_words;
        self.file_results.extend(other.file_results);
        self.failures.extend(other.failures);
    }

    /// Files that produced either a result or a failure
    pub fn files_seen(&self) -> usize {
        self.files_analyzed + self.files_failed
    }

    pub fn sort_by_file_name(&mut self) {
        self.file_results.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Concatenated display form of every file result
    pub fn to_display(&self) -> String {
        self.file_results.iter().map(FileResult::to_display).collect()
    }

    /// JSON array of file results
    pub fn to_json(&self) -> AnalysisResult<String> {
        Ok(serde_json::to_string_pretty(&self.file_results)?)
    }

    /// Writes the JSON report, replacing `path` atomically
    pub fn write_json(&self, path: &Path) -> AnalysisResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(AnalysisError::IoError)?;
            }
        }

        // `<file name>.tmp` in the same directory
        let mut tmp_name = path.file_name().unwrap_or(path.as_os_str()).to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        fs::write(&tmp_path, self.to_json()?).map_err(AnalysisError::IoError)?;
        fs::rename(&tmp_path, path).map_err(AnalysisError::IoError)?;

        Ok(())
    }
}
