//! Finds the files an analysis run should read.
//!
//! Walking is delegated to `ignore::WalkBuilder`, so hidden files and
//! gitignored paths never reach the workers. The remaining filters are plain
//! functions over a path and can be used on their own.
use glob::Pattern;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, AnalysisResult};

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "bin", "obj", "o", "class", "jar", "png", "jpg", "jpeg", "gif",
    "bmp", "ico", "pdf", "doc", "docx", "xls", "xlsx", "zip", "tar", "gz", "7z", "rar",
];

/// True if `path` has one of `extensions` (case-insensitive), or if no filter is set
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    let Some(exts) = extensions else {
        return true;
    };
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// True if `path` is under `target/` or `.git/`, or matches an ignore glob
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.contains("/target/")
        || normalized.contains("/.git/")
        || normalized.starts_with("target/")
        || normalized.starts_with(".git/")
    {
        return true;
    }

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&normalized),
        Err(e) => {
            debug!("Skipping invalid ignore pattern {:?}: {}", pattern, e);
            false
        }
    })
}

/// Judges by extension only; contents are never sniffed
pub fn is_likely_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|bin| bin.eq_ignore_ascii_case(ext))
        })
}

pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    !is_likely_binary(path)
        && has_valid_extension(path, extensions)
        && !should_ignore(path, ignore_patterns)
}

/// Lists the files under `config.root_path` that pass every filter, sorted by path.
///
/// Ignore globs are matched against the path relative to the root.
pub fn discover_files(config: &AnalysisConfig) -> AnalysisResult<Vec<PathBuf>> {
    let root = &config.root_path;
    if !root.exists() {
        return Err(AnalysisError::config_error(format!(
            "root path does not exist: {}",
            root.display()
        )));
    }

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(true)
        .ignore(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);

    let mut files: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            should_include_file(relative, &config.file_extensions, &config.ignore_patterns)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}
