//! Stopword filtering.
//!
//! The set is built on first use and never changes afterwards. `Stopwords`
//! wraps a `OnceCell`, so any number of pipeline stages may race to read it and
//! exactly one of them performs the load; the rest block until it is ready and
//! then read without locking.
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only set of words excluded from counting
#[derive(Debug, Default, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// A set that filters nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from words, lowercasing and trimming each one
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Reads one stopword per line
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Self::from_words(lines))
    }

    /// Loads a stopword file from disk
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Where the stopword set comes from
#[derive(Debug, Clone)]
pub enum StopwordSource {
    None,
    Words(Vec<String>),
    File(PathBuf),
}

/// Lazily initialized, shareable stopword set
#[derive(Debug)]
pub struct Stopwords {
    source: StopwordSource,
    set: OnceCell<StopwordSet>,
}

impl Stopwords {
    pub fn new(source: StopwordSource) -> Self {
        Self {
            source,
            set: OnceCell::new(),
        }
    }

    /// Uses the file when a path is given, otherwise filters nothing
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::new(StopwordSource::File(p.to_path_buf())),
            None => Self::new(StopwordSource::None),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(StopwordSource::Words(
            words.into_iter().map(Into::into).collect(),
        ))
    }

    /// Returns the set, building it on the first call
    pub fn get(&self) -> &StopwordSet {
        self.set.get_or_init(|| self.build())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.get().contains(word)
    }

    pub fn is_initialized(&self) -> bool {
        self.set.get().is_some()
    }

    fn build(&self) -> StopwordSet {
        match &self.source {
            StopwordSource::None => StopwordSet::empty(),
            StopwordSource::Words(words) => StopwordSet::from_words(words),
            // A missing list disables filtering instead of failing the run
            StopwordSource::File(path) => match StopwordSet::load(path) {
                Ok(set) => {
                    debug!("Loaded {} stopwords from {}", set.len(), path.display());
                    set
                }
                Err(e) => {
                    warn!(
                        "Could not load stopwords from {}: {}; no words will be filtered",
                        path.display(),
                        e
                    );
                    StopwordSet::empty()
                }
            },
        }
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new(StopwordSource::None)
    }
}
