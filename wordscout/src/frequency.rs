use std::collections::hash_map::{self, HashMap};

use crate::results::WordCount;

/// Word → occurrence count, at chunk or file granularity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: HashMap<String, usize>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `word`
    pub fn increment(&mut self, word: String) {
        *self.counts.entry(word).or_insert(0) += 1;
    }

    /// Adds `count` occurrences of `word`
    pub fn add(&mut self, word: String, count: usize) {
        *self.counts.entry(word).or_insert(0) += count;
    }

    /// Sums `other` into `self`, key by key
    pub fn merge(&mut self, other: FrequencyMap) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (word, count) in other.counts {
            self.add(word, count);
        }
    }

    /// Count for `word`, zero if absent
    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Sum of all counts, i.e. the number of tokens seen
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(word, &count)| (word.as_str(), count))
    }

    /// Converts into an unordered list of word counts
    pub fn into_word_counts(self) -> Vec<WordCount> {
        self.counts
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect()
    }
}

impl FromIterator<String> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut map = FrequencyMap::new();
        for word in iter {
            map.increment(word);
        }
        map
    }
}

impl IntoIterator for FrequencyMap {
    type Item = (String, usize);
    type IntoIter = hash_map::IntoIter<String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}
