//! Text preprocessing pipeline.
//!
//! Raw text flows through four stages, each on its own thread and joined to the
//! next by an unbounded `crossbeam_channel`:
//!
//! ```text
//! text ─▶ lowercase ─▶ strip punctuation ─▶ tokenize ─▶ filter stopwords ─▶ tokens
//! ```
//!
//! End of stream is the channel disconnecting: a stage loops until every sender
//! of its input is gone, then drops its own sender. Because the sender lives in
//! the stage's closure, a stage that panics still disconnects its output and
//! everything downstream winds down. A stage whose consumer hung up stops at
//! its next send.
//!
//! Inputs shorter than [`INLINE_THRESHOLD`] skip the threads and run the same
//! transformations inline; both paths emit identical token sequences.
use crossbeam_channel::{unbounded, Receiver, SendError, Sender};
use std::sync::Arc;
use std::thread;
use tracing::trace;

use crate::buffer_pool::BufferPool;
use crate::stopwords::Stopwords;

/// Texts shorter than this many bytes are tokenized inline
pub const INLINE_THRESHOLD: usize = 100;

/// The four-stage normalization pipeline
#[derive(Debug, Clone)]
pub struct TextPipeline {
    stopwords: Arc<Stopwords>,
    buffers: Arc<BufferPool>,
}

impl TextPipeline {
    pub fn new(stopwords: Arc<Stopwords>, buffers: Arc<BufferPool>) -> Self {
        Self { stopwords, buffers }
    }

    /// Starts the four stage threads and returns the filtered token stream.
    ///
    /// The text is queued as a single item and the input closed right away, so
    /// the stream ends once every token of `text` has passed through.
    pub fn stream(&self, text: String) -> Receiver<String> {
        let (input_tx, input_rx) = unbounded();
        // Unbounded, and the receiver is alive until the first stage exits
        let _ = input_tx.send(text);
        drop(input_tx);

        let lowered = lowercase_stage(input_rx, Arc::clone(&self.buffers));
        let stripped = strip_punctuation_stage(lowered, Arc::clone(&self.buffers));
        let words = tokenize_stage(stripped);
        filter_stopwords_stage(words, Arc::clone(&self.stopwords))
    }

    /// Collects the tokens of `text`, choosing the inline path for short input
    pub fn tokens(&self, text: &str) -> Vec<String> {
        if text.len() < INLINE_THRESHOLD {
            self.tokens_inline(text)
        } else {
            self.stream(text.to_owned()).iter().collect()
        }
    }

    /// Runs all four transformations on the calling thread
    pub fn tokens_inline(&self, text: &str) -> Vec<String> {
        let mut lowered = self.buffers.acquire();
        lowercase_into(text, &mut lowered);
        let mut cleaned = self.buffers.acquire();
        strip_punctuation_into(&lowered, &mut cleaned);

        cleaned
            .split_whitespace()
            .filter(|word| !self.stopwords.is_stopword(word))
            .map(str::to_owned)
            .collect()
    }
}

/// Appends the lowercase form of `text` to `out`, exactly one char per input char
pub fn lowercase_into(text: &str, out: &mut String) {
    out.extend(text.chars().map(lowercase_char));
}

/// Simple case mapping. Multi-char expansions such as `İ` -> `i\u{307}` keep
/// only their leading letter so a word is never split by a combining mark.
fn lowercase_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(first), None) => first,
        (Some(first), Some(_)) if first.is_alphanumeric() => first,
        _ => c,
    }
}

/// Appends `text` to `out`, turning anything but letters, digits and whitespace into a space
pub fn strip_punctuation_into(text: &str, out: &mut String) {
    for c in text.chars() {
        if c.is_alphanumeric() || c.is_whitespace() {
            out.push(c);
        } else {
            out.push(' ');
        }
    }
}

/// Stage 1: lowercase each incoming text
pub fn lowercase_stage(input: Receiver<String>, buffers: Arc<BufferPool>) -> Receiver<String> {
    spawn_stage("lowercase", input, move |text, out| {
        let lowered = {
            let mut buf = buffers.acquire();
            lowercase_into(&text, &mut buf);
            buf.as_str().to_owned()
        };
        out.send(lowered)
    })
}

/// Stage 2: replace punctuation with spaces
pub fn strip_punctuation_stage(
    input: Receiver<String>,
    buffers: Arc<BufferPool>,
) -> Receiver<String> {
    spawn_stage("strip_punctuation", input, move |text, out| {
        let cleaned = {
            let mut buf = buffers.acquire();
            strip_punctuation_into(&text, &mut buf);
            buf.as_str().to_owned()
        };
        out.send(cleaned)
    })
}

/// Stage 3: split on whitespace runs, one token per run
pub fn tokenize_stage(input: Receiver<String>) -> Receiver<String> {
    spawn_stage("tokenize", input, |text, out| {
        for word in text.split_whitespace() {
            out.send(word.to_owned())?;
        }
        Ok(())
    })
}

/// Stage 4: drop stopwords
pub fn filter_stopwords_stage(
    input: Receiver<String>,
    stopwords: Arc<Stopwords>,
) -> Receiver<String> {
    spawn_stage("filter_stopwords", input, move |word, out| {
        if stopwords.is_stopword(&word) {
            Ok(())
        } else {
            out.send(word)
        }
    })
}

fn spawn_stage<F>(name: &'static str, input: Receiver<String>, mut step: F) -> Receiver<String>
where
    F: FnMut(String, &Sender<String>) -> Result<(), SendError<String>> + Send + 'static,
{
    let (output_tx, output_rx) = unbounded();
    thread::spawn(move || {
        for item in input.iter() {
            if step(item, &output_tx).is_err() {
                trace!("{} stage: downstream closed, stopping", name);
                break;
            }
        }
    });
    output_rx
}
