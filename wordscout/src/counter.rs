use crate::frequency::FrequencyMap;
use crate::pipeline::{TextPipeline, INLINE_THRESHOLD};

/// Counts the words of one chunk.
///
/// Tokens are counted as they leave the pipeline. Holds no shared mutable
/// state, so any number of calls may run at once.
pub fn count_chunk(pipeline: &TextPipeline, text: &str) -> FrequencyMap {
    if text.len() < INLINE_THRESHOLD {
        pipeline.tokens_inline(text).into_iter().collect()
    } else {
        pipeline.stream(text.to_owned()).iter().collect()
    }
}
