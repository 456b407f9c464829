// Overlapping word windows for length-bounded generative backends.
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_WORDS: usize = 450;
pub const DEFAULT_OVERLAP_WORDS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub max_words: usize,
    pub overlap_words: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
        }
    }
}

impl ChunkConfig {
    /// Words between the starts of consecutive windows, never zero.
    pub fn stride(&self) -> usize {
        self.max_words.saturating_sub(self.overlap_words).max(1)
    }
}

/// Split the whitespace-separated words of `text` into windows of at most
/// `max_words` words, one window starting every `stride` words.
///
/// Window words are re-joined with single spaces. A window is started at every
/// stride position before the end of the text, so the last windows may be
/// shorter than `max_words`.
pub fn chunk_words(text: &str, config: ChunkConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let stride = config.stride();

    (0..words.len())
        .step_by(stride)
        .map(|start| {
            let end = (start + config.max_words).min(words.len());
            words[start..end].join(" ")
        })
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}
