//! Chunked abstractive summarization.
//!
//! Long documents are cut into overlapping word windows, each window is
//! summarized on its own, and the partial summaries are joined and, when there
//! was more than one, summarized once more for coherence. Backend failures
//! never escape this module: a failed window degrades to its leading
//! sentences and a failed refinement keeps the joined text.

use crate::backend::{BeamSettings, GenerationRequest, GenerativeBackend, Tuning};
use crate::config::LengthBounds;
use crate::nlp::chunking::{chunk_words, ChunkConfig};
use crate::nlp::sentences::{deduplicate_sentences, split_sentences};
use tracing::{debug, warn};

const MIN_CHUNK_MAX_LENGTH: usize = 20;
const MIN_CHUNK_MIN_LENGTH: usize = 5;
const CHUNK_LENGTH_SPREAD: usize = 40;
const CHUNK_LENGTH_GAP: usize = 5;

const REFINE_MIN_BEAMS: u32 = 4;
const FALLBACK_SENTENCES: usize = 2;

/// Word range to request for a window of `chunk_words` words.
///
/// The upper bound is capped at 60% of the window so a short window is never
/// asked for a summary longer than itself; both bounds have floors and the
/// lower bound always ends up below the upper one.
pub fn chunk_bounds(chunk_words: usize, bounds: LengthBounds) -> LengthBounds {
    let max_length = (chunk_words * 3 / 5)
        .min(bounds.max_length)
        .max(MIN_CHUNK_MAX_LENGTH);

    let spread_floor = max_length
        .saturating_sub(CHUNK_LENGTH_SPREAD)
        .max(MIN_CHUNK_MIN_LENGTH);
    let mut min_length = bounds.min_length.min(spread_floor).max(MIN_CHUNK_MIN_LENGTH);
    if min_length >= max_length {
        min_length = max_length
            .saturating_sub(CHUNK_LENGTH_GAP)
            .max(MIN_CHUNK_MIN_LENGTH);
    }

    LengthBounds { min_length, max_length }
}

/// Summarize `text` window by window through `backend`.
pub fn summarize_chunked(
    backend: &dyn GenerativeBackend,
    text: &str,
    bounds: LengthBounds,
    beam: BeamSettings,
    chunking: ChunkConfig,
) -> String {
    let chunks = chunk_words(text, chunking);
    debug!(backend = backend.name(), chunks = chunks.len(), "chunked summarization");

    let outputs: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| summarize_chunk(backend, index, chunk, bounds, beam))
        .collect();

    let combined = outputs.join("\n\n");
    let merged = if outputs.len() > 1 {
        refine(backend, combined, bounds, beam)
    } else {
        combined
    };

    deduplicate_sentences(&merged)
}

fn summarize_chunk(
    backend: &dyn GenerativeBackend,
    index: usize,
    chunk: &str,
    bounds: LengthBounds,
    beam: BeamSettings,
) -> String {
    let local = chunk_bounds(chunk.split_whitespace().count(), bounds);
    let request = GenerationRequest {
        text: chunk,
        bounds: local,
        tuning: Tuning::Beam(beam),
    };

    match backend.generate(&request) {
        Ok(summary) => summary.trim().to_string(),
        Err(e) => {
            warn!(chunk = index, error = %e, "chunk summarization failed, using leading sentences");
            leading_sentences(chunk, FALLBACK_SENTENCES)
        }
    }
}

fn refine(
    backend: &dyn GenerativeBackend,
    combined: String,
    bounds: LengthBounds,
    beam: BeamSettings,
) -> String {
    let request = GenerationRequest {
        text: &combined,
        bounds,
        tuning: Tuning::Beam(beam.widened(REFINE_MIN_BEAMS)),
    };

    match backend.generate(&request) {
        Ok(refined) => refined.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "refinement pass failed, keeping joined chunk summaries");
            combined
        }
    }
}

fn leading_sentences(text: &str, count: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(count)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use std::cell::RefCell;

    /// Records every request and answers from a script.
    struct ScriptedBackend {
        calls: RefCell<Vec<(String, LengthBounds, Tuning)>>,
        respond: Box<dyn Fn(usize, &str) -> Result<String, BackendError>>,
    }

    impl ScriptedBackend {
        fn new(respond: impl Fn(usize, &str) -> Result<String, BackendError> + 'static) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                respond: Box::new(respond),
            }
        }
    }

    impl GenerativeBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError> {
            let index = self.calls.borrow().len();
            self.calls
                .borrow_mut()
                .push((request.text.to_string(), request.bounds, request.tuning));
            (self.respond)(index, request.text)
        }
    }

    fn medium() -> LengthBounds {
        LengthBounds { min_length: 120, max_length: 200 }
    }

    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("Sentence {i} has five words."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_chunk_bounds_full_window() {
        // 450 * 0.6 = 270, capped at 200; min stays at 120
        assert_eq!(
            chunk_bounds(450, medium()),
            LengthBounds { min_length: 120, max_length: 200 }
        );
    }

    #[test]
    fn test_chunk_bounds_short_window() {
        // 100 * 0.6 = 60; min limited to 60 - 40 = 20
        assert_eq!(
            chunk_bounds(100, medium()),
            LengthBounds { min_length: 20, max_length: 60 }
        );
    }

    #[test]
    fn test_chunk_bounds_floors() {
        // 10 * 0.6 = 6 lifted to 20; spread floor is 5
        assert_eq!(
            chunk_bounds(10, medium()),
            LengthBounds { min_length: 5, max_length: 20 }
        );
    }

    #[test]
    fn test_chunk_bounds_min_below_max() {
        let tight = LengthBounds { min_length: 300, max_length: 20 };
        let local = chunk_bounds(450, tight);
        assert_eq!(local, LengthBounds { min_length: 5, max_length: 20 });
    }

    #[test]
    fn test_single_chunk_skips_refinement() {
        let backend = ScriptedBackend::new(|_, _| Ok("  A short summary.  ".to_string()));
        let summary = summarize_chunked(&backend, &sentences(10), medium(), BeamSettings::default(), ChunkConfig::default());

        assert_eq!(summary, "A short summary.");
        assert_eq!(backend.calls.borrow().len(), 1);
    }

    #[test]
    fn test_multi_chunk_refines_with_wider_beams() {
        let backend = ScriptedBackend::new(|i, _| Ok(format!("Summary part {i}.")));
        let beam = BeamSettings { num_beams: 2, no_repeat_ngram_size: 3, length_penalty: 1.0 };
        let text = sentences(200); // 1000 words, three windows

        let summary = summarize_chunked(&backend, &text, medium(), beam, ChunkConfig::default());
        assert_eq!(summary, "Summary part 3.");

        let calls = backend.calls.borrow();
        assert_eq!(calls.len(), 4);
        for (_, _, tuning) in calls.iter().take(3) {
            assert_eq!(*tuning, Tuning::Beam(beam));
        }
        let (refine_text, refine_bounds, refine_tuning) = &calls[3];
        assert_eq!(refine_text, "Summary part 0.\n\nSummary part 1.\n\nSummary part 2.");
        assert_eq!(*refine_bounds, medium());
        assert_eq!(*refine_tuning, Tuning::Beam(beam.widened(4)));
    }

    #[test]
    fn test_failed_chunk_uses_leading_sentences() {
        let backend = ScriptedBackend::new(|i, _| match i {
            0 => Err(BackendError::Process("model crashed".into())),
            1 => Ok("Second window summary.".to_string()),
            _ => Err(BackendError::EmptyResponse),
        });
        let text = sentences(100); // 500 words, two windows

        let summary = summarize_chunked(&backend, &text, medium(), BeamSettings::default(), ChunkConfig::default());
        assert_eq!(
            summary,
            "Sentence 0 has five words. Sentence 1 has five words. Second window summary."
        );
    }

    #[test]
    fn test_repeated_chunk_outputs_collapse() {
        let backend = ScriptedBackend::new(|i, _| match i {
            0 | 1 => Ok("The same point. Another point.".to_string()),
            _ => Err(BackendError::EmptyResponse),
        });
        let summary = summarize_chunked(&backend, &sentences(100), medium(), BeamSettings::default(), ChunkConfig::default());
        assert_eq!(summary, "The same point. Another point.");
    }

    #[test]
    fn test_empty_text_makes_no_calls() {
        let backend = ScriptedBackend::new(|_, _| Ok("unused".to_string()));
        let summary = summarize_chunked(&backend, "  ", medium(), BeamSettings::default(), ChunkConfig::default());
        assert_eq!(summary, "");
        assert!(backend.calls.borrow().is_empty());
    }
}
