// Frequency-based extractive summarization.
// Sentences are ranked by the density of document-frequent words and taken
// greedily until the word budget is met.
use crate::config::LengthBounds;
use crate::nlp::frequency::FrequencyTable;
use crate::nlp::sentences::{deduplicate_sentences, split_sentences};
use std::cmp::Ordering;
use tracing::debug;

// Sentences returned when no sentence could be scored.
const FALLBACK_SENTENCES: usize = 3;

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    sentence: &'a str,
    score: f64,
}

/// Summarize `text` by selecting its highest-scoring sentences.
///
/// Sentences come back in score order (most relevant first), not document
/// order. Equal scores keep their document order because the sort is stable.
/// Only `bounds.max_length` limits the selection; the first accepted sentence
/// is kept even when it alone exceeds the budget.
pub fn summarize_extractive(text: &str, bounds: LengthBounds) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }

    let table = FrequencyTable::build(text);

    let mut candidates: Vec<Candidate> = sentences
        .iter()
        .filter_map(|&sentence| {
            table
                .score_sentence(sentence)
                .map(|score| Candidate { sentence, score })
        })
        .collect();
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let budget = bounds.max_length;
    let mut selected: Vec<&str> = Vec::new();
    let mut total_words = 0usize;
    for candidate in &candidates {
        let words = candidate.sentence.split_whitespace().count();
        if total_words + words <= budget || total_words == 0 {
            selected.push(candidate.sentence);
            total_words += words;
        }
        if total_words >= budget {
            break;
        }
    }

    if selected.is_empty() {
        selected = sentences.iter().copied().take(FALLBACK_SENTENCES).collect();
    }

    debug!(
        sentences = sentences.len(),
        candidates = candidates.len(),
        selected = selected.len(),
        words = total_words,
        "extractive selection"
    );

    deduplicate_sentences(&selected.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str =
        "Cats are great pets. Cats are independent. Dogs are loyal pets. Dogs need lots of exercise.";

    fn bounds(min_length: usize, max_length: usize) -> LengthBounds {
        LengthBounds { min_length, max_length }
    }

    #[test]
    fn test_pets_scenario() {
        // "cats are great pets" and "dogs are loyal pets" tie at 8 / 4^0.8;
        // the next candidate would overflow the 10 word budget
        let summary = summarize_extractive(PETS, bounds(5, 10));
        assert_eq!(summary, "Cats are great pets. Dogs are loyal pets.");
    }

    #[test]
    fn test_short_document_fits_entirely() {
        let summary = summarize_extractive(PETS, bounds(60, 120));
        let mut words: Vec<&str> = summary.split_whitespace().collect();
        let mut original: Vec<&str> = PETS.split_whitespace().collect();
        words.sort_unstable();
        original.sort_unstable();
        assert_eq!(words, original);
    }

    #[test]
    fn test_results_in_score_order() {
        let summary = summarize_extractive(PETS, bounds(60, 120));
        assert!(summary.starts_with("Cats are great pets. Dogs are loyal pets."));
        assert!(summary.ends_with("Dogs need lots of exercise."));
    }

    #[test]
    fn test_oversized_first_sentence_is_kept() {
        let long = "word ".repeat(50) + "end.";
        let summary = summarize_extractive(&long, bounds(1, 5));
        assert_eq!(summary.split_whitespace().count(), 51);
    }

    #[test]
    fn test_budget_respected_before_last_sentence() {
        let text = (0..40)
            .map(|i| format!("Sentence number {i} mentions budget words again."))
            .collect::<Vec<_>>()
            .join(" ");
        let summary = summarize_extractive(&text, bounds(10, 20));
        let words = summary.split_whitespace().count();
        assert!(words <= 20);
        assert!(words >= 7);
    }

    #[test]
    fn test_unscorable_sentences_fall_back() {
        let summary = summarize_extractive("!!! ??? ... ,,,", bounds(5, 10));
        assert_eq!(summary, "!!! ??? ...");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(summarize_extractive("", bounds(5, 10)), "");
        assert_eq!(summarize_extractive("  \n ", bounds(5, 10)), "");
    }

    #[test]
    fn test_duplicate_sentences_collapse() {
        let text = "Rust is memory safe. Rust is memory safe. Cargo builds crates.";
        let summary = summarize_extractive(text, bounds(5, 100));
        assert_eq!(summary.matches("Rust is memory safe.").count(), 1);
    }
}
