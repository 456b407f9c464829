// Word-frequency statistics used by the extractive scorer and keyword listing.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern"));

// Tokens this short are too common to carry signal.
const MIN_COUNTED_CHARS: usize = 3;

// Sub-linear length normalisation for sentence scores.
const LENGTH_EXPONENT: f64 = 0.8;

/// Lowercased alphanumeric/underscore runs of `text`, in order.
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn is_counted(token: &str) -> bool {
    token.chars().count() >= MIN_COUNTED_CHARS
}

/// Occurrence counts of every counted token across a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn build(text: &str) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in word_tokens(text) {
            if is_counted(&token) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Count for `token`; unknown tokens count as zero.
    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Relevance of `sentence`: summed token counts divided by
    /// `token_count ^ 0.8`. `None` when the sentence has no tokens at all.
    ///
    /// Short tokens still count toward the divisor even though they never
    /// contribute to the sum.
    pub fn score_sentence(&self, sentence: &str) -> Option<f64> {
        let tokens = word_tokens(sentence);
        if tokens.is_empty() {
            return None;
        }
        let total: usize = tokens.iter().map(|t| self.count(t)).sum();
        Some(total as f64 / (tokens.len() as f64).powf(LENGTH_EXPONENT))
    }
}

const KEYWORD_TRIM: &[char] = &['.', ',', '!', '?', ';', ':', '"', '(', ')', '[', ']', '{', '}'];

/// Most frequent whitespace-separated words of `text`, stripped of surrounding
/// punctuation and lowercased. Ties keep first-appearance order.
pub fn top_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for raw in text.split_whitespace() {
        let word = raw.trim_matches(KEYWORD_TRIM);
        if !is_counted(word) {
            continue;
        }
        let key = word.to_lowercase();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    // stable sort keeps first appearance on ties
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokens_lowercase() {
        let tokens = word_tokens("Hello World! snake_case 42x");
        assert_eq!(tokens, vec!["hello", "world", "snake_case", "42x"]);
    }

    #[test]
    fn test_short_tokens_not_counted() {
        let table = FrequencyTable::build("An ox is in the barn. The barn is red.");
        assert_eq!(table.count("barn"), 2);
        assert_eq!(table.count("the"), 2);
        assert_eq!(table.count("ox"), 0);
        assert_eq!(table.count("is"), 0);
        assert_eq!(table.count("red"), 1);
    }

    #[test]
    fn test_unknown_token_is_zero() {
        let table = FrequencyTable::build("alpha beta");
        assert_eq!(table.count("gamma"), 0);
        assert_eq!(table.len(), 2);
        assert!(FrequencyTable::build("").is_empty());
    }

    #[test]
    fn test_score_sentence_formula() {
        let table = FrequencyTable::build("cats cats dogs");
        // (2 + 1 + 0) / 3^0.8
        let score = table.score_sentence("cats dogs of").unwrap();
        let expected = 3.0 / 3f64.powf(0.8);
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_sentence_without_tokens() {
        let table = FrequencyTable::build("anything here");
        assert_eq!(table.score_sentence("?! ..."), None);
    }

    #[test]
    fn test_top_keywords_ranking() {
        let text = "Rust is fast. rust is safe, and Rust (really) is fun. Safe code!";
        let keywords = top_keywords(text, 3);
        assert_eq!(keywords, vec!["rust", "safe", "fast"]);
    }

    #[test]
    fn test_top_keywords_empty() {
        assert!(top_keywords("a an is", 10).is_empty());
    }
}
