// Sentence splitting and sentence-level deduplication.
// Every summarization path runs its output through `deduplicate_sentences`.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// A terminator (or newline) followed by a whitespace run. The terminator stays
// with the sentence on its left; the whitespace is dropped.
static BOUNDARY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?\n]\s+").expect("sentence boundary pattern"));

/// Split `text` into trimmed, non-empty sentence-like units in source order.
///
/// The boundary rule is purely lexical, so abbreviations and decimals such as
/// `e.g. this` or `3. 5` are split too.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for m in BOUNDARY_PATTERN.find_iter(text) {
        // all terminator characters are single-byte
        let cut = m.start() + 1;
        pieces.push(&text[start..cut]);
        start = m.end();
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Keep the first occurrence of every unit, comparing trimmed lowercase text.
pub fn dedup_units<'a, I>(units: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    units
        .into_iter()
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .filter(|unit| seen.insert(unit.to_lowercase()))
        .collect()
}

/// Re-split `text` into sentences, drop case-insensitive repeats and join the
/// survivors with single spaces.
///
/// Joining can merge units that did not end in a terminator, and a merged unit
/// may repeat a later one, so the pass is repeated until nothing more is
/// dropped. Each repeat strictly shortens the text.
pub fn deduplicate_sentences(text: &str) -> String {
    let mut current = dedup_pass(text);
    loop {
        let next = dedup_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn dedup_pass(text: &str) -> String {
    dedup_units(split_sentences(text)).join(" ")
}
