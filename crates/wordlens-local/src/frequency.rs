//! Word-frequency tally and whole-word occurrence counts.

use std::collections::HashMap;
use wordlens_core::WordCount;

use crate::textprep::{is_word_char, words};

/// Counts per distinct word token, remembering first-occurrence order for tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct WordFrequencies {
    index: HashMap<String, usize>,
    counts: Vec<WordCount>,
    total: usize,
}

impl WordFrequencies {
    pub fn from_text(text: &str) -> Self {
        let mut out = Self::default();
        for w in words(text) {
            out.total += 1;
            match out.index.get(&w) {
                Some(&i) => out.counts[i].count += 1,
                None => {
                    out.index.insert(w.clone(), out.counts.len());
                    out.counts.push(WordCount { word: w, count: 1 });
                }
            }
        }
        out
    }

    /// Top `k` words by count (descending). Equal counts keep first-occurrence order.
    pub fn most_common(&self, k: usize) -> Vec<WordCount> {
        let mut ranked = self.counts.clone();
        // Stable sort: ties stay in first-occurrence order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(k);
        ranked
    }

    pub fn get(&self, word: &str) -> usize {
        self.index
            .get(&word.to_lowercase())
            .map(|&i| self.counts[i].count)
            .unwrap_or(0)
    }

    /// Number of word tokens seen.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct word tokens.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

/// Case-insensitive whole-word matches of `word` in `text`.
///
/// `word` is matched literally and each end must sit on a word boundary: the characters on
/// either side of it differ in [`is_word_char`]. So "cat" never matches inside "category". A
/// candidate that fails a boundary is retried one character later, and accepted matches do
/// not overlap. A blank word counts zero.
pub fn occurrence_count(text: &str, word: &str) -> usize {
    let word = word.trim().to_lowercase();
    let (Some(first), Some(last)) = (word.chars().next(), word.chars().next_back()) else {
        return 0;
    };
    let hay = text.to_lowercase();
    let mut count = 0;
    let mut pos = 0;
    while let Some(off) = hay[pos..].find(&word) {
        let start = pos + off;
        let end = start + word.len();
        let before = hay[..start].chars().next_back().is_some_and(is_word_char);
        let after = hay[end..].chars().next().is_some_and(is_word_char);
        if before != is_word_char(first) && after != is_word_char(last) {
            count += 1;
            pos = end;
        } else {
            pos = start + first.len_utf8();
        }
    }
    count
}
