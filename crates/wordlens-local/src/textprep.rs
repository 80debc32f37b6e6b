//! Deterministic tokenization helpers.
//!
//! Two tokenizers live here and they are deliberately different:
//! - [`whitespace_tokens`] feeds the TF-IDF engine. Punctuation stays attached ("word." != "word").
//! - [`words`] feeds frequency and context analysis. Only runs of word characters survive.

use regex::Regex;
use std::sync::OnceLock;

/// Letters, numbers (`²`, `½` included) and `_`. Combining marks and connector punctuation
/// other than `_` separate words.
const WORD_CLASS: &str = r"[\p{L}\p{N}_]";

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy `+` makes every match a maximal run, so each one is already boundary-delimited.
    RE.get_or_init(|| Regex::new(&format!("{WORD_CLASS}+")).expect("static word regex"))
}

fn word_char_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{WORD_CLASS}$")).expect("static word char regex"))
}

/// Whether `c` belongs to the class [`words`] tokenizes on.
pub fn is_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    word_char_re().is_match(c.encode_utf8(&mut buf))
}

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("static sentence regex"))
}

/// Trim, lower-case, split on whitespace.
pub fn whitespace_tokens(doc: &str) -> Vec<String> {
    doc.trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lower-cased word tokens (maximal runs of [`is_word_char`]) in text order.
pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Split after `.`, `!` or `?` followed by whitespace.
///
/// The terminator stays with the sentence it ends; the whitespace run is dropped. This is a
/// naive heuristic: "Mr. Bloom" and "3. 14" both split.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for m in sentence_break_re().find_iter(text) {
        // The terminator is a single ASCII byte.
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    out.push(&text[start..]);
    out
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_tokens_keep_punctuation() {
        assert_eq!(
            whitespace_tokens("  The cat sat. The END  "),
            vec!["the", "cat", "sat.", "the", "end"]
        );
    }

    #[test]
    fn words_drop_punctuation_and_fold_case() {
        assert_eq!(
            words("Stately, plump Buck Mulligan -- came!"),
            vec!["stately", "plump", "buck", "mulligan", "came"]
        );
    }

    #[test]
    fn words_handle_cyrillic() {
        assert_eq!(words("Привет, Мир!"), vec!["привет", "мир"]);
    }

    #[test]
    fn words_keep_underscores_and_digits_in_one_token() {
        assert_eq!(words("snake_case 42nd"), vec!["snake_case", "42nd"]);
    }

    #[test]
    fn words_keep_numeric_symbols() {
        assert_eq!(words("x² cat"), vec!["x²", "cat"]);
        assert_eq!(words("½ word"), vec!["½", "word"]);
    }

    #[test]
    fn words_split_on_combining_marks_and_tie_punctuation() {
        assert_eq!(words("cafe\u{301} bar"), vec!["cafe", "bar"]);
        assert_eq!(words("a‿b c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn word_chars_match_the_token_class() {
        for c in ['a', 'Я', '7', '²', '½', '_'] {
            assert!(is_word_char(c), "{c:?}");
        }
        for c in ['\u{301}', '\u{93e}', '‿', '-', ' ', '.'] {
            assert!(!is_word_char(c), "{c:?}");
        }
    }

    #[test]
    fn sentences_split_after_terminator_and_whitespace() {
        assert_eq!(
            sentences("End. Target word here! Really?  Yes"),
            vec!["End.", "Target word here!", "Really?", "Yes"]
        );
    }

    #[test]
    fn sentences_do_not_split_without_whitespace() {
        assert_eq!(sentences("v1.2 is out.Next"), vec!["v1.2 is out.Next"]);
    }

    #[test]
    fn sentences_trailing_break_leaves_empty_tail() {
        assert_eq!(sentences("One. "), vec!["One.", ""]);
    }

    #[test]
    fn sentences_take_the_last_terminator_of_a_run() {
        assert_eq!(sentences("Wait!! Now"), vec!["Wait!!", "Now"]);
    }

    #[test]
    fn normalize_ws_collapses_runs() {
        assert_eq!(normalize_ws("  a \n\t b  c "), "a b c");
    }
}
