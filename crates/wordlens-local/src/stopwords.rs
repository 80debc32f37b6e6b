//! Stop-word sets.
//!
//! A [`StopWords`] value is built once and handed to the engines that need it; nothing here is
//! process-global.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use stop_words::LANGUAGE;
use wordlens_core::{Error, Result};

/// Read-only set of lower-cased stop words.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Empty set: nothing is a stop word.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Union of the English and Russian lists.
    pub fn english_russian() -> Self {
        let mut out = Self::empty();
        out.extend(stop_words::get(LANGUAGE::English).iter().map(|w| w.to_string()));
        out.extend(stop_words::get(LANGUAGE::Russian).iter().map(|w| w.to_string()));
        out
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::empty();
        out.extend(words);
        out
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .map_err(|e| Error::StopWords(format!("{}: {e}", path.display())))?;
        Ok(Self::from_words(
            txt.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        ))
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in words {
            let w = w.as_ref().trim();
            if !w.is_empty() {
                self.words.insert(w.to_lowercase());
            }
        }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
