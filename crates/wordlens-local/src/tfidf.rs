//! TF-IDF over a small, fixed collection of documents.
//!
//! Documents are tokenized once at construction with [`whitespace_tokens`]; the engine is
//! immutable afterwards and every query is a pure function of that state.

use wordlens_core::{Error, Result, TermScore};

use crate::stopwords::StopWords;
use crate::textprep::whitespace_tokens;

/// Options for [`TfIdf::idf_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdfOptions {
    /// Accepted for call symmetry with [`TfIdf::tf`]. IDF is a collection-wide statistic, so this
    /// field is a no-op and never changes the result.
    pub doc_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TfIdf {
    documents: Vec<Vec<String>>,
    stopwords: StopWords,
}

impl TfIdf {
    /// Tokenize `documents` and keep `stopwords` for [`TfIdf::tf_idf`].
    ///
    /// Callers are expected to pass documents with at least two words each; nothing here
    /// enforces it.
    pub fn new<I, S>(documents: I, stopwords: StopWords) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = documents
            .into_iter()
            .map(|d| whitespace_tokens(d.as_ref()))
            .collect();
        Self {
            documents,
            stopwords,
        }
    }

    /// Same as [`TfIdf::new`] with the English + Russian stop-word set.
    pub fn with_default_stopwords<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(documents, StopWords::english_russian())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, doc_index: usize) -> Option<&[String]> {
        self.documents.get(doc_index).map(Vec::as_slice)
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    fn tokens(&self, doc_index: usize) -> Result<&[String]> {
        self.document(doc_index)
            .ok_or(Error::DocumentIndexOutOfRange {
                index: doc_index,
                len: self.documents.len(),
            })
    }

    /// Share of the tokens of `doc_index` equal to `word` (lower-cased). Zero for an empty
    /// document.
    pub fn tf(&self, word: &str, doc_index: usize) -> Result<f64> {
        let tokens = self.tokens(doc_index)?;
        if tokens.is_empty() {
            return Ok(0.0);
        }
        let word = word.to_lowercase();
        let hits = tokens.iter().filter(|t| **t == word).count();
        Ok(hits as f64 / tokens.len() as f64)
    }

    /// Smoothed IDF: `ln(N / (df + 1)) + 1`.
    ///
    /// `df` counts documents that contain the word at least once. With no documents at all the
    /// result is `-inf` (`ln(0) + 1`).
    pub fn idf(&self, word: &str) -> f64 {
        let word = word.to_lowercase();
        let df = self
            .documents
            .iter()
            .filter(|doc| doc.iter().any(|t| *t == word))
            .count();
        let n = self.documents.len() as f64;
        (n / (df as f64 + 1.0)).ln() + 1.0
    }

    /// [`TfIdf::idf`] with explicit options; see [`IdfOptions::doc_index`].
    pub fn idf_with(&self, word: &str, _opts: IdfOptions) -> f64 {
        self.idf(word)
    }

    /// `tf * idf`, or `0.0` straight away when `ignore_stopwords` is set and the word is a stop
    /// word. The short-circuit skips index validation too.
    pub fn tf_idf(&self, word: &str, doc_index: usize, ignore_stopwords: bool) -> Result<f64> {
        let word = word.to_lowercase();
        if ignore_stopwords && self.stopwords.contains(&word) {
            return Ok(0.0);
        }
        Ok(self.tf(&word, doc_index)? * self.idf(&word))
    }

    /// All three statistics for one word/document pair.
    pub fn score(&self, word: &str, doc_index: usize, ignore_stopwords: bool) -> Result<TermScore> {
        let word = word.to_lowercase();
        let tf = self.tf(&word, doc_index)?;
        let idf = self.idf(&word);
        let tf_idf = self.tf_idf(&word, doc_index, ignore_stopwords)?;
        Ok(TermScore {
            word,
            doc_index,
            tf,
            idf,
            tf_idf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn tf_counts_lowercased_matches() {
        let e = TfIdf::new(["The cat sat on the mat"], StopWords::empty());
        assert!(close(e.tf("the", 0).unwrap(), 2.0 / 6.0));
        assert!(close(e.tf("THE", 0).unwrap(), 2.0 / 6.0));
        assert_eq!(e.tf("dog", 0).unwrap(), 0.0);
    }

    #[test]
    fn tf_keeps_punctuation_distinct() {
        let e = TfIdf::new(["word word."], StopWords::empty());
        assert!(close(e.tf("word", 0).unwrap(), 0.5));
        assert!(close(e.tf("word.", 0).unwrap(), 0.5));
    }

    #[test]
    fn tf_of_empty_document_is_zero() {
        let e = TfIdf::new(["   "], StopWords::empty());
        assert_eq!(e.tf("anything", 0).unwrap(), 0.0);
    }

    #[test]
    fn tf_rejects_out_of_range_index() {
        let e = TfIdf::new(["a b", "c d"], StopWords::empty());
        let err = e.tf("a", 2).unwrap_err();
        assert!(matches!(
            err,
            Error::DocumentIndexOutOfRange { index: 2, len: 2 }
        ));
    }

    #[test]
    fn idf_single_document() {
        let e = TfIdf::new(["alpha beta"], StopWords::empty());
        assert!(close(e.idf("alpha"), (0.5f64).ln() + 1.0));
    }

    #[test]
    fn idf_word_in_both_of_two_documents() {
        let e = TfIdf::new(["red fish", "blue fish"], StopWords::empty());
        let idf = e.idf("fish");
        assert!(close(idf, (2.0f64 / 3.0).ln() + 1.0));
        assert!((idf - 0.5945).abs() < 1e-4);
    }

    #[test]
    fn idf_counts_containment_not_occurrences() {
        let e = TfIdf::new(["fish fish fish", "blue sky"], StopWords::empty());
        assert!(close(e.idf("fish"), 1.0f64.ln() + 1.0));
    }

    #[test]
    fn idf_of_absent_word_uses_laplace_smoothing() {
        let e = TfIdf::new(["a b", "c d", "e f"], StopWords::empty());
        assert!(close(e.idf("zzz"), 3.0f64.ln() + 1.0));
    }

    #[test]
    fn idf_of_empty_collection_is_negative_infinity() {
        let e = TfIdf::new(Vec::<String>::new(), StopWords::empty());
        assert!(e.is_empty());
        assert_eq!(e.idf("anything"), f64::NEG_INFINITY);
    }

    #[test]
    fn idf_doc_index_option_is_ignored() {
        let e = TfIdf::new(["a b", "b c"], StopWords::empty());
        let base = e.idf("b");
        assert_eq!(e.idf_with("b", IdfOptions { doc_index: Some(0) }), base);
        assert_eq!(e.idf_with("b", IdfOptions { doc_index: Some(99) }), base);
        assert_eq!(e.idf_with("b", IdfOptions::default()), base);
    }

    #[test]
    fn tf_idf_is_product_when_not_a_stop_word() {
        let e = TfIdf::new(["the cat sat", "a dog ran"], StopWords::from_words(["the"]));
        let got = e.tf_idf("cat", 0, true).unwrap();
        assert!(close(got, e.tf("cat", 0).unwrap() * e.idf("cat")));
    }

    #[test]
    fn tf_idf_zeroes_stop_words_only_when_asked() {
        let e = TfIdf::new(["the cat sat", "a dog ran"], StopWords::from_words(["the"]));
        assert_eq!(e.tf_idf("The", 0, true).unwrap(), 0.0);
        let kept = e.tf_idf("the", 0, false).unwrap();
        assert!(close(kept, (1.0 / 3.0) * ((2.0f64 / 2.0).ln() + 1.0)));
    }

    #[test]
    fn tf_idf_stop_word_short_circuits_before_index_check() {
        let e = TfIdf::new(["the cat"], StopWords::from_words(["the"]));
        assert_eq!(e.tf_idf("the", 42, true).unwrap(), 0.0);
        assert!(e.tf_idf("cat", 42, true).is_err());
    }

    #[test]
    fn default_stop_words_cover_english_and_russian() {
        let e = TfIdf::with_default_stopwords(["the cat и собака", "cat dog"]);
        assert_eq!(e.tf_idf("the", 0, true).unwrap(), 0.0);
        assert_eq!(e.tf_idf("и", 0, true).unwrap(), 0.0);
        assert!(e.tf_idf("собака", 0, true).unwrap() > 0.0);
    }

    #[test]
    fn score_reports_raw_tf_idf_even_for_stop_words() {
        let e = TfIdf::new(["the cat sat", "the dog"], StopWords::from_words(["the"]));
        let s = e.score("THE", 0, true).unwrap();
        assert_eq!(s.word, "the");
        assert!(close(s.tf, 1.0 / 3.0));
        assert!(close(s.idf, (2.0f64 / 3.0).ln() + 1.0));
        assert_eq!(s.tf_idf, 0.0);
    }

    proptest! {
        #[test]
        fn stop_words_always_score_zero(
            docs in proptest::collection::vec("[a-c]{1,2}( [a-c]{1,2}){1,6}", 1..5),
            word in "[a-c]{1,2}",
            idx in 0usize..8,
        ) {
            let e = TfIdf::new(&docs, StopWords::from_words([word.as_str()]));
            prop_assert_eq!(e.tf_idf(&word, idx, true).unwrap(), 0.0);
        }

        #[test]
        fn tf_is_a_fraction(
            docs in proptest::collection::vec("[a-c]{1,2}( [a-c]{1,2}){1,6}", 1..5),
            word in "[a-c]{1,2}",
        ) {
            let e = TfIdf::new(&docs, StopWords::empty());
            for i in 0..e.len() {
                let tf = e.tf(&word, i).unwrap();
                prop_assert!((0.0..=1.0).contains(&tf));
            }
        }
    }
}
