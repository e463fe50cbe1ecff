use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use crate::stemmer::IndonesianStemmer;
use crate::stopwords;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"https?://\S+").expect("valid regex");
    static ref DIGITS_RE: Regex = Regex::new(r"\d+").expect("valid regex");
    static ref WORD_RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_]*").expect("valid regex");
    static ref SHARED: Arc<Normalizer> = Arc::new(Normalizer::default());
}

/// The text preprocessing pipeline shared by every retrieval model.
///
/// Immutable once built. Models keep an `Arc<Normalizer>` so that documents and queries are
/// always reduced with the same stopword set and stemmer.
pub struct Normalizer {
    stopwords: HashSet<&'static str>,
    stemmer: IndonesianStemmer,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").field("stopwords", &self.stopwords.len()).finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            stopwords: stopwords::INDONESIAN.iter().copied().collect(),
            stemmer: IndonesianStemmer::new(),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Case-fold and strip URLs, digits and ASCII punctuation, then trim.
    pub fn clean(&self, text: &str) -> String {
        let folded = text.nfkc().collect::<String>().to_lowercase();
        let without_urls = URL_RE.replace_all(&folded, "");
        let without_digits = DIGITS_RE.replace_all(&without_urls, "");
        without_digits
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Full pipeline: clean, segment into words, drop stopwords and single characters, stem.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        WORD_RE
            .find_iter(&cleaned)
            .map(|m| m.as_str())
            .filter(|w| w.chars().count() > 1 && !self.is_stopword(w))
            .map(|w| self.stemmer.stem(w))
            .collect()
    }

    /// Normalized tokens joined with single spaces. Empty when nothing survives.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Process-wide pipeline, built on first use.
pub fn shared() -> Arc<Normalizer> {
    Arc::clone(&SHARED)
}

/// Normalize with the process-wide default pipeline.
pub fn normalize(text: &str) -> String {
    SHARED.normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t"), "");
    }

    #[test]
    fn strips_urls_digits_and_punctuation() {
        let n = Normalizer::default();
        assert_eq!(n.clean("Lihat https://contoh.id/a?b=1 ada 2021 kasus!"), "lihat  ada  kasus");
        assert_eq!(normalize("PPKM, Jakarta; 2021."), "ppkm jakarta");
    }

    #[test]
    fn only_stopwords_reduce_to_nothing() {
        assert_eq!(normalize("yang dan di ke dari"), "");
        assert_eq!(normalize("... !!! 123"), "");
    }

    #[test]
    fn single_characters_are_dropped() {
        assert_eq!(normalize("a b vaksin c"), "vaksin");
    }
}
