//! Query text canonicalization

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

/// Filler words dropped before key derivation
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up", "about",
    "into", "through", "during", "before", "after", "above", "below", "between", "among", "near",
    "close", "around", "looking", "want", "need", "searching",
];

/// Deterministic, lossy query canonicalizer
///
/// Lowercases, replaces punctuation with spaces, drops stop words and sorts
/// the remaining tokens, so `"2 bedroom flat London"` and
/// `"London flat, 2 bedroom"` normalize identically.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    stop_words: HashSet<String>,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl QueryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds more stop words on top of the defaults
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Sorted, stop-word-free tokens of the query
    pub fn tokens(&self, query: &str) -> Vec<String> {
        let lowered = query.trim().to_lowercase();
        let stripped = NON_WORD.replace_all(&lowered, " ");

        let mut tokens: Vec<String> = stripped
            .split_whitespace()
            .filter(|t| !self.is_stop_word(t))
            .map(str::to_string)
            .collect();

        tokens.sort();
        tokens
    }

    pub fn normalize(&self, query: &str) -> String {
        self.tokens(query).join(" ")
    }
}
