//! Title tokenizer and stopword filter.
//!
//! A title is lowercased, split into word tokens, and filtered down to the
//! candidate keywords used for grouping. The stopword table is built once per
//! process and shared by every extractor.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use bookmarkup_shared::GroupingConfig;

use crate::stopwords;

/// Tokens must be longer than this many characters to count as keywords.
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 3;

/// Runs of Unicode word characters. Punctuation, whitespace, apostrophes and
/// hyphens all separate tokens.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word regex"));

static ENGLISH: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| stopwords::ENGLISH.iter().copied().collect());

// ---------------------------------------------------------------------------
// StopwordSet
// ---------------------------------------------------------------------------

/// The built-in English stopwords plus optional user additions.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    base: &'static HashSet<&'static str>,
    extra: HashSet<String>,
}

impl StopwordSet {
    /// The built-in English list.
    pub fn english() -> Self {
        Self {
            base: &ENGLISH,
            extra: HashSet::new(),
        }
    }

    /// Add words on top of the current set. Words are lowercased.
    pub fn with_extra<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    /// Whether `word` (already lowercase) is a stopword.
    pub fn contains(&self, word: &str) -> bool {
        self.base.contains(word) || self.extra.contains(word)
    }
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::english()
    }
}

// ---------------------------------------------------------------------------
// KeywordExtractor
// ---------------------------------------------------------------------------

/// Turns a bookmark title into its ordered candidate keywords.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: StopwordSet,
    min_len: usize,
}

impl KeywordExtractor {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self {
            stopwords,
            min_len: DEFAULT_MIN_KEYWORD_LEN,
        }
    }

    /// Override the minimum keyword length (tokens at or below it are dropped).
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Keywords of `title`, in left-to-right order.
    pub fn keywords(&self, title: &str) -> Vec<String> {
        let lowered = title.to_lowercase();
        WORD_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.stopwords.contains(token))
            .filter(|token| token.chars().count() > self.min_len)
            .map(str::to_string)
            .collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(StopwordSet::english())
    }
}

impl From<&GroupingConfig> for KeywordExtractor {
    fn from(config: &GroupingConfig) -> Self {
        Self::new(StopwordSet::english().with_extra(&config.extra_stopwords))
            .with_min_len(config.min_keyword_len)
    }
}
