//! Pattern primitives for address resolution and keyword categorization
//!
//! Architectural Principle: Service Layer - Matchers are compiled once from configuration
//! - WordPattern performs whole-word tests for taxonomy names
//! - KeywordSet performs case-insensitive substring tests for free-text categories
//! - Both are immutable after construction and free of side effects

use crate::domain::{StandardizerError, StandardizerResult};
use regex::{Regex, RegexBuilder};

/// A compiled whole-word matcher for a single taxonomy name.
///
/// A match must be bounded on both sides by a non-word character or the
/// edge of the text, so `GUSA` matches `PUROK 3, GUSA` but not `GUSAWAN`.
#[derive(Debug, Clone)]
pub struct WordPattern {
    word: String,
    regex: Regex,
}

impl WordPattern {
    /// Compile a whole-word pattern; `word` is matched literally
    pub fn new(word: &str) -> StandardizerResult<Self> {
        let word = word.trim().to_uppercase();
        if word.is_empty() {
            return Err(StandardizerError::pattern("Cannot build a word pattern from empty text"));
        }

        let source = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&word));
        tracing::debug!("Compiling word pattern '{}' as '{}'", word, source);

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| StandardizerError::pattern(format!("Invalid pattern for '{word}': {e}")))?;

        Ok(Self { word, regex })
    }

    /// The normalized word this pattern matches
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Whether the word occurs in `text` as a whole word
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A fixed list of trigger terms backing one keyword category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    name: &'static str,
    terms: Vec<String>,
}

impl KeywordSet {
    /// Build a keyword set; terms are stored uppercased
    pub fn new<S: AsRef<str>>(name: &'static str, terms: &[S]) -> Self {
        Self {
            name,
            terms: terms
                .iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Category name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Trigger terms in declared order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether any term occurs in `text`, ignoring case. Empty text never matches.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let upper = text.to_uppercase();
        self.terms.iter().any(|t| upper.contains(t.as_str()))
    }
}
