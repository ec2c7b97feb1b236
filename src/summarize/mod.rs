//! Extractive summarization.
//!
//! A [`Summarizer`] picks verbatim sentences out of a text. The sentence count
//! either comes from the caller or from [`auto_sentence_count`].

mod sentences;
mod textrank;

pub use sentences::split_sentences;
pub use textrank::TextRankSummarizer;

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// Selects the most salient sentences of a text.
pub trait Summarizer: Send + Sync {
    /// Return up to `sentence_count` original sentences, most salient first.
    ///
    /// Asking for more sentences than the text has returns all of them.
    fn summarize(&self, text: &str, sentence_count: usize) -> Result<Vec<String>>;
}

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceCount {
    Exact(usize),
    Auto,
}

impl SentenceCount {
    /// Reject zero before anything runs.
    pub fn validate(self) -> Result<Self> {
        match self {
            SentenceCount::Exact(0) => Err(RecapError::InvalidInput(
                "sentence_count must be at least 1".to_string(),
            )),
            other => Ok(other),
        }
    }

    /// Concrete count for `text`.
    pub fn resolve(self, text: &str) -> usize {
        match self {
            SentenceCount::Exact(n) => n,
            SentenceCount::Auto => auto_sentence_count(text),
        }
    }
}

/// Summary length from input size: 3 below 10 periods, 6 below 50, else 10.
pub fn auto_sentence_count(text: &str) -> usize {
    match text.matches('.').count() {
        0..=9 => 3,
        10..=49 => 6,
        _ => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_sentence_count_thresholds() {
        assert_eq!(auto_sentence_count(""), 3);
        assert_eq!(auto_sentence_count(&".".repeat(9)), 3);
        assert_eq!(auto_sentence_count(&".".repeat(10)), 6);
        assert_eq!(auto_sentence_count(&".".repeat(49)), 6);
        assert_eq!(auto_sentence_count(&".".repeat(50)), 10);
        assert_eq!(auto_sentence_count(&".".repeat(500)), 10);
    }

    #[test]
    fn test_auto_sentence_count_is_monotonic() {
        let mut text = String::new();
        let mut previous = auto_sentence_count(&text);
        for _ in 0..120 {
            text.push_str("Word.");
            let current = auto_sentence_count(&text);
            assert!([3, 6, 10].contains(&current));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_five_periods_selects_three() {
        let text = "One. Two. Three. Four. Five.";
        assert_eq!(SentenceCount::Auto.resolve(text), 3);
    }

    #[test]
    fn test_sentence_count_validation() {
        assert!(SentenceCount::Exact(0).validate().is_err());
        assert_eq!(SentenceCount::Exact(2).validate().unwrap().resolve("x"), 2);
        assert!(SentenceCount::Auto.validate().is_ok());
    }
}
