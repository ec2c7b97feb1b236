//! Keyphrase extraction.

mod rank;
mod stopwords;

pub use rank::PhraseRankExtractor;
pub use stopwords::is_stop_word;

use crate::error::Result;
use unicode_segmentation::UnicodeSegmentation;

/// Extracts ranked 1–2 word keyphrases.
pub trait KeywordExtractor: Send + Sync {
    /// At most `count` phrases, most relevant first. No scores are exposed.
    fn extract(&self, text: &str, count: usize) -> Result<Vec<String>>;
}

/// Lower-cased words of `text` by Unicode word boundaries, in order.
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}
