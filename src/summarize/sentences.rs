//! Sentence segmentation shared by the summarizer and the keyword ranker.

use unicode_segmentation::UnicodeSegmentation;

/// Split text into whitespace-normalized sentences.
///
/// Boundaries follow Unicode sentence segmentation, so decimals, domains and
/// closing quotes stay attached to their sentence. Line breaks always end a
/// sentence. Trailing text without a terminator is kept as a final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|sentence| sentence.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|sentence| !sentence.is_empty())
        .collect()
}
