//! English stop list used by keyword ranking and sentence similarity.

/// English stop words, sorted for binary search.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "also", "am", "an", "and",
    "any", "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "couldn", "did", "didn", "do", "does",
    "doesn", "doing", "don", "down", "during", "each", "else", "etc", "ever", "every", "few",
    "for", "from", "further", "get", "gets", "got", "had", "hadn", "has", "hasn", "have",
    "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll", "me",
    "might", "more", "most", "much", "must", "mustn", "my", "myself", "needn", "no", "nor",
    "not", "now", "of", "off", "often", "on", "once", "one", "only", "or", "other", "our",
    "ours", "ourselves", "out", "over", "own", "re", "same", "shall", "shan", "she", "should",
    "shouldn", "since", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "though", "through", "to",
    "too", "under", "until", "up", "upon", "us", "ve", "very", "was", "wasn", "we", "were",
    "weren", "what", "when", "where", "whether", "which", "while", "who", "whom", "why", "will",
    "with", "won", "would", "wouldn", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Whether a lower-cased word is an English stop word.
///
/// Contractions count by their stem, so `it's` and `don't` are stop words.
pub fn is_stop_word(word: &str) -> bool {
    let stem = word.split(['\'', '\u{2019}']).next().unwrap_or(word);
    STOP_WORDS.binary_search(&word).is_ok() || STOP_WORDS.binary_search(&stem).is_ok()
}
