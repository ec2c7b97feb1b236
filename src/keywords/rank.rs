//! Frequency-weighted phrase ranking.
//!
//! Candidates are unigrams and bigrams taken from runs of content words that
//! do not cross sentence boundaries or stop words. A phrase scores its
//! occurrence count times the mean corpus frequency of its words. A phrase
//! whose words are all part of a higher-ranked phrase is dropped.

use super::{is_stop_word, words, KeywordExtractor};
use crate::error::Result;
use crate::summarize::split_sentences;
use std::collections::HashMap;

/// Keyphrase extractor over 1–2 word phrases with English stop words removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhraseRankExtractor;

#[derive(Debug)]
struct Candidate {
    words: Vec<String>,
    occurrences: usize,
    first_seen: usize,
}

impl KeywordExtractor for PhraseRankExtractor {
    fn extract(&self, text: &str, count: usize) -> Result<Vec<String>> {
        let runs = content_runs(text);

        let mut word_freq: HashMap<&str, usize> = HashMap::new();
        for run in &runs {
            for word in run {
                *word_freq.entry(word.as_str()).or_default() += 1;
            }
        }

        let mut candidates: HashMap<String, Candidate> = HashMap::new();
        let mut position = 0;
        for run in &runs {
            for (i, word) in run.iter().enumerate() {
                add_candidate(&mut candidates, std::slice::from_ref(word), position);
                if let Some(next) = run.get(i + 1) {
                    add_candidate(&mut candidates, &[word.clone(), next.clone()], position);
                }
                position += 1;
            }
        }

        let score = |c: &Candidate| {
            let mean = c
                .words
                .iter()
                .map(|w| word_freq.get(w.as_str()).copied().unwrap_or(0) as f64)
                .sum::<f64>()
                / c.words.len() as f64;
            c.occurrences as f64 * mean
        };

        let mut ranked: Vec<(f64, Candidate)> =
            candidates.into_values().map(|c| (score(&c), c)).collect();
        ranked.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then(a.first_seen.cmp(&b.first_seen))
                .then(a.words.len().cmp(&b.words.len()))
        });

        let mut selected: Vec<Vec<String>> = Vec::new();
        for (_, candidate) in ranked {
            if selected.len() == count {
                break;
            }
            let covered = selected
                .iter()
                .any(|s| candidate.words.iter().all(|w| s.contains(w)));
            if !covered {
                selected.push(candidate.words);
            }
        }

        Ok(selected.into_iter().map(|w| w.join(" ")).collect())
    }
}

fn add_candidate(candidates: &mut HashMap<String, Candidate>, phrase: &[String], position: usize) {
    candidates
        .entry(phrase.join(" "))
        .and_modify(|c| c.occurrences += 1)
        .or_insert_with(|| Candidate {
            words: phrase.to_vec(),
            occurrences: 1,
            first_seen: position,
        });
}

/// Maximal runs of content words within each sentence.
fn content_runs(text: &str) -> Vec<Vec<String>> {
    let mut runs = Vec::new();

    for sentence in split_sentences(text) {
        let mut current = Vec::new();
        for word in words(&sentence) {
            if is_content_word(&word) {
                current.push(word);
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
    }

    runs
}

fn is_content_word(word: &str) -> bool {
    word.chars().count() > 1 && !word.chars().all(|c| c.is_numeric()) && !is_stop_word(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Machine learning models need data. \
        Good data makes machine learning work. \
        Learning from data is the core of machine learning. \
        Researchers publish papers.";

    #[test]
    fn test_ranked_phrases() {
        let keywords = PhraseRankExtractor.extract(TEXT, 3).unwrap();
        assert_eq!(keywords, vec!["learning", "machine learning", "data"]);
    }

    #[test]
    fn test_respects_count() {
        assert_eq!(PhraseRankExtractor.extract(TEXT, 1).unwrap().len(), 1);
        let all = PhraseRankExtractor.extract(TEXT, 100).unwrap();
        assert!(all.len() < 100);
        assert!(all.iter().all(|k| k.split(' ').count() <= 2));
    }

    #[test]
    fn test_stop_words_never_appear() {
        let keywords = PhraseRankExtractor.extract(TEXT, 100).unwrap();
        for phrase in &keywords {
            for word in phrase.split(' ') {
                assert!(!is_stop_word(word), "{} in {:?}", word, phrase);
            }
        }
    }

    #[test]
    fn test_phrases_do_not_cross_sentences() {
        let keywords = PhraseRankExtractor.extract("Alpha beta. Gamma delta.", 10).unwrap();
        assert!(!keywords.contains(&"beta gamma".to_string()));
    }

    #[test]
    fn test_empty_text() {
        assert!(PhraseRankExtractor.extract("", 5).unwrap().is_empty());
        assert!(PhraseRankExtractor.extract("the and of", 5).unwrap().is_empty());
    }
}
