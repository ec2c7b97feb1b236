//! TextRank sentence ranking.
//!
//! Sentences are graph nodes; edge weights are the normalized overlap of
//! their content words. Scores come from weighted PageRank.

use super::{split_sentences, Summarizer};
use crate::error::Result;
use crate::keywords::{is_stop_word, words};
use std::cmp::Ordering;
use std::collections::HashSet;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const CONVERGENCE: f64 = 1e-6;

/// Deterministic TextRank summarizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRankSummarizer;

impl Summarizer for TextRankSummarizer {
    fn summarize(&self, text: &str, sentence_count: usize) -> Result<Vec<String>> {
        let sentences = split_sentences(text);
        if sentences.len() <= sentence_count {
            return Ok(sentences);
        }

        let scores = rank(&sentences);
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| compare_scores(scores[b], scores[a]).then(a.cmp(&b)));

        let mut picked = Vec::with_capacity(sentence_count);
        let mut sentences: Vec<Option<String>> = sentences.into_iter().map(Some).collect();
        for idx in order.into_iter().take(sentence_count) {
            if let Some(sentence) = sentences[idx].take() {
                picked.push(sentence);
            }
        }
        Ok(picked)
    }
}

/// Compare at a fixed precision so symmetric sentences tie exactly.
fn compare_scores(a: f64, b: f64) -> Ordering {
    let quantize = |x: f64| (x * 1e9).round() as i64;
    quantize(a).cmp(&quantize(b))
}

fn content_words(sentence: &str) -> HashSet<String> {
    words(sentence)
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect()
}

fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let overlap = a.intersection(b).count() as f64;
    if overlap == 0.0 {
        return 0.0;
    }
    let norm = (a.len() as f64).ln() + (b.len() as f64).ln();
    if norm > 0.0 {
        overlap / norm
    } else {
        overlap
    }
}

fn rank(sentences: &[String]) -> Vec<f64> {
    let n = sentences.len();
    let bags: Vec<HashSet<String>> = sentences.iter().map(|s| content_words(s)).collect();

    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = similarity(&bags[i], &bags[j]);
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }
    let out_weight: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

    let mut scores = vec![1.0; n];
    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![1.0 - DAMPING; n];
        for (i, slot) in next.iter_mut().enumerate() {
            let incoming: f64 = (0..n)
                .filter(|&j| out_weight[j] > 0.0)
                .map(|j| weights[j][i] / out_weight[j] * scores[j])
                .sum();
            *slot += DAMPING * incoming;
        }

        let delta: f64 = next
            .iter()
            .zip(&scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;
        if delta < CONVERGENCE {
            break;
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_requested_number_of_original_sentences() {
        let text = "Sentence one. Sentence two. Sentence three.";
        let summary = TextRankSummarizer.summarize(text, 2).unwrap();

        assert_eq!(summary.len(), 2);
        let originals = split_sentences(text);
        for sentence in &summary {
            assert!(originals.contains(sentence));
        }
    }

    #[test]
    fn test_more_than_available_returns_everything() {
        let text = "Only one. And two.";
        let summary = TextRankSummarizer.summarize(text, 10).unwrap();
        assert_eq!(summary, vec!["Only one.", "And two."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(TextRankSummarizer.summarize("", 3).unwrap().is_empty());
    }

    #[test]
    fn test_central_sentence_ranks_first() {
        let text = "Rust compilers check ownership. \
                    Ownership rules make Rust compilers strict about memory. \
                    Memory safety follows from ownership in Rust. \
                    My cat sleeps all afternoon.";
        let summary = TextRankSummarizer.summarize(text, 1).unwrap();
        assert_eq!(
            summary,
            vec!["Ownership rules make Rust compilers strict about memory."]
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma. Beta gamma delta. Gamma delta epsilon. Zeta eta.";
        let first = TextRankSummarizer.summarize(text, 2).unwrap();
        let second = TextRankSummarizer.summarize(text, 2).unwrap();
        assert_eq!(first, second);
    }
}
