//! Compression operations: truncation and near-duplicate removal.

use crate::text::{split_paragraphs, split_sentences, word_count};
use refiner_core::{Operation, RefineError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which part of the text survives truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TruncateStrategy {
    /// Keep the beginning
    #[default]
    Head,
    /// Keep the end
    Tail,
    /// Keep both ends, joined by `...`
    MiddleOut,
}

/// Truncate text to a word budget.
///
/// Words stand in for tokens here: the operation runs before the packer's
/// counter is known, and a word is never cheaper than a token.
#[derive(Debug, Clone, Copy)]
pub struct TruncateTokens {
    max_tokens: usize,
    strategy: TruncateStrategy,
    respect_sentence_boundary: bool,
}

impl TruncateTokens {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            strategy: TruncateStrategy::Head,
            respect_sentence_boundary: true,
        }
    }

    pub fn strategy(mut self, strategy: TruncateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Prefer cutting between sentences when at least one whole sentence fits.
    pub fn respect_sentence_boundary(mut self, enabled: bool) -> Self {
        self.respect_sentence_boundary = enabled;
        self
    }

    fn split_budget(&self) -> (usize, usize) {
        let tail = self.max_tokens / 2;
        (self.max_tokens - tail, tail)
    }

    fn truncate_words(&self, words: &[&str]) -> String {
        let max = self.max_tokens;
        match self.strategy {
            TruncateStrategy::Head => words[..max].join(" "),
            TruncateStrategy::Tail => words[words.len() - max..].join(" "),
            TruncateStrategy::MiddleOut => {
                let (head, tail) = self.split_budget();
                let start = words[..head].join(" ");
                if tail == 0 {
                    return start;
                }
                let end = words[words.len() - tail..].join(" ");
                format!("{start} ... {end}")
            }
        }
    }

    /// Whole-sentence truncation. `None` when not even one sentence fits.
    fn truncate_sentences(&self, text: &str) -> Option<String> {
        let sentences = split_sentences(text);
        let take_front = |budget: usize, limit: usize| -> usize {
            let mut used = 0;
            let mut n = 0;
            for s in sentences.iter().take(limit) {
                let words = word_count(s);
                if used + words > budget {
                    break;
                }
                used += words;
                n += 1;
            }
            n
        };
        let take_back = |budget: usize, limit: usize| -> usize {
            let mut used = 0;
            let mut n = 0;
            for s in sentences.iter().rev().take(limit) {
                let words = word_count(s);
                if used + words > budget {
                    break;
                }
                used += words;
                n += 1;
            }
            n
        };

        match self.strategy {
            TruncateStrategy::Head => {
                let n = take_front(self.max_tokens, sentences.len());
                (n > 0).then(|| sentences[..n].join(" "))
            }
            TruncateStrategy::Tail => {
                let n = take_back(self.max_tokens, sentences.len());
                (n > 0).then(|| sentences[sentences.len() - n..].join(" "))
            }
            TruncateStrategy::MiddleOut => {
                let (head_budget, tail_budget) = self.split_budget();
                let head = take_front(head_budget, sentences.len());
                let tail = take_back(tail_budget, sentences.len() - head);
                if head == 0 && tail == 0 {
                    return None;
                }
                let start = sentences[..head].join(" ");
                let end = sentences[sentences.len() - tail..].join(" ");
                Some(match (head, tail) {
                    (0, _) => format!("... {end}"),
                    (_, 0) => format!("{start} ..."),
                    _ => format!("{start} ... {end}"),
                })
            }
        }
    }
}

impl Operation for TruncateTokens {
    fn name(&self) -> &str {
        "truncate_tokens"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= self.max_tokens {
            return Ok(text.to_string());
        }

        if self.respect_sentence_boundary {
            if let Some(out) = self.truncate_sentences(text) {
                return Ok(out);
            }
        }

        Ok(self.truncate_words(&words))
    }
}

/// How chunk similarity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Word-set overlap (fast)
    #[default]
    Jaccard,
    /// Normalized character edit distance
    Levenshtein,
}

/// Unit of deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Sentence,
    #[default]
    Paragraph,
}

/// Remove chunks that are near-duplicates of an earlier chunk.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicate {
    similarity_threshold: f64,
    method: SimilarityMethod,
    granularity: Granularity,
}

impl Deduplicate {
    pub fn new() -> Self {
        Self {
            similarity_threshold: 0.85,
            method: SimilarityMethod::Jaccard,
            granularity: Granularity::Paragraph,
        }
    }

    /// Chunks at or above this similarity (0.0–1.0) are dropped.
    pub fn threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn method(mut self, method: SimilarityMethod) -> Self {
        self.method = method;
        self
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self.method {
            SimilarityMethod::Jaccard => jaccard(a, b),
            SimilarityMethod::Levenshtein => levenshtein_similarity(a, b),
        }
    }
}

impl Default for Deduplicate {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for Deduplicate {
    fn name(&self) -> &str {
        "deduplicate"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RefineError::InvalidOperation {
                operation: self.name().into(),
                reason: format!(
                    "similarity_threshold must be within 0.0..=1.0 (got {})",
                    self.similarity_threshold
                ),
            });
        }

        let chunks = match self.granularity {
            Granularity::Sentence => split_sentences(text),
            Granularity::Paragraph => split_paragraphs(text),
        };
        if chunks.is_empty() {
            return Ok(text.to_string());
        }

        let mut kept: Vec<&str> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let duplicate = kept
                .iter()
                .any(|seen| self.similarity(chunk, seen) >= self.similarity_threshold);
            if duplicate {
                tracing::trace!(chunk, "Dropping near-duplicate chunk");
            } else {
                kept.push(chunk);
            }
        }

        let joiner = match self.granularity {
            Granularity::Sentence => " ",
            Granularity::Paragraph => "\n\n",
        };
        Ok(kept.join(joiner))
    }
}

fn jaccard(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let words_b: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    1.0 - distance as f64 / a.len().max(b.len()) as f64
}
