//! Before/after token statistics for refinement pipelines.

use crate::counter::TokenCounter;
use serde::Serialize;

/// Token counts for a refined text, optionally compared with its original.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenStats {
    /// Tokens in the original text, when a comparison was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<usize>,
    /// Tokens in the refined text.
    pub refined: usize,
}

impl TokenStats {
    /// Measure a single text.
    pub fn measure(counter: &dyn TokenCounter, text: &str) -> Self {
        Self {
            original: None,
            refined: counter.count(text),
        }
    }

    /// Measure a refined text against the text it was produced from.
    pub fn compare(counter: &dyn TokenCounter, original: &str, refined: &str) -> Self {
        Self {
            original: Some(counter.count(original)),
            refined: counter.count(refined),
        }
    }

    /// Tokens saved by refinement. Negative if refinement grew the text.
    pub fn saved(&self) -> Option<i64> {
        self.original
            .map(|original| original as i64 - self.refined as i64)
    }

    /// Savings as a percentage of the original (0.0 for an empty original).
    pub fn saving_percent(&self) -> Option<f64> {
        let original = self.original?;
        let saved = self.saved()?;
        if original == 0 {
            return Some(0.0);
        }
        Some(saved as f64 / original as f64 * 100.0)
    }

    /// Human-readable report.
    pub fn format(&self) -> String {
        match (self.original, self.saved(), self.saving_percent()) {
            (Some(original), Some(saved), Some(pct)) => format!(
                "Original: {original} tokens\nRefined: {} tokens\nSaved: {saved} tokens ({pct:.1}%)",
                self.refined
            ),
            _ => format!("Tokens: {}", self.refined),
        }
    }
}
