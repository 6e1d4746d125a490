//! The token counting capability and its character-based estimator.

use refiner_config::{TokenizerConfig, TokenizerMode};
use refiner_core::TokenizerError;

/// Maps text to a token count.
pub trait TokenCounter {
    /// Count the tokens in `text`.
    fn count(&self, text: &str) -> usize;

    /// `true` when counts come from a real tokenizer rather than an estimate.
    ///
    /// Estimating counters get a safety margin applied to the budget.
    fn is_exact(&self) -> bool;

    /// Human-readable backend name, for logs.
    fn name(&self) -> &str;
}

impl<T: TokenCounter + ?Sized> TokenCounter for Box<T> {
    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }

    fn is_exact(&self) -> bool {
        (**self).is_exact()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Character-based heuristic: ~4 characters per token.
///
/// Accurate within ~10% for BPE tokenizers on English text, which is what
/// the default 0.9 safety factor compensates for. Any non-empty text costs
/// at least one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharEstimator {
    chars_per_token: usize,
}

impl CharEstimator {
    /// Estimator with the default ratio of 4 characters per token.
    pub fn new() -> Self {
        Self { chars_per_token: 4 }
    }

    /// Estimator with a custom ratio. A ratio of zero is treated as one.
    pub fn with_ratio(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for CharEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for CharEstimator {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        (text.chars().count() / self.chars_per_token).max(1)
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "char_estimator"
    }
}

/// Build the counter selected by configuration.
pub fn build_counter(config: &TokenizerConfig) -> Result<Box<dyn TokenCounter>, TokenizerError> {
    match config.mode {
        TokenizerMode::Estimate => {
            tracing::debug!(
                chars_per_token = config.chars_per_token,
                "Using character-based token estimation"
            );
            Ok(Box::new(CharEstimator::with_ratio(config.chars_per_token)))
        }
        TokenizerMode::Exact => build_exact(config),
    }
}

#[cfg(feature = "exact")]
fn build_exact(config: &TokenizerConfig) -> Result<Box<dyn TokenCounter>, TokenizerError> {
    let path = config.path.as_deref().ok_or_else(|| {
        TokenizerError::Unavailable("exact mode requires tokenizer.path".into())
    })?;
    Ok(Box::new(crate::exact::ExactCounter::from_file(path)?))
}

#[cfg(not(feature = "exact"))]
fn build_exact(_config: &TokenizerConfig) -> Result<Box<dyn TokenCounter>, TokenizerError> {
    Err(TokenizerError::Unavailable(
        "this build was compiled without the `exact` feature".into(),
    ))
}
