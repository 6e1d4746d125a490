//! Exact sub-word token counting backed by a Hugging Face `tokenizer.json`.

use crate::counter::TokenCounter;
use refiner_core::TokenizerError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

/// Counts tokens with a real tokenizer.
pub struct ExactCounter {
    tokenizer: Tokenizer,
    name: String,
}

impl ExactCounter {
    /// Load a tokenizer definition from disk.
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        if !path.exists() {
            return Err(TokenizerError::LoadFailed {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            });
        }

        let tokenizer = Tokenizer::from_file(path).map_err(|e| TokenizerError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let counter = Self::from_tokenizer(tokenizer, format!("tokenizer:{}", path.display()))?;
        info!(path = %path.display(), "Exact tokenizer loaded");
        Ok(counter)
    }

    /// Parse a tokenizer definition held in memory (the `tokenizer.json` format).
    pub fn from_json(json: &str, name: impl Into<String>) -> Result<Self, TokenizerError> {
        let name = name.into();
        let tokenizer = Tokenizer::from_str(json).map_err(|e| TokenizerError::LoadFailed {
            path: PathBuf::from(&name),
            reason: e.to_string(),
        })?;
        Self::from_tokenizer(tokenizer, name)
    }

    /// Wrap an already-built tokenizer.
    ///
    /// Truncation and padding are switched off: a truncating tokenizer
    /// reports at most `max_length` ids and would price long content far
    /// below its real size.
    pub fn from_tokenizer(
        mut tokenizer: Tokenizer,
        name: impl Into<String>,
    ) -> Result<Self, TokenizerError> {
        let name = name.into();
        if tokenizer.get_truncation().is_some() || tokenizer.get_padding().is_some() {
            debug!(name = %name, "Disabling tokenizer truncation and padding");
        }
        tokenizer
            .with_truncation(None)
            .map_err(|e| TokenizerError::LoadFailed {
                path: PathBuf::from(&name),
                reason: e.to_string(),
            })?;
        tokenizer.with_padding(None);

        Ok(Self { tokenizer, name })
    }
}

impl TokenCounter for ExactCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().len(),
            Err(e) => {
                // A byte-level tokenizer never emits more tokens than bytes,
                // so this bound can only overcount.
                warn!(error = %e, "Tokenizer encode failed, charging byte length");
                text.len()
            }
        }
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
