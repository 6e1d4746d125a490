//! Error types for the refiner domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Budget overruns are deliberately absent: an item that does not fit is
//! dropped by the packer, never reported as a failure.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all refiner operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Packer errors ---
    #[error("Packer error: {0}")]
    Packer(#[from] PackerError),

    // --- Refinement errors ---
    #[error("Refinement error: {0}")]
    Refine(#[from] RefineError),

    // --- Token counting errors ---
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackerError {
    #[error("max_tokens must be greater than zero (got {max_tokens})")]
    InvalidBudget { max_tokens: usize },

    #[error("safety factor must be in (0.0, 1.0] (got {factor})")]
    InvalidSafetyFactor { factor: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefineError {
    #[error("Unknown refinement operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid options for {operation}: {reason}")]
    InvalidOperation { operation: String, reason: String },

    #[error("Refinement failed in {operation}: {reason}")]
    OperationFailed { operation: String, reason: String },
}

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Exact token counting unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to load tokenizer from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packer_error_displays_budget() {
        let err = Error::Packer(PackerError::InvalidBudget { max_tokens: 0 });
        assert!(err.to_string().contains("max_tokens"));
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn refine_error_displays_operation() {
        let err = Error::from(RefineError::OperationFailed {
            operation: "redact_pii".into(),
            reason: "bad pattern".into(),
        });
        assert!(err.to_string().contains("redact_pii"));
        assert!(err.to_string().contains("bad pattern"));
    }

    #[test]
    fn tokenizer_error_includes_path() {
        let err = TokenizerError::LoadFailed {
            path: PathBuf::from("/models/tokenizer.json"),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("/models/tokenizer.json"));
    }
}
