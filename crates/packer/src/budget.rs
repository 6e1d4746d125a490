//! The token ceiling for one packer.

use refiner_core::PackerError;
use serde::{Deserialize, Serialize};

/// Default fraction of the budget usable when tokens are estimated.
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.9;

/// Nominal and effective token budget.
///
/// Estimated counts can undershoot a real tokenizer, so with an estimating
/// counter only `floor(max_tokens * safety_factor)` tokens are handed to
/// selection. An exact counter gets the full `max_tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    max_tokens: usize,
    safety_factor: f64,
    exact: bool,
    effective_max_tokens: usize,
}

impl Budget {
    pub fn new(max_tokens: usize, exact: bool, safety_factor: f64) -> Result<Self, PackerError> {
        if max_tokens == 0 {
            return Err(PackerError::InvalidBudget { max_tokens });
        }
        if !(safety_factor > 0.0 && safety_factor <= 1.0) {
            return Err(PackerError::InvalidSafetyFactor {
                factor: safety_factor,
            });
        }

        let effective_max_tokens = if exact {
            max_tokens
        } else {
            (max_tokens as f64 * safety_factor).floor() as usize
        };

        Ok(Self {
            max_tokens,
            safety_factor,
            exact,
            effective_max_tokens,
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn safety_factor(&self) -> f64 {
        self.safety_factor
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// The ceiling selection works against.
    pub fn effective_max_tokens(&self) -> usize {
        self.effective_max_tokens
    }
}
