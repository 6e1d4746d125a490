//! Token counting for budget enforcement.
//!
//! The packer consumes a [`TokenCounter`] and never cares which one it got:
//!
//! | Counter | Accuracy | Budget used |
//! |---------|----------|-------------|
//! | [`CharEstimator`] | ~1 token per 4 chars | `max_tokens * safety_factor` |
//! | `ExactCounter` (feature `exact`) | sub-word tokenizer | `max_tokens` |
//!
//! The counter is chosen once, from configuration. Asking for exact counting
//! in a build without the tokenizer backend is a construction error; there is
//! no silent fallback to estimation.

pub mod counter;
#[cfg(feature = "exact")]
pub mod exact;
pub mod stats;

pub use counter::{build_counter, CharEstimator, TokenCounter};
#[cfg(feature = "exact")]
pub use exact::ExactCounter;
pub use stats::TokenStats;
