//! Text refinement operations.
//!
//! Every operation implements [`refiner_core::Operation`] and can be passed
//! to the packer's `refine_with`, or chained into a [`Refiner`] pipeline:
//!
//! ```text
//! raw HTML ─▶ StripHtml ─▶ NormalizeWhitespace ─▶ TruncateTokens ─▶ packed item
//! ```
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`cleaner`] | [`StripHtml`], [`NormalizeWhitespace`], [`FixUnicode`] |
//! | [`compressor`] | [`TruncateTokens`], [`Deduplicate`] |
//! | [`scrubber`] | [`RedactPii`] |
//! | [`pipeline`] | [`Refiner`] |
//! | [`registry`] | [`build_operation`], [`build_refiner`] from configuration |

pub mod cleaner;
pub mod compressor;
pub mod pipeline;
pub mod registry;
pub mod scrubber;
mod text;

pub use cleaner::{FixUnicode, NormalizeWhitespace, StripHtml};
pub use compressor::{Deduplicate, Granularity, SimilarityMethod, TruncateStrategy, TruncateTokens};
pub use pipeline::Refiner;
pub use registry::{build_operation, build_refiner};
pub use scrubber::{PiiKind, RedactPii};
