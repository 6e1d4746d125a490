//! Priority-based context packing.
//!
//! Fits prioritized content (system instructions, retrieved documents,
//! conversation turns, the current query) into a token budget and renders
//! what fits either as chat messages or as one prompt string.
//!
//! ```text
//! add ─▶ refine ─▶ count ─▶ store
//!                              │
//! pack(mode) ─▶ price (CostModel) ─▶ greedy select ─▶ restore order ─▶ render
//! ```
//!
//! | Module | Role |
//! |--------|------|
//! | [`item`] | [`Candidate`] builder, stored-item snapshots |
//! | [`budget`] | nominal vs effective token ceiling |
//! | [`cost`] | per-mode overhead schedules ([`ChatCost`], [`TextCost`]) |
//! | [`order`] | reading-order restoration |
//! | [`render`] | chat message and delimited text renderers |
//! | [`packer`] | [`Packer`] and [`PackedResult`] |

pub mod budget;
pub mod cost;
pub mod item;
pub mod order;
pub mod packer;
pub mod render;
mod selector;

pub use budget::{Budget, DEFAULT_SAFETY_FACTOR};
pub use cost::{ChatCost, CostModel, TextCost};
pub use item::{Candidate, ItemInfo, SelectedItem};
pub use packer::{PackedResult, Packer};
pub use render::{RenderMode, RenderOutput, TextFormat};
