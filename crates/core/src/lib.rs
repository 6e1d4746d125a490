//! # Refiner Core
//!
//! Domain types, traits, and error definitions for the prompt refiner toolkit.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that the token counters, refinement operations, and the context packer all
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every pluggable capability is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with closure-backed operations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod operation;

// Re-export key types at crate root for ergonomics
pub use error::{Error, PackerError, RefineError, Result, TokenizerError};
pub use message::{
    ChatMessage, ChatRole, Priority, Role, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM,
    PRIORITY_SYSTEM, PRIORITY_USER,
};
pub use operation::{from_fn, FnOperation, Operation};
