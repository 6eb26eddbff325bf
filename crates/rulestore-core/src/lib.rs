//! Rulestore Core — shared error types and identifier utilities.
//!
//! This crate provides the foundational types used across all Rulestore
//! crates. It has no internal Rulestore dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types, stable error codes, and the Result alias
//! - [`util`]: Document ID derivation and normalization

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

// Convenience re-exports from util
pub use util::ids::{doc_id_from_rel_path, normalize_segment};
