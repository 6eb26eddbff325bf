//! # rulestore-cli
//!
//! Command-line interface for the Rulestore resolution engine:
//!
//! - `rulestore resolve` — resolve a query against one or more document
//!   roots and print the merged rule set
//! - `rulestore validate` — check a document store for structural
//!   problems, reporting every one found (CI-friendly)
//!
//! Exit codes: `0` success (including no-match), `1` load/store errors,
//! `2` unresolved precedence conflicts under `--strict`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod commands;
pub mod error;

pub use error::{Error, Result};
