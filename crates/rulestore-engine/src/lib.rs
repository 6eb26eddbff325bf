//! Rulestore Engine — layered rule document resolution.
//!
//! Given a store of markdown rule documents with scope metadata, and a
//! query describing a file's context (language, framework, structure
//! variant, process), the engine selects the applicable documents, orders
//! them by specificity and explicit `extends` relationships, and merges
//! their sections into one resolved rule set with per-fragment
//! provenance.
//!
//! # Pipeline
//!
//! query → [`matcher`] (against the index built by [`loader`]) →
//! [`resolver`] (ordering, conflict detection) → [`compositor`] (merge).
//!
//! The index is immutable after load; reload builds a fresh index and
//! atomically swaps it behind a [`StoreHandle`], so concurrent queries
//! always see a consistent snapshot and never take a lock on the hot
//! path.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod compositor;
pub mod document;
pub mod engine;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod query;
pub mod resolver;
pub mod validate;

#[cfg(test)]
mod proptests;

// Re-export the main entry points at crate root
pub use compositor::{compose, Fragment, ResolvedRuleSet, ResolvedSection, Warning};
pub use document::{OverrideSpec, RuleDocument, ScopeSelector, Section};
pub use engine::{Engine, ResolveMode};
pub use index::{RuleIndex, StoreHandle};
pub use loader::{LoadOptions, LoadStats, Loader};
pub use matcher::{match_query, ScopeMatch};
pub use query::ResolutionQuery;
pub use resolver::{resolve_order, Conflict};
pub use validate::{StoreProblem, ValidationReport};
