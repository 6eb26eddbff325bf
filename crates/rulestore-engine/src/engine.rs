//! The resolution facade.
//!
//! [`Engine`] ties the pipeline together: it holds a [`StoreHandle`],
//! takes a snapshot per query, and runs match → order → compose. All of
//! that is pure computation over the immutable snapshot, so any number of
//! resolutions may run concurrently, including across a reload.

use rulestore_core::{Error, Result};

use crate::compositor::{compose, ResolvedRuleSet};
use crate::index::{RuleIndex, StoreHandle};
use crate::loader::{LoadStats, Loader};
use crate::matcher::match_query;
use crate::query::ResolutionQuery;
use crate::resolver::resolve_order;

/// How unresolved precedence conflicts are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Conflicts abort resolution with [`Error::AmbiguousPrecedence`].
    Strict,
    /// Conflicts are passed through as data on the result.
    #[default]
    Lenient,
}

/// Resolution engine over a loaded document store.
#[derive(Clone, Debug)]
pub struct Engine {
    handle: StoreHandle,
}

impl Engine {
    /// Wraps a freshly built index.
    pub fn new(index: RuleIndex) -> Self {
        Self {
            handle: StoreHandle::new(index),
        }
    }

    /// A clone of the underlying store handle.
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Rebuilds the index from the loader's roots and swaps it in.
    ///
    /// In-flight resolutions keep the snapshot they started with; a
    /// failed reload leaves the current index untouched.
    pub async fn reload(&self, loader: &Loader) -> Result<LoadStats> {
        let (index, stats) = loader.load().await?;
        self.handle.swap(index);
        Ok(stats)
    }

    /// Resolves a query into a merged rule set.
    ///
    /// Zero matches is not an error: the result is empty and carries a
    /// `no_match` warning. In [`ResolveMode::Strict`], unresolved
    /// precedence conflicts become [`Error::AmbiguousPrecedence`];
    /// lenient mode annotates the result instead.
    pub fn resolve(&self, query: &ResolutionQuery, mode: ResolveMode) -> Result<ResolvedRuleSet> {
        query.validate()?;

        let index = self.handle.snapshot();
        let matches = match_query(&index, query);
        if matches.is_empty() {
            log::warn!("no documents matched query ({})", query.describe());
            return Ok(ResolvedRuleSet::no_match(&query.describe()));
        }

        let (ordered, conflicts) = resolve_order(&index, &matches);

        if mode == ResolveMode::Strict && !conflicts.is_empty() {
            return Err(Error::AmbiguousPrecedence {
                conflicts: conflicts.iter().map(|c| c.describe()).collect(),
            });
        }

        Ok(compose(&ordered, conflicts))
    }
}

// ============================================================================
// Tests
// ============================================================================
