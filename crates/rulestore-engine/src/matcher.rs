//! Scope matching.
//!
//! A document matches a query when every dimension it declares equals the
//! corresponding query value; undeclared dimensions are wildcards. There
//! is no partial inclusion: a document declaring `framework: gin` is out
//! of range for a query with no framework at all.
//!
//! Specificity counts the declared-and-matched dimensions, with one extra
//! point when a file glob matched — a glob pins the document to concrete
//! paths, which is stronger evidence of intent than a coarse language or
//! framework tag.

use glob::{MatchOptions, Pattern};
use serde::Serialize;

use crate::document::{RuleDocument, ScopeSelector};
use crate::index::RuleIndex;
use crate::query::ResolutionQuery;

/// A matched document together with its specificity score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeMatch {
    /// Matched document id.
    pub doc_id: String,
    /// Number of constrained-and-matched dimensions (+1 for a glob).
    pub specificity: u32,
}

/// Glob options: `*` stays within one path segment, `**` crosses them.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Matches every indexed document against a query.
///
/// Returns matches in sorted id order; scoring and exclusion are
/// per-document and independent, so the output for a given index and
/// query is always identical.
pub fn match_query(index: &RuleIndex, query: &ResolutionQuery) -> Vec<ScopeMatch> {
    index
        .documents()
        .filter_map(|doc| {
            score(doc, query).map(|specificity| ScopeMatch {
                doc_id: doc.id.clone(),
                specificity,
            })
        })
        .collect()
}

/// Scores one document against a query.
///
/// `None` means excluded; `Some(score)` means every declared dimension
/// matched.
fn score(doc: &RuleDocument, query: &ResolutionQuery) -> Option<u32> {
    let ScopeSelector {
        language,
        framework,
        structure,
        process,
        file_glob,
    } = &doc.scope;

    let mut specificity = 0;

    for (declared, queried) in [
        (language.as_deref(), Some(query.language())),
        (framework.as_deref(), query.framework()),
        (structure.as_deref(), query.structure()),
        (process.as_deref(), query.process()),
    ] {
        match declared {
            None => {}
            Some(value) if queried == Some(value) => specificity += 1,
            Some(_) => return None,
        }
    }

    if let Some(pattern) = file_glob {
        let path = query.file_path()?;
        // Invalid patterns are rejected at document parse time, so a
        // failure here means the document bypassed parsing; treat it as
        // a non-match rather than guessing.
        let pattern = Pattern::new(pattern).ok()?;
        if !pattern.matches_with(path, GLOB_OPTIONS) {
            return None;
        }
        specificity += 2;
    }

    Some(specificity)
}

// ============================================================================
// Tests
// ============================================================================
