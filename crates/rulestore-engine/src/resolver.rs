//! Precedence resolution.
//!
//! Orders a set of scope matches into resolution order — least specific
//! first, so later documents win — and detects the ties the engine
//! refuses to break silently.
//!
//! Ordering rules:
//!
//! 1. Documents connected by `extends` form a chain (a subtree, when one
//!    parent has several matched children) and stay adjacent: a child
//!    always orders after its matched parent, whatever its raw
//!    specificity. An explicit extends relationship is stronger evidence
//!    of intended precedence than a computed score.
//! 2. Chain roots and unrelated documents order by ascending specificity,
//!    then ascending `precedence_hint` (higher hint wins, meaning later),
//!    then id.
//! 3. Unrelated same-tier documents with equal (or absent) hints that
//!    contest a section — both declare it and at least one gives it
//!    replace semantics — produce a [`Conflict`]. The id fallback keeps
//!    the output order deterministic, but the conflict is surfaced so no
//!    winner is ever picked silently.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::document::RuleDocument;
use crate::index::RuleIndex;
use crate::matcher::ScopeMatch;

/// An unresolved precedence tie over one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// The contested section name.
    pub section: String,
    /// Ids of the documents contesting it, sorted.
    pub contenders: Vec<String>,
}

impl Conflict {
    /// Single-line rendering used in strict-mode errors.
    pub fn describe(&self) -> String {
        format!(
            "section '{}': {}",
            self.section,
            self.contenders.join(" vs ")
        )
    }
}

/// Sort key: ascending specificity, then hint, then id.
fn order_key<'a>(doc: &'a RuleDocument, specificity: u32) -> (u32, i64, &'a str) {
    (specificity, doc.precedence_hint.unwrap_or(0), &doc.id)
}

/// Orders matched documents and detects unresolved conflicts.
///
/// The returned order is total and deterministic for a given index and
/// match set; conflicts are reported alongside rather than breaking the
/// order, so lenient callers can still compose.
pub fn resolve_order<'a>(
    index: &'a RuleIndex,
    matches: &[ScopeMatch],
) -> (Vec<&'a RuleDocument>, Vec<Conflict>) {
    let specificity: HashMap<&str, u32> = matches
        .iter()
        .map(|m| (m.doc_id.as_str(), m.specificity))
        .collect();
    let matched: HashSet<&str> = specificity.keys().copied().collect();

    // Group matched documents under their matched chain root.
    let mut roots: BTreeSet<&str> = BTreeSet::new();
    for &id in &matched {
        roots.insert(matched_root(index, &matched, id));
    }

    // Order the roots by their own key.
    let mut roots: Vec<&str> = roots.into_iter().collect();
    roots.sort_by_key(|&id| match index.get(id) {
        Some(doc) => order_key(doc, specificity[id]),
        None => (u32::MAX, i64::MAX, id),
    });

    // Emit each chain: parent first, then matched children depth-first,
    // siblings ordered by key.
    let mut ordered: Vec<&RuleDocument> = Vec::with_capacity(matched.len());
    for root in roots {
        emit_chain(index, &matched, &specificity, root, &mut ordered);
    }

    let conflicts = detect_conflicts(index, &specificity, &ordered);
    (ordered, conflicts)
}

/// Walks extends pointers upwards while the parent is also matched.
fn matched_root<'a>(index: &RuleIndex, matched: &HashSet<&'a str>, id: &'a str) -> &'a str {
    // The loader guarantees acyclicity, so this walk terminates.
    let mut current = id;
    loop {
        let parent = index
            .get(current)
            .and_then(|d| d.extends.as_deref())
            .and_then(|p| matched.get(p).copied());
        match parent {
            Some(p) => current = p,
            None => return current,
        }
    }
}

fn emit_chain<'a>(
    index: &'a RuleIndex,
    matched: &HashSet<&str>,
    specificity: &HashMap<&str, u32>,
    id: &str,
    ordered: &mut Vec<&'a RuleDocument>,
) {
    let Some(doc) = index.get(id) else {
        return;
    };
    ordered.push(doc);

    let mut children: Vec<&str> = index
        .children_of(id)
        .into_iter()
        .filter(|child| matched.contains(*child))
        .collect();
    children.sort_by_key(|&child| match index.get(child) {
        Some(doc) => order_key(doc, specificity[child]),
        None => (u32::MAX, i64::MAX, child),
    });

    for child in children {
        emit_chain(index, matched, specificity, child, ordered);
    }
}

/// Finds same-tier, extends-unrelated, hint-tied pairs contesting a
/// section.
fn detect_conflicts(
    index: &RuleIndex,
    specificity: &HashMap<&str, u32>,
    ordered: &[&RuleDocument],
) -> Vec<Conflict> {
    let mut contested: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            if specificity[a.id.as_str()] != specificity[b.id.as_str()] {
                continue;
            }
            if index.is_ancestor(&a.id, &b.id) || index.is_ancestor(&b.id, &a.id) {
                continue;
            }
            if a.precedence_hint != b.precedence_hint {
                // A differing hint is the supported escape hatch; the tie
                // is considered author-resolved.
                continue;
            }

            for section in &a.sections {
                if !b.declares_section(&section.name) {
                    continue;
                }
                let replace_semantics = a.replaces_section(&section.name)
                    || b.replaces_section(&section.name);
                if replace_semantics {
                    let entry = contested.entry(section.name.clone()).or_default();
                    entry.insert(a.id.clone());
                    entry.insert(b.id.clone());
                }
            }
        }
    }

    contested
        .into_iter()
        .map(|(section, contenders)| Conflict {
            section,
            contenders: contenders.into_iter().collect(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
