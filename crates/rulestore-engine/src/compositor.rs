//! Composition of ordered documents into a resolved rule set.
//!
//! For each section name appearing anywhere in the ordered set (first
//! appearance fixes its position), contributions accumulate in resolution
//! order: a contributor with replace semantics for the section discards
//! everything before it and becomes the recorded winner; additive
//! contributors append beneath. Sections declared only by earlier
//! documents pass through inherited and untouched.
//!
//! Every fragment keeps the id of the document that supplied it, so a
//! consumer can trace why any instruction appears in the output.

use serde::Serialize;

use crate::document::RuleDocument;
use crate::resolver::Conflict;

/// One provenance-tagged piece of a resolved section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Id of the document that contributed this content.
    pub source: String,
    /// The contributed content.
    pub content: String,
}

/// A merged section with full provenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedSection {
    /// Section name.
    pub name: String,
    /// Contributions in resolution order. The first fragment is the
    /// winning override's content when `overridden_by` is set.
    pub fragments: Vec<Fragment>,
    /// Id of the last document that replaced this section, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden_by: Option<String>,
}

impl ResolvedSection {
    /// The merged content: fragments joined by blank lines.
    pub fn content(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.content.as_str())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Ids of every contributing document, in fragment order.
    pub fn sources(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.source.as_str()).collect()
    }
}

/// A non-fatal advisory attached to a resolution result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Stable snake_case warning code (e.g. `no_match`).
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Warning {
    /// Creates the `no_match` warning for a query description.
    pub fn no_match(query: &str) -> Self {
        Self {
            code: "no_match".to_string(),
            message: format!("no documents matched query ({query})"),
        }
    }
}

/// The merged outcome of one resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResolvedRuleSet {
    /// Contributing document ids in resolution order.
    pub order: Vec<String>,
    /// Merged sections, positioned by first appearance.
    pub sections: Vec<ResolvedSection>,
    /// Unresolved precedence conflicts (lenient mode passes these
    /// through; strict mode turns them into an error upstream).
    pub conflicts: Vec<Conflict>,
    /// Advisories such as `no_match`.
    pub warnings: Vec<Warning>,
}

impl ResolvedRuleSet {
    /// An empty result carrying a `no_match` warning.
    pub fn no_match(query_description: &str) -> Self {
        Self {
            warnings: vec![Warning::no_match(query_description)],
            ..Self::default()
        }
    }

    /// True when no document contributed.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up a merged section by name.
    pub fn section(&self, name: &str) -> Option<&ResolvedSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Merges ordered documents into a [`ResolvedRuleSet`].
///
/// Deterministic: the same ordered list always produces byte-identical
/// sections and provenance.
pub fn compose(ordered: &[&RuleDocument], conflicts: Vec<Conflict>) -> ResolvedRuleSet {
    let order: Vec<String> = ordered.iter().map(|d| d.id.clone()).collect();

    // Fix section positions by first appearance across the ordered set.
    let mut names: Vec<&str> = Vec::new();
    for doc in ordered {
        for section in &doc.sections {
            if !names.contains(&section.name.as_str()) {
                names.push(&section.name);
            }
        }
    }

    let mut sections = Vec::with_capacity(names.len());
    for name in names {
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut overridden_by: Option<String> = None;

        for doc in ordered {
            let Some(section) = doc.section(name) else {
                continue;
            };
            if doc.replaces_section(name) {
                // Replace semantics: discard everything ordered before
                fragments.clear();
                overridden_by = Some(doc.id.clone());
            }
            fragments.push(Fragment {
                source: doc.id.clone(),
                content: section.content.clone(),
            });
        }

        sections.push(ResolvedSection {
            name: name.to_string(),
            fragments,
            overridden_by,
        });
    }

    ResolvedRuleSet {
        order,
        sections,
        conflicts,
        warnings: Vec::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
