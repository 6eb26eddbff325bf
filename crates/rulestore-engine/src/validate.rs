//! Store-wide structural validation.
//!
//! Where `load` is fail-fast, validation is collect-everything: one pass
//! reports every unparsable document, duplicate id, dangling extends
//! reference, and extends cycle it can find, then — on a structurally
//! sound store — runs a cross-product conflict scan: every combination of
//! language/framework/structure/process values declared anywhere in the
//! store is synthesized into a query and checked for ambiguous
//! precedence. Suitable for running in CI against the document store.
//!
//! The conflict scan probes tag dimensions only; file-glob scopes depend
//! on concrete file paths, which a store-level scan cannot enumerate.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use serde::Serialize;

use rulestore_core::Result;

use crate::document::RuleDocument;
use crate::index::{find_cycle, RuleIndex};
use crate::loader::{LoadOptions, Loader};
use crate::matcher::match_query;
use crate::query::ResolutionQuery;
use crate::resolver::{resolve_order, Conflict};

/// One structural defect found in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreProblem {
    /// Stable snake_case code (`malformed_document`, `duplicate_id`,
    /// `dangling_extends`, `cyclic_extends`, ...).
    pub code: String,
    /// The file involved, when the problem is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Human-readable explanation.
    pub message: String,
}

/// The outcome of a full store validation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// Documents that parsed successfully.
    pub documents: usize,
    /// Every structural problem found.
    pub problems: Vec<StoreProblem>,
    /// Ambiguous-precedence conflicts found by the cross-product scan.
    /// Advisory: they do not make the store structurally unsound.
    pub conflicts: Vec<Conflict>,
}

impl ValidationReport {
    /// True when the store is structurally sound (conflicts are
    /// advisory and do not count).
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validates every document under the loader's roots.
///
/// Only root-level I/O failures are returned as `Err`; per-document
/// problems all land in the report.
pub async fn validate_store(loader: &Loader) -> Result<ValidationReport> {
    let outcomes = loader.parse_all(LoadOptions::default()).await?;

    let mut problems: Vec<StoreProblem> = Vec::new();
    let mut docs: Vec<RuleDocument> = Vec::new();

    for (path, outcome) in outcomes {
        match outcome {
            Ok(doc) => docs.push(doc),
            Err(err) => problems.push(StoreProblem {
                code: err.code().to_string(),
                path: Some(path),
                message: err.to_string(),
            }),
        }
    }

    // Duplicate ids: keep the first claimant, report the rest.
    let mut by_id: HashMap<String, RuleDocument> = HashMap::with_capacity(docs.len());
    for doc in docs {
        if let Some(existing) = by_id.get(&doc.id) {
            problems.push(StoreProblem {
                code: "duplicate_id".to_string(),
                path: Some(doc.path.clone()),
                message: format!(
                    "duplicate document id '{}': also claimed by {}",
                    doc.id,
                    existing.path.display()
                ),
            });
        } else {
            by_id.insert(doc.id.clone(), doc);
        }
    }

    // Dangling extends references.
    let mut sorted_ids: Vec<String> = by_id.keys().cloned().collect();
    sorted_ids.sort();
    for id in &sorted_ids {
        let doc = &by_id[id];
        if let Some(parent) = &doc.extends {
            if !by_id.contains_key(parent) {
                problems.push(StoreProblem {
                    code: "dangling_extends".to_string(),
                    path: Some(doc.path.clone()),
                    message: format!("'{id}' extends unknown document '{parent}'"),
                });
            }
        }
    }

    // Every cycle, not just the first: after reporting a cycle, sever its
    // members' extends pointers and look again.
    let mut graph_docs = by_id.clone();
    while let Some(chain) = find_cycle(&graph_docs, &sorted_ids) {
        problems.push(StoreProblem {
            code: "cyclic_extends".to_string(),
            path: None,
            message: format!("cyclic extends chain: {}", chain.join(" -> ")),
        });
        for id in &chain {
            if let Some(doc) = graph_docs.get_mut(id) {
                doc.extends = None;
            }
        }
    }

    let documents = by_id.len();
    let conflicts = if problems.is_empty() {
        scan_conflicts(by_id.into_values().collect())?
    } else {
        Vec::new()
    };

    Ok(ValidationReport {
        documents,
        problems,
        conflicts,
    })
}

/// Cross-product conflict scan over every declared dimension value.
fn scan_conflicts(docs: Vec<RuleDocument>) -> Result<Vec<Conflict>> {
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    let mut languages: BTreeSet<String> = BTreeSet::new();
    let mut frameworks: BTreeSet<String> = BTreeSet::new();
    let mut structures: BTreeSet<String> = BTreeSet::new();
    let mut processes: BTreeSet<String> = BTreeSet::new();
    for doc in &docs {
        languages.extend(doc.scope.language.iter().cloned());
        frameworks.extend(doc.scope.framework.iter().cloned());
        structures.extend(doc.scope.structure.iter().cloned());
        processes.extend(doc.scope.process.iter().cloned());
    }
    if languages.is_empty() {
        // All-wildcard store: one synthetic language still probes the
        // wildcard-vs-wildcard ties.
        languages.insert("any".to_string());
    }

    let (index, _) = RuleIndex::build(docs)?;

    let optional = |values: &BTreeSet<String>| -> Vec<Option<String>> {
        std::iter::once(None)
            .chain(values.iter().cloned().map(Some))
            .collect()
    };

    let mut seen: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for language in &languages {
        for framework in optional(&frameworks) {
            let structure_choices = if framework.is_some() {
                optional(&structures)
            } else {
                vec![None]
            };
            for structure in structure_choices {
                for process in optional(&processes) {
                    let mut query = ResolutionQuery::new(language);
                    if let Some(fw) = &framework {
                        query = query.with_framework(fw);
                    }
                    if let Some(st) = &structure {
                        query = query.with_structure(st);
                    }
                    if let Some(p) = &process {
                        query = query.with_process(p);
                    }

                    let matches = match_query(&index, &query);
                    let (_, conflicts) = resolve_order(&index, &matches);
                    for conflict in conflicts {
                        seen.entry(conflict.section)
                            .or_default()
                            .extend(conflict.contenders);
                    }
                }
            }
        }
    }

    Ok(seen
        .into_iter()
        .map(|(section, contenders)| Conflict {
            section,
            contenders: contenders.into_iter().collect(),
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
