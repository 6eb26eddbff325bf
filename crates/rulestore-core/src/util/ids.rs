//! Document ID derivation.
//!
//! A document's id is its store-relative path without the file extension,
//! each path segment normalized to lowercase kebab-case and joined with
//! `/`. Ids are stable across platforms (backslash separators are treated
//! the same as forward slashes) and independent of the root the document
//! was loaded from.

use std::path::Path;

/// Normalize a single path segment to lowercase kebab-case.
///
/// Trims whitespace, lowercases, converts underscores to hyphens, and
/// collapses internal whitespace runs into single hyphens.
///
/// # Examples
///
/// ```
/// use rulestore_core::util::ids::normalize_segment;
///
/// assert_eq!(normalize_segment("Go_Frameworks"), "go-frameworks");
/// assert_eq!(normalize_segment("  On Demand  "), "on-demand");
/// assert_eq!(normalize_segment("gin"), "gin");
/// ```
pub fn normalize_segment(segment: &str) -> String {
    segment
        .trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("-")
}

/// Derive a document id from a store-relative path.
///
/// The final segment has its extension stripped; every segment is
/// normalized with [`normalize_segment`]; segments are joined with `/`.
/// Returns `None` for paths with no usable file stem.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rulestore_core::util::ids::doc_id_from_rel_path;
///
/// assert_eq!(
///     doc_id_from_rel_path(Path::new("rules/go/base.md")),
///     Some("rules/go/base".to_string())
/// );
/// assert_eq!(
///     doc_id_from_rel_path(Path::new("processes/_ondemand/Code_Review.md")),
///     Some("processes/ondemand/code-review".to_string())
/// );
/// assert_eq!(doc_id_from_rel_path(Path::new("")), None);
/// ```
pub fn doc_id_from_rel_path(rel: &Path) -> Option<String> {
    let stem = rel.file_stem().and_then(|s| s.to_str())?;
    if stem.is_empty() {
        return None;
    }

    let mut segments: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .map(normalize_segment)
        .filter(|s| !s.is_empty())
        .collect();
    segments.push(normalize_segment(stem));

    Some(segments.join("/"))
}
