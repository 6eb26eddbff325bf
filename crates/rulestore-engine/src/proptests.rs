//! Property-based tests for the resolution pipeline.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use crate::compositor::compose;
use crate::document::{OverrideSpec, RuleDocument, ScopeSelector};
use crate::index::RuleIndex;
use crate::matcher::match_query;
use crate::query::ResolutionQuery;
use crate::resolver::resolve_order;

/// Builds a scope constraining the dimensions selected by `mask`, with
/// values that all match [`full_query`].
fn scope_from_mask(mask: u8) -> ScopeSelector {
    let mut scope = ScopeSelector::wildcard();
    if mask & 0b0001 != 0 {
        scope = scope.with_language("go");
    }
    if mask & 0b0010 != 0 {
        scope = scope.with_framework("gin");
    }
    if mask & 0b0100 != 0 {
        scope = scope.with_structure("modular");
    }
    if mask & 0b1000 != 0 {
        scope = scope.with_process("review");
    }
    scope
}

fn full_query() -> ResolutionQuery {
    ResolutionQuery::new("go")
        .with_framework("gin")
        .with_structure("modular")
        .with_process("review")
}

const SECTION_NAMES: [&str; 4] = ["layout", "testing", "style", "errors"];

proptest! {
    /// Constraining strictly more matching dimensions never lowers the
    /// specificity score.
    #[test]
    fn prop_specificity_monotonic(mask in 0u8..16, extra in 0u8..16) {
        let wider = mask | extra;

        let (index, _) = RuleIndex::build(vec![
            RuleDocument::new("narrow").with_scope(scope_from_mask(mask)),
            RuleDocument::new("wide").with_scope(scope_from_mask(wider)),
        ]).unwrap();

        let matches = match_query(&index, &full_query());
        let spec_of = |id: &str| {
            matches.iter().find(|m| m.doc_id == id).map(|m| m.specificity)
        };

        // Both documents only declare dimensions the query satisfies, so
        // both must match
        let narrow = spec_of("narrow").unwrap();
        let wide = spec_of("wide").unwrap();
        prop_assert!(wide >= narrow);
        prop_assert_eq!(narrow, u32::from(mask.count_ones()));
        prop_assert_eq!(wide, u32::from(wider.count_ones()));
    }

    /// If B extends A and both match, A always orders before B, whatever
    /// the raw specificity of either.
    #[test]
    fn prop_child_orders_after_parent(parent_mask in 0u8..16, child_mask in 0u8..16) {
        let (index, _) = RuleIndex::build(vec![
            RuleDocument::new("parent").with_scope(scope_from_mask(parent_mask)),
            RuleDocument::new("child")
                .with_scope(scope_from_mask(child_mask))
                .with_extends("parent"),
        ]).unwrap();

        let matches = match_query(&index, &full_query());
        let (ordered, _) = resolve_order(&index, &matches);

        let ids: Vec<&str> = ordered.iter().map(|d| d.id.as_str()).collect();
        let parent_pos = ids.iter().position(|id| *id == "parent").unwrap();
        let child_pos = ids.iter().position(|id| *id == "child").unwrap();
        prop_assert!(parent_pos < child_pos);
    }

    /// Replaying the same ordered document list produces byte-identical
    /// output, including provenance.
    #[test]
    fn prop_compose_deterministic(
        specs in prop::collection::vec(
            (0usize..SECTION_NAMES.len(), any::<bool>(), "[a-z ]{0,24}"),
            0..6,
        )
    ) {
        let docs: Vec<RuleDocument> = specs
            .iter()
            .enumerate()
            .map(|(i, (section, replaces, content))| {
                RuleDocument::new(format!("doc-{i}"))
                    .with_overrides(OverrideSpec::All(*replaces))
                    .with_section(SECTION_NAMES[*section], content.clone())
            })
            .collect();
        let ordered: Vec<&RuleDocument> = docs.iter().collect();

        let first = compose(&ordered, Vec::new());
        let second = compose(&ordered, Vec::new());

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        prop_assert_eq!(first_json, second_json);
    }

    /// An overriding document's section content always wins outright.
    #[test]
    fn prop_last_override_wins(
        contents in prop::collection::vec("[a-z]{1,12}", 2..5)
    ) {
        let docs: Vec<RuleDocument> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                RuleDocument::new(format!("doc-{i}"))
                    .with_overrides(OverrideSpec::All(true))
                    .with_section("layout", content.clone())
            })
            .collect();
        let ordered: Vec<&RuleDocument> = docs.iter().collect();

        let result = compose(&ordered, Vec::new());
        let layout = result.section("layout").unwrap();
        let last = format!("doc-{}", contents.len() - 1);

        prop_assert_eq!(layout.overridden_by.as_deref(), Some(last.as_str()));
        prop_assert_eq!(layout.content(), contents.last().unwrap().clone());
    }
}
