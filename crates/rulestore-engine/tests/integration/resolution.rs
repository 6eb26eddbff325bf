//! End-to-end resolution scenarios against on-disk stores.

use rulestore_engine::{Engine, Loader, ResolutionQuery, ResolveMode};

use crate::common::{layered_go_store, TestStore};

async fn engine_for(store: &TestStore) -> Engine {
    let loader = Loader::new([store.root_buf()]);
    let (index, _) = loader.load().await.unwrap();
    Engine::new(index)
}

// ----------------------------------------------------------------------------
// The layered go/gin/modular scenario
// ----------------------------------------------------------------------------

#[tokio::test]
async fn layered_store_resolves_base_gin_modular() {
    let store = layered_go_store();
    let engine = engine_for(&store).await;

    let query = ResolutionQuery::new("go")
        .with_framework("gin")
        .with_structure("modular");
    let result = engine.resolve(&query, ResolveMode::Strict).unwrap();

    assert_eq!(
        result.order,
        vec![
            "rules/go/base",
            "rules/go/frameworks/gin",
            "rules/go/frameworks/structures/modular",
        ]
    );

    // `layout` comes solely from the overriding structure document
    let layout = result.section("layout").unwrap();
    assert_eq!(layout.content(), "One module per bounded context.");
    assert_eq!(
        layout.sources(),
        vec!["rules/go/frameworks/structures/modular"]
    );
    assert_eq!(
        layout.overridden_by.as_deref(),
        Some("rules/go/frameworks/structures/modular")
    );

    // Everything else is inherited unchanged
    assert_eq!(
        result.section("style").unwrap().content(),
        "Run gofmt on every file."
    );
    assert_eq!(
        result.section("routing").unwrap().content(),
        "Group routes by resource."
    );
    // Additive sections concatenate parent-first
    assert_eq!(
        result.section("testing").unwrap().content(),
        "Use table-driven tests.\n\nDrive handlers with httptest."
    );
    assert!(result.conflicts.is_empty());
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn framework_query_excludes_structure_documents() {
    let store = layered_go_store();
    let engine = engine_for(&store).await;

    let query = ResolutionQuery::new("go").with_framework("gin");
    let result = engine.resolve(&query, ResolveMode::Strict).unwrap();

    assert_eq!(
        result.order,
        vec!["rules/go/base", "rules/go/frameworks/gin"]
    );
    // Without the structure document, the base layout stands
    assert_eq!(
        result.section("layout").unwrap().content(),
        "Keep a flat package layout."
    );
}

#[tokio::test]
async fn language_query_gets_base_only() {
    let store = layered_go_store();
    let engine = engine_for(&store).await;

    let result = engine
        .resolve(&ResolutionQuery::new("go"), ResolveMode::Strict)
        .unwrap();

    assert_eq!(result.order, vec!["rules/go/base"]);
}

// ----------------------------------------------------------------------------
// No-match behavior
// ----------------------------------------------------------------------------

#[tokio::test]
async fn unknown_framework_yields_no_match_warning() {
    let store = TestStore::new();
    store.write(
        "rules/go/frameworks/gin.md",
        "---\nscope:\n  language: go\n  framework: gin\n---\n\n## Routing\n\nGroups.\n",
    );
    let engine = engine_for(&store).await;

    let query = ResolutionQuery::new("go").with_framework("fiber");
    let result = engine.resolve(&query, ResolveMode::Strict).unwrap();

    assert!(result.is_empty());
    assert!(result.sections.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, "no_match");
    assert!(result.warnings[0].message.contains("framework=fiber"));
}

// ----------------------------------------------------------------------------
// Conflict behavior
// ----------------------------------------------------------------------------

fn conflicting_store() -> TestStore {
    let store = TestStore::new();
    store.write(
        "processes/ondemand/testing.md",
        "---\nscope:\n  language: go\noverrides: true\n---\n\n## Testing\n\nOn-demand.\n",
    );
    store.write(
        "processes/standard/testing.md",
        "---\nscope:\n  language: go\noverrides: true\n---\n\n## Testing\n\nStandard.\n",
    );
    store
}

#[tokio::test]
async fn strict_mode_names_both_contenders() {
    let store = conflicting_store();
    let engine = engine_for(&store).await;

    let err = engine
        .resolve(&ResolutionQuery::new("go"), ResolveMode::Strict)
        .unwrap_err();

    assert_eq!(err.code(), "ambiguous_precedence");
    assert_eq!(err.exit_code(), 2);
    let message = err.to_string();
    assert!(message.contains("processes/ondemand/testing"));
    assert!(message.contains("processes/standard/testing"));
    assert!(message.contains("testing"));
}

#[tokio::test]
async fn lenient_mode_surfaces_conflict_as_data() {
    let store = conflicting_store();
    let engine = engine_for(&store).await;

    let result = engine
        .resolve(&ResolutionQuery::new("go"), ResolveMode::Lenient)
        .unwrap();

    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].section, "testing");
    assert_eq!(
        result.conflicts[0].contenders,
        vec!["processes/ondemand/testing", "processes/standard/testing"]
    );
}

// ----------------------------------------------------------------------------
// File-glob refinement
// ----------------------------------------------------------------------------

#[tokio::test]
async fn glob_scoped_document_applies_to_matching_paths_only() {
    let store = layered_go_store();
    store.write(
        "rules/go/tests.md",
        "---\n\
         scope:\n  language: go\n  file: \"**/*_test.go\"\n\
         overrides: [testing]\n\
         ---\n\n\
         ## Testing\n\nAssert with require, not bare ifs.\n",
    );
    let engine = engine_for(&store).await;

    let test_file = ResolutionQuery::new("go").with_file_path("internal/api/user_test.go");
    let result = engine.resolve(&test_file, ResolveMode::Strict).unwrap();
    assert_eq!(
        result.section("testing").unwrap().content(),
        "Assert with require, not bare ifs."
    );

    let source_file = ResolutionQuery::new("go").with_file_path("internal/api/user.go");
    let result = engine.resolve(&source_file, ResolveMode::Strict).unwrap();
    assert_eq!(
        result.section("testing").unwrap().content(),
        "Use table-driven tests."
    );
}

// ----------------------------------------------------------------------------
// Determinism across load → resolve cycles
// ----------------------------------------------------------------------------

#[tokio::test]
async fn repeated_loads_resolve_identically() {
    let store = layered_go_store();
    let loader = Loader::new([store.root_buf()]);
    let query = ResolutionQuery::new("go")
        .with_framework("gin")
        .with_structure("modular");

    let (first_index, _) = loader.load().await.unwrap();
    let (second_index, _) = loader.load().await.unwrap();

    let first = Engine::new(first_index)
        .resolve(&query, ResolveMode::Strict)
        .unwrap();
    let second = Engine::new(second_index)
        .resolve(&query, ResolveMode::Strict)
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
