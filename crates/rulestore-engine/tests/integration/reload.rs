//! Reload and snapshot-isolation behavior.

use rulestore_engine::{Engine, Loader, ResolutionQuery, ResolveMode};

use crate::common::TestStore;

#[tokio::test]
async fn reload_picks_up_new_documents() {
    let store = TestStore::new();
    store.write(
        "rules/go/base.md",
        "---\nscope:\n  language: go\n---\n\n## Style\n\ngofmt.\n",
    );

    let loader = Loader::new([store.root_buf()]);
    let (index, _) = loader.load().await.unwrap();
    let engine = Engine::new(index);

    let query = ResolutionQuery::new("go").with_framework("gin");
    let before = engine.resolve(&query, ResolveMode::Lenient).unwrap();
    assert_eq!(before.order, vec!["rules/go/base"]);

    store.write(
        "rules/go/frameworks/gin.md",
        "---\nscope:\n  language: go\n  framework: gin\nextends: rules/go/base\n---\n\n## Routing\n\nGroups.\n",
    );
    let stats = engine.reload(&loader).await.unwrap();
    assert_eq!(stats.documents_parsed, 2);

    let after = engine.resolve(&query, ResolveMode::Lenient).unwrap();
    assert_eq!(
        after.order,
        vec!["rules/go/base", "rules/go/frameworks/gin"]
    );
}

#[tokio::test]
async fn snapshot_taken_before_reload_is_stable() {
    let store = TestStore::new();
    store.write(
        "rules/go/base.md",
        "---\nscope:\n  language: go\n---\n\n## Style\n\nold content\n",
    );

    let loader = Loader::new([store.root_buf()]);
    let (index, _) = loader.load().await.unwrap();
    let engine = Engine::new(index);

    // Simulate an in-flight query holding a snapshot across a reload
    let snapshot = engine.handle().snapshot();

    store.write(
        "rules/go/base.md",
        "---\nscope:\n  language: go\n---\n\n## Style\n\nnew content\n",
    );
    engine.reload(&loader).await.unwrap();

    let held = snapshot.get("rules/go/base").unwrap();
    assert_eq!(held.section("style").unwrap().content, "old content");

    let fresh = engine
        .resolve(&ResolutionQuery::new("go"), ResolveMode::Lenient)
        .unwrap();
    assert_eq!(fresh.section("style").unwrap().content(), "new content");
}

#[tokio::test]
async fn concurrent_resolutions_share_one_snapshot_each() {
    let store = TestStore::new();
    store.write(
        "rules/go/base.md",
        "---\nscope:\n  language: go\n---\n\n## Style\n\ngofmt.\n",
    );

    let loader = Loader::new([store.root_buf()]);
    let (index, _) = loader.load().await.unwrap();
    let engine = Engine::new(index);

    // The index is immutable, so parallel resolutions need no locking;
    // run a batch concurrently and check they all agree
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .resolve(&ResolutionQuery::new("go"), ResolveMode::Strict)
                .unwrap()
        }));
    }

    let mut outputs = Vec::new();
    for handle in handles {
        outputs.push(serde_json::to_string(&handle.await.unwrap()).unwrap());
    }
    outputs.dedup();
    assert_eq!(outputs.len(), 1);
}
