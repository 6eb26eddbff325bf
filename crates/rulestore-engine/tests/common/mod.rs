//! Common test utilities for engine integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// An on-disk document store rooted in a temp directory.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// The store root as an owned path (for `Loader::new`).
    pub fn root_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Writes a document at a store-relative path, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical layered fixture: a Go base document, a Gin framework
/// document extending it, and a modular structure document extending Gin
/// and overriding its `layout` section.
pub fn layered_go_store() -> TestStore {
    let store = TestStore::new();
    store.write(
        "rules/go/base.md",
        "---\n\
         scope:\n  language: go\n\
         ---\n\n\
         ## Style\n\nRun gofmt on every file.\n\n\
         ## Layout\n\nKeep a flat package layout.\n\n\
         ## Testing\n\nUse table-driven tests.\n",
    );
    store.write(
        "rules/go/frameworks/gin.md",
        "---\n\
         scope:\n  language: go\n  framework: gin\n\
         extends: rules/go/base\n\
         ---\n\n\
         ## Routing\n\nGroup routes by resource.\n\n\
         ## Testing\n\nDrive handlers with httptest.\n",
    );
    store.write(
        "rules/go/frameworks/structures/modular.md",
        "---\n\
         scope:\n  language: go\n  framework: gin\n  structure: modular\n\
         extends: rules/go/frameworks/gin\n\
         overrides: [layout]\n\
         ---\n\n\
         ## Layout\n\nOne module per bounded context.\n",
    );
    store
}
