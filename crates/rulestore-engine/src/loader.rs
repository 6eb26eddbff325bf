//! Document store loading.
//!
//! [`Loader`] discovers markdown files under one or more roots, parses
//! them in parallel (one task per document, no shared mutable state), and
//! builds a [`RuleIndex`] at a single synchronization point after every
//! parse task has finished. The loader performs no precedence reasoning;
//! it only gets documents into memory and validated.
//!
//! Loading is fail-fast: the first malformed document (in path order, so
//! failures are deterministic) aborts the load, as does a duplicate id or
//! an extends cycle. Nothing is served from a partially built index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_walkdir::WalkDir;
use futures::StreamExt;
use rulestore_core::util::ids::doc_id_from_rel_path;
use rulestore_core::{Error, Result};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::document::RuleDocument;
use crate::index::RuleIndex;

// ============================================================================
// Options and statistics
// ============================================================================

/// Caller-tunable load behavior.
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Cancellation signal. Setting the watched value to `true` aborts
    /// remaining parse tasks; the load then fails with
    /// [`Error::LoadCancelled`] listing the documents left unparsed.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl LoadOptions {
    /// Options with a cancellation signal attached.
    pub fn with_cancel(cancel: watch::Receiver<bool>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }
}

/// Statistics from a completed load.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Markdown files discovered under all roots.
    pub files_discovered: usize,
    /// Documents successfully parsed and indexed.
    pub documents_parsed: usize,
    /// Extends references whose target exists in no loaded document,
    /// formatted `child-id -> missing-parent-id`.
    pub dangling_extends: Vec<String>,
    /// The roots that were loaded.
    pub roots: Vec<PathBuf>,
}

// ============================================================================
// Loader
// ============================================================================

/// Loads rule documents from content roots into a [`RuleIndex`].
#[derive(Debug, Clone)]
pub struct Loader {
    roots: Vec<PathBuf>,
}

impl Loader {
    /// Creates a loader over the given roots.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Loads the store with default options.
    pub async fn load(&self) -> Result<(RuleIndex, LoadStats)> {
        self.load_with(LoadOptions::default()).await
    }

    /// Loads the store.
    ///
    /// # Errors
    ///
    /// - [`Error::RootNotFound`] / [`Error::RootUnreadable`] for bad roots
    /// - [`Error::MalformedDocument`] for the path-first unparsable file
    /// - [`Error::DuplicateId`] / [`Error::CyclicExtends`] from indexing
    /// - [`Error::LoadCancelled`] when the cancel signal fires
    pub async fn load_with(&self, options: LoadOptions) -> Result<(RuleIndex, LoadStats)> {
        let outcomes = self.parse_all(options).await?;
        let files_discovered = outcomes.len();

        let mut documents = Vec::with_capacity(outcomes.len());
        for (_, outcome) in outcomes {
            documents.push(outcome?);
        }

        let documents_parsed = documents.len();
        let (index, dangling_extends) = RuleIndex::build(documents)?;

        log::debug!(
            "loaded {documents_parsed} document(s) from {} root(s)",
            self.roots.len()
        );

        Ok((
            index,
            LoadStats {
                files_discovered,
                documents_parsed,
                dangling_extends,
                roots: self.roots.clone(),
            },
        ))
    }

    /// Discovers and parses every document, returning per-file outcomes in
    /// path order. Only root-level I/O failures and cancellation are fatal
    /// here; per-document parse failures are data, so `validate` can
    /// collect all of them while `load` fails on the first.
    pub(crate) async fn parse_all(
        &self,
        options: LoadOptions,
    ) -> Result<Vec<(PathBuf, Result<RuleDocument>)>> {
        let mut files: Vec<(PathBuf, PathBuf)> = Vec::new();
        for root in &self.roots {
            for path in discover_markdown(root).await? {
                files.push((root.clone(), path));
            }
        }

        let mut outstanding: BTreeSet<PathBuf> =
            files.iter().map(|(_, path)| path.clone()).collect();

        let mut join_set: JoinSet<(PathBuf, Result<RuleDocument>)> = JoinSet::new();
        for (root, path) in files {
            join_set.spawn(async move {
                let outcome = parse_one(&root, &path).await;
                (path, outcome)
            });
        }

        let mut cancel = options.cancel;
        let mut outcomes: Vec<(PathBuf, Result<RuleDocument>)> =
            Vec::with_capacity(outstanding.len());

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    join_set.abort_all();
                    return Err(Error::LoadCancelled {
                        pending: outstanding.into_iter().collect(),
                    });
                }
                joined = join_set.join_next() => joined,
            };

            match joined {
                Some(Ok((path, outcome))) => {
                    outstanding.remove(&path);
                    outcomes.push((path, outcome));
                }
                Some(Err(join_error)) => {
                    return Err(Error::parse(format!("parse task failed: {join_error}")));
                }
                None => break,
            }
        }

        outcomes.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(outcomes)
    }
}

/// Resolves to `()` when cancellation is requested; pends forever when no
/// signal is attached or the sender has gone away.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
    futures::future::pending::<()>().await
}

/// Reads and parses a single document.
async fn parse_one(root: &Path, path: &Path) -> Result<RuleDocument> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let id = doc_id_from_rel_path(rel)
        .ok_or_else(|| Error::malformed(path, "cannot derive a document id from this path"))?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(e, path))?;

    RuleDocument::parse(id, path, &content)
}

/// Discovers markdown files under a root, sorted for determinism.
async fn discover_markdown(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|e| Error::for_root(e, root))?;
    if !metadata.is_dir() {
        return Err(Error::RootUnreadable {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let mut files = Vec::new();
    let mut walker = WalkDir::new(root);

    while let Some(entry) = walker.next().await {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("walk error under {}: {e}", root.display());
                continue;
            }
        };

        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if ext.to_string_lossy().to_lowercase() == "md" {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================
