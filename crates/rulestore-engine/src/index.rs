//! The immutable document index.
//!
//! [`RuleIndex`] holds every loaded document plus the `extends` graph as
//! a petgraph `DiGraph` (edge direction parent → child). It is built once
//! by the loader, validated for cycles and duplicate ids, and never
//! mutated afterwards — queries share it freely without locking.
//!
//! [`StoreHandle`] wraps an index behind an atomically swappable `Arc`
//! for reload: a new index is built off to the side and swapped in whole,
//! so in-flight queries keep resolving against the snapshot they started
//! with.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rulestore_core::{Error, Result};

use crate::document::RuleDocument;

// ============================================================================
// RuleIndex
// ============================================================================

/// Immutable index over a loaded document store.
#[derive(Debug, Default)]
pub struct RuleIndex {
    /// Documents by id.
    docs: HashMap<String, RuleDocument>,
    /// Sorted ids, fixing the iteration order everywhere.
    ids: Vec<String>,
    /// Extends graph; node weight is the document id, edges point
    /// parent → child.
    graph: DiGraph<String, ()>,
    /// Lookup table: document id → graph node.
    node_indices: HashMap<String, NodeIndex>,
}

impl RuleIndex {
    /// Builds an index from parsed documents.
    ///
    /// Checks for duplicate ids and extends cycles; returns the index
    /// together with the list of dangling extends references (targets
    /// that exist in no loaded document). Dangling references are not
    /// fatal at load time — the child simply acts as a chain root — but
    /// `validate` reports them.
    pub fn build(documents: Vec<RuleDocument>) -> Result<(Self, Vec<String>)> {
        let mut docs: HashMap<String, RuleDocument> = HashMap::with_capacity(documents.len());
        for doc in documents {
            if let Some(existing) = docs.get(&doc.id) {
                return Err(Error::DuplicateId {
                    id: doc.id.clone(),
                    first: existing.path.clone(),
                    second: doc.path.clone(),
                });
            }
            docs.insert(doc.id.clone(), doc);
        }

        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();

        if let Some(chain) = find_cycle(&docs, &ids) {
            return Err(Error::CyclicExtends { chain });
        }

        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::with_capacity(ids.len());
        for id in &ids {
            let idx = graph.add_node(id.clone());
            node_indices.insert(id.clone(), idx);
        }

        let mut dangling = Vec::new();
        for id in &ids {
            let doc = &docs[id];
            if let Some(parent) = &doc.extends {
                match node_indices.get(parent) {
                    Some(&parent_idx) => {
                        graph.add_edge(parent_idx, node_indices[id], ());
                    }
                    None => {
                        log::warn!("document '{id}' extends unknown document '{parent}'");
                        dangling.push(format!("{id} -> {parent}"));
                    }
                }
            }
        }

        Ok((
            Self {
                docs,
                ids,
                graph,
                node_indices,
            },
            dangling,
        ))
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// True if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Looks up a document by id.
    pub fn get(&self, id: &str) -> Option<&RuleDocument> {
        self.docs.get(id)
    }

    /// True if the id is indexed.
    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    /// All ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// All documents in sorted id order.
    pub fn documents(&self) -> impl Iterator<Item = &RuleDocument> {
        self.ids.iter().map(|id| &self.docs[id])
    }

    /// The indexed parent of a document, if its extends target is loaded.
    pub fn parent_of(&self, id: &str) -> Option<&RuleDocument> {
        let parent_id = self.docs.get(id)?.extends.as_deref()?;
        self.docs.get(parent_id)
    }

    /// Ids of indexed documents that extend the given document, sorted.
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child_idx| self.graph[child_idx].as_str())
            .collect();
        children.sort_unstable();
        children
    }

    /// True if `ancestor` is reachable from `descendant` by following
    /// extends pointers upwards. A document is not its own ancestor.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut current = self.docs.get(descendant).and_then(|d| d.extends.as_deref());
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.docs.get(id).and_then(|d| d.extends.as_deref());
        }
        false
    }

}

/// DFS over extends pointers with a visiting set.
///
/// Since every document has at most one parent, a traversal from any node
/// is a simple chain walk; the first node revisited while still in the
/// `Visiting` state closes a cycle, reported with its complete chain
/// (first id repeated at the end). Ids are visited in sorted order so the
/// first cycle found is deterministic.
pub(crate) fn find_cycle(
    docs: &HashMap<String, RuleDocument>,
    sorted_ids: &[String],
) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Visiting,
        Done,
    }

    let mut states: HashMap<&str, State> = HashMap::with_capacity(docs.len());

    for start in sorted_ids {
        if states.contains_key(start.as_str()) {
            continue;
        }

        let mut chain: Vec<&str> = Vec::new();
        let mut current = start.as_str();
        loop {
            match states.get(current) {
                Some(State::Visiting) => {
                    // Cycle closed at `current`: slice the chain from its
                    // first occurrence and repeat it at the end.
                    let pos = chain
                        .iter()
                        .position(|&id| id == current)
                        .unwrap_or_default();
                    let mut cycle: Vec<String> =
                        chain[pos..].iter().map(|s| s.to_string()).collect();
                    cycle.push(current.to_string());
                    return Some(cycle);
                }
                Some(State::Done) => break,
                None => {
                    states.insert(current, State::Visiting);
                    chain.push(current);
                    match docs
                        .get(current)
                        .and_then(|d| d.extends.as_deref())
                        .filter(|parent| docs.contains_key(*parent))
                    {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
            }
        }

        for id in chain {
            states.insert(id, State::Done);
        }
    }

    None
}

// ============================================================================
// StoreHandle
// ============================================================================

/// Shared handle over an atomically swappable index.
///
/// Cloning the handle is cheap; every clone sees swaps made through any
/// other clone. [`snapshot`](Self::snapshot) hands out an `Arc` to the
/// current index, so a reload never invalidates an in-flight query.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    inner: Arc<RwLock<Arc<RuleIndex>>>,
}

impl StoreHandle {
    /// Wraps an index in a handle.
    pub fn new(index: RuleIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// The current index snapshot.
    pub fn snapshot(&self) -> Arc<RuleIndex> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the index, returning the previous snapshot.
    pub fn swap(&self, index: RuleIndex) -> Arc<RuleIndex> {
        let next = Arc::new(index);
        match self.inner.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
