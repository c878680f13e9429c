//! Path interning.
//!
//! Cycle detection touches every edge repeatedly, so paths are interned
//! to compact ids once per run and all graph traversal works on ids.

use std::collections::HashMap;

/// Compact identifier for an interned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of this id in the interner's backing table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bidirectional map between paths and [`NodeId`]s.
#[derive(Debug, Clone, Default)]
pub struct PathInterner {
    paths: Vec<String>,
    index: HashMap<String, NodeId>,
}

impl PathInterner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path, returning its existing id when already present.
    pub fn intern(&mut self, path: &str) -> NodeId {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let id = NodeId(u32::try_from(self.paths.len()).unwrap_or(u32::MAX));
        self.paths.push(path.to_string());
        self.index.insert(path.to_string(), id);
        id
    }

    /// Look up the id of an already-interned path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// The path behind an id. Ids are only ever produced by this
    /// interner, so the lookup is infallible.
    #[must_use]
    pub fn resolve(&self, id: NodeId) -> &str {
        &self.paths[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All interned paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(i, path)| (NodeId(i as u32), path.as_str()))
    }
}
