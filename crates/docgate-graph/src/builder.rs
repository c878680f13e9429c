//! Graph construction from a loaded corpus.

use std::collections::{BTreeMap, BTreeSet};

use docgate_corpus::{ContextEntry, DocStatus, DocumentRecord, LoadedCorpus};
use tracing::debug;

use crate::interner::{NodeId, PathInterner};

/// One node in the dependency graph.
///
/// Nodes exist for every distinct path the corpus references. A node
/// whose path never appears in the context map has an empty category;
/// whether its file exists lives on the matching [`DocumentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Normalized corpus-relative path.
    pub path: String,
    /// Grouping label from the context map, empty for link-only nodes.
    pub category: String,
    /// `layer` front matter field, `UNKNOWN` when absent.
    pub layer: String,
    /// Deduplicated upstream link targets, first-seen order.
    pub upstream: Vec<String>,
    /// Deduplicated downstream link targets, first-seen order.
    pub downstream: Vec<String>,
}

/// The dependency graph plus the per-document state gates consume.
#[derive(Debug, Clone)]
pub struct CorpusGraph {
    /// Context map entries in declaration order.
    pub entries: Vec<ContextEntry>,
    /// Nodes keyed by normalized path.
    pub nodes: BTreeMap<String, GraphNode>,
    /// Load status per path.
    pub doc_status: BTreeMap<String, DocStatus>,
    /// Loaded documents per path.
    pub doc_records: BTreeMap<String, DocumentRecord>,
    interner: PathInterner,
}

impl CorpusGraph {
    #[must_use]
    pub fn interner(&self) -> &PathInterner {
        &self.interner
    }

    /// Whether a path is declared in the context map.
    #[must_use]
    pub fn is_mapped(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    /// The upstream/downstream relation as a directed edge set.
    ///
    /// `A upstream B` and `B downstream A` both mean "A depends on B"
    /// and fold to the single edge `A -> B`, so a mutual declaration
    /// does not read as a two-node cycle.
    #[must_use]
    pub fn dependency_edges(&self) -> BTreeSet<(NodeId, NodeId)> {
        let mut edges = BTreeSet::new();
        for node in self.nodes.values() {
            let Some(from) = self.interner.get(&node.path) else {
                continue;
            };
            for target in &node.upstream {
                if let Some(to) = self.interner.get(target) {
                    edges.insert((from, to));
                }
            }
            for dependent in &node.downstream {
                if let Some(dep) = self.interner.get(dependent) {
                    edges.insert((dep, from));
                }
            }
        }
        edges
    }
}

/// Build the graph for a loaded corpus.
///
/// Context map entries seed the node set; every other record (paths
/// discovered through links) is added after them. Duplicate entries
/// and duplicate link targets collapse, keeping first-seen order.
#[must_use]
pub fn build_graph(corpus: LoadedCorpus) -> CorpusGraph {
    let LoadedCorpus {
        entries,
        records,
        status,
    } = corpus;

    let mut interner = PathInterner::new();
    let mut nodes: BTreeMap<String, GraphNode> = BTreeMap::new();

    for entry in &entries {
        if nodes.contains_key(&entry.path) {
            continue;
        }
        let Some(record) = records.get(&entry.path) else {
            continue;
        };
        interner.intern(&entry.path);
        nodes.insert(entry.path.clone(), node_from(record, entry.category.clone()));
    }

    for (path, record) in &records {
        if nodes.contains_key(path) {
            continue;
        }
        interner.intern(path);
        nodes.insert(path.clone(), node_from(record, String::new()));
    }

    debug!(
        nodes = nodes.len(),
        seeded = entries.len(),
        "dependency graph built"
    );
    CorpusGraph {
        entries,
        nodes,
        doc_status: status,
        doc_records: records,
        interner,
    }
}

fn node_from(record: &DocumentRecord, category: String) -> GraphNode {
    GraphNode {
        path: record.path.clone(),
        category,
        layer: record.layer(),
        upstream: dedupe(record.upstream()),
        downstream: dedupe(record.downstream()),
    }
}

fn dedupe(targets: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    targets
        .into_iter()
        .filter(|target| !target.is_empty() && seen.insert(target.clone()))
        .collect()
}
