//! Cycle detection over the dependency relation.
//!
//! Depth-first search with visiting/visited marking. Each back edge
//! yields the cycle currently on the path stack; cycles are normalized
//! by rotating them to start at their lexicographically smallest path,
//! then deduplicated, so the same loop declared from different
//! documents reports once.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::builder::CorpusGraph;
use crate::interner::NodeId;

/// All detected dependency cycles, each a path list in normalized
/// rotation, sorted for stable output.
#[must_use]
pub fn detect_cycles(graph: &CorpusGraph) -> Vec<Vec<String>> {
    let mut adj: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (from, to) in graph.dependency_edges() {
        adj.entry(from).or_default().push(to);
    }
    for neighbors in adj.values_mut() {
        neighbors.sort();
    }

    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

    let mut roots: Vec<NodeId> = graph.interner().iter().map(|(id, _)| id).collect();
    roots.sort();
    for root in roots {
        if !visited.contains(&root) {
            dfs(
                root,
                &adj,
                graph,
                &mut visiting,
                &mut visited,
                &mut path,
                &mut found,
            );
        }
    }

    if !found.is_empty() {
        debug!(cycles = found.len(), "dependency cycles detected");
    }
    found.into_iter().collect()
}

fn dfs(
    node: NodeId,
    adj: &HashMap<NodeId, Vec<NodeId>>,
    graph: &CorpusGraph,
    visiting: &mut HashSet<NodeId>,
    visited: &mut HashSet<NodeId>,
    path: &mut Vec<NodeId>,
    found: &mut BTreeSet<Vec<String>>,
) {
    if visiting.contains(&node) {
        if let Some(start) = path.iter().position(|&n| n == node) {
            let cycle: Vec<String> = path[start..]
                .iter()
                .map(|&id| graph.interner().resolve(id).to_string())
                .collect();
            found.insert(normalize_rotation(cycle));
        }
        return;
    }
    if visited.contains(&node) {
        return;
    }

    visiting.insert(node);
    path.push(node);

    if let Some(neighbors) = adj.get(&node) {
        for &next in neighbors {
            dfs(next, adj, graph, visiting, visited, path, found);
        }
    }

    path.pop();
    visiting.remove(&node);
    visited.insert(node);
}

/// Rotate a cycle so it starts at its lexicographically smallest path.
/// Nodes on the path stack are distinct, so the minimum is unique.
fn normalize_rotation(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_index = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(min_index);
    cycle
}
