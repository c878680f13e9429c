//! Fix planning.
//!
//! The planner is pure: it reads the built graph and computes every
//! rename and content edit before anything touches the filesystem.
//! Documents with malformed front matter are never edited beyond path
//! reference rewrites; their breadcrumbs, layers and link lists are
//! left for a human. Running the planner over a corpus it has already
//! fixed yields an empty plan.

use std::collections::{BTreeMap, BTreeSet};

use docgate_corpus::{parse_document, set_list_field, set_scalar_field, DocStatus, DocumentRecord};
use docgate_gates::naming::{canonical_path, matches_canonical};
use docgate_gates::BREADCRUMB_MARKER;
use docgate_graph::{detect_cycles, CorpusGraph, GraphNode};
use tracing::debug;

use crate::rewrite::rewrite_references;
use crate::structure::{
    ensure_breadcrumb, insert_sections, missing_sections, regenerate_toc, renumber_headings,
    replace_body,
};
use crate::summary::AutofixOperation;

/// Layer assumed when neither category nor path hints at one.
const FALLBACK_LAYER: &str = "IMPLEMENTATION";

/// A fully planned autofix run.
#[derive(Debug, Clone, Default)]
pub struct AutofixPlan {
    /// Old path to new canonical path. Targets are disjoint from every
    /// path the corpus knows, so renames commute.
    pub renames: BTreeMap<String, String>,
    /// New content keyed by the path the file has *before* renames.
    pub edits: BTreeMap<String, String>,
    /// Replacement context map text, when a renamed path appears in it.
    pub context_map: Option<String>,
    /// The plan as reportable operations: renames, then modifications.
    pub operations: Vec<AutofixOperation>,
}

impl AutofixPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// A contradiction found while planning. Nothing may be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanConflict {
    pub reason: String,
}

impl std::fmt::Display for PlanConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Values dropped from one document's link lists to break cycles.
#[derive(Debug, Clone, Default)]
struct EdgeRemovals {
    upstream: BTreeSet<String>,
    downstream: BTreeSet<String>,
}

/// Compute the full fix plan for a corpus.
///
/// `context_map_path` is only recorded in the operation list; the map
/// itself is rewritten from `context_map_text`.
pub fn plan_fixes(
    graph: &CorpusGraph,
    context_map_path: &str,
    context_map_text: &str,
    valid_layers: &[String],
) -> Result<AutofixPlan, PlanConflict> {
    let renames = plan_renames(graph, valid_layers);
    let removals = plan_cycle_removals(graph)?;

    let mut edits = BTreeMap::new();
    for (path, record) in &graph.doc_records {
        if !record.exists {
            continue;
        }
        let composed = compose_document(graph, record, &renames, &removals, valid_layers);
        if composed != record.content {
            edits.insert(path.clone(), composed);
        }
    }

    let rewritten_map = rewrite_references(context_map_text, &renames);
    let context_map = (rewritten_map != context_map_text).then_some(rewritten_map);

    let mut operations = Vec::with_capacity(renames.len() + edits.len() + 1);
    for (from, to) in &renames {
        operations.push(AutofixOperation::Rename {
            from: from.clone(),
            to: to.clone(),
        });
    }
    for path in edits.keys() {
        operations.push(AutofixOperation::Modify { path: path.clone() });
    }
    if context_map.is_some() {
        operations.push(AutofixOperation::Modify {
            path: context_map_path.to_string(),
        });
    }

    debug!(
        renames = renames.len(),
        edits = edits.len(),
        "autofix plan computed"
    );
    Ok(AutofixPlan {
        renames,
        edits,
        context_map,
        operations,
    })
}

/// Canonical renames for every fixable document whose file name fails
/// the naming gate under its effective layer. Collisions take a `_2`,
/// `_3` suffix in lexicographic source order; every path the corpus
/// knows counts as taken, so a target never shadows another file.
fn plan_renames(graph: &CorpusGraph, valid_layers: &[String]) -> BTreeMap<String, String> {
    let mut reserved: BTreeSet<String> = graph.doc_records.keys().cloned().collect();
    let mut renames = BTreeMap::new();
    for node in graph.nodes.values() {
        if !is_fixable(graph, &node.path) {
            continue;
        }
        let layer = effective_layer(node, valid_layers);
        if matches_canonical(&layer, file_name_of(&node.path)) {
            continue;
        }
        let target = disambiguate(canonical_path(&layer, &node.path, valid_layers), &reserved);
        reserved.insert(target.clone());
        renames.insert(node.path.clone(), target);
    }
    renames
}

fn disambiguate(target: String, reserved: &BTreeSet<String>) -> String {
    if !reserved.contains(&target) {
        return target;
    }
    let (base, ext) = match target.rsplit_once('.') {
        Some((base, ext)) => (base.to_string(), format!(".{ext}")),
        None => (target.clone(), String::new()),
    };
    (2u32..)
        .map(|n| format!("{base}_{n}{ext}"))
        .find(|candidate| !reserved.contains(candidate))
        .unwrap_or(target)
}

/// Pick the link-list removals that make the dependency relation
/// acyclic: for each cycle, drop the edge pointing at its
/// lexicographically greatest member, from every document declaring
/// it. Detection reruns on the reduced relation until nothing is left,
/// so one plan converges even when cycles overlap.
fn plan_cycle_removals(
    graph: &CorpusGraph,
) -> Result<BTreeMap<String, EdgeRemovals>, PlanConflict> {
    let mut removals: BTreeMap<String, EdgeRemovals> = BTreeMap::new();
    let mut working = graph.clone();
    loop {
        let cycles = detect_cycles(&working);
        if cycles.is_empty() {
            break;
        }
        for cycle in &cycles {
            let Some((idx, greatest)) = cycle
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.cmp(b))
            else {
                continue;
            };
            let greatest = greatest.clone();
            let source = cycle[(idx + cycle.len() - 1) % cycle.len()].clone();

            let mut declared = false;
            if graph
                .nodes
                .get(&source)
                .is_some_and(|node| node.upstream.iter().any(|t| t == &greatest))
            {
                removals
                    .entry(source.clone())
                    .or_default()
                    .upstream
                    .insert(greatest.clone());
                declared = true;
            }
            if graph
                .nodes
                .get(&greatest)
                .is_some_and(|node| node.downstream.iter().any(|t| t == &source))
            {
                removals
                    .entry(greatest.clone())
                    .or_default()
                    .downstream
                    .insert(source.clone());
                declared = true;
            }
            if !declared {
                return Err(PlanConflict {
                    reason: format!(
                        "cannot break dependency cycle {}: no document declares the edge {source} -> {greatest}",
                        cycle.join(" -> ")
                    ),
                });
            }

            if let Some(node) = working.nodes.get_mut(&source) {
                node.upstream.retain(|t| t != &greatest);
            }
            if let Some(node) = working.nodes.get_mut(&greatest) {
                node.downstream.retain(|t| t != &source);
            }
        }
    }
    Ok(removals)
}

/// Produce the post-fix content for one document. Reference rewrites
/// apply to every existing file; all structured repairs are limited to
/// fixable documents.
fn compose_document(
    graph: &CorpusGraph,
    record: &DocumentRecord,
    renames: &BTreeMap<String, String>,
    removals: &BTreeMap<String, EdgeRemovals>,
    valid_layers: &[String],
) -> String {
    let mut content = rewrite_references(&record.content, renames);
    if !is_fixable(graph, &record.path) {
        return content;
    }
    let Some(node) = graph.nodes.get(&record.path) else {
        return content;
    };

    let original_body = parse_document(&content).body;
    let mut body = original_body.clone();
    if let Some(with_crumb) = ensure_breadcrumb(&body, &breadcrumb_line(node, record)) {
        body = with_crumb;
    }
    let missing = missing_sections(&body);
    body = insert_sections(&body, &missing);
    body = renumber_headings(&body);
    if body != original_body {
        // A table of contents only refreshes when the structure around
        // it moved; an untouched document keeps its hand-written list.
        body = regenerate_toc(&body);
        content = replace_body(&content, &body);
    }

    if !valid_layers.iter().any(|layer| layer == &node.layer) {
        content = set_scalar_field(&content, "layer", &effective_layer(node, valid_layers));
    }

    if let Some(edge_removals) = removals.get(&record.path) {
        if !edge_removals.upstream.is_empty() {
            let values = surviving_targets(&node.upstream, &edge_removals.upstream, renames);
            content = set_list_field(&content, "upstream", &values);
        }
        if !edge_removals.downstream.is_empty() {
            let values = surviving_targets(&node.downstream, &edge_removals.downstream, renames);
            content = set_list_field(&content, "downstream", &values);
        }
    }
    content
}

fn surviving_targets(
    original: &[String],
    removed: &BTreeSet<String>,
    renames: &BTreeMap<String, String>,
) -> Vec<String> {
    original
        .iter()
        .filter(|target| !removed.contains(*target))
        .map(|target| renames.get(target).cloned().unwrap_or_else(|| target.clone()))
        .collect()
}

fn breadcrumb_line(node: &GraphNode, record: &DocumentRecord) -> String {
    if node.category.is_empty() {
        format!("{BREADCRUMB_MARKER}: {}", record.title)
    } else {
        format!("{BREADCRUMB_MARKER}: {} / {}", node.category, record.title)
    }
}

fn is_fixable(graph: &CorpusGraph, path: &str) -> bool {
    graph
        .doc_records
        .get(path)
        .is_some_and(|record| record.exists)
        && graph.doc_status.get(path) != Some(&DocStatus::MalformedFrontmatter)
}

/// The layer a document should end up with: its own when valid,
/// otherwise inferred from the context map category, then from path
/// segments, then the fallback.
fn effective_layer(node: &GraphNode, valid_layers: &[String]) -> String {
    if valid_layers.iter().any(|layer| layer == &node.layer) {
        node.layer.clone()
    } else {
        infer_layer(&node.category, &node.path, valid_layers)
    }
}

fn infer_layer(category: &str, path: &str, valid_layers: &[String]) -> String {
    for layer in valid_layers {
        if words(category).any(|word| word.eq_ignore_ascii_case(layer)) {
            return layer.clone();
        }
    }
    for layer in valid_layers {
        if words(path).any(|word| word.eq_ignore_ascii_case(layer)) {
            return layer.clone();
        }
    }
    valid_layers
        .iter()
        .find(|layer| layer.as_str() == FALLBACK_LAYER)
        .or_else(|| valid_layers.last())
        .cloned()
        .unwrap_or_else(|| FALLBACK_LAYER.to_string())
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
}

fn file_name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
