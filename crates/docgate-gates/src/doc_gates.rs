//! Document gates DOC-01 through DOC-08.
//!
//! Every gate is a pure function over the built [`CorpusGraph`]; no
//! gate does I/O and no gate depends on another's output, so they can
//! run in any order. A failure to read or parse one document never
//! interrupts the others: missing files and malformed front matter
//! have already been folded into records by the loader and surface
//! here as ordinary violations.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use docgate_corpus::{normalize_path, DocStatus, DocumentRecord};
use docgate_graph::{detect_cycles, CorpusGraph};
use regex::Regex;
use tracing::debug;

use crate::headings::{
    anchor_slugs, extract_headings, mask_fenced_blocks, split_number_prefix, Heading,
};
use crate::naming::{canonical_file_name, matches_canonical};
use crate::report::{GateId, GateReport, Violation};

/// In-body marker every corpus document must carry.
pub const BREADCRUMB_MARKER: &str = "> Breadcrumbs";

/// Section headings every document body must contain.
pub const REQUIRED_SECTIONS: [&str; 4] =
    ["Purpose", "Scope: Included", "Scope: Excluded", "Details"];

static BODY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)\s]+)\)").unwrap());

/// Run all eight document gates and collect their buckets.
#[must_use]
pub fn evaluate_doc_gates(graph: &CorpusGraph, valid_layers: &[String]) -> GateReport {
    let mut report = GateReport::new();
    report.extend(GateId::Doc01, check_breadcrumbs(graph));
    report.extend(GateId::Doc02, check_layers(graph, valid_layers));
    report.extend(GateId::Doc03, check_link_targets(graph));
    report.extend(GateId::Doc04, check_cycles(graph));
    report.extend(GateId::Doc05, check_required_sections(graph));
    report.extend(GateId::Doc06, check_anchors(graph));
    report.extend(GateId::Doc07, check_naming(graph, valid_layers));
    report.extend(GateId::Doc08, check_heading_numbering(graph));
    debug!(
        errors = report.error_count,
        warnings = report.warn_count,
        "document gates evaluated"
    );
    report
}

/// DOC-01: every document body carries the breadcrumb marker. A path
/// listed in the context map whose file is missing fails here too.
#[must_use]
pub fn check_breadcrumbs(graph: &CorpusGraph) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (path, record) in &graph.doc_records {
        if record.exists {
            if !has_breadcrumb(&record.body) {
                violations.push(Violation::error(
                    path,
                    format!("body is missing the `{BREADCRUMB_MARKER}` marker"),
                ));
            }
        } else if graph.is_mapped(path) {
            violations.push(Violation::error(
                path,
                "document is listed in the context map but does not exist",
            ));
        }
    }
    violations
}

/// Whether any line of the body carries the breadcrumb marker.
#[must_use]
pub fn has_breadcrumb(body: &str) -> bool {
    body.lines()
        .any(|line| line.trim_start().starts_with(BREADCRUMB_MARKER))
}

/// DOC-02: `layer` must come from the configured layer set. Malformed
/// front matter reads as `UNKNOWN` and fails here with its own message.
#[must_use]
pub fn check_layers(graph: &CorpusGraph, valid_layers: &[String]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for node in graph.nodes.values() {
        if !record_exists(graph, &node.path) {
            continue;
        }
        if valid_layers.iter().any(|layer| layer == &node.layer) {
            continue;
        }
        let message = if graph.doc_status.get(&node.path)
            == Some(&DocStatus::MalformedFrontmatter)
        {
            "front matter is malformed, layer is unreadable".to_string()
        } else {
            format!("layer {:?} is not in the configured layer set", node.layer)
        };
        violations.push(Violation::error(&node.path, message).with_layer(node.layer.clone()));
    }
    violations
}

/// DOC-03: every upstream/downstream target resolves to an existing
/// record. One violation per distinct `(path, link)` pair.
#[must_use]
pub fn check_link_targets(graph: &CorpusGraph) -> Vec<Violation> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut violations = Vec::new();
    for node in graph.nodes.values() {
        for target in node.upstream.iter().chain(node.downstream.iter()) {
            let target_exists = graph
                .doc_records
                .get(target)
                .is_some_and(|record| record.exists);
            if target_exists {
                continue;
            }
            if seen.insert((node.path.clone(), target.clone())) {
                violations.push(
                    Violation::error(
                        &node.path,
                        format!("link target {target} does not exist"),
                    )
                    .with_link(target.clone()),
                );
            }
        }
    }
    violations
}

/// DOC-04: the dependency relation must be acyclic. One violation per
/// distinct cycle, anchored at its lexicographically smallest member.
#[must_use]
pub fn check_cycles(graph: &CorpusGraph) -> Vec<Violation> {
    detect_cycles(graph)
        .into_iter()
        .map(|cycle| {
            let display = cycle.join(" -> ");
            let anchor = cycle[0].clone();
            Violation::error(anchor, format!("dependency cycle: {display}")).with_cycle(cycle)
        })
        .collect()
}

/// DOC-05: the body must contain all required section headings. Number
/// prefixes and case are ignored when matching.
#[must_use]
pub fn check_required_sections(graph: &CorpusGraph) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (path, record) in existing_records(graph) {
        let headings = extract_headings(&record.body);
        for required in REQUIRED_SECTIONS {
            if !headings.iter().any(|h| heading_matches(&h.text, required)) {
                violations.push(Violation::error(
                    path,
                    format!("missing required section heading {required:?}"),
                ));
            }
        }
    }
    violations
}

/// Whether a heading text names a required section, ignoring case and
/// any `3.` style numbering prefix.
#[must_use]
pub fn heading_matches(text: &str, required: &str) -> bool {
    let bare = split_number_prefix(text).map_or(text, |(_, rest)| rest);
    bare.trim().eq_ignore_ascii_case(required)
}

/// DOC-06: heading-anchor links must point at a real heading, in this
/// document for `#anchor` targets or in the target document for
/// `path#anchor` targets. Links to paths outside the corpus are not
/// checked.
#[must_use]
pub fn check_anchors(graph: &CorpusGraph) -> Vec<Violation> {
    let slugs: BTreeMap<&str, BTreeSet<String>> = existing_records(graph)
        .map(|(path, record)| {
            let set = anchor_slugs(&extract_headings(&record.body))
                .into_iter()
                .collect();
            (path.as_str(), set)
        })
        .collect();

    let mut violations = Vec::new();
    for (path, record) in existing_records(graph) {
        let masked = mask_fenced_blocks(&record.body);
        for capture in BODY_LINK.captures_iter(&masked) {
            let Some(raw) = capture.get(1) else { continue };
            let target = raw.as_str();
            if is_external(target) {
                continue;
            }
            let Some((file_part, anchor)) = target.split_once('#') else {
                continue;
            };
            let line = masked_line(record, &masked, raw.start());
            if file_part.is_empty() {
                if !slugs.get(path.as_str()).is_some_and(|set| set.contains(anchor)) {
                    violations.push(
                        Violation::error(path, format!("anchor #{anchor} has no matching heading"))
                            .with_link(target.to_string())
                            .with_line(line),
                    );
                }
                continue;
            }
            let Some(resolved) = resolve_target(graph, path, file_part) else {
                continue;
            };
            match graph.doc_records.get(&resolved) {
                Some(record) if record.exists => {
                    if !slugs.get(resolved.as_str()).is_some_and(|set| set.contains(anchor)) {
                        violations.push(
                            Violation::error(
                                path,
                                format!("anchor #{anchor} has no matching heading in {resolved}"),
                            )
                            .with_link(target.to_string())
                            .with_line(line),
                        );
                    }
                }
                Some(_) => {
                    violations.push(
                        Violation::error(path, format!("anchor link target {resolved} is missing"))
                            .with_link(target.to_string())
                            .with_line(line),
                    );
                }
                None => {}
            }
        }
    }
    violations
}

/// DOC-07: file names follow `<LAYER>_<UPPER_SNAKE_STEM>.mdc`.
/// Documents whose layer already fails DOC-02 are skipped, since no
/// canonical name can be derived for them.
#[must_use]
pub fn check_naming(graph: &CorpusGraph, valid_layers: &[String]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for node in graph.nodes.values() {
        if !record_exists(graph, &node.path) {
            continue;
        }
        if !valid_layers.iter().any(|layer| layer == &node.layer) {
            continue;
        }
        let file_name = file_name_of(&node.path);
        if !matches_canonical(&node.layer, file_name) {
            let expected = canonical_file_name(&node.layer, file_name, valid_layers);
            violations.push(
                Violation::error(
                    &node.path,
                    format!("file name should be {expected}"),
                )
                .with_layer(node.layer.clone()),
            );
        }
    }
    violations
}

/// DOC-08 (warn): numbered headings are sequential per depth, counters
/// resetting whenever a shallower heading appears.
#[must_use]
pub fn check_heading_numbering(graph: &CorpusGraph) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (path, record) in existing_records(graph) {
        let offset = body_line_base(record);
        for (heading, expected, actual) in numbering_mismatches(&extract_headings(&record.body)) {
            violations.push(
                Violation::warn(
                    path,
                    format!(
                        "heading {:?} is numbered {actual}, expected {expected}",
                        heading.text
                    ),
                )
                .with_line(offset + heading.line),
            );
        }
    }
    violations
}

/// Walk headings tracking one counter per depth. Returns each numbered
/// heading whose number differs from the expected sequence, adopting
/// the actual number afterwards so a single gap reports once.
fn numbering_mismatches(headings: &[Heading]) -> Vec<(&Heading, u32, u32)> {
    let mut counters = [0u32; 7];
    let mut mismatches = Vec::new();
    for heading in headings {
        let level = usize::from(heading.level.min(6));
        for deeper in counters.iter_mut().skip(level + 1) {
            *deeper = 0;
        }
        if let Some((actual, _)) = split_number_prefix(&heading.text) {
            let expected = counters[level] + 1;
            if actual != expected {
                mismatches.push((heading, expected, actual));
            }
            counters[level] = actual;
        }
    }
    mismatches
}

fn record_exists(graph: &CorpusGraph, path: &str) -> bool {
    graph
        .doc_records
        .get(path)
        .is_some_and(|record| record.exists)
}

fn existing_records(graph: &CorpusGraph) -> impl Iterator<Item = (&String, &DocumentRecord)> {
    graph.doc_records.iter().filter(|(_, r)| r.exists)
}

fn is_external(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("mailto:")
}

fn file_name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Resolve a body link target against the linking document's
/// directory, falling back to corpus-root-relative, or `None` when the
/// path is unknown to the corpus.
fn resolve_target(graph: &CorpusGraph, doc_path: &str, file_part: &str) -> Option<String> {
    let base_dir = doc_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    if let Some(joined) = lexical_join(base_dir, file_part) {
        if graph.doc_records.contains_key(&joined) {
            return Some(joined);
        }
    }
    let rooted = normalize_path(file_part);
    graph.doc_records.contains_key(&rooted).then_some(rooted)
}

fn lexical_join(base: &str, rel: &str) -> Option<String> {
    let mut segments: Vec<&str> = if base.is_empty() {
        Vec::new()
    } else {
        base.split('/').collect()
    };
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// 1-indexed line of a byte offset in the masked body, counted over
/// the whole file so reported lines match what an editor shows. The
/// mask preserves newlines, so line math holds for the original too.
fn masked_line(record: &DocumentRecord, masked: &str, offset: usize) -> u32 {
    let line_in_body = masked[..offset].matches('\n').count() as u32 + 1;
    body_line_base(record) + line_in_body
}

/// Number of lines the front matter block occupies.
fn body_line_base(record: &DocumentRecord) -> u32 {
    let prefix_len = record.content.len().saturating_sub(record.body.len());
    record.content[..prefix_len].matches('\n').count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_corpus::{parse_document, ContextEntry, LoadedCorpus};
    use docgate_graph::build_graph;

    fn layers() -> Vec<String> {
        ["STRATEGY", "REQUIREMENTS", "ARCHITECTURE", "IMPLEMENTATION", "OPERATIONS"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Build a graph from in-memory documents the way the loader would.
    fn graph_of(docs: &[(&str, &str)]) -> CorpusGraph {
        let entries: Vec<ContextEntry> = docs
            .iter()
            .map(|(path, _)| ContextEntry {
                category: "Docs".to_string(),
                path: (*path).to_string(),
                description: format!("{path} description"),
            })
            .collect();

        let mut records = std::collections::BTreeMap::new();
        let mut status = std::collections::BTreeMap::new();
        for (path, content) in docs {
            let parsed = parse_document(content);
            let doc_status = if parsed.malformed {
                DocStatus::MalformedFrontmatter
            } else {
                DocStatus::Ok
            };
            let title = docgate_corpus::title_from(&parsed.front_matter, path);
            records.insert(
                (*path).to_string(),
                DocumentRecord {
                    path: (*path).to_string(),
                    content: (*content).to_string(),
                    body: parsed.body,
                    front_matter: parsed.front_matter,
                    title,
                    exists: true,
                },
            );
            status.insert((*path).to_string(), doc_status);
        }

        // Record any link target the docs mention but the fixture
        // does not define, the way the loader records missing files.
        let corpus = LoadedCorpus {
            entries,
            records,
            status,
        };
        let mut full = corpus.clone();
        for record in corpus.records.values() {
            for target in record.upstream().into_iter().chain(record.downstream()) {
                if !full.records.contains_key(&target) {
                    full.status.insert(target.clone(), DocStatus::Missing);
                    full.records
                        .insert(target.clone(), DocumentRecord::missing(target));
                }
            }
        }
        build_graph(full)
    }

    const CLEAN_DOC: &str = "---\ntitle: Setup Guide\nlayer: STRATEGY\n---\n# STRATEGY_SETUP_GUIDE\n\n> Breadcrumbs: corpus > guides > setup\n\n## Purpose\n\nWhy this exists.\n\n## Scope: Included\n\nWhat is covered.\n\n## Scope: Excluded\n\nWhat is not.\n\n## Details\n\nThe content.\n";

    #[test]
    fn clean_document_passes_every_content_gate() {
        let graph = graph_of(&[("docs/STRATEGY_SETUP_GUIDE.mdc", CLEAN_DOC)]);
        let report = evaluate_doc_gates(&graph, &layers());
        assert!(report.is_clean(), "violations: {:?}", report.results);
    }

    #[test]
    fn missing_breadcrumb_fails_doc01() {
        let graph = graph_of(&[(
            "docs/STRATEGY_A.mdc",
            "---\nlayer: STRATEGY\n---\n## Purpose\n\n## Scope: Included\n\n## Scope: Excluded\n\n## Details\n",
        )]);
        let violations = check_breadcrumbs(&graph);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "docs/STRATEGY_A.mdc");
    }

    #[test]
    fn mapped_but_missing_file_fails_doc01() {
        let entries = vec![ContextEntry {
            category: "Docs".to_string(),
            path: "docs/ghost.mdc".to_string(),
            description: "declared but absent".to_string(),
        }];
        let mut records = std::collections::BTreeMap::new();
        records.insert(
            "docs/ghost.mdc".to_string(),
            DocumentRecord::missing("docs/ghost.mdc".to_string()),
        );
        let mut status = std::collections::BTreeMap::new();
        status.insert("docs/ghost.mdc".to_string(), DocStatus::Missing);
        let graph = build_graph(LoadedCorpus { entries, records, status });

        let violations = check_breadcrumbs(&graph);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("does not exist"));
    }

    #[test]
    fn bogus_layer_fails_doc02_with_offending_value() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\nlayer: BOGUS\n---\nBody.\n",
        )]);
        let violations = check_layers(&graph, &layers());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].layer.as_deref(), Some("BOGUS"));
        assert_eq!(violations[0].path, "docs/a.mdc");
    }

    #[test]
    fn malformed_front_matter_surfaces_as_layer_violation() {
        let graph = graph_of(&[("docs/a.mdc", "---\nlayer: [broken\n---\nBody.\n")]);
        let violations = check_layers(&graph, &layers());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].layer.as_deref(), Some("UNKNOWN"));
        assert!(violations[0].message.contains("malformed"));
    }

    #[test]
    fn dangling_upstream_fails_doc03_once() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\nlayer: STRATEGY\nupstream:\n  - docs/b.mdc\n---\nBody.\n",
        )]);
        let violations = check_link_targets(&graph);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "docs/a.mdc");
        assert_eq!(violations[0].link.as_deref(), Some("docs/b.mdc"));
    }

    #[test]
    fn upstream_chain_cycle_fails_doc04_once() {
        let graph = graph_of(&[
            ("docs/a.mdc", "---\nupstream: docs/b.mdc\n---\nA.\n"),
            ("docs/b.mdc", "---\nupstream: docs/c.mdc\n---\nB.\n"),
            ("docs/c.mdc", "---\nupstream: docs/a.mdc\n---\nC.\n"),
        ]);
        let violations = check_cycles(&graph);
        assert_eq!(violations.len(), 1);
        let cycle = violations[0].cycle.as_ref().unwrap();
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle[0], "docs/a.mdc");
    }

    #[test]
    fn missing_sections_fail_doc05_per_heading() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\nlayer: STRATEGY\n---\n## Purpose\n\nOnly purpose here.\n",
        )]);
        let violations = check_required_sections(&graph);
        assert_eq!(violations.len(), 3, "three of four sections are missing");
    }

    #[test]
    fn numbered_section_headings_still_satisfy_doc05() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\n## 1. Purpose\n\n## 2. Scope: Included\n\n## 3. Scope: Excluded\n\n## 4. details\n",
        )]);
        assert!(check_required_sections(&graph).is_empty());
    }

    #[test]
    fn broken_self_anchor_fails_doc06_with_line() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\nlayer: STRATEGY\n---\n## Details\n\nSee [details](#detials).\n",
        )]);
        let violations = check_anchors(&graph);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].link.as_deref(), Some("#detials"));
        assert_eq!(violations[0].line, Some(6), "line is file-absolute");
    }

    #[test]
    fn cross_document_anchor_is_checked_in_target() {
        let graph = graph_of(&[
            (
                "docs/a.mdc",
                "---\n---\nSee [b](b.mdc#purpose) and [bad](b.mdc#nope).\n",
            ),
            ("docs/b.mdc", "---\n---\n## Purpose\n\nB.\n"),
        ]);
        let violations = check_anchors(&graph);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].link.as_deref(), Some("b.mdc#nope"));
    }

    #[test]
    fn anchor_into_missing_record_is_reported() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\nupstream:\n  - docs/gone.mdc\n---\nSee [x](gone.mdc#top).\n",
        )]);
        let violations = check_anchors(&graph);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("missing"));
    }

    #[test]
    fn anchors_inside_code_fences_are_ignored() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\n## Details\n\n```\nSee [x](#not-a-heading).\n```\n",
        )]);
        assert!(check_anchors(&graph).is_empty());
    }

    #[test]
    fn links_outside_the_corpus_are_ignored_by_doc06() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\nSee [ext](https://example.com#frag) and [other](../elsewhere/readme.md#x).\n",
        )]);
        assert!(check_anchors(&graph).is_empty());
    }

    #[test]
    fn non_canonical_name_fails_doc07_with_expected_name() {
        let graph = graph_of(&[(
            "docs/setup-guide.mdc",
            "---\nlayer: STRATEGY\n---\nBody.\n",
        )]);
        let violations = check_naming(&graph, &layers());
        assert_eq!(violations.len(), 1);
        assert!(
            violations[0].message.contains("STRATEGY_SETUP_GUIDE.mdc"),
            "message was: {}",
            violations[0].message
        );
    }

    #[test]
    fn doc07_skips_documents_with_invalid_layers() {
        let graph = graph_of(&[("docs/whatever.mdc", "---\nlayer: BOGUS\n---\nBody.\n")]);
        assert!(check_naming(&graph, &layers()).is_empty());
    }

    #[test]
    fn heading_gaps_warn_once_per_gap() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\n## 1. One\n\n## 3. Three\n\n## 4. Four\n",
        )]);
        let violations = check_heading_numbering(&graph);
        assert_eq!(violations.len(), 1, "adopting the gap stops cascades");
        assert!(violations[0].message.contains("expected 2"));
        assert_eq!(violations[0].severity, crate::report::Severity::Warn);
    }

    #[test]
    fn nested_numbering_resets_under_a_new_parent() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\n## 1. One\n\n### 1. One One\n\n### 2. One Two\n\n## 2. Two\n\n### 1. Two One\n",
        )]);
        assert!(check_heading_numbering(&graph).is_empty());
    }

    #[test]
    fn duplicate_numbers_warn() {
        let graph = graph_of(&[(
            "docs/a.mdc",
            "---\n---\n## 1. One\n\n## 1. Also One\n",
        )]);
        let violations = check_heading_numbering(&graph);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected 2"));
    }
}
