//! Gate validators for docgate.
//!
//! Twelve gates in two families: DOC-01..08 run over the dependency
//! graph of a loaded corpus, TC-01..04 run over scanned test sources.
//! Each gate owns a bucket in the [`GateReport`]; an empty bucket means
//! the gate passed for the whole corpus.

pub mod doc_gates;
pub mod headings;
pub mod naming;
pub mod report;
pub mod tc_gates;

pub use doc_gates::{
    evaluate_doc_gates, has_breadcrumb, heading_matches, BREADCRUMB_MARKER, REQUIRED_SECTIONS,
};
pub use report::{
    emit_report_json, GateId, GateReport, Severity, Violation, GATE_REPORT_SCHEMA_VERSION,
};
pub use tc_gates::{evaluate_tc_gates, scan_test_sources, TestSourceFile};

use docgate_graph::CorpusGraph;

/// Run the document gates and the test-case gates into one report.
#[must_use]
pub fn evaluate_all(
    graph: &CorpusGraph,
    test_files: &[TestSourceFile],
    valid_layers: &[String],
) -> GateReport {
    let mut report = evaluate_doc_gates(graph, valid_layers);
    report.merge(evaluate_tc_gates(test_files));
    report
}
