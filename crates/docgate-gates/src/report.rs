//! Gate identifiers, violations, and the aggregated report.

use std::collections::BTreeMap;

use anyhow::Context;
use docgate_utils::canonicalization::emit_jcs;
use serde::{Deserialize, Serialize};

/// Schema identifier embedded in every emitted report.
pub const GATE_REPORT_SCHEMA_VERSION: &str = "gate-report.v1";

/// Severity of a gate violation. Warnings never block a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

/// The twelve gates, in report order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[cfg_attr(feature = "test-utils", derive(strum::VariantNames))]
pub enum GateId {
    #[serde(rename = "DOC-01")]
    Doc01,
    #[serde(rename = "DOC-02")]
    Doc02,
    #[serde(rename = "DOC-03")]
    Doc03,
    #[serde(rename = "DOC-04")]
    Doc04,
    #[serde(rename = "DOC-05")]
    Doc05,
    #[serde(rename = "DOC-06")]
    Doc06,
    #[serde(rename = "DOC-07")]
    Doc07,
    #[serde(rename = "DOC-08")]
    Doc08,
    #[serde(rename = "TC-01")]
    Tc01,
    #[serde(rename = "TC-02")]
    Tc02,
    #[serde(rename = "TC-03")]
    Tc03,
    #[serde(rename = "TC-04")]
    Tc04,
}

impl GateId {
    /// Every gate, in report order.
    pub const ALL: [GateId; 12] = [
        GateId::Doc01,
        GateId::Doc02,
        GateId::Doc03,
        GateId::Doc04,
        GateId::Doc05,
        GateId::Doc06,
        GateId::Doc07,
        GateId::Doc08,
        GateId::Tc01,
        GateId::Tc02,
        GateId::Tc03,
        GateId::Tc04,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            GateId::Doc01 => "DOC-01",
            GateId::Doc02 => "DOC-02",
            GateId::Doc03 => "DOC-03",
            GateId::Doc04 => "DOC-04",
            GateId::Doc05 => "DOC-05",
            GateId::Doc06 => "DOC-06",
            GateId::Doc07 => "DOC-07",
            GateId::Doc08 => "DOC-08",
            GateId::Tc01 => "TC-01",
            GateId::Tc02 => "TC-02",
            GateId::Tc03 => "TC-03",
            GateId::Tc04 => "TC-04",
        }
    }

    /// Fixed severity of violations this gate emits.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            GateId::Doc08 | GateId::Tc02 | GateId::Tc03 => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gate violation. Rule-specific fields stay `None` for gates that
/// do not use them so the JSON form only carries what applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Violation {
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, Severity::Error)
    }

    #[must_use]
    pub fn warn(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, Severity::Warn)
    }

    fn new(path: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
            layer: None,
            link: None,
            cycle: None,
            line: None,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_cycle(mut self, cycle: Vec<String>) -> Self {
        self.cycle = Some(cycle);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Aggregated gate results. Every gate owns a bucket even when it
/// passed, so consumers can distinguish "ran and passed" from "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub schema_version: String,
    pub results: BTreeMap<GateId, Vec<Violation>>,
    pub error_count: u32,
    pub warn_count: u32,
}

impl Default for GateReport {
    fn default() -> Self {
        Self::new()
    }
}

impl GateReport {
    #[must_use]
    pub fn new() -> Self {
        let mut results = BTreeMap::new();
        for gate in GateId::ALL {
            results.insert(gate, Vec::new());
        }
        Self {
            schema_version: GATE_REPORT_SCHEMA_VERSION.to_string(),
            results,
            error_count: 0,
            warn_count: 0,
        }
    }

    pub fn push(&mut self, gate: GateId, violation: Violation) {
        match violation.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warn => self.warn_count += 1,
        }
        self.results.entry(gate).or_default().push(violation);
    }

    pub fn extend(&mut self, gate: GateId, violations: Vec<Violation>) {
        for violation in violations {
            self.push(gate, violation);
        }
    }

    /// Fold another report's violations into this one.
    pub fn merge(&mut self, other: GateReport) {
        for (gate, violations) in other.results {
            self.extend(gate, violations);
        }
    }

    #[must_use]
    pub fn violations(&self, gate: GateId) -> &[Violation] {
        self.results.get(&gate).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.error_count + self.warn_count
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Emit a report as canonical JSON (RFC 8785) for deterministic output
/// and stable diffs.
pub fn emit_report_json(report: &GateReport) -> anyhow::Result<String> {
    emit_jcs(report).context("Failed to emit gate report JSON")
}
