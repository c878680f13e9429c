//! Autofix run summary and JSON emission.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use docgate_utils::canonicalization::emit_jcs;
use serde::{Deserialize, Serialize};

/// Schema identifier embedded in every autofix summary.
pub const AUTOFIX_SUMMARY_SCHEMA_VERSION: &str = "autofix-summary.v1";

/// Mode for autofix runs - preview or apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    /// Plan fixes and report them, no writes
    Preview,
    /// Plan fixes and write them to disk
    Apply,
}

impl FixMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Apply => "apply",
        }
    }
}

/// One planned mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AutofixOperation {
    /// A file moves to its canonical name.
    Rename { from: String, to: String },
    /// A file's content changes in place.
    Modify { path: String },
}

/// Outcome of an autofix run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutofixStatus {
    Ok,
    Error,
}

/// Machine-readable result of one autofix run.
///
/// `operations` lists the plan in pipeline order: renames first, then
/// content modifications. `files` holds the final path of every file
/// the run wrote (or would write in preview mode), sorted. `hashes`
/// maps each written file to the BLAKE3 hash (first 8 chars) of its
/// new content and stays empty in preview mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofixSummary {
    pub schema_version: String,
    pub status: AutofixStatus,
    pub operations: Vec<AutofixOperation>,
    pub files: Vec<String>,
    pub hashes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AutofixSummary {
    #[must_use]
    pub fn ok(
        operations: Vec<AutofixOperation>,
        files: Vec<String>,
        hashes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            schema_version: AUTOFIX_SUMMARY_SCHEMA_VERSION.to_string(),
            status: AutofixStatus::Ok,
            operations,
            files,
            hashes,
            message: None,
        }
    }

    /// Summary for a plan-time conflict: nothing was written.
    #[must_use]
    pub fn conflict(message: String) -> Self {
        Self {
            schema_version: AUTOFIX_SUMMARY_SCHEMA_VERSION.to_string(),
            status: AutofixStatus::Error,
            operations: Vec::new(),
            files: Vec::new(),
            hashes: BTreeMap::new(),
            message: Some(message),
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status == AutofixStatus::Error
    }
}

/// Serialize an autofix summary as canonical JSON (RFC 8785).
pub fn emit_summary_json(summary: &AutofixSummary) -> Result<String> {
    emit_jcs(summary).context("Failed to emit autofix summary JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_serialize_with_type_tags() {
        let rename = AutofixOperation::Rename {
            from: "docs/setup.mdc".to_string(),
            to: "docs/STRATEGY_SETUP.mdc".to_string(),
        };
        let json = serde_json::to_value(&rename).unwrap();
        assert_eq!(json["type"], "rename");
        assert_eq!(json["from"], "docs/setup.mdc");
        assert_eq!(json["to"], "docs/STRATEGY_SETUP.mdc");

        let modify = AutofixOperation::Modify {
            path: "docs/a.mdc".to_string(),
        };
        let json = serde_json::to_value(&modify).unwrap();
        assert_eq!(json["type"], "modify");
        assert_eq!(json["path"], "docs/a.mdc");
    }

    #[test]
    fn summary_emits_canonical_json() {
        let summary = AutofixSummary::ok(
            vec![AutofixOperation::Modify {
                path: "docs/a.mdc".to_string(),
            }],
            vec!["docs/a.mdc".to_string()],
            BTreeMap::from([("docs/a.mdc".to_string(), "0a1b2c3d".to_string())]),
        );
        let json = emit_summary_json(&summary).unwrap();
        assert!(json.contains("\"schema_version\":\"autofix-summary.v1\""));
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("\"message\""), "absent message is omitted");

        let parsed: AutofixSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }

    #[test]
    fn conflict_summary_carries_message_and_no_operations() {
        let summary = AutofixSummary::conflict("cannot break cycle".to_string());
        assert!(summary.is_conflict());
        assert!(summary.operations.is_empty());
        let json = emit_summary_json(&summary).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"message\":\"cannot break cycle\""));
    }

    #[test]
    fn mode_names_are_stable() {
        assert_eq!(FixMode::Preview.as_str(), "preview");
        assert_eq!(FixMode::Apply.as_str(), "apply");
    }
}
