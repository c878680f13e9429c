//! Plan execution.
//!
//! The executor never writes without a complete plan. In apply mode it
//! lands all content edits first, at their pre-rename paths, then the
//! context map, and performs renames last, so an interrupted run can
//! leave extra references to old names but never a moved file whose
//! references still point at the old path. Re-running the fixer
//! completes the remainder.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::Utf8PathBuf;
use docgate_graph::CorpusGraph;
use docgate_utils::atomic_write::write_file_atomic;
use docgate_utils::canonicalization::content_hash_short;
use docgate_utils::error::{AutofixError, DocgateError};
use docgate_utils::paths::SandboxRoot;
use tracing::{debug, info, warn};

use crate::planner::{plan_fixes, AutofixPlan};
use crate::summary::{AutofixSummary, FixMode};

/// Plans and applies fixes inside a sandboxed corpus root.
///
/// Every path in the plan is validated through [`SandboxRoot::join`]
/// before any file operation, so a hostile context map cannot steer
/// writes outside the corpus.
pub struct Autofixer {
    mode: FixMode,
    root: SandboxRoot,
}

impl Autofixer {
    #[must_use]
    pub fn new(mode: FixMode, root: SandboxRoot) -> Self {
        Self { mode, root }
    }

    /// Plan fixes for the corpus and, in apply mode, execute them.
    ///
    /// A plan conflict is not an error: it reports through the summary
    /// status and the corpus stays untouched. Filesystem failures while
    /// applying an already-validated plan do error.
    pub fn run(
        &self,
        graph: &CorpusGraph,
        context_map_path: &str,
        context_map_text: &str,
        valid_layers: &[String],
    ) -> Result<AutofixSummary, DocgateError> {
        let plan = match plan_fixes(graph, context_map_path, context_map_text, valid_layers) {
            Ok(plan) => plan,
            Err(conflict) => {
                warn!(reason = %conflict, "autofix plan conflict, corpus untouched");
                return Ok(AutofixSummary::conflict(conflict.reason));
            }
        };

        let files = planned_files(&plan, context_map_path);
        if self.mode == FixMode::Preview {
            debug!(
                operations = plan.operations.len(),
                "preview mode, nothing written"
            );
            return Ok(AutofixSummary::ok(plan.operations, files, BTreeMap::new()));
        }

        let mut hashes = BTreeMap::new();
        for (path, content) in &plan.edits {
            let full = self.resolve(path)?;
            write_file_atomic(&full, content).map_err(|e| AutofixError::WriteFailed {
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;
            let final_path = plan
                .renames
                .get(path)
                .cloned()
                .unwrap_or_else(|| path.clone());
            hashes.insert(final_path, content_hash_short(content));
        }
        if let Some(map_text) = &plan.context_map {
            let full = self.resolve(context_map_path)?;
            write_file_atomic(&full, map_text).map_err(|e| AutofixError::WriteFailed {
                path: context_map_path.to_string(),
                reason: format!("{e:#}"),
            })?;
            hashes.insert(context_map_path.to_string(), content_hash_short(map_text));
        }
        for (from, to) in &plan.renames {
            let from_full = self.resolve(from)?;
            let to_full = self.resolve(to)?;
            if to_full.exists() {
                return Err(AutofixError::RenameFailed {
                    from: from.clone(),
                    to: to.clone(),
                    reason: "target already exists".to_string(),
                }
                .into());
            }
            fs::rename(from_full.as_std_path(), to_full.as_std_path()).map_err(|e| {
                AutofixError::RenameFailed {
                    from: from.clone(),
                    to: to.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        info!(
            renames = plan.renames.len(),
            edits = plan.edits.len(),
            "autofix applied"
        );
        Ok(AutofixSummary::ok(plan.operations, files, hashes))
    }

    fn resolve(&self, rel: &str) -> Result<Utf8PathBuf, DocgateError> {
        let sandbox_path = self.root.join(rel)?;
        Utf8PathBuf::from_path_buf(sandbox_path.to_path_buf()).map_err(|path| {
            DocgateError::Internal {
                reason: format!("non UTF-8 path: {}", path.display()),
            }
        })
    }
}

/// Final paths of every file the plan touches, sorted.
fn planned_files(plan: &AutofixPlan, context_map_path: &str) -> Vec<String> {
    let mut files: BTreeSet<String> = BTreeSet::new();
    for path in plan.edits.keys() {
        files.insert(
            plan.renames
                .get(path)
                .cloned()
                .unwrap_or_else(|| path.clone()),
        );
    }
    for target in plan.renames.values() {
        files.insert(target.clone());
    }
    if plan.context_map.is_some() {
        files.insert(context_map_path.to_string());
    }
    files.into_iter().collect()
}
