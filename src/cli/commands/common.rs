//! Common helper functions used across CLI commands
//!
//! This module contains the shared corpus-loading path used by `check`
//! and `fix`, plus the history-recording helper both of them call.

use anyhow::Result;

use docgate_config::Config;
use docgate_corpus::load_corpus;
use docgate_graph::{build_graph, CorpusGraph};
use docgate_history::{HistoryEntry, HistoryStore, RunMode};
use docgate_utils::error::{CorpusError, DocgateError};
use docgate_utils::exit_codes::ExitCode;
use docgate_utils::paths::SandboxRoot;

/// A corpus loaded far enough to run gates or plan fixes over it.
pub struct ProjectContext {
    pub root: SandboxRoot,
    pub context_map_text: String,
    pub graph: CorpusGraph,
}

/// Resolve the sandbox root, read the context map, and build the graph.
///
/// Fails with a typed error when the root is unusable or the context map
/// cannot be read at all. Per-document problems (missing files, malformed
/// front matter) surface later as gate violations, never here.
pub async fn load_project(config: &Config) -> Result<ProjectContext> {
    let root = SandboxRoot::new(config.root.as_std_path()).map_err(|e| {
        DocgateError::Corpus(CorpusError::InvalidRoot {
            path: config.root.to_string(),
            reason: e.to_string(),
        })
    })?;

    let map_path = root.join(&config.context_map).map_err(|e| {
        DocgateError::Corpus(CorpusError::ContextMapUnreadable {
            path: config.context_map.clone(),
            reason: e.to_string(),
        })
    })?;
    let context_map_text = tokio::fs::read_to_string(map_path.as_path())
        .await
        .map_err(|e| {
            DocgateError::Corpus(CorpusError::ContextMapUnreadable {
                path: config.context_map.clone(),
                reason: e.to_string(),
            })
        })?;

    let corpus = load_corpus(&root, &context_map_text).await;
    let graph = build_graph(corpus);

    Ok(ProjectContext {
        root,
        context_map_text,
        graph,
    })
}

/// Append one entry to the run history log.
///
/// Called after all stdout output and before any result-driven
/// `process::exit`, so a recorded run is always a reported run.
pub fn record_run(
    config: &Config,
    mode: RunMode,
    exit: ExitCode,
    error_count: u32,
    warn_count: u32,
    operations: u32,
) -> Result<()> {
    let store = HistoryStore::new(&config.root);
    let entry = HistoryEntry::new(mode, exit.as_i32(), error_count, warn_count, operations);
    let path = store.append(&entry).map_err(DocgateError::from)?;
    tracing::debug!(path = %path, "run recorded");
    Ok(())
}
