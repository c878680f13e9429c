//! docgate - Documentation corpus gates with a breadcrumb graph and autofix
//!
//! This crate validates a documentation corpus against twelve structural
//! gates and can rewrite the corpus to satisfy the document gates
//! automatically, keeping an append-only history of every run.
//!
//! docgate can be used in two ways:
//! - **CLI**: Install via `cargo install docgate` and run from command line
//! - **Library**: Add as a dependency and drive the loader, gates, and
//!   autofixer directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Scaffold .docgate/config.toml and a starter context map
//! docgate init
//!
//! # Run all twelve gates
//! docgate check --json
//!
//! # Preview what autofix would change, then apply it
//! docgate fix --dry-run
//! docgate fix
//!
//! # List recorded runs, newest first
//! docgate history --limit 10
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use docgate::{build_graph, evaluate_all, load_corpus, scan_test_sources, SandboxRoot};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let root = SandboxRoot::new("/path/to/project")?;
//! let context_map = tokio::fs::read_to_string("/path/to/project/context-map.yaml").await?;
//! let corpus = load_corpus(&root, &context_map).await;
//! let graph = build_graph(corpus);
//! let tests = scan_test_sources(&root, &["tests".into()], &[])?;
//! let layers: Vec<String> = ["STRATEGY", "IMPLEMENTATION"].iter().map(|s| s.to_string()).collect();
//! let report = evaluate_all(&graph, &tests, &layers);
//! println!("{} errors", report.error_count);
//! # Ok(())
//! # }
//! ```
//!
//! # JSON Contracts
//!
//! docgate emits JSON in JCS (RFC 8785) canonical form for deterministic
//! output:
//!
//! - Gate reports: `schema_version: "gate-report.v1"`
//! - Autofix summaries: `schema_version: "autofix-summary.v1"`
//! - History entries: `schema_version: "history-entry.v1"`
//!
//! Use [`emit_jcs`] to emit JSON in canonical form for your own integrations.
//!
//! # Stable Public API
//!
//! The following types are part of stable public API for 1.x releases:
//!
//! - [`Config`] and [`CliArgs`] - Configuration management
//! - [`GateId`], [`GateReport`], [`Violation`] - Gate results
//! - [`AutofixSummary`], [`Autofixer`], [`FixMode`] - Autofix pipeline
//! - [`HistoryEntry`], [`HistoryStore`] - Run history
//! - [`DocgateError`] - Library error type
//! - [`ExitCode`] - CLI exit codes
//! - [`emit_jcs`] - JCS canonical JSON emission
//!
//! Internal modules are accessible via module paths but are marked
//! `#[doc(hidden)]` and are not covered by semver stability guarantees.

// ============================================================================
// Stable Public API - covered by semver guarantees for 1.x
// ============================================================================

/// Configuration for docgate operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// Use [`Config::discover()`] for CLI-like behavior.
pub use docgate_config::Config;

/// CLI argument structure for configuration override.
///
/// Used internally by the CLI and for programmatic configuration via
/// [`Config::discover()`].
pub use docgate_config::CliArgs;

/// Library-level error type with rich context.
///
/// `DocgateError` provides detailed error information including:
/// - User-friendly messages via [`display_for_user()`](DocgateError::display_for_user)
/// - Exit code mapping via [`to_exit_code()`](DocgateError::to_exit_code)
///
/// Library code returns `DocgateError` and does NOT call `std::process::exit()`.
pub use docgate_utils::error::DocgateError;

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling for docgate operations.
/// Use named constants (e.g., [`ExitCode::SUCCESS`], [`ExitCode::GATE_VIOLATIONS`])
/// or [`as_i32()`](ExitCode::as_i32) to get the numeric value.
pub use docgate_utils::exit_codes::ExitCode;

/// JCS (RFC 8785) canonical JSON emission for JSON contracts.
///
/// Use this function to emit JSON in canonical form for gate reports,
/// autofix summaries, and history entries. Canonical JSON ensures
/// deterministic output for stable diffs and hash verification.
pub use docgate_utils::canonicalization::emit_jcs;

/// Path guard confining every read and write to the project root.
pub use docgate_utils::paths::SandboxRoot;

/// Gate identifiers, violations, and the aggregated report.
pub use docgate_gates::{
    evaluate_all, evaluate_doc_gates, evaluate_tc_gates, scan_test_sources, GateId, GateReport,
    Severity, Violation,
};

/// Corpus loading from a context map plus files on disk.
pub use docgate_corpus::{load_corpus, LoadedCorpus};

/// Dependency graph construction over a loaded corpus.
pub use docgate_graph::{build_graph, CorpusGraph};

/// Autofix planning and execution.
pub use docgate_autofix::{
    plan_fixes, Autofixer, AutofixOperation, AutofixPlan, AutofixStatus, AutofixSummary, FixMode,
};

/// Append-only run history.
pub use docgate_history::{HistoryEntry, HistoryStore, RunMode};

// Additional stable re-exports for convenience

/// Error categories for grouping similar errors.
///
/// Used with [`DocgateError`] for programmatic error handling.
pub use docgate_utils::error::ErrorCategory;

/// Trait for providing user-friendly error reporting.
///
/// Implemented by [`DocgateError`] and its component error types.
pub use docgate_utils::error::UserFriendlyError;

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use docgate_utils::{canonicalization, error, exit_codes, logging, paths};

#[doc(hidden)]
pub use docgate_config as config;

#[doc(hidden)]
pub use docgate_corpus as corpus;

#[doc(hidden)]
pub use docgate_graph as graph;

#[doc(hidden)]
pub use docgate_gates as gates;

#[doc(hidden)]
pub use docgate_autofix as autofix;

#[doc(hidden)]
pub use docgate_history as history;

// CLI module - internal implementation detail, not part of stable public API
// Exported with #[doc(hidden)] to allow white-box testing of CLI flag parsing
#[doc(hidden)]
pub mod cli;
