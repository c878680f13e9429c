//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// docgate - structural gates for documentation corpora
#[derive(Parser)]
#[command(name = "docgate")]
#[command(about = "Validates a documentation corpus against twelve structural gates and can fix it")]
#[command(long_about = r#"
docgate reads the context map of a documentation corpus, builds the breadcrumb
dependency graph it declares, and checks eight document gates (DOC-01..DOC-08)
plus four test-source hygiene gates (TC-01..TC-04). The fixable findings can
be repaired automatically with a transactional rename/rewrite pipeline.

EXAMPLES:
  # Scaffold .docgate/config.toml and a starter context map
  docgate init

  # Run all twelve gates against the current directory
  docgate check

  # Check a different project with an explicit context map
  docgate check --root ../handbook --context-map docs/context-map.yaml

  # Machine-readable report for CI (canonical JSON on stdout)
  docgate check --json

  # Preview the autofix plan without touching any file
  docgate fix --dry-run

  # Apply the autofix plan
  docgate fix

  # List the last ten recorded runs
  docgate history --limit 10

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from the root for .docgate/config.toml
  Use --config to specify an explicit config file path

EXIT CODES:
  0  clean, or warnings only
  1  internal error
  2  usage or configuration error
  3  gate violations at error severity (check)
  4  autofix plan conflict, corpus left untouched (fix)

For more information, see: https://github.com/docgate-dev/docgate
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress log output (command results on stdout are unaffected)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run all twelve gates without modifying the corpus
    ///
    /// Loads the corpus declared by the context map, builds the breadcrumb
    /// graph, and evaluates DOC-01..DOC-08 over it plus TC-01..TC-04 over
    /// the configured test roots. Exits 3 when any error-severity violation
    /// is found; warnings alone exit 0.
    ///
    /// EXAMPLES:
    ///   docgate check
    ///   docgate check --root ../handbook --json
    ///   docgate check --test-root tests --test-root src/__tests__
    Check {
        /// Project root containing the corpus (default: current directory)
        #[arg(long)]
        root: Option<Utf8PathBuf>,

        /// Context map path, relative to the root
        #[arg(long)]
        context_map: Option<String>,

        /// Test-source root to scan for TC gates, relative to the root (repeatable)
        #[arg(long = "test-root")]
        test_root: Vec<String>,

        /// Emit the gate report as canonical JSON (RFC 8785)
        #[arg(long)]
        json: bool,
    },

    /// Plan and apply automatic fixes for the document gates
    ///
    /// Computes the complete fix plan (canonical renames, front-matter
    /// normalization, structural insertions, reference rewrites, cycle
    /// removal) before writing anything. A plan conflict leaves the corpus
    /// untouched and exits 4.
    ///
    /// EXAMPLES:
    ///   docgate fix --dry-run
    ///   docgate fix --json
    Fix {
        /// Project root containing the corpus (default: current directory)
        #[arg(long)]
        root: Option<Utf8PathBuf>,

        /// Context map path, relative to the root
        #[arg(long)]
        context_map: Option<String>,

        /// Plan only; report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Emit the autofix summary as canonical JSON (RFC 8785)
        #[arg(long)]
        json: bool,
    },

    /// List recorded runs, newest first
    ///
    /// Reads the append-only run log under .docgate/history/. Preview (fix
    /// --dry-run) runs change nothing and are never recorded.
    ///
    /// EXAMPLES:
    ///   docgate history
    ///   docgate history --limit 5 --json
    History {
        /// Project root containing the history log (default: current directory)
        #[arg(long)]
        root: Option<Utf8PathBuf>,

        /// Maximum number of entries to list
        #[arg(long)]
        limit: Option<usize>,

        /// Emit the entries as canonical JSON (RFC 8785)
        #[arg(long)]
        json: bool,
    },

    /// Scaffold .docgate/config.toml and a starter context map
    ///
    /// Refuses to overwrite files that already exist.
    ///
    /// EXAMPLES:
    ///   docgate init
    ///   docgate init --root ../handbook
    Init {
        /// Project root to initialize (default: current directory)
        #[arg(long)]
        root: Option<Utf8PathBuf>,
    },
}
