//! Configuration types and built-in defaults.
//!
//! Values resolve with precedence CLI > config file > defaults, and each
//! resolved value remembers where it came from so the verbose output can
//! attribute it.

mod discovery;
mod sources;

use std::collections::BTreeMap;

use camino::Utf8PathBuf;

/// Default context-map path, relative to the project root.
pub const DEFAULT_CONTEXT_MAP: &str = "context-map.yaml";

/// The layer enumeration documents must declare in front matter.
pub const DEFAULT_VALID_LAYERS: [&str; 5] = [
    "STRATEGY",
    "REQUIREMENTS",
    "ARCHITECTURE",
    "IMPLEMENTATION",
    "OPERATIONS",
];

/// Directories scanned for test sources when no override is given.
pub const DEFAULT_TEST_ROOTS: [&str; 2] = ["tests", "src/__tests__"];

/// Glob patterns excluded from test-source scanning.
pub const DEFAULT_EXCLUDE: [&str; 2] = ["**/node_modules/**", "**/dist/**"];

/// Entries shown by `docgate history` when `--limit` is absent.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Resolved configuration for one docgate run.
///
/// Built by [`Config::discover`]; see the module docs for precedence.
/// `source_attribution` records, per key, which level supplied the
/// effective value.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root all corpus paths are relative to.
    pub root: Utf8PathBuf,
    /// Context-map path, relative to `root`.
    pub context_map: String,
    /// Test-source roots, relative to `root`.
    pub test_roots: Vec<String>,
    /// Layer names accepted by the layer gate.
    pub valid_layers: Vec<String>,
    /// Glob patterns excluded from test-source scanning.
    pub exclude: Vec<String>,
    /// Default number of history entries to list.
    pub history_limit: usize,
    /// Config file the file-level values came from, if one was found.
    pub config_path: Option<Utf8PathBuf>,
    /// Where each effective value came from, keyed by setting name.
    pub source_attribution: BTreeMap<String, ConfigSource>,
}

/// Source of a configuration value for attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(Utf8PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::ConfigFile(path) => write!(f, "config file ({path})"),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}

/// CLI arguments that participate in configuration resolution.
///
/// Flags that only shape one invocation (verbosity, `--json`, `--dry-run`)
/// stay in the CLI layer and never reach this struct.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub root: Option<Utf8PathBuf>,
    pub config_path: Option<Utf8PathBuf>,
    pub context_map: Option<String>,
    pub test_roots: Vec<String>,
    pub history_limit: Option<usize>,
}
