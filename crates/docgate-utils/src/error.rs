use std::fmt;
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::paths::SandboxError;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `DocgateError` is the primary error type returned by docgate library
/// operations. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// Note the deliberate asymmetry with gate violations: a dangling link or a
/// bad layer value in a document is a *violation* reported through the gate
/// machinery, never a `DocgateError`. This type covers the failures that
/// prevent a run from producing a result at all (unusable root, unreadable
/// context map, history store corruption, broken writes) plus internal
/// invariant breaches, which always surface as hard failures.
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration / usage errors, unusable inputs |
/// | 1 | Everything else (I/O, history store, internal bugs) |
///
/// Exit codes 3 (gate violations) and 4 (autofix conflict) come from run
/// *results*, not from this error type.
///
/// Library code returns `DocgateError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum DocgateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Autofix error: {0}")]
    Autofix(#[from] AutofixError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal invariant violated: {reason}")]
    Internal { reason: String },
}

impl DocgateError {
    /// Map this error to the documented CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::Corpus(_) | Self::Sandbox(_) => ExitCode::CLI_ARGS,
            Self::History(_) | Self::Autofix(_) | Self::Io(_) | Self::Internal { .. } => {
                ExitCode::INTERNAL
            }
        }
    }

    /// Format this error for end users, including context and suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut out = format!("Error: {self}");
        if let Some(ctx) = self.context() {
            out.push_str(&format!("\n\n{ctx}"));
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\n\nSuggestions:");
            for s in suggestions {
                out.push_str(&format!("\n  - {s}"));
            }
        }
        out
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Corpus,
    FileSystem,
    History,
    Autofix,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Corpus => write!(f, "Corpus"),
            Self::FileSystem => write!(f, "File System"),
            Self::History => write!(f, "History"),
            Self::Autofix => write!(f, "Autofix"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with a [corpus] section.".to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } => Some(
                "docgate looks for .docgate/config.toml upward from the project root, or at the path given with --config.".to_string(),
            ),
            Self::DiscoveryFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of your config file".to_string(),
                "Run 'docgate init' to generate a valid starter config".to_string(),
            ],
            Self::InvalidValue { key, .. } => {
                vec![format!("Review the documented values for '{key}'")]
            }
            Self::NotFound { .. } => vec![
                "Create the file with 'docgate init'".to_string(),
                "Pass an explicit path with --config".to_string(),
            ],
            Self::DiscoveryFailed { .. } => {
                vec!["Verify the project root is readable".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Corpus-level errors that prevent a run from starting.
///
/// Per-document problems (missing files, malformed front matter, dangling
/// links) never appear here; the validators record them as violations and
/// the run continues.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Project root is not usable: {path}: {reason}")]
    InvalidRoot { path: String, reason: String },

    #[error("Context map is unreadable: {path}: {reason}")]
    ContextMapUnreadable { path: String, reason: String },
}

impl UserFriendlyError for CorpusError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidRoot { path, reason } => {
                format!("Project root '{path}' is not usable: {reason}")
            }
            Self::ContextMapUnreadable { path, reason } => {
                format!("Could not read context map '{path}': {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidRoot { .. } => {
                Some("The project root must be an existing directory.".to_string())
            }
            Self::ContextMapUnreadable { .. } => Some(
                "The context map enumerates the documents docgate validates; without it there is nothing to check.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidRoot { .. } => vec!["Pass a valid directory with --root".to_string()],
            Self::ContextMapUnreadable { .. } => vec![
                "Check the path given with --context-map".to_string(),
                "Run 'docgate init' to scaffold a starter context map".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Corpus
    }
}

/// Errors from the append-only run-history store
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to write history entry at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to read history from {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Malformed history entry at {path}: {reason}")]
    MalformedEntry { path: String, reason: String },
}

impl UserFriendlyError for HistoryError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some("Run history lives under .docgate/history/ as one JSON file per run.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::WriteFailed { .. } => {
                vec!["Check that .docgate/history/ is writable".to_string()]
            }
            Self::ReadFailed { .. } | Self::MalformedEntry { .. } => {
                vec!["Remove the offending file; history is append-only and safe to prune".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::History
    }
}

/// Errors raised while applying an autofix plan.
///
/// Plan *conflicts* (rename collisions that cannot be disambiguated,
/// irreconcilable cycles) are not errors: the planner reports them through
/// the summary status and leaves the corpus untouched. This type covers
/// failures while executing an already-validated plan.
#[derive(Error, Debug)]
pub enum AutofixError {
    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to rename {from} to {to}: {reason}")]
    RenameFailed {
        from: String,
        to: String,
        reason: String,
    },
}

impl UserFriendlyError for AutofixError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Autofix applies its plan file by file; a failure here can leave some operations applied. Re-running the fix is safe and will complete the remainder.".to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "Check filesystem permissions under the project root".to_string(),
            "Re-run 'docgate fix' once the underlying problem is resolved".to_string(),
        ]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Autofix
    }
}

impl UserFriendlyError for DocgateError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Corpus(e) => e.user_message(),
            Self::History(e) => e.user_message(),
            Self::Autofix(e) => e.user_message(),
            Self::Sandbox(e) => e.to_string(),
            Self::Io(e) => format!("I/O error: {e}"),
            Self::Internal { reason } => format!("Internal invariant violated: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Corpus(e) => e.context(),
            Self::History(e) => e.context(),
            Self::Autofix(e) => e.context(),
            Self::Sandbox(_) => Some(
                "All reads and writes are confined to the project root; paths that escape it are rejected.".to_string(),
            ),
            Self::Io(_) => None,
            Self::Internal { .. } => {
                Some("This is a bug in docgate, not a problem with your corpus.".to_string())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Corpus(e) => e.suggestions(),
            Self::History(e) => e.suggestions(),
            Self::Autofix(e) => e.suggestions(),
            Self::Sandbox(_) => vec!["Use paths relative to the project root".to_string()],
            Self::Io(_) => vec![],
            Self::Internal { .. } => {
                vec!["Please report this with the full command output".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Corpus(e) => e.category(),
            Self::History(e) => e.category(),
            Self::Autofix(e) => e.category(),
            Self::Sandbox(_) | Self::Io(_) => ErrorCategory::FileSystem,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}
