use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version for history entry JSON.
pub const HISTORY_ENTRY_SCHEMA_VERSION: &str = "history-entry.v1";

/// Which command produced a history entry.
///
/// Preview (`--dry-run`) fix runs change nothing and are not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Check,
    Fix,
}

impl RunMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Fix => "fix",
        }
    }
}

/// One recorded run: a timestamped snapshot of mode, exit code, and
/// result counts. Entries are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Schema version, always `history-entry.v1`.
    pub schema_version: String,
    /// RFC3339 UTC timestamp when the run was recorded
    pub recorded_at: DateTime<Utc>,
    pub mode: RunMode,
    /// Process exit code the run finished with
    pub exit_code: i32,
    /// Error-severity findings reported by the run
    pub error_count: u32,
    /// Warn-severity findings reported by the run
    pub warn_count: u32,
    /// Autofix operations planned or applied (zero for check runs)
    pub operations: u32,
}

impl HistoryEntry {
    /// Build an entry timestamped now.
    #[must_use]
    pub fn new(
        mode: RunMode,
        exit_code: i32,
        error_count: u32,
        warn_count: u32,
        operations: u32,
    ) -> Self {
        Self {
            schema_version: HISTORY_ENTRY_SCHEMA_VERSION.to_string(),
            recorded_at: Utc::now(),
            mode,
            exit_code,
            error_count,
            warn_count,
            operations,
        }
    }
}
