use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use docgate_utils::atomic_write::write_file_atomic;
use docgate_utils::canonicalization::emit_jcs;
use docgate_utils::error::HistoryError;
use tracing::debug;

use crate::model::HistoryEntry;

/// History directory, relative to the project root.
pub const HISTORY_DIR: &str = ".docgate/history";

/// Append-only store of run records.
///
/// One JCS JSON file per run under `<root>/.docgate/history/`, named
/// `<mode>-<UTC timestamp>.json`. Existing files are never rewritten;
/// pruning old entries by deleting files is always safe.
pub struct HistoryStore {
    dir: Utf8PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            dir: root.join(HISTORY_DIR),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Record one run. Returns the path of the written file.
    pub fn append(&self, entry: &HistoryEntry) -> Result<Utf8PathBuf, HistoryError> {
        let name = format!(
            "{}-{}.json",
            entry.mode.as_str(),
            entry.recorded_at.format("%Y%m%d_%H%M%S%.3f")
        );
        let path = self.dir.join(name);
        let json = emit_jcs(entry).map_err(|e| HistoryError::WriteFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;
        write_file_atomic(&path, &json).map_err(|e| HistoryError::WriteFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;
        debug!(path = %path, mode = entry.mode.as_str(), "recorded run");
        Ok(path)
    }

    /// Read up to `limit` entries, newest first.
    ///
    /// A history directory that does not exist yet is an empty history,
    /// not an error.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = Vec::new();
        let dir = match fs::read_dir(self.dir.as_std_path()) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(entries),
            Err(e) => {
                return Err(HistoryError::ReadFailed {
                    path: self.dir.to_string(),
                    reason: e.to_string(),
                });
            }
        };
        for item in dir {
            let item = item.map_err(|e| HistoryError::ReadFailed {
                path: self.dir.to_string(),
                reason: e.to_string(),
            })?;
            let path = item.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let text = fs::read_to_string(&path).map_err(|e| HistoryError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let entry: HistoryEntry =
                serde_json::from_str(&text).map_err(|e| HistoryError::MalformedEntry {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            entries.push(entry);
        }
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        entries.truncate(limit);
        Ok(entries)
    }
}
