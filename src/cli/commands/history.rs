//! History command implementation
//!
//! Handles `docgate history` and `docgate history --json`.

use anyhow::{Context, Result};

use docgate_config::Config;
use docgate_history::HistoryStore;
use docgate_utils::canonicalization::emit_jcs;
use docgate_utils::error::DocgateError;

/// Execute the history command: list recorded runs, newest first.
///
/// The effective limit comes from the resolved config, so `--limit`
/// beats the config file which beats the built-in default.
pub fn execute_history_command(config: &Config, json: bool) -> Result<()> {
    let store = HistoryStore::new(&config.root);
    let entries = store
        .read_recent(config.history_limit)
        .map_err(DocgateError::from)?;

    if json {
        let output = emit_jcs(&entries).with_context(|| "Failed to emit history JSON")?;
        println!("{output}");
        return Ok(());
    }

    if entries.is_empty() {
        println!("No recorded runs under {}", store.dir());
        return Ok(());
    }

    println!("Recorded runs (newest first):");
    for entry in &entries {
        println!(
            "  {}  {:<5}  exit {}  {} error(s), {} warning(s), {} operation(s)",
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.mode.as_str(),
            entry.exit_code,
            entry.error_count,
            entry.warn_count,
            entry.operations,
        );
    }
    Ok(())
}
