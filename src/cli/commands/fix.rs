//! Fix command implementation
//!
//! Handles `docgate fix` and `docgate fix --dry-run`.

use anyhow::{Context, Result};

use docgate_autofix::{emit_summary_json, AutofixOperation, AutofixSummary, Autofixer, FixMode};
use docgate_config::Config;
use docgate_gates::evaluate_doc_gates;
use docgate_history::RunMode;
use docgate_utils::exit_codes::ExitCode;
use docgate_utils::logging::{log_run_complete, log_run_start, run_span};

use super::common::{load_project, record_run};

/// Execute the fix command: plan, optionally apply, report, record.
///
/// A plan conflict leaves the corpus untouched and exits 4, in preview
/// mode too. Preview runs are never recorded in the history log.
pub async fn execute_fix_command(config: &Config, dry_run: bool, json: bool) -> Result<()> {
    let started = std::time::Instant::now();
    let mode = if dry_run {
        FixMode::Preview
    } else {
        FixMode::Apply
    };
    log_run_start(mode.as_str(), config.root.as_str());

    let project = load_project(config).await?;

    // Recorded alongside the operation count: what the fixer saw before
    // changing anything.
    let before = evaluate_doc_gates(&project.graph, &config.valid_layers);

    let fixer = Autofixer::new(mode, project.root);
    let summary = {
        let _span = run_span(mode.as_str(), "autofix", config.root.as_str()).entered();
        fixer.run(
            &project.graph,
            &config.context_map,
            &project.context_map_text,
            &config.valid_layers,
        )?
    };

    if json {
        let output =
            emit_summary_json(&summary).with_context(|| "Failed to emit autofix summary")?;
        println!("{output}");
    } else {
        print_summary(&summary, mode);
    }

    log_run_complete(
        mode.as_str(),
        before.error_count as usize,
        before.warn_count as usize,
        started.elapsed().as_millis(),
    );

    if !dry_run {
        let exit = if summary.is_conflict() {
            ExitCode::AUTOFIX_CONFLICT
        } else {
            ExitCode::SUCCESS
        };
        record_run(
            config,
            RunMode::Fix,
            exit,
            before.error_count,
            before.warn_count,
            summary.operations.len() as u32,
        )?;
    }

    if summary.is_conflict() {
        std::process::exit(ExitCode::AUTOFIX_CONFLICT.as_i32());
    }
    Ok(())
}

/// Human-readable autofix summary.
fn print_summary(summary: &AutofixSummary, mode: FixMode) {
    if summary.is_conflict() {
        let reason = summary.message.as_deref().unwrap_or("unknown conflict");
        println!("✗ Autofix plan conflict: {reason}");
        println!("  No files were changed");
        return;
    }

    if summary.operations.is_empty() {
        println!("✓ Nothing to fix");
        return;
    }

    match mode {
        FixMode::Preview => println!("Planned operations ({}):", summary.operations.len()),
        FixMode::Apply => println!("Applied operations ({}):", summary.operations.len()),
    }
    for operation in &summary.operations {
        match operation {
            AutofixOperation::Rename { from, to } => println!("  rename {from} -> {to}"),
            AutofixOperation::Modify { path } => println!("  modify {path}"),
        }
    }

    match mode {
        FixMode::Preview => {
            println!(
                "\n{} file(s) would change; re-run without --dry-run to apply",
                summary.files.len()
            );
        }
        FixMode::Apply => {
            println!("\n{} file(s) written:", summary.files.len());
            for file in &summary.files {
                match summary.hashes.get(file) {
                    Some(hash) => println!("  {file} -> {hash}"),
                    None => println!("  {file}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn conflict_summary_prints_without_panicking() {
        let summary = AutofixSummary::conflict("two documents disambiguate to one name".into());
        print_summary(&summary, FixMode::Apply);
    }

    #[test]
    fn applied_summary_prints_without_panicking() {
        let summary = AutofixSummary::ok(
            vec![
                AutofixOperation::Rename {
                    from: "docs/setup.mdc".into(),
                    to: "docs/STRATEGY_SETUP.mdc".into(),
                },
                AutofixOperation::Modify {
                    path: "docs/STRATEGY_SETUP.mdc".into(),
                },
            ],
            vec!["docs/STRATEGY_SETUP.mdc".into()],
            BTreeMap::from([("docs/STRATEGY_SETUP.mdc".into(), "0a1b2c3d".into())]),
        );
        print_summary(&summary, FixMode::Preview);
        print_summary(&summary, FixMode::Apply);
    }
}
