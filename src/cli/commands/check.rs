//! Check command implementation
//!
//! Handles `docgate check` and `docgate check --json`.

use anyhow::{Context, Result};

use docgate_config::Config;
use docgate_gates::{
    emit_report_json, evaluate_all, scan_test_sources, GateId, GateReport, Severity,
};
use docgate_history::RunMode;
use docgate_utils::exit_codes::ExitCode;
use docgate_utils::logging::{log_run_complete, log_run_start, run_span};

use super::common::{load_project, record_run};

/// Execute the check command: run all twelve gates, report, record.
///
/// Exits the process with code 3 when any error-severity violation was
/// found, after stdout output and history recording are complete.
/// Warnings alone leave the exit code at 0.
pub async fn execute_check_command(config: &Config, json: bool) -> Result<()> {
    let started = std::time::Instant::now();
    log_run_start("check", config.root.as_str());

    let project = load_project(config).await?;
    let test_files = scan_test_sources(&project.root, &config.test_roots, &config.exclude)
        .with_context(|| "Failed to scan test sources")?;
    let report = {
        let _span = run_span("check", "validate", config.root.as_str()).entered();
        evaluate_all(&project.graph, &test_files, &config.valid_layers)
    };

    if json {
        let output = emit_report_json(&report).with_context(|| "Failed to emit gate report")?;
        println!("{output}");
    } else {
        print_report(&report, config);
    }

    log_run_complete(
        "check",
        report.error_count as usize,
        report.warn_count as usize,
        started.elapsed().as_millis(),
    );

    let exit = if report.has_errors() {
        ExitCode::GATE_VIOLATIONS
    } else {
        ExitCode::SUCCESS
    };
    record_run(
        config,
        RunMode::Check,
        exit,
        report.error_count,
        report.warn_count,
        0,
    )?;

    if report.has_errors() {
        std::process::exit(exit.as_i32());
    }
    Ok(())
}

/// Human-readable gate report, one block per gate that found something.
fn print_report(report: &GateReport, config: &Config) {
    println!("Checked corpus at {}", config.root);

    if report.is_clean() {
        println!("✓ All {} gates passed", GateId::ALL.len());
        return;
    }

    for gate in GateId::ALL {
        let violations = report.violations(gate);
        if violations.is_empty() {
            continue;
        }
        let marker = match gate.severity() {
            Severity::Error => "✗",
            Severity::Warn => "⚠",
        };
        println!("\n{gate} ({}):", violations.len());
        for violation in violations {
            match violation.line {
                Some(line) => {
                    println!("  {marker} {}:{line}: {}", violation.path, violation.message);
                }
                None => println!("  {marker} {}: {}", violation.path, violation.message),
            }
        }
    }

    println!(
        "\n{} error(s), {} warning(s)",
        report.error_count, report.warn_count
    );
    if report.has_errors() {
        println!("Run 'docgate fix --dry-run' to preview automatic fixes");
    }
}
