//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, DocgateError, ExitCode};
use docgate_utils::logging::{init_tracing, log_run_error};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns
/// `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error via [`DocgateError::display_for_user`],
///   returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it
/// does NOT print. Result-driven exits (3 for gate violations, 4 for an
/// autofix conflict) happen inside the command handlers after all output
/// and history recording are done.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A second subscriber in the same process (tests, embedding) is fine;
    // the first one wins.
    if !cli.quiet {
        let _ = init_tracing(cli.verbose);
    }

    // Build CLI args for the configuration system. Only flags that
    // participate in config resolution go here; per-invocation flags
    // (--json, --dry-run, verbosity) stay local.
    let cli_args = match &cli.command {
        Commands::Check {
            root,
            context_map,
            test_root,
            ..
        } => CliArgs {
            root: root.clone(),
            config_path: cli.config.clone(),
            context_map: context_map.clone(),
            test_roots: test_root.clone(),
            history_limit: None,
        },
        Commands::Fix {
            root, context_map, ..
        } => CliArgs {
            root: root.clone(),
            config_path: cli.config.clone(),
            context_map: context_map.clone(),
            test_roots: Vec::new(),
            history_limit: None,
        },
        Commands::History { root, limit, .. } => CliArgs {
            root: root.clone(),
            config_path: cli.config.clone(),
            context_map: None,
            test_roots: Vec::new(),
            history_limit: *limit,
        },
        Commands::Init { root } => CliArgs {
            root: root.clone(),
            config_path: cli.config.clone(),
            context_map: None,
            test_roots: Vec::new(),
            history_limit: None,
        },
    };

    // Discover and load configuration
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = DocgateError::from(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };
    for (key, (value, source)) in config.effective_config() {
        tracing::debug!(%key, %value, %source, "config value resolved");
    }

    // Create tokio runtime for async operations
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let mode = match &cli.command {
        Commands::Check { .. } => "check",
        Commands::Fix { .. } => "fix",
        Commands::History { .. } => "history",
        Commands::Init { .. } => "init",
    };
    let started = std::time::Instant::now();

    let result = rt.block_on(async {
        match cli.command {
            Commands::Check { json, .. } => commands::execute_check_command(&config, json).await,
            Commands::Fix { dry_run, json, .. } => {
                commands::execute_fix_command(&config, dry_run, json).await
            }
            Commands::History { json, .. } => commands::execute_history_command(&config, json),
            Commands::Init { .. } => commands::execute_init_command(&config),
        }
    });

    // cli::run() handles ALL output including errors. Typed errors carry
    // their own context and suggestions; anything else is a bug surface.
    if let Err(error) = result {
        log_run_error(mode, &format!("{error:#}"), started.elapsed().as_millis());
        if let Some(docgate_error) = error.downcast_ref::<DocgateError>() {
            eprintln!("{}", docgate_error.display_for_user());
            return Err(docgate_error.to_exit_code());
        }

        eprintln!("✗ Unexpected error: {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
