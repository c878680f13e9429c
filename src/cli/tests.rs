//! CLI parsing tests.
//!
//! Command behavior is covered by the integration tests under `tests/`;
//! this module only pins the argument surface: flag names, defaults,
//! and conflicts.

use clap::Parser;

use super::args::{Cli, Commands};

#[test]
fn check_parses_all_flags() {
    let cli = Cli::try_parse_from([
        "docgate",
        "check",
        "--root",
        "../handbook",
        "--context-map",
        "docs/context-map.yaml",
        "--test-root",
        "tests",
        "--test-root",
        "src/__tests__",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Check {
            root,
            context_map,
            test_root,
            json,
        } => {
            assert_eq!(root.as_deref().map(|p| p.as_str()), Some("../handbook"));
            assert_eq!(context_map.as_deref(), Some("docs/context-map.yaml"));
            assert_eq!(test_root, vec!["tests", "src/__tests__"]);
            assert!(json);
        }
        _ => panic!("expected check command"),
    }
}

#[test]
fn check_defaults_are_empty() {
    let cli = Cli::try_parse_from(["docgate", "check"]).unwrap();
    match cli.command {
        Commands::Check {
            root,
            context_map,
            test_root,
            json,
        } => {
            assert!(root.is_none());
            assert!(context_map.is_none());
            assert!(test_root.is_empty());
            assert!(!json);
        }
        _ => panic!("expected check command"),
    }
    assert!(!cli.verbose);
    assert!(!cli.quiet);
    assert!(cli.config.is_none());
}

#[test]
fn fix_parses_dry_run_and_json() {
    let cli = Cli::try_parse_from(["docgate", "fix", "--dry-run", "--json"]).unwrap();
    match cli.command {
        Commands::Fix { dry_run, json, .. } => {
            assert!(dry_run);
            assert!(json);
        }
        _ => panic!("expected fix command"),
    }
}

#[test]
fn history_parses_limit() {
    let cli = Cli::try_parse_from(["docgate", "history", "--limit", "5"]).unwrap();
    match cli.command {
        Commands::History { limit, json, .. } => {
            assert_eq!(limit, Some(5));
            assert!(!json);
        }
        _ => panic!("expected history command"),
    }
}

#[test]
fn init_parses_root() {
    let cli = Cli::try_parse_from(["docgate", "init", "--root", "proj"]).unwrap();
    match cli.command {
        Commands::Init { root } => {
            assert_eq!(root.as_deref().map(|p| p.as_str()), Some("proj"));
        }
        _ => panic!("expected init command"),
    }
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = Cli::try_parse_from([
        "docgate",
        "check",
        "--config",
        "custom/config.toml",
        "--verbose",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(
        cli.config.as_deref().map(|p| p.as_str()),
        Some("custom/config.toml")
    );
}

#[test]
fn verbose_conflicts_with_quiet() {
    let result = Cli::try_parse_from(["docgate", "check", "--verbose", "--quiet"]);
    assert!(result.is_err(), "verbose and quiet must not combine");
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["docgate"]).is_err());
}

#[test]
fn unknown_flag_is_an_error() {
    assert!(Cli::try_parse_from(["docgate", "check", "--nope"]).is_err());
}
