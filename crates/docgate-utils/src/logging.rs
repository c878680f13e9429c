//! Logging and observability infrastructure for docgate
//!
//! Structured tracing setup plus span helpers for the load/validate/fix
//! phases of a run.

use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize tracing subscriber for structured logging.
///
/// Sets up tracing with either compact (default) or verbose format. The
/// `RUST_LOG` environment variable takes precedence over both. Log lines
/// go to stderr; stdout is reserved for command output (JSON contracts).
///
/// # Arguments
/// * `verbose` - If true, use verbose format with span close events
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("docgate=debug,info")
            } else {
                EnvFilter::try_new("docgate=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span for one phase of a run (load, validate, fix) with
/// structured fields.
pub fn run_span(mode: &str, phase: &str, root: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "run_phase",
        mode = %mode,
        phase = %phase,
        root = %root,
    )
}

/// Log run start with structured fields
pub fn log_run_start(mode: &str, root: &str) {
    info!(
        mode = %mode,
        root = %root,
        "Starting run"
    );
}

/// Log run completion with violation counts and duration
pub fn log_run_complete(mode: &str, errors: usize, warnings: usize, duration_ms: u128) {
    info!(
        mode = %mode,
        errors = %errors,
        warnings = %warnings,
        duration_ms = %duration_ms,
        "Run completed"
    );
}

/// Log run failure with context
pub fn log_run_error(mode: &str, error: &str, duration_ms: u128) {
    error!(
        mode = %mode,
        duration_ms = %duration_ms,
        error = %error,
        "Run failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_initialization_compact() {
        // May fail if already initialized in the test process, which is okay:
        // init_tracing is called once at program start in real usage
        let result = init_tracing(false);
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_tracing_initialization_verbose() {
        let result = init_tracing(true);
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_run_span_creation() {
        let span = run_span("check", "validate", "/tmp/project");
        if let Some(metadata) = span.metadata() {
            assert_eq!(metadata.name(), "run_phase");
        }
        // The important thing is that creating the span doesn't panic
    }

    #[test]
    fn test_structured_logging_functions() {
        log_run_start("check", "/tmp/project");
        log_run_complete("check", 2, 1, 42);
        log_run_error("fix", "planner conflict", 10);
    }
}
