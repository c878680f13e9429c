//! Exit code constants for docgate.
//!
//! This module defines standardized exit codes for the different outcomes of
//! a docgate run. Codes 3 and 4 are outcomes, not failures: they report what
//! the run found rather than that the run broke.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Run completed; no error-level violations |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `GATE_VIOLATIONS` | One or more error-severity gate violations |
//! | 4 | `AUTOFIX_CONFLICT` | Autofix planner conflict; corpus untouched |
//!
//! Warn-only violations do not change the exit code: a corpus that produces
//! nothing above warn severity exits 0.

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling for docgate operations.
/// Use the named constants for the defined codes, or [`as_i32()`](Self::as_i32)
/// to get the numeric value for `std::process::exit()`.
///
/// The numeric values are part of the public CLI contract; scripts key off
/// them to distinguish "dirty corpus" (3) from "broken run" (1).
///
/// # Example
///
/// ```rust
/// use docgate_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::GATE_VIOLATIONS;
/// assert_eq!(code.as_i32(), 3);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success: run completed with no error-level violations
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error: general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error: invalid or missing arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Gate violations: at least one error-severity violation was reported
    pub const GATE_VIOLATIONS: ExitCode = ExitCode(3);

    /// Autofix conflict: the planner refused to produce a plan; no file was touched
    pub const AUTOFIX_CONFLICT: ExitCode = ExitCode(4);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
