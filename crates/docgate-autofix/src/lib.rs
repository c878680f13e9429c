//! Automatic repair of fixable gate findings.
//!
//! The planner computes a complete [`AutofixPlan`] up front from the
//! corpus graph: canonical renames, reference rewrites, structural
//! insertions, layer normalization, heading renumbering, and cycle
//! removal. The executor then writes new contents at the old paths,
//! rewrites the context map, and performs physical renames last.
//! Running the fixer on its own output plans nothing.

pub mod executor;
pub mod planner;
pub mod rewrite;
pub mod structure;
pub mod summary;

pub use executor::Autofixer;
pub use planner::{plan_fixes, AutofixPlan, PlanConflict};
pub use summary::{
    emit_summary_json, AutofixOperation, AutofixStatus, AutofixSummary, FixMode,
    AUTOFIX_SUMMARY_SCHEMA_VERSION,
};
