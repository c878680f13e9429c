//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs` and CLI
//! tests. Implementations live in `commands/*`.

mod check;
mod common;
mod fix;
mod history;
mod init;

// Re-export command handlers
pub use check::execute_check_command;
pub use fix::execute_fix_command;
pub use history::execute_history_command;
pub use init::execute_init_command;
