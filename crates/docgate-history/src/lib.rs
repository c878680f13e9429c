//! Append-only run history.
//!
//! Every recorded run becomes one immutable JSON file under
//! `.docgate/history/`. The log is write-only from the validator's
//! perspective; only the `history` listing command reads it back.

pub mod model;
pub mod store;

pub use model::{HistoryEntry, RunMode, HISTORY_ENTRY_SCHEMA_VERSION};
pub use store::{HistoryStore, HISTORY_DIR};
