//! Configuration management for docgate
//!
//! This crate provides hierarchical configuration with discovery and
//! precedence: CLI > file > defaults. Config files are TOML with
//! `[corpus]` and `[history]` sections, discovered as
//! `.docgate/config.toml` walking up from the project root.

pub mod config;

pub use config::{
    CliArgs, Config, ConfigSource, DEFAULT_CONTEXT_MAP, DEFAULT_EXCLUDE, DEFAULT_HISTORY_LIMIT,
    DEFAULT_TEST_ROOTS, DEFAULT_VALID_LAYERS,
};
