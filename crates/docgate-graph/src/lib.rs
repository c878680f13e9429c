//! Dependency graph over a loaded corpus.
//!
//! Builds one node per distinct path, keyed by normalized path, and
//! exposes the upstream/downstream relation as a directed graph for
//! cycle detection. Everything here is pure: the loader has already
//! done all I/O by the time a graph is built.

pub mod builder;
pub mod cycles;
pub mod interner;

pub use builder::{build_graph, CorpusGraph, GraphNode};
pub use cycles::detect_cycles;
pub use interner::{NodeId, PathInterner};
