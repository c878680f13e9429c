//! Corpus ingestion for docgate.
//!
//! This crate owns the two input formats of a documentation corpus:
//! the context map (YAML or Markdown) that declares which documents
//! belong to the corpus, and the YAML front matter embedded in each
//! document. The [`loader`] module ties them together and produces a
//! [`LoadedCorpus`](loader::LoadedCorpus) with one record per distinct
//! path, including paths that are only reachable through links.

pub mod context_map;
pub mod front_matter;
pub mod loader;
pub mod types;

pub use context_map::parse_context_entries;
pub use front_matter::{parse_document, set_list_field, set_scalar_field, ParsedDocument};
pub use loader::{load_corpus, LoadedCorpus};
pub use types::{
    normalize_link_field, normalize_path, title_from, ContextEntry, DocStatus, DocumentRecord,
};
