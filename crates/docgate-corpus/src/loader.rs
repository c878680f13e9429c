//! Corpus loading.
//!
//! The loader turns the context map plus the files on disk into one
//! [`DocumentRecord`] per distinct path. Link targets found in front
//! matter are loaded too, transitively, so downstream passes never
//! chase a path the loader has not already resolved. Reads within a
//! wave run concurrently; per-file failures become `missing` records
//! instead of errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use docgate_utils::paths::SandboxRoot;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::context_map::parse_context_entries;
use crate::front_matter::parse_document;
use crate::types::{title_from, ContextEntry, DocStatus, DocumentRecord};

/// Everything the loader knows about a corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCorpus {
    /// Context map entries in declaration order.
    pub entries: Vec<ContextEntry>,
    /// One record per distinct path, including link-only paths.
    pub records: BTreeMap<String, DocumentRecord>,
    /// Load status per path.
    pub status: BTreeMap<String, DocStatus>,
}

/// Load the corpus declared by a context map buffer.
///
/// Paths that escape the corpus root, point at directories, or do not
/// exist all produce placeholder records with [`DocStatus::Missing`].
pub async fn load_corpus(root: &SandboxRoot, context_map_text: &str) -> LoadedCorpus {
    let entries = parse_context_entries(context_map_text);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut pending: Vec<String> = Vec::new();
    for entry in &entries {
        if seen.insert(entry.path.clone()) {
            pending.push(entry.path.clone());
        }
    }

    let mut records: BTreeMap<String, DocumentRecord> = BTreeMap::new();
    let mut status: BTreeMap<String, DocStatus> = BTreeMap::new();

    while !pending.is_empty() {
        let mut wave = std::mem::take(&mut pending);
        wave.sort();
        debug!(paths = wave.len(), "loading corpus wave");

        for (path, text) in read_wave(root, wave).await {
            let (record, doc_status) = build_record(path.clone(), text);
            for target in record.upstream().into_iter().chain(record.downstream()) {
                if !target.is_empty() && seen.insert(target.clone()) {
                    pending.push(target);
                }
            }
            status.insert(path.clone(), doc_status);
            records.insert(path, record);
        }
    }

    info!(
        entries = entries.len(),
        documents = records.len(),
        "corpus loaded"
    );
    LoadedCorpus {
        entries,
        records,
        status,
    }
}

/// Read one wave of paths concurrently. Paths the sandbox rejects are
/// reported as unreadable without touching the filesystem.
async fn read_wave(root: &SandboxRoot, wave: Vec<String>) -> Vec<(String, Option<String>)> {
    let mut results = Vec::with_capacity(wave.len());
    let mut tasks: JoinSet<(String, Option<String>)> = JoinSet::new();

    for path in wave {
        match root.join(&path) {
            Ok(resolved) => {
                let full: PathBuf = resolved.to_path_buf();
                tasks.spawn(async move {
                    let text = tokio::fs::read_to_string(&full).await.ok();
                    (path, text)
                });
            }
            Err(err) => {
                debug!(path = %path, error = %err, "path rejected by sandbox");
                results.push((path, None));
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Ok(result) = joined {
            results.push(result);
        }
    }
    results
}

fn build_record(path: String, text: Option<String>) -> (DocumentRecord, DocStatus) {
    let Some(raw) = text else {
        return (DocumentRecord::missing(path), DocStatus::Missing);
    };
    let content = normalize_newlines(&raw);
    let parsed = parse_document(&content);
    let doc_status = if parsed.malformed {
        DocStatus::MalformedFrontmatter
    } else {
        DocStatus::Ok
    };
    let title = title_from(&parsed.front_matter, &path);
    let record = DocumentRecord {
        path,
        content,
        body: parsed.body,
        front_matter: parsed.front_matter,
        title,
        exists: true,
    };
    (record, doc_status)
}

fn normalize_newlines(raw: &str) -> String {
    if raw.contains('\r') {
        raw.replace("\r\n", "\n")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn corpus_root(dir: &TempDir) -> SandboxRoot {
        SandboxRoot::new(dir.path()).unwrap()
    }

    const MAP: &str = "contextMap:\n  - category: Guides\n    entries:\n      - path: docs/a.mdc\n        description: Doc A\n";

    #[tokio::test]
    async fn dangling_upstream_becomes_missing_record() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "docs/a.mdc",
            "---\ntitle: A\nupstream:\n  - docs/b.mdc\n---\nBody.\n",
        );

        let corpus = load_corpus(&corpus_root(&dir), MAP).await;
        assert_eq!(corpus.records.len(), 2);
        assert_eq!(corpus.status.get("docs/a.mdc"), Some(&DocStatus::Ok));
        assert_eq!(corpus.status.get("docs/b.mdc"), Some(&DocStatus::Missing));
        let b = &corpus.records["docs/b.mdc"];
        assert!(!b.exists);
        assert_eq!(b.title, "docs/b.mdc");
    }

    #[tokio::test]
    async fn link_targets_are_discovered_transitively() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "docs/a.mdc",
            "---\nupstream:\n  - docs/b.mdc\n---\nA.\n",
        );
        write(
            &dir,
            "docs/b.mdc",
            "---\nupstream:\n  - docs/c.mdc\n---\nB.\n",
        );
        write(&dir, "docs/c.mdc", "---\ntitle: C\n---\nC.\n");

        let corpus = load_corpus(&corpus_root(&dir), MAP).await;
        assert_eq!(corpus.records.len(), 3, "b and c must be pulled in via links");
        assert!(corpus.records["docs/c.mdc"].exists);
        assert_eq!(corpus.records["docs/c.mdc"].title, "C");
    }

    #[tokio::test]
    async fn malformed_front_matter_keeps_body_and_flags_status() {
        let dir = TempDir::new().unwrap();
        write(&dir, "docs/a.mdc", "---\ntitle: [broken\n---\nStill here.\n");

        let corpus = load_corpus(&corpus_root(&dir), MAP).await;
        assert_eq!(
            corpus.status.get("docs/a.mdc"),
            Some(&DocStatus::MalformedFrontmatter)
        );
        let record = &corpus.records["docs/a.mdc"];
        assert!(record.exists);
        assert_eq!(record.body, "Still here.\n");
        assert!(record.front_matter.is_empty());
    }

    #[tokio::test]
    async fn escaping_link_target_is_missing_not_an_error() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "docs/a.mdc",
            "---\nupstream:\n  - ../outside.mdc\n---\nA.\n",
        );

        let corpus = load_corpus(&corpus_root(&dir), MAP).await;
        assert_eq!(
            corpus.status.get("../outside.mdc"),
            Some(&DocStatus::Missing)
        );
        assert!(!corpus.records["../outside.mdc"].exists);
    }

    #[tokio::test]
    async fn crlf_content_is_normalized_on_load() {
        let dir = TempDir::new().unwrap();
        write(&dir, "docs/a.mdc", "---\r\ntitle: A\r\n---\r\nLine.\r\n");

        let corpus = load_corpus(&corpus_root(&dir), MAP).await;
        let record = &corpus.records["docs/a.mdc"];
        assert_eq!(record.body, "Line.\n");
        assert_eq!(record.title, "A");
        assert_eq!(corpus.status.get("docs/a.mdc"), Some(&DocStatus::Ok));
    }

    #[tokio::test]
    async fn empty_context_map_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let corpus = load_corpus(&corpus_root(&dir), "").await;
        assert!(corpus.entries.is_empty());
        assert!(corpus.records.is_empty());
    }

    #[tokio::test]
    async fn duplicate_map_entries_load_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "docs/a.mdc", "---\ntitle: A\n---\nA.\n");
        let map = "contextMap:\n  - category: G\n    entries:\n      - path: docs/a.mdc\n        description: First\n      - path: docs/a.mdc\n        description: Second\n";

        let corpus = load_corpus(&corpus_root(&dir), map).await;
        assert_eq!(corpus.entries.len(), 2, "entries keep both declarations");
        assert_eq!(corpus.records.len(), 1, "records are keyed by path");
    }
}
