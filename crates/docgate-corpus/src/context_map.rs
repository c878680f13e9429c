//! Context map parsing.
//!
//! The context map is the corpus membership list. The canonical form
//! is a YAML document with a top-level `contextMap` key holding a list
//! of categories, each with an `entries` list of `{path, description}`
//! pairs. Older corpora keep the same information in a Markdown
//! `## Context Map` section instead, with `### <Category>` headers and
//! `- <path> … <description>` bullet lines. The parser tries YAML
//! first and falls back to the Markdown form when YAML yields nothing.

use serde::Deserialize;
use tracing::debug;

use crate::types::{normalize_path, ContextEntry};

/// Separator between path and description in Markdown bullet entries.
const ENTRY_SEPARATOR: char = '\u{2026}';

#[derive(Debug, Deserialize)]
struct ContextMapFile {
    #[serde(rename = "contextMap", default)]
    context_map: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    category: String,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: Option<String>,
    description: Option<String>,
}

/// Parse a context map buffer into a flat entry list.
///
/// Entries missing a path or a description are skipped; everything
/// else is kept in declaration order. An unparseable or empty buffer
/// produces an empty list rather than an error, so callers can treat
/// "no context map" and "empty context map" uniformly.
#[must_use]
pub fn parse_context_entries(buffer: &str) -> Vec<ContextEntry> {
    let from_yaml = parse_yaml(buffer);
    if !from_yaml.is_empty() {
        debug!(entries = from_yaml.len(), "parsed context map as YAML");
        return from_yaml;
    }
    let from_markdown = parse_markdown(buffer);
    if !from_markdown.is_empty() {
        debug!(entries = from_markdown.len(), "parsed context map as Markdown");
    }
    from_markdown
}

fn parse_yaml(buffer: &str) -> Vec<ContextEntry> {
    let Ok(file) = serde_yaml::from_str::<ContextMapFile>(buffer) else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for category in file.context_map {
        for raw in category.entries {
            let (Some(path), Some(description)) = (raw.path, raw.description) else {
                continue;
            };
            let path = normalize_path(&path);
            if path.is_empty() || description.trim().is_empty() {
                continue;
            }
            entries.push(ContextEntry {
                category: category.category.clone(),
                path,
                description: description.trim().to_string(),
            });
        }
    }
    entries
}

fn parse_markdown(buffer: &str) -> Vec<ContextEntry> {
    let mut entries = Vec::new();
    let mut in_section = false;
    let mut category = String::new();

    for line in buffer.lines() {
        let trimmed = line.trim_end();
        if let Some(heading) = trimmed.strip_prefix("## ") {
            in_section = heading.trim().eq_ignore_ascii_case("context map");
            category.clear();
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("### ") {
            category = heading.trim().to_string();
            continue;
        }
        if let Some(bullet) = trimmed.trim_start().strip_prefix("- ") {
            let Some((raw_path, raw_description)) = bullet.split_once(ENTRY_SEPARATOR) else {
                continue;
            };
            let path = normalize_path(raw_path);
            let description = raw_description.trim().to_string();
            if path.is_empty() || description.is_empty() {
                continue;
            }
            entries.push(ContextEntry {
                category: category.clone(),
                path,
                description,
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_MAP: &str = r#"
contextMap:
  - category: Guides
    entries:
      - path: docs/setup.mdc
        description: Environment setup
      - path: docs/deploy.mdc
        description: Deployment runbook
  - category: Reference
    entries:
      - path: docs/api.mdc
        description: API surface
"#;

    const MARKDOWN_MAP: &str = "# Corpus\n\n## Context Map\n\n### Guides\n\n- docs/setup.mdc \u{2026} Environment setup\n- docs/deploy.mdc \u{2026} Deployment runbook\n\n### Reference\n\n- docs/api.mdc \u{2026} API surface\n\n## Something Else\n\n- not/an/entry.mdc \u{2026} outside the section\n";

    #[test]
    fn yaml_form_flattens_categories_in_order() {
        let entries = parse_context_entries(YAML_MAP);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].category, "Guides");
        assert_eq!(entries[0].path, "docs/setup.mdc");
        assert_eq!(entries[2].category, "Reference");
        assert_eq!(entries[2].description, "API surface");
    }

    #[test]
    fn markdown_fallback_stops_at_next_section() {
        let entries = parse_context_entries(MARKDOWN_MAP);
        assert_eq!(entries.len(), 3, "entries outside Context Map must be ignored");
        assert_eq!(entries[1].path, "docs/deploy.mdc");
        assert_eq!(entries[2].category, "Reference");
    }

    #[test]
    fn yaml_entries_missing_fields_are_skipped() {
        let buffer = r#"
contextMap:
  - category: Guides
    entries:
      - path: docs/ok.mdc
        description: Kept
      - path: docs/no-description.mdc
      - description: No path
"#;
        let entries = parse_context_entries(buffer);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "docs/ok.mdc");
    }

    #[test]
    fn markdown_bullets_without_separator_are_skipped() {
        let buffer = "## Context Map\n\n### Guides\n\n- docs/plain.mdc just a note\n- docs/kept.mdc \u{2026} Kept\n";
        let entries = parse_context_entries(buffer);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "docs/kept.mdc");
    }

    #[test]
    fn empty_or_unrelated_buffer_yields_no_entries() {
        assert!(parse_context_entries("").is_empty());
        assert!(parse_context_entries("# Just a README\n\nNo map here.\n").is_empty());
        assert!(parse_context_entries("not: [valid, contextMap").is_empty());
    }

    #[test]
    fn yaml_paths_are_normalized() {
        let buffer = "contextMap:\n  - category: G\n    entries:\n      - path: ./docs\\\\nested//file.mdc\n        description: D\n";
        let entries = parse_context_entries(buffer);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "docs/nested/file.mdc");
    }
}
