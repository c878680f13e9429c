//! Core corpus data types shared across the workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One declared document in the context map.
///
/// Entries are the authoritative membership list of the corpus. Paths
/// are stored in normalized form (forward slashes, no leading `./`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Free-form grouping label from the context map.
    pub category: String,
    /// Corpus-relative document path.
    pub path: String,
    /// Human description from the context map.
    pub description: String,
}

/// Load status of a single document, keyed by path in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocStatus {
    /// File was read and any front matter parsed cleanly.
    Ok,
    /// File does not exist under the corpus root.
    Missing,
    /// File exists but its front matter block failed to parse.
    MalformedFrontmatter,
}

impl DocStatus {
    /// Stable string form used in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Missing => "missing",
            Self::MalformedFrontmatter => "malformed-frontmatter",
        }
    }
}

/// A loaded document, or a placeholder for a path that could not be read.
///
/// Records exist for every distinct path the corpus references. Paths
/// that only appear as link targets still get a record, with
/// `exists = false` and empty content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Normalized corpus-relative path.
    pub path: String,
    /// Raw file text, LF-normalized. Empty when the file is missing.
    pub content: String,
    /// Text after the front matter block. Equals `content` when the
    /// document has no front matter.
    pub body: String,
    /// Parsed front matter fields. Empty when absent or malformed.
    pub front_matter: BTreeMap<String, serde_yaml::Value>,
    /// `title` front matter field, falling back to the path.
    pub title: String,
    /// Whether the file was actually found under the corpus root.
    pub exists: bool,
}

impl DocumentRecord {
    /// Placeholder record for a path that could not be resolved on disk.
    #[must_use]
    pub fn missing(path: String) -> Self {
        Self {
            title: path.clone(),
            path,
            content: String::new(),
            body: String::new(),
            front_matter: BTreeMap::new(),
            exists: false,
        }
    }

    /// The `layer` front matter field, or `UNKNOWN` when absent.
    #[must_use]
    pub fn layer(&self) -> String {
        scalar_field(&self.front_matter, "layer").unwrap_or_else(|| "UNKNOWN".to_string())
    }

    /// Normalized upstream link targets.
    #[must_use]
    pub fn upstream(&self) -> Vec<String> {
        link_field(&self.front_matter, "upstream")
    }

    /// Normalized downstream link targets.
    #[must_use]
    pub fn downstream(&self) -> Vec<String> {
        link_field(&self.front_matter, "downstream")
    }
}

/// Extract the document title from front matter, falling back to the
/// path when the field is absent or empty.
#[must_use]
pub fn title_from(map: &BTreeMap<String, serde_yaml::Value>, path: &str) -> String {
    scalar_field(map, "title").unwrap_or_else(|| path.to_string())
}

fn scalar_field(map: &BTreeMap<String, serde_yaml::Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        serde_yaml::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn link_field(map: &BTreeMap<String, serde_yaml::Value>, key: &str) -> Vec<String> {
    map.get(key).map(normalize_link_field).unwrap_or_default()
}

/// Normalize a corpus path: forward slashes, trimmed, no `./` prefix,
/// no duplicate separators.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let mut path = raw.trim().replace('\\', "/");
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped.to_string();
    }
    path
}

/// Normalize an `upstream`/`downstream` front matter value into a list
/// of paths.
///
/// Accepts a YAML sequence, a single scalar, or a comma-separated
/// scalar. Placeholder values (`N/A`, `none`, `-`, empty) fold to an
/// empty list rather than becoming link targets.
#[must_use]
pub fn normalize_link_field(value: &serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::String(raw) => {
            if raw.contains(',') {
                raw.split(',')
                    .map(str::trim)
                    .filter(|part| !is_placeholder(part))
                    .map(normalize_path)
                    .collect()
            } else if is_placeholder(raw) {
                Vec::new()
            } else {
                vec![normalize_path(raw)]
            }
        }
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(|item| match item {
                serde_yaml::Value::String(s) => Some(s.as_str()),
                _ => None,
            })
            .filter(|part| !is_placeholder(part))
            .map(normalize_path)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(input: &str) -> serde_yaml::Value {
        serde_yaml::from_str(input).unwrap()
    }

    #[test]
    fn normalize_path_strips_prefix_and_backslashes() {
        assert_eq!(normalize_path("./docs\\guide.mdc"), "docs/guide.mdc");
        assert_eq!(normalize_path("  docs//guide.mdc  "), "docs/guide.mdc");
    }

    #[test]
    fn link_field_accepts_sequence_scalar_and_comma_forms() {
        assert_eq!(
            normalize_link_field(&yaml("[a.mdc, b.mdc]")),
            vec!["a.mdc".to_string(), "b.mdc".to_string()]
        );
        assert_eq!(
            normalize_link_field(&yaml("\"a.mdc\"")),
            vec!["a.mdc".to_string()]
        );
        assert_eq!(
            normalize_link_field(&yaml("\"a.mdc, b.mdc\"")),
            vec!["a.mdc".to_string(), "b.mdc".to_string()]
        );
    }

    #[test]
    fn placeholder_values_fold_to_empty() {
        for raw in ["\"N/A\"", "\"n/a\"", "\"none\"", "\"-\"", "\"\""] {
            assert!(
                normalize_link_field(&yaml(raw)).is_empty(),
                "placeholder {raw} should produce no links"
            );
        }
        assert!(normalize_link_field(&yaml("[\"N/A\", \"-\"]")).is_empty());
    }

    #[test]
    fn layer_falls_back_to_unknown() {
        let record = DocumentRecord::missing("docs/a.mdc".to_string());
        assert_eq!(record.layer(), "UNKNOWN");
        assert_eq!(record.title, "docs/a.mdc");
        assert!(!record.exists);
    }

    #[test]
    fn doc_status_serializes_kebab_case() {
        let serialized = serde_yaml::to_string(&DocStatus::MalformedFrontmatter).unwrap();
        assert_eq!(serialized.trim(), "malformed-frontmatter");
        assert_eq!(DocStatus::Ok.as_str(), "ok");
        assert_eq!(DocStatus::Missing.as_str(), "missing");
        assert_eq!(DocStatus::MalformedFrontmatter.as_str(), "malformed-frontmatter");
    }
}
