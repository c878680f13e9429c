//! Front matter parsing and in-place field editing.
//!
//! Front matter is a YAML block delimited by `---` lines at the top of
//! a document. Parsing is tolerant: a broken block marks the document
//! malformed and yields an empty field map instead of an error, and the
//! body is still recovered so content gates can run. The editing
//! helpers rewrite a single field line-wise, leaving the rest of the
//! block byte-for-byte intact.

use std::collections::BTreeMap;

/// Result of splitting a document into front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Parsed front matter fields. Empty when absent or malformed.
    pub front_matter: BTreeMap<String, serde_yaml::Value>,
    /// Document text after the front matter block.
    pub body: String,
    /// True when a front matter block was found but could not be parsed.
    pub malformed: bool,
}

enum RawSplit<'a> {
    Closed { yaml: &'a str, body: &'a str },
    Unclosed { body: &'a str },
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

fn split_raw(content: &str) -> Option<RawSplit<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if !is_fence(first) || !first.ends_with('\n') {
        return None;
    }
    let mut cursor = first.len();
    for line in lines {
        let line_start = cursor;
        cursor += line.len();
        if is_fence(line) {
            return Some(RawSplit::Closed {
                yaml: &content[first.len()..line_start],
                body: &content[cursor..],
            });
        }
    }
    Some(RawSplit::Unclosed {
        body: &content[first.len()..],
    })
}

/// Split a document into front matter fields and body.
pub fn parse_document(content: &str) -> ParsedDocument {
    match split_raw(content) {
        None => ParsedDocument {
            front_matter: BTreeMap::new(),
            body: content.to_string(),
            malformed: false,
        },
        Some(RawSplit::Unclosed { body }) => ParsedDocument {
            front_matter: BTreeMap::new(),
            body: body.to_string(),
            malformed: true,
        },
        Some(RawSplit::Closed { yaml, body }) => {
            if yaml.trim().is_empty() {
                return ParsedDocument {
                    front_matter: BTreeMap::new(),
                    body: body.to_string(),
                    malformed: false,
                };
            }
            match serde_yaml::from_str::<BTreeMap<String, serde_yaml::Value>>(yaml) {
                Ok(front_matter) => ParsedDocument {
                    front_matter,
                    body: body.to_string(),
                    malformed: false,
                },
                Err(_) => ParsedDocument {
                    front_matter: BTreeMap::new(),
                    body: body.to_string(),
                    malformed: true,
                },
            }
        }
    }
}

/// Set or insert a scalar front matter field, creating the block when
/// the document has none. Documents with an unclosed fence are
/// returned unchanged.
#[must_use]
pub fn set_scalar_field(content: &str, key: &str, value: &str) -> String {
    edit_field(content, key, Some(vec![format!("{key}: {}", yaml_scalar(value))]))
}

/// Replace a front matter list field with a block sequence. An empty
/// value list removes the field entirely.
#[must_use]
pub fn set_list_field(content: &str, key: &str, values: &[String]) -> String {
    if values.is_empty() {
        return edit_field(content, key, None);
    }
    let mut lines = Vec::with_capacity(values.len() + 1);
    lines.push(format!("{key}:"));
    for value in values {
        lines.push(format!("  - {}", yaml_scalar(value)));
    }
    edit_field(content, key, Some(lines))
}

fn yaml_scalar(value: &str) -> String {
    serde_yaml::to_string(&value)
        .map(|rendered| rendered.trim_end().to_string())
        .unwrap_or_else(|_| format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
}

fn edit_field(content: &str, key: &str, replacement: Option<Vec<String>>) -> String {
    match split_raw(content) {
        None => match replacement {
            Some(lines) => format!("---\n{}\n---\n{content}", lines.join("\n")),
            None => content.to_string(),
        },
        Some(RawSplit::Unclosed { .. }) => content.to_string(),
        Some(RawSplit::Closed { yaml, body }) => {
            let new_yaml = splice_field(yaml, key, replacement);
            format!("---\n{new_yaml}---\n{body}")
        }
    }
}

/// Rewrite `yaml` so the given field holds exactly `replacement`, or is
/// absent when `replacement` is `None`. Output always ends with a
/// newline so the closing fence lands on its own line.
fn splice_field(yaml: &str, key: &str, replacement: Option<Vec<String>>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut replaced = false;
    let mut skipping = false;

    for line in yaml.lines() {
        if skipping {
            if is_continuation(line) {
                continue;
            }
            skipping = false;
        }
        if !replaced && field_key(line) == Some(key) {
            if let Some(lines) = &replacement {
                out.extend(lines.iter().cloned());
            }
            replaced = true;
            skipping = true;
            continue;
        }
        out.push(line.to_string());
    }

    if !replaced {
        if let Some(lines) = replacement {
            out.extend(lines);
        }
    }

    let mut rendered = out.join("\n");
    if !rendered.is_empty() {
        rendered.push('\n');
    }
    rendered
}

/// Lines belonging to the previous field: indented continuations and
/// zero-indent sequence items.
fn is_continuation(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t') || line.starts_with("- ") || line == "-"
}

fn field_key(line: &str) -> Option<&str> {
    if line.starts_with(' ') || line.starts_with('\t') {
        return None;
    }
    let (key, _) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() { None } else { Some(key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\ntitle: Setup Guide\nlayer: STRATEGY\nupstream:\n  - docs/a.mdc\n  - docs/b.mdc\n---\n# Setup Guide\n\nBody text.\n";

    #[test]
    fn parse_splits_fields_and_body() {
        let parsed = parse_document(DOC);
        assert!(!parsed.malformed);
        assert_eq!(
            parsed.front_matter.get("title"),
            Some(&serde_yaml::Value::String("Setup Guide".to_string()))
        );
        assert_eq!(parsed.body, "# Setup Guide\n\nBody text.\n");
    }

    #[test]
    fn document_without_front_matter_is_all_body() {
        let parsed = parse_document("# Title\n\nNo fences here.\n");
        assert!(!parsed.malformed);
        assert!(parsed.front_matter.is_empty());
        assert_eq!(parsed.body, "# Title\n\nNo fences here.\n");
    }

    #[test]
    fn broken_yaml_marks_malformed_but_keeps_body() {
        let content = "---\ntitle: [unclosed\n---\nBody survives.\n";
        let parsed = parse_document(content);
        assert!(parsed.malformed);
        assert!(parsed.front_matter.is_empty());
        assert_eq!(parsed.body, "Body survives.\n");
    }

    #[test]
    fn unclosed_fence_marks_malformed() {
        let parsed = parse_document("---\ntitle: Oops\nNo closing fence.\n");
        assert!(parsed.malformed);
        assert!(parsed.front_matter.is_empty());
    }

    #[test]
    fn empty_block_is_not_malformed() {
        let parsed = parse_document("---\n---\nBody.\n");
        assert!(!parsed.malformed);
        assert!(parsed.front_matter.is_empty());
        assert_eq!(parsed.body, "Body.\n");
    }

    #[test]
    fn horizontal_rule_is_not_a_fence() {
        let parsed = parse_document("----\ntext\n");
        assert!(!parsed.malformed);
        assert!(parsed.front_matter.is_empty());
    }

    #[test]
    fn set_scalar_replaces_existing_field() {
        let updated = set_scalar_field(DOC, "layer", "IMPLEMENTATION");
        let parsed = parse_document(&updated);
        assert_eq!(
            parsed.front_matter.get("layer"),
            Some(&serde_yaml::Value::String("IMPLEMENTATION".to_string()))
        );
        // Untouched fields keep their original text.
        assert!(updated.contains("title: Setup Guide\n"));
        assert!(updated.contains("  - docs/a.mdc\n"));
        assert_eq!(parsed.body, "# Setup Guide\n\nBody text.\n");
    }

    #[test]
    fn set_scalar_inserts_missing_field_before_fence() {
        let updated = set_scalar_field("---\ntitle: T\n---\nBody.\n", "layer", "OPERATIONS");
        assert_eq!(updated, "---\ntitle: T\nlayer: OPERATIONS\n---\nBody.\n");
    }

    #[test]
    fn set_scalar_creates_block_when_absent() {
        let updated = set_scalar_field("# Heading only\n", "layer", "STRATEGY");
        assert_eq!(updated, "---\nlayer: STRATEGY\n---\n# Heading only\n");
    }

    #[test]
    fn set_list_replaces_scalar_form_with_block_sequence() {
        let content = "---\nupstream: docs/a.mdc, docs/b.mdc\n---\nBody.\n";
        let updated = set_list_field(content, "upstream", &["docs/c.mdc".to_string()]);
        assert_eq!(updated, "---\nupstream:\n  - docs/c.mdc\n---\nBody.\n");
    }

    #[test]
    fn set_list_with_empty_values_removes_field() {
        let updated = set_list_field(DOC, "upstream", &[]);
        let parsed = parse_document(&updated);
        assert!(!parsed.front_matter.contains_key("upstream"));
        assert!(parsed.front_matter.contains_key("title"));
        assert_eq!(parsed.body, "# Setup Guide\n\nBody text.\n");
    }

    #[test]
    fn zero_indent_sequence_items_belong_to_their_field() {
        let content = "---\nupstream:\n- docs/a.mdc\n- docs/b.mdc\ntitle: T\n---\nBody.\n";
        let updated = set_list_field(content, "upstream", &["docs/z.mdc".to_string()]);
        assert_eq!(updated, "---\nupstream:\n  - docs/z.mdc\ntitle: T\n---\nBody.\n");
    }

    #[test]
    fn values_needing_quotes_are_quoted() {
        let updated = set_scalar_field("---\n---\nBody.\n", "title", "Setup: the guide");
        let parsed = parse_document(&updated);
        assert_eq!(
            parsed.front_matter.get("title"),
            Some(&serde_yaml::Value::String("Setup: the guide".to_string()))
        );
    }

    #[test]
    fn unclosed_fence_is_left_unchanged_by_edits() {
        let content = "---\ntitle: Broken\nBody without fence.\n";
        assert_eq!(set_scalar_field(content, "layer", "STRATEGY"), content);
    }
}
