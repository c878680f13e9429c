//! Path reference rewriting.
//!
//! When files move to their canonical names, every textual reference
//! to the old path has to follow: front matter link lists, body links,
//! and the context map. Replacement is token-bounded so `docs/a.mdc`
//! never matches inside `docs/a.mdc.bak` or `xdocs/a.mdc`, while a
//! `](docs/a.mdc#section)` link still rewrites its file part.

use std::collections::BTreeMap;

/// Characters that can be part of a path token.
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/')
}

/// Replace whole-token occurrences of `from` with `to`.
#[must_use]
pub fn replace_path_token(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() || from == to {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(from) {
        let start = cursor + offset;
        let end = start + from.len();
        let boundary_before = text[..start].chars().next_back().is_none_or(|c| !is_path_char(c));
        let boundary_after = text[end..].chars().next().is_none_or(|c| !is_path_char(c));
        out.push_str(&text[cursor..start]);
        if boundary_before && boundary_after {
            out.push_str(to);
        } else {
            out.push_str(&text[start..end]);
        }
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Apply every rename to the path references in `text`.
///
/// Rename targets are always fresh paths, disjoint from every source,
/// so applying them one at a time cannot cascade.
#[must_use]
pub fn rewrite_references(text: &str, renames: &BTreeMap<String, String>) -> String {
    let mut current = text.to_string();
    for (from, to) in renames {
        current = replace_path_token(&current, from, to);
    }
    current
}
