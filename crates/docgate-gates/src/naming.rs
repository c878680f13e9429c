//! Canonical file naming.
//!
//! Document files are named `<LAYER>_<UPPER_SNAKE_STEM>.mdc`. The gate
//! checks the convention; the autofixer uses [`canonical_path`] to plan
//! renames, so both sides must agree on the conversion rules here.

/// Convert a file stem to `UPPER_SNAKE`, splitting on separator runs
/// and camelCase boundaries.
#[must_use]
pub fn to_upper_snake(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let mut out = String::with_capacity(stem.len() + 4);
    let mut pending_sep = false;

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            pending_sep = !out.is_empty();
            continue;
        }
        let prev = if i > 0 { chars.get(i - 1).copied() } else { None };
        let next = chars.get(i + 1).copied();
        let camel_boundary = matches!(prev, Some(p) if p.is_lowercase() && ch.is_uppercase())
            || (matches!(prev, Some(p) if p.is_uppercase())
                && ch.is_uppercase()
                && matches!(next, Some(n) if n.is_lowercase()));
        if (pending_sep || camel_boundary) && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        for upper in ch.to_uppercase() {
            out.push(upper);
        }
    }
    out
}

/// Whether a file name already follows the canonical convention for
/// the given layer.
#[must_use]
pub fn matches_canonical(layer: &str, file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(layer) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix('_') else {
        return false;
    };
    let Some(stem) = rest.strip_suffix(".mdc") else {
        return false;
    };
    !stem.is_empty()
        && !stem.starts_with('_')
        && !stem.ends_with('_')
        && !stem.contains("__")
        && stem
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// The canonical file name for a document, derived from its layer and
/// current name. An existing layer prefix is stripped before
/// conversion so renames do not stack prefixes.
#[must_use]
pub fn canonical_file_name(layer: &str, file_name: &str, valid_layers: &[String]) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    let mut upper = to_upper_snake(stem);

    for candidate in valid_layers.iter().map(String::as_str).chain([layer]) {
        let candidate_upper = to_upper_snake(candidate);
        if upper == candidate_upper {
            upper.clear();
            break;
        }
        if let Some(bare) = upper.strip_prefix(&format!("{candidate_upper}_")) {
            upper = bare.to_string();
            break;
        }
    }
    if upper.is_empty() {
        upper = "DOC".to_string();
    }
    format!("{layer}_{upper}.mdc")
}

/// Canonical corpus-relative path: same directory, canonical file name.
#[must_use]
pub fn canonical_path(layer: &str, path: &str, valid_layers: &[String]) -> String {
    match path.rsplit_once('/') {
        Some((dir, file_name)) => {
            format!("{dir}/{}", canonical_file_name(layer, file_name, valid_layers))
        }
        None => canonical_file_name(layer, path, valid_layers),
    }
}
