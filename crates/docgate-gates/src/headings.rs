//! Markdown heading extraction and anchor slugs.
//!
//! Shared by the anchor gate, the numbering gate, and the structural
//! autofix steps. Only ATX headings count; anything inside a fenced
//! code block is ignored.

use unicode_normalization::UnicodeNormalization;

/// One ATX heading with its 1-indexed line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Number of `#` characters, 1..=6.
    pub level: u8,
    /// Heading text after the markers, trimmed.
    pub text: String,
    /// 1-indexed source line.
    pub line: u32,
}

/// Extract ATX headings, skipping fenced code blocks.
#[must_use]
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;

    for (index, raw) in body.lines().enumerate() {
        let line = raw.trim_end();
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let Some((level, text)) = parse_atx(line) else {
            continue;
        };
        headings.push(Heading {
            level,
            text: text.to_string(),
            line: u32::try_from(index + 1).unwrap_or(u32::MAX),
        });
    }
    headings
}

fn parse_atx(line: &str) -> Option<(u8, &str)> {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(' ') && !rest.is_empty() {
        return None;
    }
    Some((hashes as u8, rest.trim()))
}

/// Blank out the interior of fenced code blocks, keeping every newline
/// so line arithmetic over the result still matches the original.
#[must_use]
pub fn mask_fenced_blocks(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_fence = false;
    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        if content.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push_str(line);
            continue;
        }
        if in_fence {
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }
    out
}

/// GitHub-style anchor slug: NFC-normalize, lowercase, drop everything
/// that is not alphanumeric, space, hyphen, or underscore, then turn
/// spaces into hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    let mut slug = String::with_capacity(normalized.len());
    for ch in normalized.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else if ch == ' ' || ch == '-' {
            slug.push(if ch == ' ' { '-' } else { ch });
        }
    }
    slug
}

/// Anchor slugs for a document, with GitHub's `-1`, `-2` suffixes for
/// repeated headings, in document order.
#[must_use]
pub fn anchor_slugs(headings: &[Heading]) -> Vec<String> {
    let mut counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    headings
        .iter()
        .map(|heading| {
            let base = slugify(&heading.text);
            let seen = counts.entry(base.clone()).or_insert(0);
            let slug = if *seen == 0 {
                base.clone()
            } else {
                format!("{base}-{seen}")
            };
            *seen += 1;
            slug
        })
        .collect()
}

/// Split a `3. Title` style numbering prefix off a heading text.
#[must_use]
pub fn split_number_prefix(text: &str) -> Option<(u32, &str)> {
    let (digits, rest) = text.split_at(text.find(|c: char| !c.is_ascii_digit())?);
    if digits.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix('.')?;
    let number = digits.parse().ok()?;
    Some((number, rest.trim_start()))
}
