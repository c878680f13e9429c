//! Structural document repair.
//!
//! Body-level transforms used by the planner: breadcrumb insertion,
//! required-section stubs, heading renumbering, and table-of-contents
//! regeneration. Every function is pure and byte-stable: feeding its
//! own output back in produces no further change.

use docgate_corpus::parse_document;
use docgate_gates::headings::{anchor_slugs, extract_headings, split_number_prefix};
use docgate_gates::{has_breadcrumb, heading_matches, REQUIRED_SECTIONS};

/// Body text for generated section stubs.
pub const SECTION_PLACEHOLDER: &str = "_Not yet documented._";

/// Heading that marks a regenerable table of contents.
pub const TOC_HEADING: &str = "Table of Contents";

/// Swap the body while keeping the front matter block byte-identical.
#[must_use]
pub fn replace_body(content: &str, new_body: &str) -> String {
    let parsed = parse_document(content);
    let prefix_len = content.len() - parsed.body.len();
    let mut out = String::with_capacity(prefix_len + new_body.len());
    out.push_str(&content[..prefix_len]);
    out.push_str(new_body);
    out
}

/// Insert a breadcrumb line, after the leading H1 title when the body
/// has one, otherwise at the very top. Returns `None` when the marker
/// is already present.
#[must_use]
pub fn ensure_breadcrumb(body: &str, crumb_line: &str) -> Option<String> {
    if has_breadcrumb(body) {
        return None;
    }
    let mut lines: Vec<&str> = body.split('\n').collect();
    let title_idx = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .filter(|&idx| lines[idx].starts_with("# "));
    match title_idx {
        Some(idx) => {
            lines.insert(idx + 1, crumb_line);
            lines.insert(idx + 1, "");
        }
        None => {
            lines.insert(0, "");
            lines.insert(0, crumb_line);
        }
    }
    Some(lines.join("\n"))
}

/// Required sections that have no matching heading in the body.
#[must_use]
pub fn missing_sections(body: &str) -> Vec<&'static str> {
    let headings = extract_headings(body);
    REQUIRED_SECTIONS
        .into_iter()
        .filter(|required| !headings.iter().any(|h| heading_matches(&h.text, required)))
        .collect()
}

/// Insert stub headings for the given sections, as one block before
/// the first existing heading of the same or lower rank, or at the end
/// of the body when there is none.
#[must_use]
pub fn insert_sections(body: &str, missing: &[&str]) -> String {
    if missing.is_empty() {
        return body.to_string();
    }
    let mut block: Vec<String> = Vec::with_capacity(missing.len() * 4);
    for name in missing {
        block.push(format!("## {name}"));
        block.push(String::new());
        block.push(SECTION_PLACEHOLDER.to_string());
        block.push(String::new());
    }

    let anchor = extract_headings(body)
        .into_iter()
        .find(|h| h.level >= 2)
        .map(|h| h.line as usize - 1);
    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    match anchor {
        Some(idx) => {
            if idx > 0 && !lines[idx - 1].trim().is_empty() {
                block.insert(0, String::new());
            }
            lines.splice(idx..idx, block);
        }
        None => {
            while lines.last().is_some_and(|line| line.trim().is_empty()) {
                lines.pop();
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(block);
        }
    }
    lines.join("\n")
}

/// Rewrite numbered headings so every depth counts sequentially from 1,
/// counters resetting under a shallower heading. This is the repair
/// twin of the numbering gate's walk, assigning the expected number
/// where the gate merely adopts the actual one.
#[must_use]
pub fn renumber_headings(body: &str) -> String {
    let headings = extract_headings(body);
    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    let mut counters = [0u32; 7];
    let mut changed = false;
    for heading in &headings {
        let level = usize::from(heading.level.min(6));
        for deeper in counters.iter_mut().skip(level + 1) {
            *deeper = 0;
        }
        let Some((actual, rest)) = split_number_prefix(&heading.text) else {
            continue;
        };
        let expected = counters[level] + 1;
        counters[level] = expected;
        if actual != expected {
            let idx = heading.line as usize - 1;
            lines[idx] = format!("{} {expected}. {rest}", "#".repeat(level));
            changed = true;
        }
    }
    if changed {
        lines.join("\n")
    } else {
        body.to_string()
    }
}

/// Regenerate the table-of-contents section when the body carries a
/// `Table of Contents` heading. The section content, up to the next
/// heading of the same or shallower level, is replaced with one link
/// per heading below the title, indented by depth. Bodies without the
/// heading are returned unchanged.
#[must_use]
pub fn regenerate_toc(body: &str) -> String {
    let headings = extract_headings(body);
    let Some(toc_pos) = headings
        .iter()
        .position(|h| heading_matches(&h.text, TOC_HEADING))
    else {
        return body.to_string();
    };
    let toc_level = headings[toc_pos].level;
    let slugs = anchor_slugs(&headings);

    let mut entries = Vec::new();
    for (pos, heading) in headings.iter().enumerate() {
        if pos == toc_pos || heading.level == 1 {
            continue;
        }
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(2)));
        entries.push(format!("{indent}- [{}](#{})", heading.text, slugs[pos]));
    }

    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    let start = headings[toc_pos].line as usize;
    let end = headings
        .iter()
        .skip(toc_pos + 1)
        .find(|h| h.level <= toc_level)
        .map_or(lines.len(), |h| h.line as usize - 1);

    let mut replacement = Vec::with_capacity(entries.len() + 2);
    replacement.push(String::new());
    replacement.extend(entries);
    replacement.push(String::new());
    lines.splice(start..end, replacement);
    lines.join("\n")
}
