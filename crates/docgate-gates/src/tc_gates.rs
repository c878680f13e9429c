//! Test-case gates TC-01 through TC-04.
//!
//! These gates read TypeScript test sources as text. Nothing is
//! executed or parsed into an AST; TC-02 and TC-03 in particular are
//! pattern heuristics and are reported as warnings because they can
//! miss couplings and flag odd-but-legitimate layouts.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Context;
use docgate_utils::paths::SandboxRoot;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::report::{GateId, GateReport, Violation};

/// A test source file, with its path relative to the corpus root and
/// the test root it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSourceFile {
    /// Normalized test root this file belongs to.
    pub root: String,
    /// Corpus-relative path.
    pub path: String,
    /// File text.
    pub content: String,
}

static SPEC_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*\.spec\.ts$").unwrap());

static TEST_BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:it|test)\s*\(").unwrap());

static MODULE_LEVEL_LET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:export\s+)?(?:let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap());

static FIXTURE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'`]([^"'`\n]*fixtures/[^"'`\n]*)["'`]"#).unwrap());

/// Run all four test-case gates over the scanned files.
#[must_use]
pub fn evaluate_tc_gates(files: &[TestSourceFile]) -> GateReport {
    let mut report = GateReport::new();
    report.extend(GateId::Tc01, check_test_naming(files));
    report.extend(GateId::Tc02, check_test_coupling(files));
    report.extend(GateId::Tc03, check_test_docs(files));
    report.extend(GateId::Tc04, check_fixture_scope(files));
    debug!(
        files = files.len(),
        errors = report.error_count,
        warnings = report.warn_count,
        "test-case gates evaluated"
    );
    report
}

/// Collect `.ts` sources under the configured test roots. Roots that
/// do not exist are skipped; unreadable files are skipped with a debug
/// log rather than failing the run. Bad exclude globs are a
/// configuration error.
pub fn scan_test_sources(
    root: &SandboxRoot,
    test_roots: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<TestSourceFile>> {
    let excludes = build_globset(exclude)?;
    let mut files = Vec::new();

    for test_root in test_roots {
        let Ok(base) = root.join(test_root) else {
            debug!(root = %test_root, "test root rejected by sandbox");
            continue;
        };
        if !base.as_path().is_dir() {
            debug!(root = %test_root, "test root does not exist, skipping");
            continue;
        }
        for entry in WalkDir::new(base.as_path())
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(stripped) = entry.path().strip_prefix(root.as_path()) else {
                continue;
            };
            let rel = stripped.to_string_lossy().replace('\\', "/");
            if excludes.is_match(&rel) {
                continue;
            }
            if !rel.ends_with(".ts") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                debug!(path = %rel, "skipping unreadable test source");
                continue;
            };
            files.push(TestSourceFile {
                root: test_root.clone(),
                path: rel,
                content,
            });
        }
    }

    debug!(files = files.len(), roots = test_roots.len(), "test sources scanned");
    Ok(files)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("Invalid exclude pattern: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build exclude globs")
}

/// TC-01: files that look like tests must be named
/// `<kebab-or-snake>.spec.ts`.
#[must_use]
pub fn check_test_naming(files: &[TestSourceFile]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for file in files {
        let name = file_name_of(&file.path);
        if !is_test_like(name) {
            continue;
        }
        if !SPEC_FILE_NAME.is_match(name) {
            violations.push(Violation::error(
                &file.path,
                format!("test file {name} must be named <lower-kebab-or-snake>.spec.ts"),
            ));
        }
    }
    violations
}

fn is_test_like(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".spec.ts") || lower.ends_with(".test.ts")
}

/// TC-02 (warn): a module-level `let`/`var` assigned inside one test
/// block and read in a later block suggests the later test depends on
/// the earlier one's execution. Heuristic, so false negatives are
/// expected.
#[must_use]
pub fn check_test_coupling(files: &[TestSourceFile]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for file in files {
        let blocks = test_block_spans(&file.content);
        if blocks.len() < 2 {
            continue;
        }
        for capture in MODULE_LEVEL_LET.captures_iter(&file.content) {
            let Some(name) = capture.get(1) else { continue };
            // Declarations inside a test block are block-local.
            if block_index(&blocks, name.start()).is_some() {
                continue;
            }
            let variable = name.as_str();
            if let Some((read_block, read_offset)) = chained_read(&file.content, &blocks, variable)
            {
                let line = line_of(&file.content, read_offset);
                violations.push(
                    Violation::warn(
                        &file.path,
                        format!(
                            "test reads `{variable}` assigned by an earlier test (block {} -> block {})",
                            read_block.0 + 1,
                            read_block.1 + 1
                        ),
                    )
                    .with_line(line),
                );
            }
        }
    }
    violations
}

/// Find the earliest block that assigns `variable` and the first later
/// block that mentions it. Returns the (assigning, reading) block pair
/// and the byte offset of the read.
fn chained_read(
    content: &str,
    blocks: &[(usize, usize)],
    variable: &str,
) -> Option<((usize, usize), usize)> {
    let mut assigned_in: Option<usize> = None;
    for (index, &(start, end)) in blocks.iter().enumerate() {
        let span = &content[start..end];
        let mut from = 0;
        while let Some(col) = find_token(&span[from..], variable) {
            let at = from + col;
            let after = span[at + variable.len()..].trim_start();
            let is_assignment = after.starts_with('=')
                && !after.starts_with("==")
                && !after.starts_with("=>");
            match assigned_in {
                None if is_assignment => {
                    assigned_in = Some(index);
                }
                Some(earlier) if index > earlier => {
                    return Some(((earlier, index), start + at));
                }
                _ => {}
            }
            from = at + variable.len();
        }
    }
    None
}

/// TC-03 (warn): every test block needs a comment directly above it
/// stating purpose and expectation.
#[must_use]
pub fn check_test_docs(files: &[TestSourceFile]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for file in files {
        let lines: Vec<&str> = file.content.lines().collect();
        for m in TEST_BLOCK_START.find_iter(&file.content) {
            let line_index = line_of(&file.content, m.start()) as usize - 1;
            let documented = line_index > 0
                && lines
                    .get(line_index - 1)
                    .is_some_and(|above| is_comment_line(above));
            if !documented {
                violations.push(
                    Violation::warn(
                        &file.path,
                        "test block has no documentation comment above it",
                    )
                    .with_line(line_index as u32 + 1),
                );
            }
        }
    }
    violations
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.ends_with("*/")
}

/// TC-04: fixture references must resolve inside the referencing
/// file's own test root.
#[must_use]
pub fn check_fixture_scope(files: &[TestSourceFile]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for file in files {
        let base_dir = file.path.rsplit_once('/').map_or("", |(dir, _)| dir);
        for capture in FIXTURE_REF.captures_iter(&file.content) {
            let Some(raw) = capture.get(1) else { continue };
            let reference = raw.as_str();
            let line = line_of(&file.content, raw.start());
            let resolved = if reference.starts_with('/') {
                None
            } else {
                lexical_join(base_dir, reference)
            };
            let in_scope = resolved
                .as_deref()
                .is_some_and(|path| path == file.root || path.starts_with(&format!("{}/", file.root)));
            if !in_scope {
                violations.push(
                    Violation::error(
                        &file.path,
                        format!("fixture reference {reference} resolves outside test root {}", file.root),
                    )
                    .with_link(reference.to_string())
                    .with_line(line),
                );
            }
        }
    }
    violations
}

/// Byte spans of test blocks, each running to the start of the next
/// block. Flat approximation; good enough for textual heuristics.
fn test_block_spans(content: &str) -> Vec<(usize, usize)> {
    let starts: Vec<usize> = TEST_BLOCK_START.find_iter(content).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(content.len());
            (start, end)
        })
        .collect()
}

fn block_index(blocks: &[(usize, usize)], offset: usize) -> Option<usize> {
    blocks
        .iter()
        .position(|&(start, end)| offset >= start && offset < end)
}

/// First identifier-boundary occurrence of `token` in `haystack`.
fn find_token(haystack: &str, token: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = haystack[from..].find(token) {
        let at = from + found;
        let before_ok = at == 0 || !is_ident_char(haystack[..at].chars().next_back());
        let after = haystack[at + token.len()..].chars().next();
        let after_ok = !is_ident_char(after);
        if before_ok && after_ok {
            return Some(at);
        }
        from = at + token.len();
    }
    None
}

fn is_ident_char(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn line_of(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

fn file_name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn lexical_join(base: &str, rel: &str) -> Option<String> {
    let mut segments: Vec<&str> = if base.is_empty() {
        Vec::new()
    } else {
        base.split('/').collect()
    };
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
