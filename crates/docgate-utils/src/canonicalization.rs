use anyhow::{Context, Result};
use blake3::Hasher;
use serde::Serialize;

/// Emit a value as JCS-canonical JSON (RFC 8785).
///
/// This is the standard way to emit JSON for gate reports, autofix summaries,
/// history entries, and any other JSON contracts. JCS ensures deterministic
/// output regardless of field ordering in the source struct.
///
/// # Example
///
/// ```rust,no_run
/// use docgate_utils::canonicalization::emit_jcs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct MyOutput {
///     name: String,
///     value: i32,
/// }
///
/// let output = MyOutput { name: "test".into(), value: 42 };
/// let json = emit_jcs(&output).expect("serialization should succeed");
/// println!("{}", json);
/// ```
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}

/// Compute the BLAKE3 hash of content after LF normalization, as a 64-char
/// hex string.
///
/// Normalizing first keeps the hash stable across CRLF checkouts of the
/// same corpus.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut hasher = Hasher::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// First 8 hex characters of [`content_hash`], the short form recorded per
/// written file in autofix summaries.
#[must_use]
pub fn content_hash_short(content: &str) -> String {
    let full = content_hash(content);
    full[..8].to_string()
}
