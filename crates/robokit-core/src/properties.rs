//! Reconciles one `key=value` directive into a hand-edited properties file.
//!
//! Every existing line is kept verbatim and in order. A line holding the key
//! gets the desired value appended (comma separated) unless the value is
//! already in it; a missing key is appended as a new last line. Running this
//! any number of times gives the same file as running it once.

use std::path::Path;

use crate::error::{ProvisionError, Result};
use crate::storage;

/// Robocode setting listing extra directories scanned for robot classes.
pub const DEVELOPMENT_PATH_KEY: &str = "robocode.options.development.path";

/// Default separator for multi-valued settings.
pub const DEFAULT_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub value: String,
    pub separator: char,
}

impl Directive {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Directive {
            key: key.into(),
            value: value.into(),
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Adds `dir` to Robocode's development path.
    pub fn development_path(dir: &Path) -> Self {
        Directive::new(DEVELOPMENT_PATH_KEY, dir.to_string_lossy().into_owned())
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }
}

/// What reconciliation did to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The value was already present.
    Unchanged,
    /// The value was appended to an existing line.
    Appended,
    /// A new `key=value` line was added at the end.
    Inserted,
}

/// Byte offset where the value starts if `line` assigns `key`.
///
/// Accepts `key=v`, `key = v` and `key:v` after leading whitespace. Comment
/// lines (`#`, `!`) and longer keys sharing the prefix never match.
fn value_offset(line: &[u8], key: &[u8]) -> Option<usize> {
    let indent = line.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let trimmed = &line[indent..];
    if matches!(trimmed.first(), Some(b'#' | b'!')) {
        return None;
    }
    let after_key = trimmed.strip_prefix(key)?;
    let spaces = after_key.iter().take_while(|&&b| matches!(b, b' ' | b'\t')).count();
    let rest = match after_key.get(spaces) {
        Some(b'=' | b':') => &after_key[spaces + 1..],
        _ => return None,
    };
    Some(line.len() - rest.len())
}

/// Splits content into lines; a final newline does not start an extra empty line.
fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|&b| b == b'\n').collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Reconciles raw file content. Lines that do not assign the key are copied
/// byte for byte, whatever their encoding.
pub fn reconcile_bytes(existing: &[u8], directive: &Directive) -> (Vec<u8>, ReconcileOutcome) {
    let key = directive.key.as_bytes();
    let value = directive.value.as_bytes();
    let mut buf = [0u8; 4];
    let separator: &str = directive.separator.encode_utf8(&mut buf);
    let separator = separator.as_bytes();

    let mut out = Vec::with_capacity(existing.len() + key.len() + value.len() + 2);
    let mut found = false;
    let mut appended = false;

    for line in split_lines(existing) {
        let Some(offset) = value_offset(line, key) else {
            out.extend_from_slice(line);
            out.push(b'\n');
            continue;
        };
        found = true;

        // A CRLF line keeps its '\r' last.
        let (content, cr): (&[u8], &[u8]) = match line.strip_suffix(b"\r") {
            Some(c) => (c, &b"\r"[..]),
            None => (line, &b""[..]),
        };
        let current = &content[offset.min(content.len())..];
        out.extend_from_slice(content);
        if !contains(current, value) {
            if !current.iter().all(u8::is_ascii_whitespace) {
                out.extend_from_slice(separator);
            }
            out.extend_from_slice(value);
            appended = true;
        }
        out.extend_from_slice(cr);
        out.push(b'\n');
    }

    if !found {
        out.extend_from_slice(key);
        out.push(b'=');
        out.extend_from_slice(value);
        out.push(b'\n');
        return (out, ReconcileOutcome::Inserted);
    }

    let outcome = if appended {
        ReconcileOutcome::Appended
    } else {
        ReconcileOutcome::Unchanged
    };
    (out, outcome)
}

/// Pure reconciliation of `existing` content. Returns the new content and what changed.
pub fn reconcile(existing: &str, directive: &Directive) -> (String, ReconcileOutcome) {
    let (bytes, outcome) = reconcile_bytes(existing.as_bytes(), directive);
    let text = String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    (text, outcome)
}

/// Reconciles the file at `path` (missing file = empty). Rewrites it only if the content changes.
pub fn reconcile_file(path: &Path, directive: &Directive) -> Result<ReconcileOutcome> {
    let existing = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(ProvisionError::io(path, e)),
    };

    let (updated, outcome) = reconcile_bytes(&existing, directive);
    if updated != existing {
        storage::write_atomic(path, &updated)?;
    }
    tracing::info!(
        path = %path.display(),
        key = %directive.key,
        ?outcome,
        "reconciled properties"
    );
    Ok(outcome)
}
