//! Line naming policy (C3): turns an arbitrary line of text into a
//! filesystem-safe, batch-unique, case-fold-unique directory name.

use sha2::{Digest, Sha256};

/// Human-readable suffixes are capped to this many characters so a very
/// long line doesn't produce an unwieldy directory name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Derive a line's item name: an 8-hex-char SHA-256 suffix (which alone
/// guarantees uniqueness, including case-fold uniqueness, across distinct
/// lines) plus an optional human-readable suffix when the line itself is
/// already filesystem-safe.
pub fn line_name(line: &str) -> String {
    let hash = hex_suffix(line.as_bytes());
    match readable_suffix(line) {
        Some(suffix) => format!("{hash}-{suffix}"),
        None => hash,
    }
}

fn hex_suffix(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex = hex_encode(&digest);
    hex[hex.len() - 8..].to_string()
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn readable_suffix(line: &str) -> Option<String> {
    let stripped = line.trim();
    if !stripped.is_empty()
        && stripped
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Some(stripped.chars().take(MAX_NAME_LENGTH).collect())
    } else {
        None
    }
}
