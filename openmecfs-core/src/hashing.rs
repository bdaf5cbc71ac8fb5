//! Content hashing — the idempotency key for evidence generation.
//!
//! The same normalization must run at generation time and at lookup time,
//! or idempotency silently breaks. Both paths call through
//! [`source_fingerprint`]; nothing else in the crate hashes source text.

use sha2::{Digest, Sha256};

/// Separator between title and abstract in the normalized input.
const FIELD_SEPARATOR: &str = "\n\n";

/// Normalize source text for hashing: trim both fields and join them with
/// a fixed separator.
pub fn normalize_source_text(title: &str, abstract_text: &str) -> String {
    format!("{}{}{}", title.trim(), FIELD_SEPARATOR, abstract_text.trim())
}

/// SHA-256 digest of the given normalized text, hex-encoded.
pub fn content_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Fingerprint of a source document: normalization plus hashing in one
/// step, so generation and lookup cannot diverge.
pub fn source_fingerprint(title: &str, abstract_text: &str) -> String {
    content_hash(&normalize_source_text(title, abstract_text))
}
