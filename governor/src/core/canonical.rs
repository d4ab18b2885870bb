//! Canonical JSON encoding and content hashing.
//!
//! Canonical form: UTF-8 without BOM, compact separators, object keys in
//! lexicographic order, array order preserved. `serde_json::Map` keeps keys
//! sorted as long as the `preserve_order` feature stays off, so compact
//! serialization of a `Value` is already canonical.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical bytes for `value`.
pub fn canonical_json(value: &Value) -> Vec<u8> {
    // `Display` for `Value` is the compact serializer.
    value.to_string().into_bytes()
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// 64-char lowercase hex SHA-256 over the canonical encoding of `value`.
pub fn content_hash(value: &Value) -> String {
    sha256_hex(&canonical_json(value))
}

/// Algorithm tag for hashes embedded in other artifacts.
pub const HASH_PREFIX: &str = "sha256:";

/// `sha256:<hex>` form of a [`content_hash`] result.
pub fn prefixed_hash(hash: &str) -> String {
    format!("{HASH_PREFIX}{hash}")
}

/// Accept a hash in bare or `sha256:` form and return the bare digest.
///
/// `None` unless the digest is 64 lowercase hex characters.
pub fn parse_hash(input: &str) -> Option<&str> {
    let digest = input.strip_prefix(HASH_PREFIX).unwrap_or(input);
    is_hex_digest(digest).then_some(digest)
}

/// True if `raw` is byte-for-byte the canonical encoding of `value`.
pub fn is_canonical(raw: &[u8], value: &Value) -> bool {
    raw == canonical_json(value).as_slice()
}

/// True if `hash` has the shape of a [`content_hash`] result.
pub fn is_hex_digest(hash: &str) -> bool {
    hash.len() == 64 && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
