//! Cache-key hashing.
//!
//! Keys are a BLAKE3 digest of the normalized query. This is a cache, not a
//! security boundary: a collision costs one stale lookup, which downstream
//! validation tolerates.

/// Normalizes a query for cache keying: trim surrounding whitespace and
/// lowercase. Two queries that differ only in case or padding share a key.
#[inline]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Computes the 32-byte BLAKE3 cache key for a query after normalization.
#[inline]
pub fn hash_query(query: &str) -> [u8; 32] {
    *blake3::hash(normalize_query(query).as_bytes()).as_bytes()
}
