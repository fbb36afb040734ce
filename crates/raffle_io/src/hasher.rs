//! crates/raffle_io/src/hasher.rs
//!
//! SHA-256 digests for draw records.
//! - `sha256_hex` over raw bytes (e.g. the snapshot file as read)
//! - `sha256_canonical` over the canonical JSON of any serializable value
//! Hex digests are **lowercase**, 64 chars.

#![forbid(unsafe_code)]

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes_of;
use crate::IoResult;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes_of(value)?))
}

/// Lowercase 64-hex check.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
