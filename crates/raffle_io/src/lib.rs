//! crates/raffle_io/src/lib.rs
//! Minimal I/O crate for the raffle engine.
//!
//! - Snapshot loading: one local JSON file → typed `Snapshot` + raw digest.
//! - Canonical JSON (sorted keys, compact) with atomic file writes.
//! - SHA-256 digests over raw bytes and canonical JSON.
//!
//! The engine crates never touch the filesystem; everything that does lives here.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for raffle_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Reading an input failed.
    #[error("read error: {0}")]
    Read(std::io::Error),

    /// Writing an output failed.
    #[error("write error: {0}")]
    Write(std::io::Error),

    /// Path rejected before any I/O (URL-like, not a file, ...).
    #[error("path error: {0}")]
    Path(String),

    /// JSON syntax/shape errors with a JSON-Pointer-like location.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Snapshot passed JSON parsing but breaks a cross-reference or uniqueness rule.
    #[error("invalid snapshot: {0}")]
    Invalid(String),

    /// Input exceeded a size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Canonicalization / hashing failure.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Read(e)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; callers may enrich this.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod snapshot;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_canonical, sha256_hex};
    pub use crate::snapshot::{load_snapshot, parse_loaded, parse_snapshot, LoadedSnapshot, Snapshot};
}
