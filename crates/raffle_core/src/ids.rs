//! crates/raffle_core/src/ids.rs
//! Entrant keys and prize-category tokens. ASCII-only, strict shapes; no I/O.

use alloc::string::{String, ToString};
use core::borrow::Borrow;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const TOKEN_MAX_LEN: usize = 64;

/// Category token: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let bs = s.as_bytes();
    if bs.is_empty() || bs.len() > TOKEN_MAX_LEN {
        return false;
    }
    bs.iter().all(|&b| {
        b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-')
    })
}

/* -------------------------------- EntrantId -------------------------------- */

/// Unique numeric key of an entrant (employee id, ticket number, ...).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntrantId(u64);

impl EntrantId {
    #[inline] pub const fn new(v: u64) -> Self { Self(v) }
    #[inline] pub const fn get(self) -> u64 { self.0 }
}

impl From<u64> for EntrantId {
    #[inline]
    fn from(v: u64) -> Self { Self(v) }
}

impl fmt::Display for EntrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntrantId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidId);
        }
        t.parse::<u64>().map(Self).map_err(|_| CoreError::InvalidId)
    }
}

/* -------------------------------- CategoryId ------------------------------- */

/// Prize category key (e.g. `firstPrize`). Draws are scoped per category.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct CategoryId(String);

impl CategoryId {
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CategoryId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for CategoryId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
    }
}

impl TryFrom<&str> for CategoryId {
    type Error = CoreError;
    #[inline]
    fn try_from(s: &str) -> Result<Self, Self::Error> { s.parse() }
}

impl TryFrom<String> for CategoryId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if is_valid_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken) }
    }
}

impl From<CategoryId> for String {
    #[inline]
    fn from(c: CategoryId) -> Self { c.0 }
}

// Lets maps keyed by CategoryId be queried with a plain &str.
impl Borrow<str> for CategoryId {
    #[inline]
    fn borrow(&self) -> &str { &self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrant_id_parses_trimmed_digits() {
        assert_eq!(" 42 ".parse::<EntrantId>(), Ok(EntrantId::new(42)));
        assert_eq!("abc".parse::<EntrantId>(), Err(CoreError::InvalidId));
        assert_eq!("-5".parse::<EntrantId>(), Err(CoreError::InvalidId));
        assert_eq!("1.5".parse::<EntrantId>(), Err(CoreError::InvalidId));
        assert_eq!("".parse::<EntrantId>(), Err(CoreError::InvalidId));
    }

    #[test]
    fn category_token_shape() {
        assert!("firstPrize".parse::<CategoryId>().is_ok());
        assert!("prize:2025.a-b_c".parse::<CategoryId>().is_ok());
        assert_eq!("".parse::<CategoryId>(), Err(CoreError::InvalidToken));
        assert_eq!("first prize".parse::<CategoryId>(), Err(CoreError::InvalidToken));
        let long = "x".repeat(65);
        assert_eq!(long.parse::<CategoryId>(), Err(CoreError::InvalidToken));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn category_rejects_bad_token_on_deserialize() {
        let ok: CategoryId = serde_json::from_str("\"secondPrize\"").unwrap();
        assert_eq!(ok.as_str(), "secondPrize");
        assert!(serde_json::from_str::<CategoryId>("\"bad token\"").is_err());
    }
}
