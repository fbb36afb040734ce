//! Draw modes as offered by a draw form, and their resolution into a count.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// How many winners a single draw should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", content = "qty", rename_all = "snake_case"))]
pub enum DrawMode {
    /// Whatever the category still has left to award.
    Remain,
    One,
    Five,
    /// Free quantity typed in by the operator; validated on resolve.
    Custom(i64),
}

impl DrawMode {
    /// Legacy numeric form codes: 0 = remain, 1 = one, 5 = five, 99 = custom.
    pub fn from_code(code: u8, qty: Option<i64>) -> Result<Self, CoreError> {
        match code {
            0 => Ok(DrawMode::Remain),
            1 => Ok(DrawMode::One),
            5 => Ok(DrawMode::Five),
            99 => qty.map(DrawMode::Custom).ok_or(CoreError::DomainOutOfRange("qty")),
            _ => Err(CoreError::UnknownMode),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DrawMode::Remain => 0,
            DrawMode::One => 1,
            DrawMode::Five => 5,
            DrawMode::Custom(_) => 99,
        }
    }

    /// Resolve into a concrete count.
    ///
    /// `category_count` is the total the category awards; `already_drawn` is
    /// how many winners are already recorded for it.
    pub fn resolve(self, category_count: usize, already_drawn: usize) -> Result<usize, CoreError> {
        match self {
            DrawMode::One => Ok(1),
            DrawMode::Five => Ok(5),
            DrawMode::Remain => Ok(category_count.saturating_sub(already_drawn)),
            DrawMode::Custom(q) => usize::try_from(q).map_err(|_| CoreError::DomainOutOfRange("qty")),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            DrawMode::Remain => "remain",
            DrawMode::One => "one",
            DrawMode::Five => "five",
            DrawMode::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawMode::Custom(q) => write!(f, "custom:{q}"),
            other => f.write_str(other.token()),
        }
    }
}

/// Accepts `one`, `five`, `remain` and `custom:<qty>`.
impl FromStr for DrawMode {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(q) = s.strip_prefix("custom:") {
            return q
                .trim()
                .parse::<i64>()
                .map(DrawMode::Custom)
                .map_err(|_| CoreError::DomainOutOfRange("qty"));
        }
        match s {
            "one" => Ok(DrawMode::One),
            "five" => Ok(DrawMode::Five),
            "remain" => Ok(DrawMode::Remain),
            _ => Err(CoreError::UnknownMode),
        }
    }
}
