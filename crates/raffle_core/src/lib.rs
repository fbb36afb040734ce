//! raffle_core: Core types, draw modes, and swappable random index sources.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! workspace (`raffle_algo`, `raffle_io`, `raffle_pipeline`, `raffle_cli`):
//!
//! - Identifiers: `EntrantId` (numeric key), `CategoryId` (prize token)
//! - Entities: `Entrant`, `PresetList`, `CategorySpec`, `DrawConfig`,
//!   `ResultHistory`, `DrawRequest`
//! - Draw modes (`one | five | remain | custom`) resolved into a concrete count
//! - `IndexSource` trait with ChaCha20, scripted and mutex-shared implementations
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidId,
        InvalidToken,
        UnknownMode,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidId => write!(f, "invalid entrant id"),
                CoreError::InvalidToken => write!(f, "invalid category token"),
                CoreError::UnknownMode => write!(f, "unknown draw mode"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    #[cfg(feature = "std")]
    impl std::error::Error for CoreError {}
}

pub mod ids;
pub mod entities;
pub mod mode;
pub mod rng;

pub use entities::{CategorySpec, DrawConfig, DrawRequest, Entrant, PresetList, ResultHistory, WinnerList};
pub use errors::CoreError;
pub use ids::{CategoryId, EntrantId};
pub use mode::DrawMode;
pub use rng::{ChaChaIndexSource, IndexSource, ScriptedIndexSource};
#[cfg(feature = "std")]
pub use rng::SharedIndexSource;
