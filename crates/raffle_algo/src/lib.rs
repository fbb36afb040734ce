// crates/raffle_algo/src/lib.rs
#![forbid(unsafe_code)]

// Core IDs and draw-time entities
pub use raffle_core::{
    ids::{CategoryId, EntrantId},
    entities::{DrawConfig, DrawRequest, Entrant, ResultHistory, WinnerList},
    rng::IndexSource,
};

// ----------------------------- Errors ------------------------------------------------

/// Typed draw failures; callers branch on the kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// Fewer eligible entrants than the draw still needs after presets.
    #[error("not enough eligible entrants for {category}: need {needed}, only {available} available (preset supplied {preset_used})")]
    InsufficientPool {
        category: CategoryId,
        needed: usize,
        available: usize,
        preset_used: usize,
    },
    /// The request cannot be interpreted (unknown category, bad count, ...).
    #[error("invalid draw request: {0}")]
    InvalidRequest(String),
}

// ----------------------------- Modules -----------------------------------------------

pub mod eligibility;
pub mod select;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use eligibility::{category_allowed, count_eligible, eligible_pool, exclusion_set};
pub use select::{select_winners, select_winners_traced, DrawCrumb, DrawInputs, DrawOutcome};
