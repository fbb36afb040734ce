//! Constrained draw selection (deterministic given the index source; integers only).
//!
//! Contract:
//! - Exclusion set `E` = `already_won` ∪ every recorded winner ∪ the global excluded set.
//! - Preset ids for the category are filtered by `E`, by the entrant directory and by the
//!   category restriction, keeping their configured order. If they cover the request they
//!   *are* the result and the index source is never touched.
//! - Otherwise they become guaranteed winners, join `E`, and the remaining slots are drawn
//!   uniformly without replacement from the eligible pool.
//! - The pool is kept in entrant-directory order; draw `k = next_in(1, len)` takes
//!   `pool[k - 1]` and removes it, so the rest keeps its relative order.
//! - A short pool is an `InsufficientPool` error, never a truncated list.
//!
//! Notes:
//! - `draw_from_all_remaining` does not change the exclusion rule here: callers express
//!   "all-in" by passing an empty `already_won`. Recorded history stays excluded.
//! - A preset id with no entrant record is dropped silently (logged at debug).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use raffle_core::{
    entities::{DrawConfig, DrawRequest, Entrant, ResultHistory, WinnerList},
    ids::EntrantId,
    rng::IndexSource,
};

use crate::eligibility::{category_allowed, eligible_pool, exclusion_set};
use crate::DrawError;

/// Read-only snapshot a draw is computed against.
#[derive(Clone, Copy, Debug)]
pub struct DrawInputs<'a> {
    pub entrants: &'a [Entrant],
    pub history: &'a ResultHistory,
    pub config: &'a DrawConfig,
    pub excluded: &'a BTreeSet<EntrantId>,
}

impl<'a> DrawInputs<'a> {
    pub fn new(
        entrants: &'a [Entrant],
        history: &'a ResultHistory,
        config: &'a DrawConfig,
        excluded: &'a BTreeSet<EntrantId>,
    ) -> Self {
        Self { entrants, history, config, excluded }
    }
}

/// One random pick, as drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawCrumb {
    /// 1-based position of this pick among the random picks.
    pub draw: usize,
    /// Pool size at the moment of the pick.
    pub pool_size: usize,
    /// 1-based index returned by the source.
    pub index: usize,
    pub picked: EntrantId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawOutcome {
    pub winners: WinnerList,
    /// Leading entries of `winners` that came from the preset list.
    pub preset_count: usize,
    pub trail: Vec<DrawCrumb>,
}

impl DrawOutcome {
    pub fn preset_winners(&self) -> &[EntrantId] { &self.winners[..self.split()] }
    pub fn random_winners(&self) -> &[EntrantId] { &self.winners[self.split()..] }

    /// `preset_count` clamped to the winner list, for hand-built outcomes.
    fn split(&self) -> usize { self.preset_count.min(self.winners.len()) }
}

/// Select the winners of one draw.
pub fn select_winners<R: IndexSource + ?Sized>(
    request: &DrawRequest,
    inputs: &DrawInputs<'_>,
    rng: &mut R,
) -> Result<WinnerList, DrawError> {
    select_winners_traced(request, inputs, rng).map(|o| o.winners)
}

/// Same as [`select_winners`], keeping the preset split and the per-pick trail.
pub fn select_winners_traced<R: IndexSource + ?Sized>(
    request: &DrawRequest,
    inputs: &DrawInputs<'_>,
    rng: &mut R,
) -> Result<DrawOutcome, DrawError> {
    let category = request.category.as_str();
    if !inputs.config.is_known(category) {
        return Err(DrawError::InvalidRequest(format!("unknown category: {category}")));
    }
    let wanted = request.requested_count;

    // 1) Exclusions
    let mut exclusion = exclusion_set(request, inputs.history, inputs.excluded);

    // 2) Presets take precedence
    let mut winners = resolve_preset(request, inputs, &exclusion);
    if winners.len() >= wanted {
        winners.truncate(wanted);
        debug!(category, count = winners.len(), "preset list covers the draw");
        return Ok(DrawOutcome { preset_count: winners.len(), winners, trail: Vec::new() });
    }
    let preset_count = winners.len();
    exclusion.extend(winners.iter().copied());
    let needed = wanted - preset_count;

    // 3) Pool + capacity
    let pool = eligible_pool(inputs.entrants, &exclusion, category);
    if pool.len() < needed {
        return Err(DrawError::InsufficientPool {
            category: request.category.clone(),
            needed,
            available: pool.len(),
            preset_used: preset_count,
        });
    }

    // 4) Random fill
    let mut trail = Vec::with_capacity(needed);
    winners.extend(sample_without_replacement(pool, needed, rng, &mut trail));

    debug!(
        category,
        preset = preset_count,
        random = winners.len() - preset_count,
        "draw selected"
    );
    Ok(DrawOutcome { winners, preset_count, trail })
}

/// Preset ids still valid for this draw, in configured order.
fn resolve_preset(
    request: &DrawRequest,
    inputs: &DrawInputs<'_>,
    exclusion: &BTreeSet<EntrantId>,
) -> Vec<EntrantId> {
    let category = request.category.as_str();
    let Some(preset) = inputs.config.preset_for(category) else {
        return Vec::new();
    };

    let mut directory: BTreeMap<EntrantId, &Entrant> = BTreeMap::new();
    for e in inputs.entrants {
        directory.entry(e.id).or_insert(e);
    }

    let mut seen = BTreeSet::new();
    preset
        .ids()
        .iter()
        .copied()
        .filter(|id| id.get() != 0 && seen.insert(*id))
        .filter(|id| {
            if exclusion.contains(id) {
                debug!(category, id = %id, "preset id already excluded");
                return false;
            }
            match directory.get(id) {
                None => {
                    debug!(category, id = %id, "preset id has no entrant record");
                    false
                }
                Some(e) if !category_allowed(e, category) => {
                    debug!(category, id = %id, "preset id not allowed in category");
                    false
                }
                Some(_) => true,
            }
        })
        .collect()
}

/// Draw `needed` ids from `pool`, removing each pick so it cannot repeat.
fn sample_without_replacement<R: IndexSource + ?Sized>(
    mut pool: Vec<EntrantId>,
    needed: usize,
    rng: &mut R,
    trail: &mut Vec<DrawCrumb>,
) -> Vec<EntrantId> {
    let mut out = Vec::with_capacity(needed);
    for draw in 1..=needed {
        if pool.is_empty() {
            warn!(draw, needed, "pool exhausted before the draw was filled");
            break;
        }
        let pool_size = pool.len();
        // Out-of-contract sources must not index past the pool.
        let index = rng.next_in(1, pool_size).clamp(1, pool_size);
        let picked = pool.remove(index - 1);
        trace!(draw, pool_size, index, picked = %picked, "random pick");
        trail.push(DrawCrumb { draw, pool_size, index, picked });
        out.push(picked);
    }
    out
}
