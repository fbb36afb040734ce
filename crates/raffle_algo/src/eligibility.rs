//! Eligibility and exclusion helpers shared by the selection engine and callers.
//!
//! Pure set arithmetic over the draw snapshot. No RNG, no I/O.

use std::collections::BTreeSet;

use raffle_core::{
    entities::{DrawRequest, Entrant, ResultHistory},
    ids::EntrantId,
};

/// An entrant with no restriction may win anything; otherwise only the listed categories.
#[inline]
pub fn category_allowed(entrant: &Entrant, category: &str) -> bool {
    !entrant.is_restricted() || entrant.allowed_categories.contains(category)
}

/// Everyone who must not win this draw: `already_won` ∪ every recorded winner ∪ `excluded`.
pub fn exclusion_set(
    request: &DrawRequest,
    history: &ResultHistory,
    excluded: &BTreeSet<EntrantId>,
) -> BTreeSet<EntrantId> {
    let mut out = request.already_won.clone();
    out.extend(history.all_winners());
    out.extend(excluded.iter().copied());
    out
}

/// Ids still eligible for `category`, in entrant-directory order.
///
/// A repeated id in the directory is only taken once (first occurrence).
pub fn eligible_pool(
    entrants: &[Entrant],
    exclusion: &BTreeSet<EntrantId>,
    category: &str,
) -> Vec<EntrantId> {
    let mut seen = BTreeSet::new();
    entrants
        .iter()
        .filter(|e| !exclusion.contains(&e.id) && category_allowed(e, category))
        .filter(|e| seen.insert(e.id))
        .map(|e| e.id)
        .collect()
}

/// Size of the pool a fresh draw for `category` would sample from.
pub fn count_eligible(
    entrants: &[Entrant],
    history: &ResultHistory,
    excluded: &BTreeSet<EntrantId>,
    category: &str,
) -> usize {
    let mut exclusion = history.all_winners();
    exclusion.extend(excluded.iter().copied());
    eligible_pool(entrants, &exclusion, category).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_core::ids::CategoryId;

    fn cat(s: &str) -> CategoryId { s.parse().unwrap() }
    fn id(v: u64) -> EntrantId { EntrantId::new(v) }

    #[test]
    fn unrestricted_entrant_allowed_everywhere() {
        let e = Entrant::new(1, "Ada");
        assert!(category_allowed(&e, "first"));
        assert!(category_allowed(&e, "anything"));
    }

    #[test]
    fn restricted_entrant_only_listed() {
        let e = Entrant::new(1, "Ada").restricted_to([cat("first"), cat("third")]);
        assert!(category_allowed(&e, "first"));
        assert!(!category_allowed(&e, "second"));
    }

    #[test]
    fn exclusion_is_union_of_all_sources() {
        let req = DrawRequest::new(cat("a"), 1).with_already_won([id(1)]);
        let history = ResultHistory::new()
            .committed(&cat("a"), &[id(2)])
            .committed(&cat("b"), &[id(3)]);
        let excluded: BTreeSet<_> = [id(4)].into_iter().collect();
        let e = exclusion_set(&req, &history, &excluded);
        assert_eq!(e.into_iter().collect::<Vec<_>>(), vec![id(1), id(2), id(3), id(4)]);
    }

    #[test]
    fn pool_keeps_directory_order_and_dedupes() {
        let entrants = vec![
            Entrant::new(5, "e"),
            Entrant::new(2, "b"),
            Entrant::new(9, "x").restricted_to([cat("other")]),
            Entrant::new(2, "b again"),
            Entrant::new(7, "g"),
        ];
        let exclusion: BTreeSet<_> = [id(7)].into_iter().collect();
        assert_eq!(eligible_pool(&entrants, &exclusion, "a"), vec![id(5), id(2)]);
    }

    #[test]
    fn count_eligible_ignores_request_state() {
        let entrants: Vec<_> = (1..=6).map(|i| Entrant::new(i, "")).collect();
        let history = ResultHistory::new().committed(&cat("a"), &[id(1), id(2)]);
        let excluded: BTreeSet<_> = [id(6)].into_iter().collect();
        assert_eq!(count_eligible(&entrants, &history, &excluded, "b"), 3);
    }
}
