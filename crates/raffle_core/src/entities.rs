//! crates/raffle_core/src/entities.rs
//! Draw-time entities: entrants, preset lists, category configuration,
//! per-category result history and the draw request itself.
//!
//! Everything here is an ephemeral, read-only snapshot from the engine's point
//! of view. The only "write" helper (`ResultHistory::committed`) returns a new
//! value and is meant for callers folding a successful draw into their state.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, EntrantId};

/// Ordered winners of one draw: preset winners first, then random winners.
pub type WinnerList = Vec<EntrantId>;

/* --------------------------------- Entrant --------------------------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entrant {
    pub id: EntrantId,
    pub display_name: String,
    /// Empty = eligible for every category.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allowed_categories: BTreeSet<CategoryId>,
}

impl Entrant {
    pub fn new(id: impl Into<EntrantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            allowed_categories: BTreeSet::new(),
        }
    }

    /// Restrict this entrant to the given categories.
    pub fn restricted_to<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = CategoryId>,
    {
        self.allowed_categories.extend(categories);
        self
    }

    #[inline]
    pub fn is_restricted(&self) -> bool { !self.allowed_categories.is_empty() }
}

/* ------------------------------- PresetList -------------------------------- */

/// Ordered guaranteed winners for one category.
///
/// Parsed leniently from a comma-separated list: blank, non-numeric, non-integral
/// and `0` tokens are dropped, and a repeated id keeps only its first position.
/// Integral spellings such as `+5`, `1.0`, `1e1` and `0x10` are accepted.
/// Every constructor (including deserialization) applies the same dedup and `0` rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<EntrantId>", into = "Vec<EntrantId>"))]
pub struct PresetList(Vec<EntrantId>);

impl PresetList {
    pub fn parse(raw: &str) -> Self {
        Self::from_ids(raw.split(',').filter_map(preset_token).map(EntrantId::new))
    }

    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = EntrantId>,
    {
        let mut seen = BTreeSet::new();
        Self(
            ids.into_iter()
                .filter(|id| id.get() != 0)
                .filter(|id| seen.insert(*id))
                .collect(),
        )
    }

    #[inline] pub fn ids(&self) -> &[EntrantId] { &self.0 }
    #[inline] pub fn len(&self) -> usize { self.0.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<Vec<EntrantId>> for PresetList {
    fn from(ids: Vec<EntrantId>) -> Self { Self::from_ids(ids) }
}

impl From<PresetList> for Vec<EntrantId> {
    fn from(p: PresetList) -> Self { p.0 }
}

/// Largest integer an f64 holds exactly (2^53 - 1).
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_991.0;

/// One preset token as a positive integer, or `None` when it does not name one.
fn preset_token(tok: &str) -> Option<u64> {
    let t = tok.trim();
    if t.is_empty() {
        return None;
    }
    if t.bytes().all(|b| b.is_ascii_digit()) {
        return t.parse().ok();
    }
    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &t[2..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        return u64::from_str_radix(digits, radix).ok();
    }
    // Decimal forms with a fraction or exponent; only exact integers survive.
    if !t.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) {
        return None;
    }
    let v: f64 = t.parse().ok()?;
    if !(v >= 1.0 && v <= MAX_EXACT_F64_INT) {
        return None;
    }
    let n = v as u64;
    (n as f64 == v).then_some(n)
}

impl fmt::Display for PresetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/* ------------------------------ Configuration ------------------------------ */

/// One prize category as configured by the organiser.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategorySpec {
    pub name: String,
    /// Total number of winners this category awards across all its draws.
    pub count: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub preset: Option<PresetList>,
}

/// Read-only configuration: the set of known categories with their presets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawConfig {
    pub name: String,
    pub categories: BTreeMap<CategoryId, CategorySpec>,
    /// Category keys in the organiser's display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: Vec<CategoryId>,
}

impl DrawConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Append a category; a repeated key replaces the spec but keeps its position.
    pub fn with_category(mut self, key: CategoryId, spec: CategorySpec) -> Self {
        if !self.categories.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.categories.insert(key, spec);
        self
    }

    #[inline]
    pub fn category(&self, key: &str) -> Option<&CategorySpec> { self.categories.get(key) }

    #[inline]
    pub fn is_known(&self, key: &str) -> bool { self.categories.contains_key(key) }

    /// Non-empty preset for `key`, if any.
    pub fn preset_for(&self, key: &str) -> Option<&PresetList> {
        self.category(key)
            .and_then(|c| c.preset.as_ref())
            .filter(|p| !p.is_empty())
    }

    /// Categories in display order (falls back to key order when `order` is empty).
    pub fn ordered(&self) -> Vec<(&CategoryId, &CategorySpec)> {
        if self.order.is_empty() {
            return self.categories.iter().collect();
        }
        self.order
            .iter()
            .filter_map(|k| self.categories.get_key_value(k.as_str()))
            .collect()
    }
}

/* ------------------------------ ResultHistory ------------------------------ */

/// Winners already recorded, per category, in the order they were drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResultHistory(BTreeMap<CategoryId, Vec<EntrantId>>);

impl ResultHistory {
    pub fn new() -> Self { Self::default() }

    pub fn from_map(map: BTreeMap<CategoryId, Vec<EntrantId>>) -> Self { Self(map) }

    pub fn winners_for(&self, category: &str) -> &[EntrantId] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of every winner across all categories.
    pub fn all_winners(&self) -> BTreeSet<EntrantId> {
        self.0.values().flatten().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, &Vec<EntrantId>)> {
        self.0.iter()
    }

    /// Total number of recorded wins.
    pub fn total(&self) -> usize { self.0.values().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.total() == 0 }

    /// A copy of this history with `winners` appended to `category`.
    #[must_use]
    pub fn committed(&self, category: &CategoryId, winners: &[EntrantId]) -> Self {
        let mut next = self.0.clone();
        next.entry(category.clone()).or_default().extend_from_slice(winners);
        Self(next)
    }

    pub fn into_inner(self) -> BTreeMap<CategoryId, Vec<EntrantId>> { self.0 }
}

/* ------------------------------- DrawRequest ------------------------------- */

/// One draw, with its count already resolved by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawRequest {
    pub category: CategoryId,
    pub requested_count: usize,
    /// Winners across all categories so far (empty when drawing "all-in").
    pub already_won: BTreeSet<EntrantId>,
    pub draw_from_all_remaining: bool,
}

impl DrawRequest {
    pub fn new(category: CategoryId, requested_count: usize) -> Self {
        Self {
            category,
            requested_count,
            already_won: BTreeSet::new(),
            draw_from_all_remaining: false,
        }
    }

    pub fn with_already_won<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = EntrantId>,
    {
        self.already_won.extend(ids);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(s: &str) -> CategoryId { s.parse().unwrap() }
    fn ids(v: &[u64]) -> Vec<EntrantId> { v.iter().copied().map(EntrantId::new).collect() }

    #[test]
    fn preset_parse_drops_malformed_and_zero() {
        let p = PresetList::parse(" 10, 20 ,abc,,0, 30,1.5,-4");
        assert_eq!(p.ids(), ids(&[10, 20, 30]).as_slice());
    }

    #[test]
    fn preset_parse_keeps_first_of_duplicates() {
        let p = PresetList::parse("7,3,7,3,9");
        assert_eq!(p.ids(), ids(&[7, 3, 9]).as_slice());
        assert_eq!(p.to_string(), "7,3,9");
    }

    #[test]
    fn preset_parse_accepts_integral_spellings() {
        let p = PresetList::parse("+5, 1.0 ,1e1,0x10,0b11,2.50e1,1e-1,0x,+-3,1_0");
        assert_eq!(p.ids(), ids(&[5, 1, 10, 16, 3, 25]).as_slice());
        // 10 and 0xA name the same entrant
        assert_eq!(PresetList::parse("10,0xA,1e1").to_string(), "10");
    }

    #[test]
    fn from_ids_drops_zero_and_repeats() {
        let p = PresetList::from_ids(ids(&[5, 0, 5, 6]));
        assert_eq!(p.ids(), ids(&[5, 6]).as_slice());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_preset_is_normalized() {
        let spec: CategorySpec =
            serde_json::from_str(r#"{"name":"A","count":3,"preset":[5,5,0,6]}"#).unwrap();
        assert_eq!(spec.preset.as_ref().map(PresetList::ids), Some(ids(&[5, 6]).as_slice()));
        let back = serde_json::to_string(&spec.preset).unwrap();
        assert_eq!(back, "[5,6]");
    }

    #[test]
    fn preset_for_ignores_empty_lists() {
        let cfg = DrawConfig::new("t")
            .with_category(cat("a"), CategorySpec { name: "A".into(), count: 1, preset: Some(PresetList::parse(" , x")) })
            .with_category(cat("b"), CategorySpec { name: "B".into(), count: 1, preset: Some(PresetList::parse("5")) });
        assert!(cfg.preset_for("a").is_none());
        assert_eq!(cfg.preset_for("b").map(PresetList::len), Some(1));
        assert!(cfg.preset_for("missing").is_none());
    }

    #[test]
    fn ordered_follows_insertion() {
        let spec = CategorySpec { name: String::new(), count: 1, preset: None };
        let cfg = DrawConfig::new("t")
            .with_category(cat("zeta"), spec.clone())
            .with_category(cat("alpha"), spec.clone())
            .with_category(cat("zeta"), spec);
        let keys: Vec<&str> = cfg.ordered().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn committed_appends_without_touching_original() {
        let h = ResultHistory::new().committed(&cat("a"), &ids(&[1, 2]));
        let h2 = h.committed(&cat("a"), &ids(&[3])).committed(&cat("b"), &ids(&[4]));
        assert_eq!(h.winners_for("a"), ids(&[1, 2]).as_slice());
        assert_eq!(h2.winners_for("a"), ids(&[1, 2, 3]).as_slice());
        assert_eq!(h2.all_winners().len(), 4);
        assert_eq!(h2.total(), 4);
        assert!(h2.winners_for("c").is_empty());
    }
}
