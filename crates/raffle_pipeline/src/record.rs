//! Draw record: what was asked, what came out, and the digests that tie the
//! two to the exact snapshot bytes.
//!
//! - `snapshot_sha256` is over the raw snapshot file as loaded.
//! - `result_sha256` is over the canonical JSON of `{category, winners, preset_count}`.
//! - `seed_hex` is present iff the index source was seeded (16 lowercase hex digits).

use serde::{Deserialize, Serialize};

use raffle_algo::DrawOutcome;
use raffle_core::{
    entities::{DrawRequest, WinnerList},
    ids::CategoryId,
    mode::DrawMode,
};
use raffle_io::hasher;

use crate::{form::DrawForm, DrawCtx, PipelineError};

/// Engine identifiers recorded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

impl EngineMeta {
    /// Identity of this build.
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub category: CategoryId,
    pub mode: DrawMode,
    pub requested: usize,
    pub all_in: bool,
    pub winners: WinnerList,
    pub preset_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_hex: Option<String>,
    pub snapshot_sha256: String,
    pub result_sha256: String,
    pub engine: EngineMeta,
}

#[derive(Serialize)]
struct ResultPayload<'a> {
    category: &'a CategoryId,
    winners: &'a [raffle_core::ids::EntrantId],
    preset_count: usize,
}

/// Assemble the record for a successful draw.
pub fn build_record(
    form: &DrawForm,
    request: &DrawRequest,
    outcome: &DrawOutcome,
    ctx: &DrawCtx,
) -> Result<DrawRecord, PipelineError> {
    let payload = ResultPayload {
        category: &request.category,
        winners: &outcome.winners,
        preset_count: outcome.preset_count,
    };
    let result_sha256 = hasher::sha256_canonical(&payload)?;

    Ok(DrawRecord {
        category: request.category.clone(),
        mode: form.mode,
        requested: request.requested_count,
        all_in: form.all_in,
        winners: outcome.winners.clone(),
        preset_count: outcome.preset_count,
        seed_hex: ctx.seed.map(|s| format!("{s:016x}")),
        snapshot_sha256: ctx.loaded.sha256.clone(),
        result_sha256,
        engine: ctx.engine_meta.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cat, ctx};
    use crate::run_draw;
    use raffle_core::rng::ScriptedIndexSource;

    #[test]
    fn record_echoes_the_draw() {
        let ctx = ctx();
        let form = DrawForm::new(cat("grand"), DrawMode::Custom(2));
        let report = run_draw(&form, &ctx, &mut ScriptedIndexSource::new([2])).unwrap();
        let rec = &report.record;
        assert_eq!(rec.category, cat("grand"));
        assert_eq!(rec.requested, 2);
        assert_eq!(rec.winners, report.winners);
        assert_eq!(rec.seed_hex, None);
        assert_eq!(rec.snapshot_sha256, ctx.loaded.sha256);
        assert!(hasher::is_sha256_hex(&rec.result_sha256));
        assert_eq!(rec.engine, EngineMeta::current());
    }

    #[test]
    fn result_digest_depends_on_winner_order() {
        let ctx = ctx();
        let form = DrawForm::new(cat("grand"), DrawMode::Custom(2));
        let a = run_draw(&form, &ctx, &mut ScriptedIndexSource::new([1])).unwrap();
        let b = run_draw(&form, &ctx, &mut ScriptedIndexSource::new([2, 1])).unwrap();
        // pool [2,3,4,5]: [1,1] → [2,3]; [2,1] → [3,2]
        assert_eq!(a.winners.len(), 2);
        assert_ne!(a.winners, b.winners);
        assert_ne!(a.record.result_sha256, b.record.result_sha256);
    }

    #[test]
    fn serialized_record_omits_missing_seed() {
        let ctx = ctx();
        let form = DrawForm::new(cat("grand"), DrawMode::One);
        let rec = run_draw(&form, &ctx, &mut ScriptedIndexSource::new([1])).unwrap().record;
        let v = serde_json::to_value(&rec).unwrap();
        assert!(v.get("seed_hex").is_none());
        assert_eq!(v["mode"]["mode"], "one");
        assert_eq!(v["winners"], serde_json::json!([2]));
    }
}
