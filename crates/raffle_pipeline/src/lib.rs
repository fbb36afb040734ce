//! raffle_pipeline: one draw, end to end (form → request → select → commit → record).
//! This crate stays I/O-free: snapshots arrive already loaded through `raffle_io`,
//! selection is delegated to `raffle_algo`, and the history update is returned
//! to the caller as a new value rather than written anywhere.

use tracing::{info, warn};

use raffle_algo::{count_eligible, select_winners_traced, DrawCrumb, DrawInputs};
use raffle_core::{
    entities::{ResultHistory, WinnerList},
    errors::CoreError,
    ids::CategoryId,
    rng::IndexSource,
};
use raffle_io::{
    snapshot::{LoadedSnapshot, Snapshot},
    IoError,
};

pub mod form;
pub mod listing;
pub mod record;

pub use raffle_algo::DrawError;
pub use form::{build_request, DrawForm};
pub use listing::{result_listing, ResultRow};
pub use record::{build_record, DrawRecord, EngineMeta};

/// Everything a draw reads: the loaded snapshot, the engine identity and the
/// seed behind the index source (if it was seeded).
#[derive(Debug, Clone)]
pub struct DrawCtx {
    pub loaded: LoadedSnapshot,
    pub engine_meta: EngineMeta,
    pub seed: Option<u64>,
}

impl DrawCtx {
    pub fn new(loaded: LoadedSnapshot) -> Self {
        Self { loaded, engine_meta: EngineMeta::current(), seed: None }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        &self.loaded.snapshot
    }
}

/// Outcome of a successful draw.
#[derive(Debug, Clone)]
pub struct DrawReport {
    pub category: CategoryId,
    pub winners: WinnerList,
    pub preset_count: usize,
    pub trail: Vec<DrawCrumb>,
    /// Snapshot history with this draw's winners appended.
    pub history: ResultHistory,
    /// Entrants still eligible for the category after this draw.
    pub remaining_pool: usize,
    pub record: DrawRecord,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug)]
pub enum PipelineError {
    Io(String),
    Validate(String),
    Draw(DrawError),
    Build(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Validate(m) => write!(f, "validate: {m}"),
            PipelineError::Draw(e) => write!(f, "draw: {e}"),
            PipelineError::Build(m) => write!(f, "build: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Draw(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        use PipelineError::*;
        match e {
            IoError::Json { pointer, msg } => Validate(format!("json {pointer}: {msg}")),
            IoError::Invalid(m) => Validate(m),
            IoError::Read(e) => Io(format!("read: {e}")),
            IoError::Write(e) => Io(format!("write: {e}")),
            IoError::Path(m) => Io(format!("path: {m}")),
            IoError::Limit(m) => Io(format!("limit: {m}")),
            IoError::Hash(m) => Build(format!("hash: {m}")),
        }
    }
}

impl From<DrawError> for PipelineError {
    fn from(e: DrawError) -> Self {
        PipelineError::Draw(e)
    }
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        PipelineError::Validate(e.to_string())
    }
}

// -------------------------------------- Public API --------------------------------------

/// Run one draw against `ctx` with the given index source.
///
/// On any error nothing is produced; the snapshot's history is never modified.
pub fn run_draw<R: IndexSource + ?Sized>(
    form: &DrawForm,
    ctx: &DrawCtx,
    rng: &mut R,
) -> Result<DrawReport, PipelineError> {
    let snap = ctx.snapshot();
    let request = build_request(form, snap)?;
    let inputs = DrawInputs::new(&snap.entrants, &snap.history, &snap.config, &snap.excluded);

    let outcome = match select_winners_traced(&request, &inputs, rng) {
        Ok(o) => o,
        Err(e) => {
            if let DrawError::InsufficientPool { needed, available, .. } = &e {
                warn!(category = %request.category, needed, available, "draw rejected: pool too small");
            }
            return Err(e.into());
        }
    };

    let history = snap.history.committed(&request.category, &outcome.winners);
    let remaining_pool = count_eligible(
        &snap.entrants,
        &history,
        &snap.excluded,
        request.category.as_str(),
    );
    let record = build_record(form, &request, &outcome, ctx)?;

    info!(
        category = %request.category,
        count = outcome.winners.len(),
        preset_count = outcome.preset_count,
        remaining_pool,
        "draw committed"
    );

    Ok(DrawReport {
        category: request.category,
        winners: outcome.winners,
        preset_count: outcome.preset_count,
        trail: outcome.trail,
        history,
        remaining_pool,
        record,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use raffle_io::snapshot::parse_loaded;

    use super::*;

    /// Five entrants, two categories; `grand` has already awarded entrant 1.
    pub const SNAPSHOT: &str = r#"{
        "config": { "name": "Test raffle", "categories": [
            { "key": "grand", "name": "Grand prize", "count": 5 },
            { "key": "vip", "name": "VIP", "count": 2, "preset": "4,1,3" }
        ]},
        "entrants": [
            { "key": 1, "name": "Ada" },
            { "key": 2, "name": "Bo" },
            { "key": 3, "name": "Cy" },
            { "key": 4, "name": "Di" },
            { "key": 5, "name": "Ed", "allowedPrizes": ["grand"] }
        ],
        "result": { "grand": [1] }
    }"#;

    pub fn ctx() -> DrawCtx {
        DrawCtx::new(parse_loaded(SNAPSHOT.as_bytes()).unwrap())
    }

    pub fn cat(s: &str) -> CategoryId {
        s.parse().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{cat, ctx};
    use super::*;
    use raffle_core::{ids::EntrantId, mode::DrawMode, rng::ScriptedIndexSource};

    fn ids(v: &[u64]) -> Vec<EntrantId> {
        v.iter().copied().map(EntrantId::new).collect()
    }

    #[test]
    fn remain_draws_what_the_category_has_left() {
        let ctx = ctx();
        // grand: count 5, one already recorded → 4; pool after E = {2,3,4,5}
        let mut rng = ScriptedIndexSource::new([1]);
        let report = run_draw(&DrawForm::new(cat("grand"), DrawMode::Remain), &ctx, &mut rng).unwrap();
        assert_eq!(report.winners, ids(&[2, 3, 4, 5]));
        assert_eq!(report.preset_count, 0);
        assert_eq!(report.trail.len(), 4);
        assert_eq!(report.remaining_pool, 0);
        assert_eq!(report.history.winners_for("grand"), ids(&[1, 2, 3, 4, 5]).as_slice());
    }

    #[test]
    fn preset_winners_lead_and_history_is_a_copy() {
        let ctx = ctx();
        let mut rng = ScriptedIndexSource::new([1]);
        let report = run_draw(&DrawForm::new(cat("vip"), DrawMode::Remain), &ctx, &mut rng).unwrap();
        // preset 4,1,3 minus recorded winner 1 → [4,3] covers count 2
        assert_eq!(report.winners, ids(&[4, 3]));
        assert_eq!(report.preset_count, 2);
        assert_eq!(rng.calls(), 0);
        assert_eq!(report.history.winners_for("grand"), ids(&[1]).as_slice());
        assert_eq!(report.history.winners_for("vip"), ids(&[4, 3]).as_slice());
        assert!(ctx.snapshot().history.winners_for("vip").is_empty());
    }

    #[test]
    fn insufficient_pool_is_typed_and_commits_nothing() {
        let ctx = ctx();
        let mut rng = ScriptedIndexSource::new([1]);
        let err = run_draw(&DrawForm::new(cat("grand"), DrawMode::Custom(10)), &ctx, &mut rng).unwrap_err();
        match err {
            PipelineError::Draw(DrawError::InsufficientPool { needed, available, .. }) => {
                assert_eq!((needed, available), (10, 4));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ctx.snapshot().history.total(), 1);
    }

    #[test]
    fn negative_custom_quantity_is_a_validation_error() {
        let ctx = ctx();
        let mut rng = ScriptedIndexSource::new([1]);
        let err = run_draw(&DrawForm::new(cat("grand"), DrawMode::Custom(-1)), &ctx, &mut rng).unwrap_err();
        assert!(matches!(err, PipelineError::Validate(_)));
    }

    #[test]
    fn seeded_runs_repeat() {
        let ctx = ctx().with_seed(Some(42));
        let form = DrawForm::new(cat("grand"), DrawMode::Custom(3));
        let a = run_draw(&form, &ctx, &mut raffle_core::ChaChaIndexSource::from_seed_u64(42)).unwrap();
        let b = run_draw(&form, &ctx, &mut raffle_core::ChaChaIndexSource::from_seed_u64(42)).unwrap();
        assert_eq!(a.winners, b.winners);
        assert_eq!(a.record.result_sha256, b.record.result_sha256);
        assert_eq!(a.record.seed_hex.as_deref(), Some("000000000000002a"));
    }

    #[test]
    fn io_errors_map_to_buckets() {
        assert!(matches!(PipelineError::from(IoError::Invalid("x".into())), PipelineError::Validate(_)));
        assert!(matches!(PipelineError::from(IoError::Limit("x".into())), PipelineError::Io(_)));
        assert!(matches!(PipelineError::from(IoError::Hash("x".into())), PipelineError::Build(_)));
    }
}
