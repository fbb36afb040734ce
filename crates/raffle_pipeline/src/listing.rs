//! Result listing: recorded winners per category, in the organiser's category
//! order, with display names resolved from the entrant directory.

use serde::Serialize;

use raffle_core::{entities::ResultHistory, ids::EntrantId};
use raffle_io::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub key: String,
    pub name: String,
    pub winners: Vec<(EntrantId, String)>,
}

/// One row per configured category (empty categories included).
pub fn result_listing(snap: &Snapshot, history: &ResultHistory) -> Vec<ResultRow> {
    snap.config
        .ordered()
        .into_iter()
        .map(|(key, spec)| ResultRow {
            key: key.to_string(),
            name: spec.name.clone(),
            winners: history
                .winners_for(key.as_str())
                .iter()
                .map(|&id| (id, snap.display_name(id)))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cat, ctx};

    #[test]
    fn rows_follow_config_order() {
        let ctx = ctx();
        let snap = ctx.snapshot();
        let history = snap.history.committed(&cat("vip"), &[EntrantId::new(4), EntrantId::new(77)]);
        let rows = result_listing(snap, &history);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "grand");
        assert_eq!(rows[0].winners, vec![(EntrantId::new(1), "Ada".to_string())]);
        assert_eq!(rows[1].name, "VIP");
        assert_eq!(
            rows[1].winners,
            vec![(EntrantId::new(4), "Di".to_string()), (EntrantId::new(77), "77".to_string())]
        );
    }
}
