//! Draw form → engine request.
//!
//! The form is what an operator submits: a category, a mode and the "all-in"
//! switch. Resolution reads the category's configured count and its recorded
//! winners; `already_won` is every recorded winner unless `all_in` is set.

#![forbid(unsafe_code)]

use raffle_core::{entities::DrawRequest, ids::CategoryId, mode::DrawMode};
use raffle_io::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawForm {
    pub category: CategoryId,
    #[serde(flatten)]
    pub mode: DrawMode,
    #[serde(default)]
    pub all_in: bool,
}

impl DrawForm {
    pub fn new(category: CategoryId, mode: DrawMode) -> Self {
        Self { category, mode, all_in: false }
    }

    pub fn all_in(mut self, all_in: bool) -> Self {
        self.all_in = all_in;
        self
    }
}

/// Resolve `form` into a request against `snap`.
pub fn build_request(form: &DrawForm, snap: &Snapshot) -> Result<DrawRequest, PipelineError> {
    let key = form.category.as_str();
    let spec = snap
        .config
        .category(key)
        .ok_or_else(|| PipelineError::Validate(format!("unknown category: {key}")))?;

    let drawn = snap.history.winners_for(key).len();
    let count = form.mode.resolve(spec.count, drawn)?;

    let mut req = DrawRequest::new(form.category.clone(), count);
    req.draw_from_all_remaining = form.all_in;
    if !form.all_in {
        req = req.with_already_won(snap.history.all_winners());
    }
    Ok(req)
}
