//! Round resolution: challenge effects, intervention spending and the
//! termination check.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Challenge, Intervention};
use crate::metrics::MetricSet;

/// Result of resolving a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub metrics: MetricSet,
    pub resources: i32,
    /// Every metric met its target after the round's effects.
    pub ended: bool,
}

/// Reasons a round cannot be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("intervention {0} is not on offer this round")]
    UnknownIntervention(String),
    #[error("not enough resources: need {required}, have {available}")]
    InsufficientResources { required: i32, available: i32 },
}

/// Summed cost of the selected interventions.
///
/// # Errors
///
/// Returns [`EngineError::UnknownIntervention`] when an id is not in `offered`.
pub fn selection_cost<S: AsRef<str>>(
    offered: &[Intervention],
    selected_ids: &[S],
) -> Result<i32, EngineError> {
    selected_ids.iter().try_fold(0_i32, |total, id| {
        let id = id.as_ref();
        offered
            .iter()
            .find(|i| i.id == id)
            .map(|i| total.saturating_add(i.cost))
            .ok_or_else(|| EngineError::UnknownIntervention(id.to_string()))
    })
}

/// Apply one round to the given metrics and resources.
///
/// The challenge lands first, then each selected intervention in selection
/// order. Inputs are left untouched; the next state is returned.
///
/// # Errors
///
/// Fails without producing any state when a selected id is not offered or
/// the selection costs more than `resources`.
pub fn apply_round<S: AsRef<str>>(
    metrics: &MetricSet,
    resources: i32,
    challenge: &Challenge,
    offered: &[Intervention],
    selected_ids: &[S],
) -> Result<RoundOutcome, EngineError> {
    let required = selection_cost(offered, selected_ids)?;
    if required > resources {
        return Err(EngineError::InsufficientResources {
            required,
            available: resources,
        });
    }

    let mut next = *metrics;
    next.apply_impact(&challenge.impact);

    let mut remaining = resources;
    for id in selected_ids {
        let id = id.as_ref();
        // Presence was checked by selection_cost.
        if let Some(intervention) = offered.iter().find(|i| i.id == id) {
            remaining -= intervention.cost;
            next.apply_impact(&intervention.impact);
        }
    }

    Ok(RoundOutcome {
        metrics: next,
        resources: remaining,
        ended: next.all_targets_met(),
    })
}
