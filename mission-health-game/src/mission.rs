//! Mission state machine: region selection, rounds and completion.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::KeyValueStore;
use crate::achievements::{AchievementTracker, CompletionReport, MemoryStore};
use crate::constants::{
    FIRST_ROUND, OFFERED_INTERVENTIONS, ROUND_RESOURCE_BONUS, STARTING_RESOURCES,
};
use crate::data::{Challenge, Intervention, MissionCatalog, Offer};
use crate::districts::{self, District};
use crate::engine::{self, EngineError, RoundOutcome};
use crate::metrics::MetricSet;
use crate::scoring::compute_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MissionPhase {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Rejected player actions. None of these change session state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("unknown region {0}")]
    UnknownRegion(String),
    #[error("select a region before starting the mission")]
    NoRegionSelected,
    #[error("a mission is already underway; reset it first")]
    MissionActive,
    #[error("no mission in progress")]
    NotInProgress,
    #[error("intervention {0} is not on offer this round")]
    UnknownIntervention(String),
    #[error("not enough resources: need {required}, have {available}")]
    InsufficientResources { required: i32, available: i32 },
    #[error("select at least one intervention")]
    NoInterventionsSelected,
    #[error("catalog cannot fill a round")]
    EmptyCatalog,
}

impl From<EngineError> for MissionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownIntervention(id) => Self::UnknownIntervention(id),
            EngineError::InsufficientResources {
                required,
                available,
            } => Self::InsufficientResources {
                required,
                available,
            },
        }
    }
}

/// What one `apply_interventions` call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub round: u32,
    pub challenge: Challenge,
    pub interventions: Vec<Intervention>,
    pub resources_spent: i32,
    pub outcome: RoundOutcome,
    /// Present only on the round that completed the mission.
    pub completion: Option<CompletionReport>,
}

/// Read-only view of the session for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSnapshot {
    pub phase: MissionPhase,
    pub region: Option<District>,
    pub round: u32,
    pub resources: i32,
    pub metrics: MetricSet,
    pub active_challenge: Option<Challenge>,
    pub offered_interventions: Vec<Intervention>,
    pub selected_ids: Vec<String>,
    pub score: Option<i32>,
}

/// A single player's mission, from region selection through completion.
#[derive(Debug, Clone)]
pub struct MissionSession<S: KeyValueStore = MemoryStore, R: Rng = ChaCha20Rng> {
    catalog: MissionCatalog,
    tracker: AchievementTracker<S>,
    rng: R,
    phase: MissionPhase,
    region: Option<&'static District>,
    round: u32,
    resources: i32,
    metrics: MetricSet,
    active_challenge: Option<Challenge>,
    offer: Offer,
    selected: SmallVec<[String; OFFERED_INTERVENTIONS]>,
    score: Option<i32>,
}

impl<S: KeyValueStore> MissionSession<S, ChaCha20Rng> {
    /// Session whose draws are reproducible from `seed`.
    #[must_use]
    pub fn new(catalog: MissionCatalog, seed: u64, tracker: AchievementTracker<S>) -> Self {
        Self::with_rng(catalog, ChaCha20Rng::seed_from_u64(seed), tracker)
    }
}

impl<S: KeyValueStore, R: Rng> MissionSession<S, R> {
    #[must_use]
    pub fn with_rng(catalog: MissionCatalog, rng: R, tracker: AchievementTracker<S>) -> Self {
        Self {
            catalog,
            tracker,
            rng,
            phase: MissionPhase::NotStarted,
            region: None,
            round: FIRST_ROUND,
            resources: STARTING_RESOURCES,
            metrics: MetricSet::default(),
            active_challenge: None,
            offer: Offer::new(),
            selected: SmallVec::new(),
            score: None,
        }
    }

    /// Choose the district the mission runs in.
    ///
    /// # Errors
    ///
    /// [`MissionError::MissionActive`] outside `NotStarted`,
    /// [`MissionError::UnknownRegion`] for ids not in the district table.
    pub fn select_region(&mut self, id: &str) -> Result<&'static District, MissionError> {
        if self.phase != MissionPhase::NotStarted {
            return Err(MissionError::MissionActive);
        }
        let district = districts::district_by_id(id)
            .ok_or_else(|| MissionError::UnknownRegion(id.to_string()))?;
        log::debug!("region selected: {} ({})", district.name, district.id);
        self.region = Some(district);
        Ok(district)
    }

    /// Begin round one in the selected region.
    ///
    /// # Errors
    ///
    /// [`MissionError::MissionActive`] outside `NotStarted`,
    /// [`MissionError::NoRegionSelected`] before a region is chosen and
    /// [`MissionError::EmptyCatalog`] when the catalog cannot supply a challenge
    /// and a full offer.
    pub fn start_mission(&mut self) -> Result<(), MissionError> {
        if self.phase != MissionPhase::NotStarted {
            return Err(MissionError::MissionActive);
        }
        let region = self.region.ok_or(MissionError::NoRegionSelected)?;
        let (challenge, offer) = self.draw_round()?;

        self.metrics = MetricSet::default();
        self.resources = STARTING_RESOURCES;
        self.round = FIRST_ROUND;
        self.score = None;
        self.selected.clear();
        self.active_challenge = Some(challenge);
        self.offer = offer;
        self.phase = MissionPhase::InProgress;
        log::info!("mission started in {}", region.name);
        Ok(())
    }

    /// Select or deselect an offered intervention. Returns whether it is now
    /// selected.
    ///
    /// # Errors
    ///
    /// [`MissionError::NotInProgress`] outside a running mission,
    /// [`MissionError::UnknownIntervention`] for ids not on offer and
    /// [`MissionError::InsufficientResources`] when the uncommitted budget
    /// cannot cover it.
    pub fn toggle_intervention(&mut self, id: &str) -> Result<bool, MissionError> {
        if self.phase != MissionPhase::InProgress {
            return Err(MissionError::NotInProgress);
        }
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            return Ok(false);
        }
        let cost = self
            .offer
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.cost)
            .ok_or_else(|| MissionError::UnknownIntervention(id.to_string()))?;
        let available = self.uncommitted_resources();
        if cost > available {
            return Err(MissionError::InsufficientResources {
                required: cost,
                available,
            });
        }
        self.selected.push(id.to_string());
        Ok(true)
    }

    /// Resolve the current round with the selected interventions.
    ///
    /// # Errors
    ///
    /// [`MissionError::NotInProgress`] outside a running mission,
    /// [`MissionError::NoInterventionsSelected`] for an empty selection, plus
    /// any rejection from the round engine. State is untouched on error.
    pub fn apply_interventions(&mut self) -> Result<RoundReport, MissionError> {
        if self.phase != MissionPhase::InProgress {
            return Err(MissionError::NotInProgress);
        }
        if self.selected.is_empty() {
            return Err(MissionError::NoInterventionsSelected);
        }
        let challenge = self
            .active_challenge
            .clone()
            .ok_or(MissionError::EmptyCatalog)?;
        let outcome = engine::apply_round(
            &self.metrics,
            self.resources,
            &challenge,
            &self.offer,
            self.selected.as_slice(),
        )?;
        // Draw the next round before mutating so a failed draw leaves state intact.
        let next_round = if outcome.ended {
            None
        } else {
            Some(self.draw_round()?)
        };

        let interventions: Vec<Intervention> = self
            .selected
            .iter()
            .filter_map(|id| self.offer.iter().find(|i| &i.id == id).cloned())
            .collect();
        let round = self.round;
        let resources_spent = self.resources - outcome.resources;
        self.metrics = outcome.metrics;
        self.resources = outcome.resources;
        self.selected.clear();

        let completion = match next_round {
            Some((next_challenge, next_offer)) => {
                self.round += 1;
                self.resources = self.resources.saturating_add(ROUND_RESOURCE_BONUS);
                self.active_challenge = Some(next_challenge);
                self.offer = next_offer;
                log::debug!(
                    "round {round} resolved: spent {resources_spent}, {} resources for round {}",
                    self.resources,
                    self.round
                );
                None
            }
            None => {
                let score = compute_score(&self.metrics, self.resources);
                self.score = Some(score);
                self.phase = MissionPhase::Completed;
                self.active_challenge = None;
                self.offer.clear();
                log::info!("mission completed in round {round} with score {score}");
                Some(self.tracker.report_completion(score))
            }
        };

        Ok(RoundReport {
            round,
            challenge,
            interventions,
            resources_spent,
            outcome,
            completion,
        })
    }

    /// Return to `NotStarted` from any phase, clearing the region.
    pub fn reset_mission(&mut self) {
        self.phase = MissionPhase::NotStarted;
        self.region = None;
        self.round = FIRST_ROUND;
        self.resources = STARTING_RESOURCES;
        self.metrics = MetricSet::default();
        self.active_challenge = None;
        self.offer.clear();
        self.selected.clear();
        self.score = None;
        log::debug!("mission reset");
    }

    #[must_use]
    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot {
            phase: self.phase,
            region: self.region.copied(),
            round: self.round,
            resources: self.resources,
            metrics: self.metrics,
            active_challenge: self.active_challenge.clone(),
            offered_interventions: self.offer.to_vec(),
            selected_ids: self.selected.to_vec(),
            score: self.score,
        }
    }

    /// Resources left after paying for the current selection.
    #[must_use]
    pub fn uncommitted_resources(&self) -> i32 {
        let committed = engine::selection_cost(&self.offer, self.selected.as_slice())
            .unwrap_or(0);
        self.resources - committed
    }

    #[must_use]
    pub const fn phase(&self) -> MissionPhase {
        self.phase
    }

    #[must_use]
    pub const fn region(&self) -> Option<&'static District> {
        self.region
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub const fn resources(&self) -> i32 {
        self.resources
    }

    #[must_use]
    pub const fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    #[must_use]
    pub const fn active_challenge(&self) -> Option<&Challenge> {
        self.active_challenge.as_ref()
    }

    #[must_use]
    pub fn offered(&self) -> &[Intervention] {
        &self.offer
    }

    #[must_use]
    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub const fn score(&self) -> Option<i32> {
        self.score
    }

    #[must_use]
    pub const fn tracker(&self) -> &AchievementTracker<S> {
        &self.tracker
    }

    #[must_use]
    pub fn into_tracker(self) -> AchievementTracker<S> {
        self.tracker
    }

    fn draw_round(&mut self) -> Result<(Challenge, Offer), MissionError> {
        let challenge = self
            .catalog
            .draw_challenge(&mut self.rng)
            .ok_or(MissionError::EmptyCatalog)?;
        let offer = self.catalog.draw_offer(&mut self.rng);
        if offer.len() < OFFERED_INTERVENTIONS {
            return Err(MissionError::EmptyCatalog);
        }
        Ok((challenge, offer))
    }
}
