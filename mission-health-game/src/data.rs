//! Challenge and intervention catalogs for the mission game.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::OFFERED_INTERVENTIONS;
use crate::metrics::Impact;

/// The interventions offered to the player in a single round.
pub type Offer = SmallVec<[Intervention; OFFERED_INTERVENTIONS]>;

/// An adverse event applied at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub impact: Impact,
}

/// A player-selectable response with a resource cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cost: i32,
    #[serde(default)]
    pub impact: Impact,
}

/// Errors raised when a catalog cannot drive a mission.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog has no challenges")]
    NoChallenges,
    #[error("catalog needs at least {needed} interventions (got {got})")]
    TooFewInterventions { needed: usize, got: usize },
    #[error("duplicate challenge id {0}")]
    DuplicateChallenge(String),
    #[error("duplicate intervention id {0}")]
    DuplicateIntervention(String),
    #[error("intervention {id} has negative cost {cost}")]
    NegativeCost { id: String, cost: i32 },
}

/// Container for every challenge and intervention a mission can draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionCatalog {
    pub challenges: Vec<Challenge>,
    pub interventions: Vec<Intervention>,
}

impl MissionCatalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load catalog data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the catalog fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../assets/data/mission.json"))
    }

    /// Check that the catalog can fill a round.
    ///
    /// # Errors
    ///
    /// Returns the first invariant the catalog violates.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.challenges.is_empty() {
            return Err(CatalogError::NoChallenges);
        }
        if self.interventions.len() < OFFERED_INTERVENTIONS {
            return Err(CatalogError::TooFewInterventions {
                needed: OFFERED_INTERVENTIONS,
                got: self.interventions.len(),
            });
        }
        let mut seen = HashSet::new();
        for challenge in &self.challenges {
            if !seen.insert(challenge.id.as_str()) {
                return Err(CatalogError::DuplicateChallenge(challenge.id.clone()));
            }
        }
        seen.clear();
        for intervention in &self.interventions {
            if !seen.insert(intervention.id.as_str()) {
                return Err(CatalogError::DuplicateIntervention(intervention.id.clone()));
            }
            if intervention.cost < 0 {
                return Err(CatalogError::NegativeCost {
                    id: intervention.id.clone(),
                    cost: intervention.cost,
                });
            }
        }
        Ok(())
    }

    /// Draw one challenge uniformly; repeats across rounds are allowed.
    pub fn draw_challenge<R>(&self, rng: &mut R) -> Option<Challenge>
    where
        R: Rng + ?Sized,
    {
        self.challenges.choose(rng).cloned()
    }

    /// Draw the round's offer without replacement.
    pub fn draw_offer<R>(&self, rng: &mut R) -> Offer
    where
        R: Rng + ?Sized,
    {
        self.interventions
            .choose_multiple(rng, OFFERED_INTERVENTIONS)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn challenge(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn intervention(&self, id: &str) -> Option<&Intervention> {
        self.interventions.iter().find(|i| i.id == id)
    }
}
