//! Mission Health Game Engine
//!
//! Platform-agnostic core logic for Mission Health, a turn-based public health
//! strategy game set in the districts of Madhya Pradesh. This crate provides the
//! mission engine, achievement tracking and the side games without UI or
//! platform-specific dependencies.

pub mod achievements;
pub mod constants;
pub mod data;
pub mod districts;
pub mod engine;
pub mod life_journey;
pub mod metrics;
pub mod mission;
pub mod numbers;
pub mod scoring;
pub mod seed;
pub mod wordle;

// Re-export commonly used types
pub use achievements::{
    AchievementProgress, AchievementRecord, AchievementTracker, CompletionReport, MemoryStore,
    level_for_xp,
};
pub use data::{CatalogError, Challenge, Intervention, MissionCatalog, Offer};
pub use districts::{DISTRICTS, DensityBand, District};
pub use engine::{EngineError, RoundOutcome, apply_round};
pub use life_journey::{JOURNEY_STAGES, JourneyStage, JourneyTracker};
pub use metrics::{Impact, Metric, MetricKind, MetricSet};
pub use mission::{MissionError, MissionPhase, MissionSession, MissionSnapshot, RoundReport};
pub use scoring::compute_score;
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy, parse_share_code};
pub use wordle::{GuessError, TileStatus, WordleGame, WordleStatus};

/// Trait for abstracting catalog loading
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the challenge and intervention catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;
}

/// Loader for the catalog compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl CatalogLoader for BundledCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        MissionCatalog::load_default()
    }
}

/// Trait for abstracting the string key-value persistence behind achievements
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Main engine for creating mission sessions
pub struct MissionEngine<L, S>
where
    L: CatalogLoader,
    S: KeyValueStore + Clone,
{
    catalog_loader: L,
    storage: S,
}

impl<L, S> MissionEngine<L, S>
where
    L: CatalogLoader,
    S: KeyValueStore + Clone,
{
    /// Create a new engine with the provided catalog loader and storage
    pub const fn new(catalog_loader: L, storage: S) -> Self {
        Self {
            catalog_loader,
            storage,
        }
    }

    /// Construct a seeded session with achievement progress read from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<MissionSession<S>, L::Error> {
        let catalog = self.catalog_loader.load_catalog()?;
        let tracker = AchievementTracker::load(self.storage.clone());
        Ok(MissionSession::new(catalog, seed, tracker))
    }

    /// Current persisted achievement progress
    #[must_use]
    pub fn progress(&self) -> AchievementProgress {
        *AchievementTracker::load(self.storage.clone()).progress()
    }

    /// Erase persisted achievements and XP
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be removed.
    pub fn clear_progress(&self) -> Result<(), S::Error> {
        self.storage.remove(constants::ACHIEVEMENTS_KEY)?;
        self.storage.remove(constants::XP_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CatalogLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
            let parsed = MissionCatalog::from_json(
                r#"{
                    "challenges": [{ "id": "calm", "title": "Calm", "description": "" }],
                    "interventions": [
                        { "id": "a", "title": "A", "description": "", "cost": 10,
                          "impact": { "childHealth": 30, "maternalHealth": 40,
                                      "nutrition": 35, "diseaseControl": 35 } },
                        { "id": "b", "title": "B", "description": "", "cost": 10,
                          "impact": { "childHealth": 30, "maternalHealth": 40,
                                      "nutrition": 35, "diseaseControl": 35 } },
                        { "id": "c", "title": "C", "description": "", "cost": 10,
                          "impact": { "childHealth": 30, "maternalHealth": 40,
                                      "nutrition": 35, "diseaseControl": 35 } }
                    ]
                }"#,
            )
            .unwrap();
            Ok(parsed)
        }
    }

    fn play_one_round(session: &mut MissionSession<MemoryStore>) -> RoundReport {
        session.select_region("1").unwrap();
        session.start_mission().unwrap();
        let id = session.offered()[0].id.clone();
        session.toggle_intervention(&id).unwrap();
        session.apply_interventions().unwrap()
    }

    #[test]
    fn engine_persists_progress_between_sessions() {
        let engine = MissionEngine::new(FixtureLoader, MemoryStore::new());
        let mut session = engine.create_session(0xABCD).unwrap();
        let completion = play_one_round(&mut session).completion.expect("completed");
        assert!(completion.persisted);

        let progress = engine.progress();
        assert_eq!(progress.record.missions_completed, 1);
        assert_eq!(progress.xp, 25);

        let next = engine.create_session(1).unwrap();
        assert_eq!(next.tracker().progress().xp, 25);
    }

    #[test]
    fn clearing_progress_resets_to_defaults() {
        let engine = MissionEngine::new(FixtureLoader, MemoryStore::new());
        let mut session = engine.create_session(3).unwrap();
        play_one_round(&mut session);
        engine.clear_progress().unwrap();
        assert_eq!(engine.progress(), AchievementProgress::default());
    }

    #[test]
    fn bundled_catalog_loads() {
        let engine = MissionEngine::new(BundledCatalog, MemoryStore::new());
        let mut session = engine.create_session(7).unwrap();
        session.select_region("1").unwrap();
        session.start_mission().unwrap();
        assert_eq!(session.offered().len(), constants::OFFERED_INTERVENTIONS);
    }
}
