//! Achievement and XP tracking persisted through a [`KeyValueStore`].
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::KeyValueStore;
use crate::constants::{ACHIEVEMENTS_KEY, XP_KEY, XP_PER_COMPLETION, XP_PER_LEVEL};

/// Lifetime mission statistics, stored as JSON under [`ACHIEVEMENTS_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementRecord {
    pub games_played: u32,
    pub missions_completed: u32,
    pub high_score: i32,
}

/// Record plus XP, the full persisted progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AchievementProgress {
    pub record: AchievementRecord,
    pub xp: u32,
}

impl AchievementProgress {
    #[must_use]
    pub const fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    /// Percent of the way to the next level, 0..100.
    #[must_use]
    pub const fn progress_to_next_level(&self) -> u32 {
        (self.xp % XP_PER_LEVEL) * 100 / XP_PER_LEVEL
    }
}

#[must_use]
pub const fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// What changed when a completed mission was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub score: i32,
    pub record: AchievementRecord,
    pub xp: u32,
    pub level: u32,
    pub leveled_up: bool,
    /// False when the store rejected the write; in-memory progress still advanced.
    pub persisted: bool,
}

/// Loads, updates and saves achievement progress.
#[derive(Debug, Clone)]
pub struct AchievementTracker<S: KeyValueStore> {
    store: S,
    progress: AchievementProgress,
}

impl<S: KeyValueStore> AchievementTracker<S> {
    /// Read progress from `store`. Missing, unreadable or malformed entries
    /// fall back to defaults.
    pub fn load(store: S) -> Self {
        let record = match store.get(ACHIEVEMENTS_KEY) {
            Ok(Some(raw)) => {
                serde_json::from_str::<AchievementRecord>(&raw).unwrap_or_else(|err| {
                    log::warn!("discarding malformed {ACHIEVEMENTS_KEY}: {err}");
                    AchievementRecord::default()
                })
            }
            Ok(None) => AchievementRecord::default(),
            Err(err) => {
                log::warn!("could not read {ACHIEVEMENTS_KEY}: {err}");
                AchievementRecord::default()
            }
        };
        let xp = match store.get(XP_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u32>().unwrap_or_else(|err| {
                log::warn!("discarding malformed {XP_KEY} {raw:?}: {err}");
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                log::warn!("could not read {XP_KEY}: {err}");
                0
            }
        };
        Self {
            store,
            progress: AchievementProgress { record, xp },
        }
    }

    #[must_use]
    pub const fn progress(&self) -> &AchievementProgress {
        &self.progress
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Record a completed mission and persist both keys.
    pub fn report_completion(&mut self, score: i32) -> CompletionReport {
        let previous = self.progress.record;
        let previous_level = self.progress.level();
        let record = &mut self.progress.record;
        record.games_played = record.games_played.saturating_add(1);
        record.missions_completed = record.missions_completed.saturating_add(1);
        record.high_score = record.high_score.max(score);
        self.progress.xp = self.progress.xp.saturating_add(XP_PER_COMPLETION);

        let persisted = match self.save(&previous) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("achievement progress not persisted: {err}");
                false
            }
        };
        let level = self.progress.level();
        if level > previous_level {
            log::info!("level up: {previous_level} -> {level}");
        }
        CompletionReport {
            score,
            record: self.progress.record,
            xp: self.progress.xp,
            level,
            leveled_up: level > previous_level,
            persisted,
        }
    }

    /// Writes the record then the XP. If the XP write fails the stored
    /// record is put back to `previous` so both keys stay in step.
    fn save(&self, previous: &AchievementRecord) -> Result<(), SaveError<S::Error>> {
        let json = serde_json::to_string(&self.progress.record)
            .map_err(SaveError::Encode)?;
        let rollback = serde_json::to_string(previous).map_err(SaveError::Encode)?;
        self.store
            .set(ACHIEVEMENTS_KEY, &json)
            .map_err(SaveError::Store)?;
        if let Err(err) = self.store.set(XP_KEY, &self.progress.xp.to_string()) {
            if let Err(restore_err) = self.store.set(ACHIEVEMENTS_KEY, &rollback) {
                log::warn!("could not restore {ACHIEVEMENTS_KEY}: {restore_err}");
            }
            return Err(SaveError::Store(err));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum SaveError<E: std::error::Error + 'static> {
    #[error("encoding failed: {0}")]
    Encode(serde_json::Error),
    #[error("store write failed: {0}")]
    Store(E),
}

/// In-memory [`KeyValueStore`]; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_starts_at_level_one() {
        let tracker = AchievementTracker::load(MemoryStore::new());
        assert_eq!(tracker.progress().record, AchievementRecord::default());
        assert_eq!(tracker.progress().xp, 0);
        assert_eq!(tracker.progress().level(), 1);
    }

    #[test]
    fn completion_updates_record_and_persists() {
        let store = MemoryStore::new();
        let mut tracker = AchievementTracker::load(store.clone());
        let report = tracker.report_completion(42);
        assert!(report.persisted);
        assert_eq!(report.record.games_played, 1);
        assert_eq!(report.record.missions_completed, 1);
        assert_eq!(report.record.high_score, 42);
        assert_eq!(report.xp, 25);

        let lower = tracker.report_completion(10);
        assert_eq!(lower.record.high_score, 42);

        assert_eq!(store.get(XP_KEY).unwrap().as_deref(), Some("50"));
        let raw = store.get(ACHIEVEMENTS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"gamesPlayed\":2"));
        assert!(raw.contains("\"highScore\":42"));

        let reloaded = AchievementTracker::load(store);
        assert_eq!(reloaded.progress().record.games_played, 2);
        assert_eq!(reloaded.progress().xp, 50);
    }

    #[test]
    fn fourth_completion_levels_up() {
        let mut tracker = AchievementTracker::load(MemoryStore::new());
        let reports: Vec<_> = (0..4).map(|i| tracker.report_completion(i)).collect();
        assert!(reports[..3].iter().all(|r| !r.leveled_up));
        assert!(reports[3].leveled_up);
        assert_eq!(reports[3].level, 2);
        assert_eq!(tracker.progress().progress_to_next_level(), 0);
    }

    #[test]
    fn corrupt_entries_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(ACHIEVEMENTS_KEY, "{not json").unwrap();
        store.set(XP_KEY, "lots").unwrap();
        let tracker = AchievementTracker::load(store);
        assert_eq!(tracker.progress(), &AchievementProgress::default());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("store offline")]
    struct Offline;

    /// Wraps a `MemoryStore`, failing reads or writes of chosen keys.
    #[derive(Debug, Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_get: Option<&'static str>,
        fail_set: Option<&'static str>,
    }

    impl KeyValueStore for FlakyStore {
        type Error = Offline;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            if self.fail_get == Some(key) {
                return Err(Offline);
            }
            self.inner.get(key).map_err(|never| match never {})
        }

        fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            if self.fail_set == Some(key) {
                return Err(Offline);
            }
            self.inner.set(key, value).map_err(|never| match never {})
        }

        fn remove(&self, key: &str) -> Result<(), Self::Error> {
            self.inner.remove(key).map_err(|never| match never {})
        }
    }

    #[test]
    fn failed_xp_write_leaves_store_consistent() {
        let inner = MemoryStore::new();
        let mut seeded = AchievementTracker::load(inner.clone());
        seeded.report_completion(30);

        let store = FlakyStore {
            inner: inner.clone(),
            fail_set: Some(XP_KEY),
            ..FlakyStore::default()
        };
        let mut tracker = AchievementTracker::load(store);
        let report = tracker.report_completion(40);
        assert!(!report.persisted);
        assert_eq!(report.record.games_played, 2);
        assert_eq!(report.xp, 50);

        let reloaded = AchievementTracker::load(inner);
        assert_eq!(reloaded.progress().record.games_played, 1);
        assert_eq!(reloaded.progress().record.high_score, 30);
        assert_eq!(reloaded.progress().xp, 25);
    }

    #[test]
    fn failed_record_write_touches_nothing() {
        let inner = MemoryStore::new();
        let store = FlakyStore {
            inner: inner.clone(),
            fail_set: Some(ACHIEVEMENTS_KEY),
            ..FlakyStore::default()
        };
        let report = AchievementTracker::load(store).report_completion(40);
        assert!(!report.persisted);
        assert_eq!(inner.get(ACHIEVEMENTS_KEY).unwrap(), None);
        assert_eq!(inner.get(XP_KEY).unwrap(), None);
    }

    #[test]
    fn unreadable_store_loads_defaults() {
        let inner = MemoryStore::new();
        inner
            .set(
                ACHIEVEMENTS_KEY,
                r#"{"gamesPlayed":4,"missionsCompleted":4,"highScore":50}"#,
            )
            .unwrap();
        inner.set(XP_KEY, "100").unwrap();

        let record_down = FlakyStore {
            inner: inner.clone(),
            fail_get: Some(ACHIEVEMENTS_KEY),
            ..FlakyStore::default()
        };
        let tracker = AchievementTracker::load(record_down);
        assert_eq!(tracker.progress().record, AchievementRecord::default());
        assert_eq!(tracker.progress().xp, 100);

        let xp_down = FlakyStore {
            inner,
            fail_get: Some(XP_KEY),
            ..FlakyStore::default()
        };
        let tracker = AchievementTracker::load(xp_down);
        assert_eq!(tracker.progress().record.games_played, 4);
        assert_eq!(tracker.progress().xp, 0);
    }

    #[test]
    fn partial_record_keeps_present_fields() {
        let store = MemoryStore::new();
        store.set(ACHIEVEMENTS_KEY, r#"{"gamesPlayed":3}"#).unwrap();
        let tracker = AchievementTracker::load(store);
        assert_eq!(
            tracker.progress().record,
            AchievementRecord {
                games_played: 3,
                missions_completed: 0,
                high_score: 0,
            }
        );
    }

    #[test]
    fn level_formula_matches_xp_bands() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
        let progress = AchievementProgress {
            record: AchievementRecord::default(),
            xp: 175,
        };
        assert_eq!(progress.progress_to_next_level(), 75);
    }
}
