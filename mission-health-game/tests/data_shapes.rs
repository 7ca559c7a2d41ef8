use mission_health_game::constants::{ACHIEVEMENTS_KEY, XP_KEY};
use mission_health_game::{
    AchievementTracker, KeyValueStore, MemoryStore, MissionCatalog, MissionSession, MetricKind,
};
use serde_json::Value;

fn started_session(store: MemoryStore) -> MissionSession {
    let catalog = MissionCatalog::load_default().unwrap();
    let mut session = MissionSession::new(catalog, 0xFACE_B00C, AchievementTracker::load(store));
    session.select_region("2").unwrap();
    session.start_mission().unwrap();
    session
}

#[test]
fn bundled_catalog_covers_every_metric() {
    let catalog = MissionCatalog::load_default().unwrap();
    assert!(catalog.challenges.len() >= 5);
    assert!(catalog.interventions.len() >= 8);
    for kind in MetricKind::ALL {
        assert!(
            catalog
                .interventions
                .iter()
                .any(|i| i.impact.get(&kind).copied().unwrap_or(0) > 0),
            "no intervention improves {kind}"
        );
    }
    assert!(catalog.interventions.iter().all(|i| i.cost >= 0));
}

#[test]
fn snapshot_serializes_with_camel_case_keys() {
    let session = started_session(MemoryStore::new());
    let value = serde_json::to_value(session.snapshot()).unwrap();
    let obj = value.as_object().unwrap();
    for key in [
        "phase",
        "region",
        "round",
        "resources",
        "metrics",
        "activeChallenge",
        "offeredInterventions",
        "selectedIds",
        "score",
    ] {
        assert!(obj.contains_key(key), "missing {key}");
    }
    assert_eq!(obj["phase"], Value::from("InProgress"));
    assert_eq!(obj["region"]["name"], Value::from("Indore"));
    assert_eq!(obj["score"], Value::Null);

    let metrics = obj["metrics"].as_array().unwrap();
    let kinds: Vec<_> = metrics.iter().map(|m| m["kind"].clone()).collect();
    assert_eq!(
        kinds,
        ["childHealth", "maternalHealth", "nutrition", "diseaseControl"].map(Value::from)
    );
    assert_eq!(metrics[0]["value"], Value::from(50));
    assert_eq!(metrics[0]["target"], Value::from(80));
}

#[test]
fn achievement_keys_match_persisted_format() {
    let store = MemoryStore::new();
    store
        .set(
            ACHIEVEMENTS_KEY,
            r#"{"gamesPlayed":3,"missionsCompleted":2,"highScore":57}"#,
        )
        .unwrap();
    store.set(XP_KEY, "90").unwrap();

    let mut tracker = AchievementTracker::load(store.clone());
    assert_eq!(tracker.progress().record.high_score, 57);
    let report = tracker.report_completion(30);
    assert!(report.leveled_up);
    assert_eq!(report.level, 2);

    let stored = store.get(ACHIEVEMENTS_KEY).unwrap().unwrap();
    let raw: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(raw["gamesPlayed"], Value::from(4));
    assert_eq!(raw["missionsCompleted"], Value::from(3));
    assert_eq!(raw["highScore"], Value::from(57));
    assert_eq!(store.get(XP_KEY).unwrap().as_deref(), Some("115"));
}
