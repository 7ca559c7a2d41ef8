use mission_health_game::{
    AchievementTracker, BundledCatalog, Intervention, MemoryStore, MissionEngine, MissionError,
    MissionPhase, MissionSession, apply_round, compute_score, parse_share_code,
};

const ROUND_CAP: u32 = 500;

/// Pick interventions one at a time while each pick lowers the post-round gap.
fn gap_greedy_selection(session: &MissionSession) -> Vec<String> {
    let challenge = session.active_challenge().unwrap().clone();
    let offered: Vec<Intervention> = session.offered().to_vec();
    let gap_after = |ids: &[String]| {
        apply_round(
            session.metrics(),
            session.resources(),
            &challenge,
            &offered,
            ids,
        )
        .ok()
        .map(|outcome| outcome.metrics.total_gap())
    };

    let mut chosen: Vec<String> = Vec::new();
    let mut current = gap_after(chosen.as_slice()).unwrap();
    loop {
        let best = offered
            .iter()
            .filter(|i| !chosen.contains(&i.id))
            .filter_map(|i| {
                let mut trial = chosen.clone();
                trial.push(i.id.clone());
                gap_after(trial.as_slice()).map(|gap| (gap, i.id.clone()))
            })
            .min();
        match best {
            Some((gap, id)) if gap < current => {
                current = gap;
                chosen.push(id);
            }
            _ => break,
        }
    }
    if chosen.is_empty()
        && let Some(cheapest) = offered
            .iter()
            .filter(|i| i.cost <= session.resources())
            .min_by_key(|i| i.cost)
    {
        chosen.push(cheapest.id.clone());
    }
    chosen
}

fn play(session: &mut MissionSession) -> u32 {
    let mut rounds = 0;
    while session.phase() == MissionPhase::InProgress {
        for id in gap_greedy_selection(session) {
            session.toggle_intervention(&id).unwrap();
        }
        let report = session.apply_interventions().unwrap();
        rounds += 1;
        assert!(
            report
                .outcome
                .metrics
                .iter()
                .all(|m| (0..=100).contains(&m.value)),
            "metric escaped range in round {}",
            report.round
        );
        assert!(report.outcome.resources >= 0);
        assert!(rounds < ROUND_CAP, "mission never finished");
    }
    rounds
}

#[test]
fn seeded_missions_reach_completion() {
    let engine = MissionEngine::new(BundledCatalog, MemoryStore::new());
    let seeds = [1_u64, 7, 42, 0xC0FFEE, 0xDEAD_BEEF];
    for (played, seed) in seeds.into_iter().enumerate() {
        let mut session = engine.create_session(seed).unwrap();
        session.select_region("1").unwrap();
        session.start_mission().unwrap();
        play(&mut session);

        let snap = session.snapshot();
        assert_eq!(snap.phase, MissionPhase::Completed);
        assert!(snap.metrics.all_targets_met());
        assert_eq!(
            snap.score,
            Some(compute_score(&snap.metrics, snap.resources))
        );
        let games = u32::try_from(played).unwrap() + 1;
        assert_eq!(session.tracker().progress().record.games_played, games);
    }
    assert_eq!(engine.progress().xp, 5 * 25);
}

#[test]
fn share_code_replays_identical_mission() {
    let (district, seed) = parse_share_code("SAGAR17").unwrap();
    let run = || {
        let engine = MissionEngine::new(BundledCatalog, MemoryStore::new());
        let mut session = engine.create_session(seed).unwrap();
        session.select_region(district.id).unwrap();
        session.start_mission().unwrap();
        let rounds = play(&mut session);
        (rounds, session.snapshot())
    };
    let (rounds_a, snap_a) = run();
    let (rounds_b, snap_b) = run();
    assert_eq!(rounds_a, rounds_b);
    assert_eq!(snap_a, snap_b);
    assert_eq!(snap_a.region.map(|d| d.name), Some("Sagar"));
}

#[test]
fn completed_mission_must_be_reset_before_replaying() {
    let catalog = mission_health_game::MissionCatalog::load_default().unwrap();
    let mut session =
        MissionSession::new(catalog, 11, AchievementTracker::load(MemoryStore::new()));
    session.select_region("4").unwrap();
    session.start_mission().unwrap();
    play(&mut session);

    assert_eq!(session.start_mission(), Err(MissionError::MissionActive));
    assert_eq!(session.select_region("4"), Err(MissionError::MissionActive));
    session.reset_mission();
    assert_eq!(session.start_mission(), Err(MissionError::NoRegionSelected));
    session.select_region("4").unwrap();
    session.start_mission().unwrap();
    assert_eq!(session.round(), 1);
    assert_eq!(session.resources(), 100);
}
