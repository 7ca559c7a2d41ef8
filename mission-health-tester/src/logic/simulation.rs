use anyhow::Result;
use mission_health_game::seed::{district_for_seed, encode_friendly};
use mission_health_game::{
    AchievementTracker, CompletionReport, KeyValueStore, MissionCatalog, MissionError,
    MissionPhase, MissionSession, MissionSnapshot,
};
use serde::Serialize;

use crate::logic::policy::{GameplayStrategy, RoundView};

pub const DEFAULT_MAX_ROUNDS: u32 = 200;

/// Check applied to a finished simulation.
pub type Expectation = fn(&SimulationSummary) -> Result<()>;

/// How a scenario drives one mission.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_rounds: u32,
    /// District id; `None` uses the district named by the seed's share code.
    pub region: Option<String>,
    pub expectations: Vec<Expectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_rounds: DEFAULT_MAX_ROUNDS,
            region: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

/// One resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub round: u32,
    pub challenge_id: String,
    pub intervention_ids: Vec<String>,
    pub resources_before: i32,
    pub resources_spent: i32,
    pub resources_after: i32,
    pub total_gap: i32,
    pub ended: bool,
}

/// Everything a run produced, for expectations and reports.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub share_code: String,
    pub strategy: GameplayStrategy,
    pub policy_name: &'static str,
    pub max_rounds: u32,
    pub region: String,
    pub turns: Vec<TurnRecord>,
    pub final_snapshot: MissionSnapshot,
    pub completion: Option<CompletionReport>,
    pub starting_xp: u32,
    /// Set when the mission could not continue before completing.
    pub halted: Option<String>,
}

impl SimulationSummary {
    #[must_use]
    pub fn completed(&self) -> bool {
        self.final_snapshot.phase == MissionPhase::Completed
    }
}

/// Play one seeded mission under `plan`, recording achievements into `store`.
pub fn run_plan<S: KeyValueStore>(
    catalog: &MissionCatalog,
    store: S,
    plan: &SimulationPlan,
    seed: u64,
) -> SimulationSummary {
    let region = plan
        .region
        .clone()
        .unwrap_or_else(|| district_for_seed(seed).id.to_string());
    let tracker = AchievementTracker::load(store);
    let starting_xp = tracker.progress().xp;
    let mut session = MissionSession::new(catalog.clone(), seed, tracker);
    let mut policy = plan.strategy.create_policy();
    let mut turns = Vec::new();
    let mut completion = None;

    let halted = match start(&mut session, &region) {
        Err(err) => Some(err.to_string()),
        Ok(()) => loop {
            if session.phase() != MissionPhase::InProgress {
                break None;
            }
            if turns.len() >= plan.max_rounds as usize {
                break Some(format!("round cap {} reached", plan.max_rounds));
            }
            let Some(challenge) = session.active_challenge().cloned() else {
                break Some("no active challenge".to_string());
            };
            let picks = {
                let view = RoundView {
                    metrics: session.metrics(),
                    resources: session.resources(),
                    challenge: &challenge,
                    offered: session.offered(),
                };
                policy.pick_interventions(&view)
            };
            if let Err(err) = picks
                .iter()
                .try_for_each(|id| session.toggle_intervention(id).map(|_| ()))
            {
                break Some(err.to_string());
            }
            let resources_before = session.resources();
            match session.apply_interventions() {
                Ok(report) => {
                    log::debug!(
                        "seed {seed} round {} [{}]: {:?}",
                        report.round,
                        policy.name(),
                        picks
                    );
                    turns.push(TurnRecord {
                        round: report.round,
                        challenge_id: report.challenge.id.clone(),
                        intervention_ids: report
                            .interventions
                            .iter()
                            .map(|i| i.id.clone())
                            .collect(),
                        resources_before,
                        resources_spent: report.resources_spent,
                        resources_after: report.outcome.resources,
                        total_gap: report.outcome.metrics.total_gap(),
                        ended: report.outcome.ended,
                    });
                    if report.completion.is_some() {
                        completion = report.completion;
                    }
                }
                Err(err) => break Some(err.to_string()),
            }
        },
    };

    SimulationSummary {
        seed,
        share_code: encode_friendly(seed),
        strategy: plan.strategy,
        policy_name: policy.name(),
        max_rounds: plan.max_rounds,
        region,
        turns,
        final_snapshot: session.snapshot(),
        completion,
        starting_xp,
        halted,
    }
}

fn start<S: KeyValueStore>(
    session: &mut MissionSession<S>,
    region: &str,
) -> Result<(), MissionError> {
    session.select_region(region)?;
    session.start_mission()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_health_game::MemoryStore;

    fn catalog() -> MissionCatalog {
        MissionCatalog::load_default().unwrap()
    }

    #[test]
    fn records_one_turn_per_round() {
        let plan = SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_rounds(3);
        let summary = run_plan(&catalog(), MemoryStore::new(), &plan, 1337);
        assert!(!summary.turns.is_empty());
        assert!(summary.turns.len() <= 3);
        for (i, turn) in summary.turns.iter().enumerate() {
            assert_eq!(turn.round as usize, i + 1);
            assert_eq!(
                turn.resources_before - turn.resources_spent,
                turn.resources_after
            );
        }
        if !summary.completed() {
            assert_eq!(summary.halted.as_deref(), Some("round cap 3 reached"));
        }
    }

    #[test]
    fn unknown_region_halts_before_round_one() {
        let plan = SimulationPlan::new(GameplayStrategy::Greedy)
            .with_region("999");
        let summary = run_plan(&catalog(), MemoryStore::new(), &plan, 5);
        assert!(summary.turns.is_empty());
        assert_eq!(summary.halted.as_deref(), Some("unknown region 999"));
        assert_eq!(summary.final_snapshot.phase, MissionPhase::NotStarted);
    }

    #[test]
    fn region_defaults_to_share_code_district() {
        let plan = SimulationPlan::new(GameplayStrategy::Cheapest)
            .with_max_rounds(1);
        let summary = run_plan(&catalog(), MemoryStore::new(), &plan, 77);
        assert_eq!(summary.region, district_for_seed(77).id);
        assert!(summary.share_code.ends_with(char::is_numeric));
    }
}
