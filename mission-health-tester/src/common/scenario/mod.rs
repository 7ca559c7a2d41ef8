pub mod catalog;

use crate::logic::{GameplayStrategy, SimulationPlan};

/// A named simulation run by the logic tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Registry entry: CLI key, description and plan builder.
#[derive(Clone, Copy)]
pub struct ScenarioEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    build: fn(SimulationPlan) -> SimulationPlan,
}

const SCENARIOS: [ScenarioEntry; 9] = [
    ScenarioEntry {
        key: "smoke",
        name: "Smoke",
        description: "Start a mission and resolve its first round",
        build: catalog::smoke_plan,
    },
    ScenarioEntry {
        key: "full-mission",
        name: "Full Mission",
        description: "Play a seeded mission through to completion",
        build: catalog::full_mission_plan,
    },
    ScenarioEntry {
        key: "resource-guard",
        name: "Resource Guard",
        description: "Spending never exceeds the budget and rounds refill it",
        build: catalog::resource_guard_plan,
    },
    ScenarioEntry {
        key: "deterministic",
        name: "Deterministic Replay",
        description: "The same seed and strategy replay identically",
        build: catalog::deterministic_plan,
    },
    ScenarioEntry {
        key: "share-code",
        name: "Share Code Round Trip",
        description: "Share codes decode to seeds that encode back to the same code",
        build: catalog::share_code_plan,
    },
    ScenarioEntry {
        key: "achievements",
        name: "Achievement Progress",
        description: "Completing a mission awards XP and updates the record",
        build: catalog::achievements_plan,
    },
    ScenarioEntry {
        key: "word-game",
        name: "Health Word Game",
        description: "A seeded word game is solved or exhausted within six guesses",
        build: catalog::word_game_plan,
    },
    ScenarioEntry {
        key: "life-journey",
        name: "Life Journey",
        description: "Walk the four life stages in the mission's district",
        build: catalog::life_journey_plan,
    },
    ScenarioEntry {
        key: "districts",
        name: "District Data",
        description: "District lookups, density bands and number formatting",
        build: catalog::districts_plan,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

pub fn scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|s| s.key.to_string()).collect()
}

/// Build the named scenario for one strategy.
pub fn get_scenario(
    key: &str,
    strategy: GameplayStrategy,
    max_rounds: u32,
) -> Option<TestScenario> {
    let entry = SCENARIOS
        .iter()
        .find(|s| s.key.eq_ignore_ascii_case(key))?;
    let plan = (entry.build)(SimulationPlan::new(strategy).with_max_rounds(max_rounds));
    Some(TestScenario::new(entry.name, plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_builds() {
        for key in scenario_keys() {
            let scenario = get_scenario(&key, GameplayStrategy::Balanced, 50).unwrap();
            assert!(!scenario.name.is_empty());
            assert!(!scenario.plan.expectations.is_empty());
        }
        let missing = get_scenario("missing", GameplayStrategy::Balanced, 50);
        assert!(missing.is_none());
    }

    #[test]
    fn smoke_caps_rounds() {
        let scenario = get_scenario("SMOKE", GameplayStrategy::Greedy, 50).unwrap();
        assert_eq!(scenario.plan.max_rounds, 1);
        assert_eq!(scenario.plan.strategy, GameplayStrategy::Greedy);
    }
}
