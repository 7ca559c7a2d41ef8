use colored::Colorize;
use mission_health_game::{KeyValueStore, MissionCatalog};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, run_plan};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub seed: u64,
    pub share_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub mean_rounds: f64,
    pub best_score: Option<i32>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester<S: KeyValueStore + Clone> {
    catalog: MissionCatalog,
    store: S,
    verbose: bool,
}

impl<S: KeyValueStore + Clone> LogicTester<S> {
    pub const fn new(catalog: MissionCatalog, store: S, verbose: bool) -> Self {
        Self {
            catalog,
            store,
            verbose,
        }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let outcome = self.run_simulation_iterations(&scenario.plan, seed, iterations);

        let avg_duration = if outcome.performance_data.is_empty() {
            Duration::ZERO
        } else {
            outcome.performance_data.iter().sum::<Duration>()
                / u32::try_from(outcome.performance_data.len()).unwrap_or(1)
        };
        let mean_rounds = if outcome.rounds.is_empty() {
            0.0
        } else {
            let total: u32 = outcome.rounds.iter().sum();
            f64::from(total) / f64::from(u32::try_from(outcome.rounds.len()).unwrap_or(1))
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            strategy: scenario.plan.strategy.label().to_string(),
            seed,
            share_code: mission_health_game::encode_friendly(seed),
            passed: outcome.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: outcome.successes,
            failures: outcome.failures,
            mean_rounds,
            best_score: outcome.best_score,
            average_duration: avg_duration,
            performance_data: outcome.performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> IterationOutcome {
        let mut outcome = IterationOutcome::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = run_plan(&self.catalog, self.store.clone(), plan, iteration_seed);
            let rounds = u32::try_from(summary.turns.len()).unwrap_or(u32::MAX);
            outcome.rounds.push(rounds);
            if let Some(score) = summary.final_snapshot.score {
                outcome.best_score = Some(outcome.best_score.map_or(score, |b| b.max(score)));
            }

            if let Some(err) = evaluate_expectations(plan, &summary) {
                let status = if summary.completed() {
                    "completed"
                } else {
                    "halted"
                };
                outcome.failures.push(format!(
                    "Iteration {} (strategy {}, seed {} [{}], region {}, rounds {}, status {}): {} | {} | final resources {} gap {}",
                    i + 1,
                    summary.strategy.label(),
                    summary.seed,
                    summary.share_code,
                    summary.region,
                    rounds,
                    status,
                    err,
                    summarize_decision_path(&summary),
                    summary.final_snapshot.resources,
                    summary.final_snapshot.metrics.total_gap()
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                }
            } else {
                outcome.successes += 1;
                let duration = start_time.elapsed();
                outcome.performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) rounds:{} score:{} strategy:{}",
                        i + 1,
                        iterations,
                        rounds,
                        summary
                            .final_snapshot
                            .score
                            .map_or_else(|| "-".to_string(), |s| s.to_string()),
                        summary.strategy.label()
                    );
                }
            }
        }

        outcome
    }
}

#[derive(Debug, Default)]
struct IterationOutcome {
    successes: usize,
    failures: Vec<String>,
    performance_data: Vec<Duration>,
    rounds: Vec<u32>,
    best_score: Option<i32>,
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation(summary) {
            return Some(err.to_string());
        }
    }
    None
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.turns.is_empty() {
        return summary
            .halted
            .clone()
            .unwrap_or_else(|| "no rounds played".to_string());
    }

    summary
        .turns
        .iter()
        .rev()
        .take(3)
        .map(|turn| {
            format!(
                "round {} ({}): [{}] spent {} gap {}",
                turn.round,
                turn.challenge_id,
                turn.intervention_ids.join(", "),
                turn.resources_spent,
                turn.total_gap
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
