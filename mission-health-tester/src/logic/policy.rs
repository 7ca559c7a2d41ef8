use std::fmt;

use mission_health_game::{Challenge, Intervention, MetricSet, apply_round};

/// What a policy sees when picking interventions for a round.
#[derive(Debug, Clone, Copy)]
pub struct RoundView<'a> {
    pub metrics: &'a MetricSet,
    pub resources: i32,
    pub challenge: &'a Challenge,
    pub offered: &'a [Intervention],
}

impl RoundView<'_> {
    /// Metric shortfall after resolving the round with `ids`, `None` when the
    /// selection is unaffordable.
    fn gap_after(&self, ids: &[String]) -> Option<i32> {
        apply_round(
            self.metrics,
            self.resources,
            self.challenge,
            self.offered,
            ids,
        )
        .ok()
        .map(|outcome| outcome.metrics.total_gap())
    }

    fn cheapest_affordable(&self) -> Option<&Intervention> {
        self.offered
            .iter()
            .filter(|i| i.cost <= self.resources)
            .min_by_key(|i| (i.cost, i.id.clone()))
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Ids to select this round. Empty only when nothing is affordable.
    fn pick_interventions(&mut self, view: &RoundView<'_>) -> Vec<String>;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum GameplayStrategy {
    Greedy,
    Cheapest,
    Balanced,
}

impl GameplayStrategy {
    pub const ALL: [Self; 3] = [Self::Greedy, Self::Cheapest, Self::Balanced];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Greedy => "Greedy",
            GameplayStrategy::Cheapest => "Cheapest",
            GameplayStrategy::Balanced => "Balanced",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "greedy" => Some(Self::Greedy),
            "cheapest" => Some(Self::Cheapest),
            "balanced" => Some(Self::Balanced),
            _ => None,
        }
    }

    #[must_use]
    pub fn create_policy(self) -> Box<dyn PlayerPolicy> {
        match self {
            GameplayStrategy::Greedy => Box::new(GreedyPolicy),
            GameplayStrategy::Cheapest => Box::new(CheapestPolicy),
            GameplayStrategy::Balanced => Box::new(BalancedPolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Buys the biggest raw impact it can afford, repeatedly.
struct GreedyPolicy;
/// Buys only the single cheapest offer.
struct CheapestPolicy;
/// Adds picks while each one shrinks the post-round gap.
struct BalancedPolicy;

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn pick_interventions(&mut self, view: &RoundView<'_>) -> Vec<String> {
        let mut budget = view.resources;
        let mut ranked: Vec<&Intervention> = view.offered.iter().collect();
        ranked.sort_by_key(|i| {
            (
                std::cmp::Reverse(i.impact.values().sum::<i32>()),
                i.cost,
                i.id.clone(),
            )
        });
        let mut picks = Vec::new();
        for intervention in ranked {
            if intervention.cost <= budget {
                budget -= intervention.cost;
                picks.push(intervention.id.clone());
            }
        }
        picks
    }
}

impl PlayerPolicy for CheapestPolicy {
    fn name(&self) -> &'static str {
        "cheapest"
    }

    fn pick_interventions(&mut self, view: &RoundView<'_>) -> Vec<String> {
        view.cheapest_affordable()
            .map(|i| vec![i.id.clone()])
            .unwrap_or_default()
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn pick_interventions(&mut self, view: &RoundView<'_>) -> Vec<String> {
        let mut chosen: Vec<String> = Vec::new();
        let Some(mut current) = view.gap_after(&chosen) else {
            return chosen;
        };
        loop {
            let best = view
                .offered
                .iter()
                .filter(|i| !chosen.contains(&i.id))
                .filter_map(|i| {
                    let mut trial = chosen.clone();
                    trial.push(i.id.clone());
                    view.gap_after(&trial)
                        .map(|gap| (gap, i.cost, i.id.clone()))
                })
                .min();
            match best {
                Some((gap, _, id)) if gap < current => {
                    current = gap;
                    chosen.push(id);
                }
                _ => break,
            }
        }
        if chosen.is_empty()
            && let Some(fallback) = view.cheapest_affordable()
        {
            chosen.push(fallback.id.clone());
        }
        chosen
    }
}
