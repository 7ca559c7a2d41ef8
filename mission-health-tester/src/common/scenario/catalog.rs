use anyhow::{Context, Result, anyhow, ensure};
use mission_health_game::constants::{ROUND_RESOURCE_BONUS, STARTING_RESOURCES, XP_PER_COMPLETION};
use mission_health_game::districts::{self, DensityBand};
use mission_health_game::seed::district_for_seed;
use mission_health_game::wordle::{self, WordleGame, WordleStatus};
use mission_health_game::{
    JourneyTracker, MemoryStore, MissionCatalog, compute_score, decode_to_seed, encode_friendly,
    level_for_xp, parse_share_code,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::logic::simulation::{SimulationPlan, SimulationSummary, run_plan};

pub fn smoke_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_max_rounds(1)
        .with_expectation(started_expectation)
        .with_expectation(first_round_expectation)
}

pub fn full_mission_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_expectation(started_expectation)
        .with_expectation(completion_expectation)
        .with_expectation(metric_range_expectation)
}

pub fn resource_guard_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_expectation(started_expectation)
        .with_expectation(resource_guard_expectation)
}

pub fn deterministic_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_expectation(deterministic_expectation)
}

pub fn share_code_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_max_rounds(0)
        .with_expectation(share_code_expectation)
}

pub fn achievements_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_expectation(completion_expectation)
        .with_expectation(achievement_expectation)
}

pub fn word_game_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_max_rounds(0)
        .with_expectation(word_game_expectation)
}

pub fn life_journey_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_max_rounds(0)
        .with_expectation(life_journey_expectation)
}

pub fn districts_plan(plan: SimulationPlan) -> SimulationPlan {
    plan.with_max_rounds(0)
        .with_expectation(districts_expectation)
}

fn started_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        !summary.turns.is_empty(),
        "mission never played a round: {}",
        summary.halted.as_deref().unwrap_or("unknown reason")
    );
    Ok(())
}

fn first_round_expectation(summary: &SimulationSummary) -> Result<()> {
    let turn = summary
        .turns
        .first()
        .ok_or_else(|| anyhow!("no first round"))?;
    ensure!(turn.round == 1, "first round numbered {}", turn.round);
    ensure!(
        turn.resources_before == STARTING_RESOURCES,
        "mission started with {} resources",
        turn.resources_before
    );
    ensure!(
        !turn.intervention_ids.is_empty(),
        "first round applied no interventions"
    );
    Ok(())
}

fn completion_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.completed(),
        "mission did not complete within {} rounds ({})",
        summary.max_rounds,
        summary.halted.as_deref().unwrap_or("still in progress")
    );
    let snapshot = &summary.final_snapshot;
    ensure!(
        snapshot.metrics.all_targets_met(),
        "completed with unmet targets"
    );
    let expected = compute_score(&snapshot.metrics, snapshot.resources);
    ensure!(
        snapshot.score == Some(expected),
        "score {:?} does not match {expected}",
        snapshot.score
    );
    let last = summary
        .turns
        .last()
        .ok_or_else(|| anyhow!("completed without a round"))?;
    ensure!(last.ended, "final round not marked as ending the mission");
    ensure!(
        summary.turns.iter().filter(|t| t.ended).count() == 1,
        "more than one round ended the mission"
    );
    Ok(())
}

fn metric_range_expectation(summary: &SimulationSummary) -> Result<()> {
    for metric in summary.final_snapshot.metrics.iter() {
        ensure!(
            (0..=100).contains(&metric.value),
            "{} out of range: {}",
            metric.kind,
            metric.value
        );
    }
    Ok(())
}

fn resource_guard_expectation(summary: &SimulationSummary) -> Result<()> {
    for turn in &summary.turns {
        ensure!(
            turn.resources_spent <= turn.resources_before,
            "round {} spent {} of {}",
            turn.round,
            turn.resources_spent,
            turn.resources_before
        );
        ensure!(
            turn.resources_after >= 0,
            "round {} left {} resources",
            turn.round,
            turn.resources_after
        );
    }
    for pair in summary.turns.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        ensure!(
            next.resources_before == prev.resources_after + ROUND_RESOURCE_BONUS,
            "round {} began with {} resources, expected {}",
            next.round,
            next.resources_before,
            prev.resources_after + ROUND_RESOURCE_BONUS
        );
    }
    Ok(())
}

fn deterministic_expectation(summary: &SimulationSummary) -> Result<()> {
    let catalog = MissionCatalog::load_default()
        .context("loading bundled catalog")?;
    let plan = SimulationPlan::new(summary.strategy)
        .with_max_rounds(summary.max_rounds)
        .with_region(summary.region.clone());
    let replay = run_plan(&catalog, MemoryStore::new(), &plan, summary.seed);
    ensure!(
        replay.turns == summary.turns,
        "replay diverged after {} rounds",
        replay
            .turns
            .iter()
            .zip(&summary.turns)
            .take_while(|(a, b)| a == b)
            .count()
    );
    ensure!(
        replay.final_snapshot == summary.final_snapshot,
        "replay finished in a different state"
    );
    Ok(())
}

fn share_code_expectation(summary: &SimulationSummary) -> Result<()> {
    let code = encode_friendly(summary.seed);
    ensure!(
        code == summary.share_code,
        "share code changed between calls"
    );
    let decoded = decode_to_seed(&code)
        .ok_or_else(|| anyhow!("share code {code} did not decode"))?;
    ensure!(
        encode_friendly(decoded) == code,
        "share code {code} does not round trip"
    );
    let (district, _) = parse_share_code(&code)
        .ok_or_else(|| anyhow!("unparsable {code}"))?;
    ensure!(
        district.id == district_for_seed(summary.seed).id,
        "share code {code} names {} but the seed maps elsewhere",
        district.name
    );
    Ok(())
}

fn achievement_expectation(summary: &SimulationSummary) -> Result<()> {
    let completion = summary
        .completion
        .ok_or_else(|| anyhow!("no completion report"))?;
    ensure!(
        completion.xp == summary.starting_xp + XP_PER_COMPLETION,
        "xp went from {} to {}",
        summary.starting_xp,
        completion.xp
    );
    ensure!(
        completion.level == level_for_xp(completion.xp),
        "level {} does not match xp {}",
        completion.level,
        completion.xp
    );
    ensure!(
        completion.record.high_score >= completion.score,
        "high score {} below run score {}",
        completion.record.high_score,
        completion.score
    );
    ensure!(
        completion.record.games_played >= 1,
        "games played not recorded"
    );
    Ok(())
}

fn word_game_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(summary.seed);
    let mut game = WordleGame::new(&mut rng);
    let mut candidates: Vec<&str> = wordle::playable_terms().map(|t| t.word).collect();

    while game.status() == WordleStatus::InProgress {
        let guess = *candidates
            .first()
            .ok_or_else(|| anyhow!("no candidate words left"))?;
        for letter in guess.chars() {
            game.push_letter(letter)?;
        }
        let tiles = game.submit()?.tiles;
        candidates.retain(|word| wordle::evaluate_guess(guess, word) == tiles);
    }

    let answer = game
        .revealed()
        .ok_or_else(|| anyhow!("answer hidden after game end"))?;
    ensure!(
        wordle::definition(answer.word) == Some(answer.definition),
        "definition lookup mismatch for {}",
        answer.word
    );
    if game.status() == WordleStatus::Won {
        let last = game
            .guesses()
            .last()
            .ok_or_else(|| anyhow!("won without guessing"))?;
        ensure!(
            last.word == answer.word,
            "won on {} but answer is {}",
            last.word,
            answer.word
        );
    }
    ensure!(game.guesses().len() <= 6, "more than six guesses recorded");
    Ok(())
}

fn life_journey_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut tracker = JourneyTracker::new();
    tracker
        .select_region(&summary.region)
        .ok_or_else(|| anyhow!("region {} not found", summary.region))?;
    let mut last = tracker.progress_percent();
    for _ in 0..3 {
        tracker.advance();
        let progress = tracker.progress_percent();
        ensure!(progress > last, "progress stalled at {progress}%");
        last = progress;
    }
    ensure!(last == 100, "journey ended at {last}%");
    ensure!(tracker.unlocked().len() == 4, "not every stage unlocked");
    tracker.previous();
    ensure!(
        tracker.progress_percent() == 75,
        "previous stage did not step back"
    );
    ensure!(
        tracker.go_to("pregnancy").is_some() && tracker.progress_percent() == 25,
        "could not jump back to the first stage"
    );
    Ok(())
}

fn districts_expectation(summary: &SimulationSummary) -> Result<()> {
    let district = districts::district_by_id(&summary.region)
        .ok_or_else(|| anyhow!("region {} not found", summary.region))?;
    let by_name = districts::district_by_name(&district.name.to_lowercase());
    ensure!(
        by_name.map(|d| d.id) == Some(district.id),
        "name lookup failed for {}",
        district.name
    );
    let radius = districts::marker_radius(district.population);
    ensure!(
        (8.0..=28.0).contains(&radius),
        "marker radius {radius} out of bounds"
    );
    let band = districts::density_band(district.population);
    if district.population == districts::max_population() {
        ensure!(band == DensityBand::High, "largest district not High");
    }
    let formatted = districts::format_indian(u64::from(district.population));
    ensure!(
        formatted.replace(',', "") == district.population.to_string(),
        "formatting lost digits: {formatted}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameplayStrategy;

    fn summary_for(plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let catalog = MissionCatalog::load_default().unwrap();
        run_plan(&catalog, MemoryStore::new(), plan, seed)
    }

    #[test]
    fn side_game_expectations_pass_for_many_seeds() {
        let plan = SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_rounds(0);
        for seed in 0..40 {
            let summary = summary_for(&plan, seed);
            share_code_expectation(&summary).unwrap();
            word_game_expectation(&summary).unwrap();
            life_journey_expectation(&summary).unwrap();
            districts_expectation(&summary).unwrap();
        }
    }

    #[test]
    fn zero_round_cap_halts_without_playing() {
        let plan = SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_rounds(0);
        let summary = summary_for(&plan, 3);
        assert!(summary.turns.is_empty());
        assert!(started_expectation(&summary).is_err());
        assert!(completion_expectation(&summary).is_err());
    }

    #[test]
    fn smoke_plan_passes() {
        let plan = smoke_plan(SimulationPlan::new(GameplayStrategy::Cheapest));
        let summary = summary_for(&plan, 1337);
        for expectation in &plan.expectations {
            expectation(&summary).unwrap();
        }
    }

    #[test]
    fn resource_guard_holds_for_every_strategy() {
        for strategy in GameplayStrategy::ALL {
            let plan = resource_guard_plan(SimulationPlan::new(strategy).with_max_rounds(20));
            let summary = summary_for(&plan, 99);
            resource_guard_expectation(&summary).unwrap();
            deterministic_expectation(&summary).unwrap();
        }
    }
}
