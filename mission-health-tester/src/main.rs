mod common;
mod logic;
mod storage;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use mission_health_game::{KeyValueStore, MemoryStore, MissionCatalog};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{get_scenario, list_scenarios, scenario_keys};
use common::{run_stamp, split_csv};
use logic::{DEFAULT_MAX_ROUNDS, GameplayStrategy, LogicTester, ScenarioResult, resolve_seed_inputs};
use storage::FileStore;

#[derive(Debug, Parser)]
#[command(name = "mission-health-tester", version = "0.1.0")]
#[command(about = "Automated logic testing for Mission Health")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated numbers or share codes such as BHOPAL42)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Intervention strategy driving the missions
    #[arg(long, default_value = "balanced")]
    #[arg(value_parser = ["greedy", "cheapest", "balanced", "all"])]
    strategy: String,

    /// Round cap before a mission counts as stalled
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Persist achievements from completed missions to this JSON file
    #[arg(long)]
    achievements: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let strategies = expand_strategies(&args.strategy)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    if args.verbose {
        let codes: Vec<String> = seed_infos.iter().map(logic::SeedInfo::share_code).collect();
        println!("🌱 Seeds: {}", codes.join(", "));
    }
    let catalog = MissionCatalog::load_default()
        .context("loading mission catalog")?;

    let results = if let Some(path) = args.achievements.clone() {
        let store = FileStore::new(path);
        log::info!("persisting achievements to {}", store.path().display());
        let tester = LogicTester::new(catalog, store, args.verbose);
        run_logic_scenarios(&tester, &scenarios, &strategies, &seeds, &args)
    } else {
        let tester = LogicTester::new(catalog, MemoryStore::new(), args.verbose);
        run_logic_scenarios(&tester, &scenarios, &strategies, &seeds, &args)
    };

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🩺 Mission Health Automated Tester".bright_cyan().bold());
    println!("{}", "==================================".cyan());
    println!("Run started {}", run_stamp(chrono::Utc::now()));
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in scenario_keys() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn expand_strategies(strategy_arg: &str) -> Result<Vec<GameplayStrategy>> {
    if strategy_arg.eq_ignore_ascii_case("all") {
        return Ok(GameplayStrategy::ALL.to_vec());
    }
    match GameplayStrategy::parse(strategy_arg) {
        Some(strategy) => Ok(vec![strategy]),
        None => bail!("Unknown strategy: {strategy_arg}"),
    }
}

fn run_logic_scenarios<S: KeyValueStore + Clone>(
    tester: &LogicTester<S>,
    scenarios: &[String],
    strategies: &[GameplayStrategy],
    seeds: &[u64],
    args: &Args,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    for scenario_name in scenarios {
        for &strategy in strategies {
            if let Some(scenario) = get_scenario(scenario_name, strategy, args.max_rounds) {
                results.extend(tester.run_scenario(&scenario, seeds, args.iterations));
            } else {
                eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
                break;
            }
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Mission Health Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
