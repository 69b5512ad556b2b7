use std::path::PathBuf;

use clap::Parser;

use wizard_bench::config::{BenchmarkConfig, ResolvedOutputs};
use wizard_bench::logging::init_logging;
use wizard_bench::tournament::TournamentRunner;
use wizard_core::AppInfo;

/// Tournament benchmarking harness for Wizard bots.
#[derive(Debug, Parser)]
#[command(
    name = "wizard-bench",
    author,
    version,
    about = "Deterministic Wizard tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/wizard.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "MATCHES")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seat permutations per match.
    #[arg(long, value_name = "COUNT")]
    permutations: Option<usize>,

    /// Stop every match after this many rounds.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<u8>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if let Some(permutations) = cli.permutations {
        config.matches.permutations = permutations;
    }

    if let Some(rounds) = cli.rounds {
        config.matches.rounds = Some(rounds);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let matches = config.matches.count;
    let permutations = config.matches.permutations;

    println!(
        "{} {}: loaded configuration '{run_id}' with {agent_count} agents ({matches} matches, {permutations} permutations)",
        AppInfo::name(),
        AppInfo::version()
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} matches × {} permutations → {} rows at {}",
        summary.matches_played,
        summary.permutations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    println!("Match logs: {}", summary.match_log_dir.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
