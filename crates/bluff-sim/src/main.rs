use std::path::PathBuf;

use clap::Parser;

use bluff_sim::config::SimConfig;
use bluff_sim::logging::init_logging;
use bluff_sim::runner::SimRunner;

/// Headless simulation harness for the monkeybluff engine.
#[derive(Debug, Parser)]
#[command(
    name = "monkeybluff-sim",
    author,
    version,
    about = "Deterministic bluffing-game simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the number of seats at the table.
    #[arg(long, value_name = "PLAYERS")]
    players: Option<usize>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.table.games = games;
    }

    if let Some(players) = cli.players {
        config.table.players = players;
    }

    if let Some(seed) = cli.seed {
        config.table.seed = Some(seed);
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    println!(
        "Loaded configuration '{}' ({} game{}, {} players)",
        config.run_id,
        config.table.games,
        if config.table.games == 1 { "" } else { "s" },
        config.table.players
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimRunner::new(config, outputs);

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Simulation complete: {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if summary.unfinished > 0 {
        println!(
            "WARN: {} game(s) hit the tick limit without a winner",
            summary.unfinished
        );
    }

    Ok(())
}
