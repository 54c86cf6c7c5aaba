#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Lane Defence levels headlessly.

use std::{fs, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use lane_defence_core::{CellCoord, Command, Event, LevelConfig, LevelOutcome, PlantKind};
use lane_defence_world::{apply, query, World};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ticks simulated when `--ticks` is not given: five minutes of game time.
const DEFAULT_TICKS: u64 = 18_000;

#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Headless Lane Defence simulation")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plays a level and prints a summary.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML level file; omitted parameters use their defaults.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    ticks: u64,
    /// Overrides the level seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Plant placed before the first tick, as `KIND@ROW,COL`.
    #[arg(long = "plant", value_name = "KIND@ROW,COL")]
    plants: Vec<PlacementArg>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Scripted placement parsed from the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PlacementArg {
    kind: PlantKind,
    cell: CellCoord,
}

impl FromStr for PlacementArg {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let (kind, position) = value
            .split_once('@')
            .ok_or_else(|| anyhow!("expected KIND@ROW,COL, got `{value}`"))?;
        let (row, column) = position
            .split_once(',')
            .ok_or_else(|| anyhow!("expected ROW,COL after `@`, got `{position}`"))?;
        Ok(Self {
            kind: kind.parse()?,
            cell: CellCoord::new(
                row.trim().parse().context("row must be a number")?,
                column.trim().parse().context("column must be a number")?,
            ),
        })
    }
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Run(args) => {
            install_logging(&args.log);
            run(args)
        }
    }
}

fn install_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_level(path: Option<&PathBuf>) -> Result<LevelConfig> {
    let Some(path) = path else {
        return Ok(LevelConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse level file {}", path.display()))
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_level(args.level.as_ref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Err(error) = config.validate() {
        warn!(%error, "level file contains values that will be clamped");
    }

    let mut world = World::new(config);
    println!("{}", query::welcome_banner(&world));

    let mut events = Vec::new();
    for placement in &args.plants {
        events.clear();
        apply(
            &mut world,
            Command::PlacePlant {
                kind: placement.kind,
                cell: placement.cell,
            },
            &mut events,
        );
        for event in &events {
            if let Event::PlacementRejected { kind, cell, error } = event {
                warn!(
                    kind = kind.as_str(),
                    row = cell.row(),
                    column = cell.column(),
                    %error,
                    "scripted placement rejected"
                );
            }
        }
    }

    while query::tick_index(&world) < args.ticks
        && query::outcome(&world) == LevelOutcome::Running
    {
        events.clear();
        apply(&mut world, Command::Tick, &mut events);
    }
    info!(ticks = query::tick_index(&world), "simulation stopped");

    print_summary(&world);
    Ok(())
}

fn print_summary(world: &World) {
    let outcome = match query::outcome(world) {
        LevelOutcome::Running => "running".to_owned(),
        LevelOutcome::Failed { row } => format!("failed in row {row}"),
        LevelOutcome::Completed => "completed".to_owned(),
    };
    let kills = query::kills(world);
    let progress = query::wave_progress(world);
    let economy = query::economy(world);

    println!("ticks:   {}", query::tick_index(world));
    println!("outcome: {outcome}");
    println!("kills:   {} ({} before waves)", kills.total, kills.pre_wave);
    println!(
        "waves:   {}/{} cleared",
        progress.waves_completed(),
        progress.max_waves()
    );
    println!("sun:     {}", economy.sun);
    println!("coins:   {}", economy.coins);
    println!("plants:  {}", query::plants(world).len());
}
