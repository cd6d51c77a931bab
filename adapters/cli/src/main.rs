#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates dungeon levels and replays them headlessly.

mod config;
mod simulate;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dungeon_sentinel_core::{TileKind, TileRect, Vector2, REFERENCE_TICK_RATE};
use dungeon_sentinel_system_generation::LevelGenerator;
use dungeon_sentinel_world::{query, Level};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::GenerationArgs;
use simulate::SimulationSettings;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(author, version, about = "Dungeon sentinel level generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Generates a level and prints its tile dump.
    Generate(GenerateArgs),
    /// Generates a level and runs it headlessly with a scripted target.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    generation: GenerationArgs,

    /// Print a JSON summary instead of the tile dump.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    generation: GenerationArgs,

    /// Simulated seconds to run at the reference tick rate.
    #[arg(long, default_value_t = 20)]
    seconds: u32,

    /// Seed for sentinel cadence draws.
    #[arg(long, default_value_t = 0)]
    targeting_seed: u64,

    /// Avatar speed in world units per frame.
    #[arg(long, default_value_t = 3.0, value_parser = parse_speed)]
    speed: f32,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct LevelSummary<'a> {
    seed: u64,
    columns: u32,
    rows: u32,
    tile_size: f32,
    rooms: &'a [TileRect],
    spawn_point: Vector2,
    goal_point: Vector2,
    floor_tiles: usize,
    walls: usize,
    sentinels: Vec<SentinelSummary>,
}

#[derive(Serialize)]
struct SentinelSummary {
    id: u32,
    column: u32,
    row: u32,
    health: u32,
    threshold_ms: u64,
}

impl<'a> LevelSummary<'a> {
    fn new(level: &'a Level, seed: u64) -> Self {
        let grid = query::grid(level);
        let sentinels = query::sentinel_view(level)
            .iter()
            .map(|sentinel| SentinelSummary {
                id: sentinel.id.get(),
                column: sentinel.tile.column(),
                row: sentinel.tile.row(),
                health: sentinel.health.get(),
                threshold_ms: u64::try_from(sentinel.threshold.as_millis()).unwrap_or(u64::MAX),
            })
            .collect();

        Self {
            seed,
            columns: grid.columns(),
            rows: grid.rows(),
            tile_size: query::tile_size(level),
            rooms: query::rooms(level),
            spawn_point: query::spawn_point(level),
            goal_point: query::goal_point(level),
            floor_tiles: grid.count(TileKind::Floor),
            walls: query::wall_colliders(level).len(),
            sentinels,
        }
    }
}

fn parse_speed(arg: &str) -> Result<f32> {
    let speed: f32 = arg.parse()?;
    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("speed must be a positive finite number, got {speed}");
    }
    Ok(speed)
}

/// Entry point for the dungeon sentinel command-line interface.
fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        CliCommand::Generate(args) => generate(&args),
        CliCommand::Simulate(args) => simulate(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_level(args: &GenerationArgs) -> Result<Level> {
    let config = args.resolve()?;
    let generator = LevelGenerator::new(config).context("invalid generator configuration")?;
    generator
        .generate_seeded(args.seed)
        .with_context(|| format!("level generation failed for seed {}", args.seed))
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let level = build_level(&args.generation)?;
    let mut stdout = io::stdout().lock();

    if args.json {
        let summary = LevelSummary::new(&level, args.generation.seed);
        serde_json::to_writer_pretty(&mut stdout, &summary)
            .context("failed to serialize level summary")?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", query::grid_dump(&level))?;
    }

    stdout.flush().context("failed to flush stdout")
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let mut level = build_level(&args.generation)?;
    let settings = SimulationSettings {
        frames: args.seconds.saturating_mul(REFERENCE_TICK_RATE),
        targeting_seed: args.targeting_seed,
        speed: args.speed,
    };

    info!(
        frames = settings.frames,
        sentinels = query::sentinel_view(&level).len(),
        "starting simulation"
    );
    let report = simulate::run(&mut level, settings);
    info!(
        attacks = report.attacks,
        hits = report.hits,
        defeated = report.sentinels_defeated,
        "simulation finished"
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &report)
            .context("failed to serialize simulation report")?;
        writeln!(stdout)?;
    } else {
        writeln!(
            stdout,
            "frames: {}\nattacks: {}\nhits: {}\nstrikes: {}\nsentinels defeated: {}\nsentinels remaining: {}\nreached goal: {}",
            report.frames,
            report.attacks,
            report.hits,
            report.strikes,
            report.sentinels_defeated,
            report.sentinels_remaining,
            report.reached_goal,
        )?;
    }

    stdout.flush().context("failed to flush stdout")
}
