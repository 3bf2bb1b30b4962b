use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase::app::{App, RunOptions};
use maze_chase::config::load_config;
use maze_chase::logging::setup_logging;
use thousands::Separable;
use tracing::info;

/// Runs the maze-chase simulation headless in real time.
///
/// Configuration is read from `MAZE_*` environment variables.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Start a session right away, steered by the autopilot
    #[arg(long)]
    start: bool,
    /// Seed the simulation, overriding `MAZE_SEED`
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    limit: Option<f32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging().context("Could not install the tracing subscriber")?;

    let mut config = load_config()?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.start {
        config.autopilot = true;
    }

    let options = RunOptions {
        start: args.start,
        max_duration: args.limit.filter(|seconds| seconds.is_finite() && *seconds > 0.0).map(Duration::from_secs_f32),
    };

    let mut app = App::new(&config, options)?;
    info!(loop_time = ?maze_chase::constants::LOOP_TIME, "Starting game loop");

    while app.run() {}

    info!(
        score = %app.game.score().separate_with_commas(),
        high_score = %app.game.high_score().separate_with_commas(),
        level = app.game.level(),
        steps = %app.game.ticks().separate_with_commas(),
        "Run finished"
    );
    Ok(())
}
