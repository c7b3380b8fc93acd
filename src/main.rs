//! Swarm Strike headless entry point
//!
//! Runs the simulation under an autopilot with the fixed-step frame loop
//! and reports how far it got.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use swarm_strike::Settings;
use swarm_strike::driver::{Autopilot, FixedStep};
use swarm_strike::sim::{GamePhase, World, tick};

#[derive(Parser, Debug)]
#[command(name = "swarm-strike")]
#[command(about = "Run the swarm-strike simulation headless under an autopilot")]
struct Cli {
    /// JSON settings file; defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frames to run (overrides `demo_ticks`)
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed (overrides the settings seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final render snapshot as JSON
    #[arg(long, default_value_t = false)]
    snapshot: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    settings.validate().context("invalid settings")?;

    let seed = settings.seed.unwrap_or_else(clock_seed);
    let frames = cli.ticks.unwrap_or(settings.demo_ticks);
    log::info!(
        "Swarm Strike starting: seed {seed}, {}x{} arena, {frames} frames",
        settings.screen_width,
        settings.screen_height
    );

    let mut world = World::from_settings(&settings, seed);
    let mut clock = FixedStep::new(settings.tick_dt(), settings.max_frame_time);
    let mut pilot = Autopilot::default();
    let mut last_phase = world.state.phase;
    let mut frames_run = 0;

    // Headless frames arrive exactly one step apart
    let frame_dt = clock.step();
    while frames_run < frames && !world.state.is_terminal() {
        for _ in 0..clock.advance(frame_dt) {
            let input = pilot.decide(&world);
            tick(&mut world, &input, clock.step());
        }
        frames_run += 1;

        if world.state.phase != last_phase {
            log::debug!(
                "frame {frames_run}: {:?} -> {:?}",
                last_phase,
                world.state.phase
            );
            last_phase = world.state.phase;
        }
    }

    let outcome = if world.state.phase == GamePhase::GameOver {
        "game over"
    } else {
        "frame limit"
    };
    log::info!("Run ended after {frames_run} frames ({outcome})");

    println!(
        "wave {} | score {} | lives {} | ticks {} | {}",
        world.state.wave, world.state.score, world.player.lives, world.time_ticks, outcome
    );

    if cli.snapshot {
        let json = serde_json::to_string_pretty(&world.snapshot())
            .context("failed to serialise snapshot")?;
        println!("{json}");
    }

    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
