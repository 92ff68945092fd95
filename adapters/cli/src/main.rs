#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless tank battle.
//!
//! The battle is driven by a synthetic clock so a run with the same arguments
//! always produces the same event stream.

use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tank_arena_core::TankType;
use tank_arena_system_random_events::RandomEvent;

mod logging;
mod session;
mod stage_file;
mod tuning;

use session::{Outcome, Session, SessionConfig, Summary};

/// Command-line arguments accepted by the battle runner.
#[derive(Debug, Parser)]
#[command(name = "tank-arena", about = "Runs a headless tank battle")]
struct Args {
    /// Stage file to load instead of the built-in stage.
    #[arg(long)]
    stage: Option<PathBuf>,
    /// TOML file overriding tuning values.
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Number of ticks to simulate before giving up.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Seed for bot decisions.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Simulated milliseconds between frames.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Total number of bots deployed during the battle.
    #[arg(long, default_value_t = 6)]
    bots: u32,
    /// Let a seeded autopilot drive the player tank.
    #[arg(long)]
    autopilot: bool,
    /// Chassis of the player tank: normal, heavy, tank_destroyer, light or self_propelled_gun.
    #[arg(long, default_value_t = TankType::Normal)]
    tank_type: TankType,
    /// Random event running during the battle.
    #[arg(long, value_enum, default_value_t = EventChoice::None)]
    event: EventChoice,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
    /// Writes every event as a JSON line instead of a text summary.
    #[arg(long)]
    json: bool,
}

/// Random event selection accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EventChoice {
    /// No random event.
    None,
    /// Slowdown for the whole battle.
    Blizzard,
    /// Periodic air raids.
    Bombing,
    /// One of the events, drawn from the seed.
    Random,
}

impl EventChoice {
    fn resolve(self, seed: u64) -> Option<RandomEvent> {
        match self {
            Self::None => None,
            Self::Blizzard => Some(RandomEvent::Blizzard),
            Self::Bombing => Some(RandomEvent::Bombing),
            Self::Random => Some(RandomEvent::pick(seed)),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    outcome: Outcome,
    event: Option<RandomEvent>,
    summary: &'a Summary,
}

/// Entry point for the tank battle command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let tuning = match &args.tuning {
        Some(path) => tuning::load(path)
            .with_context(|| format!("failed to load tuning from {}", path.display()))?,
        None => tank_arena_core::Tuning::default(),
    };
    let stage = match &args.stage {
        Some(path) => stage_file::load(path)
            .with_context(|| format!("failed to load stage from {}", path.display()))?,
        None => stage_file::parse(stage_file::DEFAULT_STAGE)
            .context("built-in stage is malformed")?,
    };

    let event = args.event.resolve(args.seed);
    if let Some(event) = event {
        log::info!("random event: {event}");
    }

    let mut events = Vec::new();
    let mut session = Session::new(
        stage,
        tuning,
        SessionConfig {
            bots: args.bots,
            seed: args.seed,
            autopilot: args.autopilot,
            tank_type: args.tank_type,
            event,
        },
        &mut events,
    )?;
    log::info!(
        "running {} ticks of {} ms with seed {}",
        args.ticks,
        args.frame_ms,
        args.seed
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frame = Duration::from_millis(args.frame_ms);

    // The first frame only primes the clock.
    for index in 0..=args.ticks {
        let now = frame.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
        let outcome = session.frame(now, &mut events);
        if args.json {
            for event in events.drain(..) {
                serde_json::to_writer(&mut out, &event)?;
                writeln!(out)?;
            }
        } else {
            events.clear();
        }
        if outcome != Outcome::Running {
            break;
        }
    }

    if args.json {
        let report = Report {
            outcome: session.outcome(),
            event,
            summary: session.summary(),
        };
        serde_json::to_writer(&mut out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", session.outcome())?;
        writeln!(out, "{}", session.summary())?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}
