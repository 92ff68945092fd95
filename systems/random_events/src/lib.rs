#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stage-wide random events.
//!
//! A stage runs at most one event. A blizzard keeps the terrain-wide slowdown
//! on for the whole stage. Bombing announces a target every few seconds and
//! detonates it after a short warning, destroying tanks and soft terrain in
//! the blast. Targets and intervals come from a seeded stream so replays
//! stay deterministic.

use std::{fmt, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tank_arena_core::{
    elapsed, BombingTarget, Command, Event, TerrainLayer, BLOCK_SIZE, FIELD_BLOCKS,
};
use tank_arena_world::{query, Terrain, World};

/// Shortest pause between two air raids.
pub const MIN_BOMBING_INTERVAL: Duration = Duration::from_millis(6_000);
/// Longest pause between two air raids.
pub const MAX_BOMBING_INTERVAL: Duration = Duration::from_millis(10_000);
/// Time between announcing a target and the explosion.
pub const BOMBING_WARNING: Duration = Duration::from_millis(2_000);
/// Half-width of the square blast around the target centre.
pub const BLAST_RADIUS: f32 = 2.0 * BLOCK_SIZE;
/// Targets never land this close to the eagle's centre.
const EAGLE_CLEARANCE: f32 = 3.0 * BLOCK_SIZE;
const MAX_TARGET_ATTEMPTS: usize = 16;

/// Event that shapes a whole stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomEvent {
    /// Icy terrain: the slowdown stays on for the stage.
    Blizzard,
    /// Periodic air raids on random blocks.
    Bombing,
}

impl RandomEvent {
    /// Draws one event from a seeded stream.
    #[must_use]
    pub fn pick(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        if rng.gen_bool(0.5) {
            Self::Blizzard
        } else {
            Self::Bombing
        }
    }
}

impl fmt::Display for RandomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blizzard => f.write_str("blizzard"),
            Self::Bombing => f.write_str("bombing"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Raid {
    Waiting(Duration),
    Warning {
        target: BombingTarget,
        remaining: Duration,
    },
}

/// System that runs the stage's random event, if any.
#[derive(Debug)]
pub struct RandomEvents {
    event: Option<RandomEvent>,
    rng: ChaCha8Rng,
    raid: Raid,
}

impl RandomEvents {
    /// Creates the system for `event`; `None` disables random events.
    #[must_use]
    pub fn new(event: Option<RandomEvent>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let raid = Raid::Waiting(interval(&mut rng));
        Self { event, rng, raid }
    }

    /// Event this system runs.
    #[must_use]
    pub fn event(&self) -> Option<RandomEvent> {
        self.event
    }

    /// Consumes world events and the world snapshot to emit event commands.
    ///
    /// Nothing happens unless `events` contains a `TimeAdvanced` event.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        if events.contains(&Event::StageLoaded) {
            self.raid = Raid::Waiting(interval(&mut self.rng));
        }

        let dt = elapsed(events);
        if dt.is_zero() {
            return;
        }

        match self.event {
            None => {}
            Some(RandomEvent::Blizzard) => {
                if !query::slowdown_active(world) {
                    out.push(Command::SetSlowdown { active: true });
                }
            }
            Some(RandomEvent::Bombing) => self.bombing(dt, world, out),
        }
    }

    fn bombing(&mut self, dt: Duration, world: &World, out: &mut Vec<Command>) {
        let raid = self.raid;
        self.raid = match raid {
            Raid::Waiting(remaining) if remaining > dt => Raid::Waiting(remaining - dt),
            Raid::Waiting(_) => match self.pick_target(query::terrain(world)) {
                Some(target) => {
                    log::debug!("air raid targets ({}, {})", target.x, target.y);
                    out.push(Command::SetBombingTarget {
                        target: Some(target),
                    });
                    Raid::Warning {
                        target,
                        remaining: BOMBING_WARNING,
                    }
                }
                None => Raid::Waiting(interval(&mut self.rng)),
            },
            Raid::Warning { target, remaining } if remaining > dt => Raid::Warning {
                target,
                remaining: remaining - dt,
            },
            Raid::Warning { target, .. } => {
                explode(&target, world, out);
                out.push(Command::SetBombingTarget { target: None });
                Raid::Waiting(interval(&mut self.rng))
            }
        };
    }

    fn pick_target(&mut self, terrain: &Terrain) -> Option<BombingTarget> {
        let eagle = terrain.eagle();
        (0..MAX_TARGET_ATTEMPTS).find_map(|_| {
            let column = self.rng.gen_range(0..FIELD_BLOCKS);
            let row = self.rng.gen_range(0..FIELD_BLOCKS);
            let target = BombingTarget {
                x: (column as f32 + 0.5) * BLOCK_SIZE,
                y: (row as f32 + 0.5) * BLOCK_SIZE,
            };
            let near_eagle = eagle.is_some_and(|eagle| {
                let (x, y) = eagle.rect().centre();
                target.covers(x, y, EAGLE_CLEARANCE)
            });
            (!near_eagle).then_some(target)
        })
    }
}

impl Default for RandomEvents {
    fn default() -> Self {
        Self::new(None, 0)
    }
}

fn interval(rng: &mut ChaCha8Rng) -> Duration {
    rng.gen_range(MIN_BOMBING_INTERVAL..=MAX_BOMBING_INTERVAL)
}

/// Emits the damage of a blast centred on `target`.
///
/// Tanks under the blast are destroyed unless a helmet protects them. Brick,
/// glass and forest cells whose centres lie in the blast are cleared; steel
/// and mountains withstand it.
fn explode(target: &BombingTarget, world: &World, out: &mut Vec<Command>) {
    for tank in query::tank_view(world).iter().filter(|tank| tank.alive) {
        let (x, y) = tank.rect().centre();
        if target.covers(x, y, BLAST_RADIUS) && tank.helmet_duration.is_zero() {
            out.push(Command::SetTankToDead { tank: tank.id });
        }
    }

    let terrain = query::terrain(world);
    let cells = |layer: TerrainLayer| -> Vec<usize> {
        (0..layer.cell_count())
            .filter(|index| terrain.is_set(layer, *index))
            .filter(|index| {
                let (x, y) = layer.cell_rect(*index).centre();
                target.covers(x, y, BLAST_RADIUS)
            })
            .collect()
    };
    let bricks = cells(TerrainLayer::Brick);
    if !bricks.is_empty() {
        out.push(Command::RemoveBricks { cells: bricks });
    }
    let glasses = cells(TerrainLayer::Glass);
    if !glasses.is_empty() {
        out.push(Command::RemoveGlasses { cells: glasses });
    }
    let forests = cells(TerrainLayer::Forest);
    if !forests.is_empty() {
        out.push(Command::RemoveForests { cells: forests });
    }
}
