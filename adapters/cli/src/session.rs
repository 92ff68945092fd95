//! Headless battle session: stage, tanks, reinforcements and the tick loop.

use std::{fmt, time::Duration};

use anyhow::{bail, Result};
use serde::Serialize;
use tank_arena_core::{
    test_collide, AreaId, Command, Direction, Event, Rect, Side, StageMap, TankId, TankInputs,
    TankLevel, TankSpawn, TankType, Tuning, BLOCK_SIZE, DEFAULT_THRESHOLD,
};
use tank_arena_system_bot_input::BotInput;
use tank_arena_system_random_events::RandomEvent;
use tank_arena_system_scheduler::{Scheduler, TickClock};
use tank_arena_world::{query, World};

/// Corners where bots enter the field.
const BOT_SPAWN_POINTS: [(f32, f32); 3] = [
    (0.0, 0.0),
    (6.0 * BLOCK_SIZE, 0.0),
    (12.0 * BLOCK_SIZE, 0.0),
];
const BOT_LEVELS: [TankLevel; 6] = [
    TankLevel::Basic,
    TankLevel::Fast,
    TankLevel::Power,
    TankLevel::Armor,
    TankLevel::Suicide,
    TankLevel::Stealth,
];
const PLAYER_SPAWN: (f32, f32) = (4.0 * BLOCK_SIZE, 12.0 * BLOCK_SIZE);
const PLAYER_HELMET: Duration = Duration::from_secs(3);
/// Time a spawn point stays blocked before the bot appears.
const ARRIVAL_TIME: Duration = Duration::from_millis(1_000);
const MAX_ACTIVE_BOTS: usize = 3;

/// Parameters of a session that do not come from the stage or tuning.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionConfig {
    /// Total number of bots deployed over the battle.
    pub(crate) bots: u32,
    /// Seed for every random decision.
    pub(crate) seed: u64,
    /// Whether a seeded autopilot drives the player tank.
    pub(crate) autopilot: bool,
    /// Chassis of the player tank.
    pub(crate) tank_type: TankType,
    /// Random event running on the stage.
    pub(crate) event: Option<RandomEvent>,
}

/// How the battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    /// The battle is still going.
    Running,
    /// Every bot was destroyed.
    Victory,
    /// The eagle fell.
    EagleDestroyed,
    /// The player tank was destroyed.
    PlayerDestroyed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Running => "battle still running",
            Self::Victory => "victory",
            Self::EagleDestroyed => "defeat: eagle destroyed",
            Self::PlayerDestroyed => "defeat: player destroyed",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug)]
struct Arrival {
    area: AreaId,
    point: usize,
    level: TankLevel,
    remaining: Duration,
}

/// Running battle.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    scheduler: Scheduler,
    clock: TickClock,
    bots: BotInput,
    autopilot: Option<BotInput>,
    player: TankId,
    live_bots: Vec<TankId>,
    arrivals: Vec<Arrival>,
    bots_deployed: u32,
    bots_total: u32,
    next_area: u32,
    outcome: Outcome,
    summary: Summary,
}

impl Session {
    /// Loads the stage and places the player; bots start arriving on the first ticks.
    ///
    /// The setup events are appended to `out`.
    pub(crate) fn new(
        stage: StageMap,
        tuning: Tuning,
        config: SessionConfig,
        out: &mut Vec<Event>,
    ) -> Result<Self> {
        let mut world = World::new();
        let mut scheduler = Scheduler::new(tuning.clone())
            .with_random_event(config.event, config.seed.rotate_left(16) ^ 0xb0b);
        let mut events = Vec::new();

        scheduler.apply(&mut world, Command::LoadStage { stage }, &mut events);
        if !events.contains(&Event::StageLoaded) {
            bail!("the world rejected the stage");
        }

        let (x, y) = PLAYER_SPAWN;
        scheduler.apply(
            &mut world,
            Command::SpawnTank {
                spawn: TankSpawn::new(Side::Player, TankLevel::Basic, x, y)
                    .with_type(config.tank_type)
                    .with_helmet(PLAYER_HELMET),
            },
            &mut events,
        );
        let Some(player) = events.iter().find_map(|event| match event {
            Event::TankSpawned { tank } => Some(tank.id),
            _ => None,
        }) else {
            bail!("the player tank was not spawned");
        };

        let mut summary = Summary::default();
        summary.record(&events);
        out.extend(events);

        Ok(Self {
            world,
            scheduler,
            clock: TickClock::new(tuning.max_frame_delta()),
            bots: BotInput::new(config.seed),
            autopilot: config
                .autopilot
                .then(|| BotInput::new(config.seed.rotate_left(32) ^ 0x5eed)),
            player,
            live_bots: Vec::new(),
            arrivals: Vec::new(),
            bots_deployed: 0,
            bots_total: config.bots,
            next_area: 0,
            outcome: Outcome::Running,
            summary,
        })
    }

    /// Simulates the frame observed at `now`, appending the produced events to `out`.
    ///
    /// Returns the outcome after the frame.
    pub(crate) fn frame(&mut self, now: Duration, out: &mut Vec<Event>) -> Outcome {
        if self.outcome != Outcome::Running {
            return self.outcome;
        }
        let start = out.len();

        if let Some(dt) = self.clock.frame(now) {
            self.advance_arrivals(dt, out);
            self.schedule_arrivals(out);

            let inputs = self.inputs();
            self.scheduler.step(&mut self.world, dt, &inputs, out);
        }

        let produced = &out[start..];
        self.summary.record(produced);
        self.track(produced);
        self.outcome
    }

    /// Statistics gathered so far.
    pub(crate) fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Current outcome.
    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn inputs(&mut self) -> TankInputs {
        let tanks = query::tank_view(&self.world);
        let mut inputs = TankInputs::new();
        self.bots.fill(&tanks, &mut inputs);
        if let (Some(autopilot), Some(player)) =
            (self.autopilot.as_mut(), tanks.get(self.player))
        {
            if player.alive {
                inputs.set(player.id, autopilot.drive(player));
            }
        }
        inputs
    }

    fn schedule_arrivals(&mut self, out: &mut Vec<Event>) {
        while self.bots_deployed < self.bots_total
            && self.live_bots.len() + self.arrivals.len() < MAX_ACTIVE_BOTS
        {
            let point = self.bots_deployed as usize % BOT_SPAWN_POINTS.len();
            let (x, y) = BOT_SPAWN_POINTS[point];
            let area = Rect::tank_at(x, y);
            let occupied = query::tank_view(&self.world)
                .iter()
                .any(|tank| tank.alive && test_collide(&tank.rect(), &area, DEFAULT_THRESHOLD))
                || self.arrivals.iter().any(|arrival| arrival.point == point);
            if occupied {
                break;
            }

            let id = AreaId::new(self.next_area);
            self.next_area += 1;
            self.scheduler.apply(
                &mut self.world,
                Command::AddRestrictedArea { area: id, rect: area },
                out,
            );
            self.arrivals.push(Arrival {
                area: id,
                point,
                level: BOT_LEVELS[self.bots_deployed as usize % BOT_LEVELS.len()],
                remaining: ARRIVAL_TIME,
            });
            self.bots_deployed += 1;
        }
    }

    fn advance_arrivals(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for arrival in &mut self.arrivals {
            arrival.remaining = arrival.remaining.saturating_sub(dt);
        }
        let (ready, waiting): (Vec<Arrival>, Vec<Arrival>) = self
            .arrivals
            .drain(..)
            .partition(|arrival| arrival.remaining.is_zero());
        self.arrivals = waiting;

        for arrival in ready {
            let (x, y) = BOT_SPAWN_POINTS[arrival.point];
            self.scheduler.apply(
                &mut self.world,
                Command::RemoveRestrictedArea { area: arrival.area },
                out,
            );
            let start = out.len();
            self.scheduler.apply(
                &mut self.world,
                Command::SpawnTank {
                    spawn: TankSpawn::new(Side::Bot, arrival.level, x, y).facing(Direction::Down),
                },
                out,
            );
            if let Some(id) = out[start..].iter().find_map(|event| match event {
                Event::TankSpawned { tank } => Some(tank.id),
                _ => None,
            }) {
                log::debug!("bot {} entered at spawn point {}", id.get(), arrival.point);
                self.live_bots.push(id);
            }
        }
    }

    fn track(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TankKilled { tank } if *tank == self.player => {
                    self.outcome = Outcome::PlayerDestroyed;
                }
                Event::TankKilled { tank } => self.live_bots.retain(|id| id != tank),
                Event::EagleDestroyed => self.outcome = Outcome::EagleDestroyed,
                _ => {}
            }
        }
        if self.outcome == Outcome::Running
            && self.bots_deployed == self.bots_total
            && self.live_bots.is_empty()
            && self.arrivals.is_empty()
        {
            self.outcome = Outcome::Victory;
        }
        if self.outcome != Outcome::Running {
            log::info!("{}", self.outcome);
        }
    }
}

/// Running totals derived from the event stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Summary {
    ticks: u64,
    shots: u64,
    overcharged_shots: u64,
    tanks_destroyed: u64,
    hits: u64,
    bricks_destroyed: u64,
    steels_destroyed: u64,
    glasses_destroyed: u64,
    air_raids: u64,
    eagle_destroyed: bool,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.ticks += 1,
                Event::BulletFired { bullet } => {
                    self.shots += 1;
                    if bullet.overcharged {
                        self.overcharged_shots += 1;
                    }
                }
                Event::TankHurt { .. } => self.hits += 1,
                Event::TankKilled { .. } => self.tanks_destroyed += 1,
                Event::BricksDestroyed { cells } => self.bricks_destroyed += cells.len() as u64,
                Event::SteelsDestroyed { cells } => self.steels_destroyed += cells.len() as u64,
                Event::GlassesDestroyed { cells } => {
                    self.glasses_destroyed += cells.len() as u64;
                }
                Event::BombingTargetChanged { target: Some(_) } => self.air_raids += 1,
                Event::EagleDestroyed => self.eagle_destroyed = true,
                _ => {}
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated:   {}", self.ticks)?;
        writeln!(
            f,
            "bullets fired:     {} ({} overcharged)",
            self.shots, self.overcharged_shots
        )?;
        writeln!(f, "tank hits:         {}", self.hits)?;
        writeln!(f, "tanks destroyed:   {}", self.tanks_destroyed)?;
        writeln!(f, "bricks destroyed:  {}", self.bricks_destroyed)?;
        writeln!(f, "steel destroyed:   {}", self.steels_destroyed)?;
        writeln!(f, "glass destroyed:   {}", self.glasses_destroyed)?;
        writeln!(f, "air raids:         {}", self.air_raids)?;
        write!(
            f,
            "eagle:             {}",
            if self.eagle_destroyed { "destroyed" } else { "intact" }
        )
    }
}
