#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick scheduler that runs every controller against one consistent world snapshot.
//!
//! A step applies the tick, lets movement, fire, ballistics, the special bots
//! and the stage's random event read the same immutable world and only then
//! applies the commands they proposed, in the order they were emitted. No controller ever observes another controller's
//! writes from the same tick.

use std::time::Duration;

use tank_arena_core::{Command, Event, TankInputs, Tuning};
use tank_arena_system_ballistics::Ballistics;
use tank_arena_system_fire::Fire;
use tank_arena_system_movement::Movement;
use tank_arena_system_random_events::{RandomEvent, RandomEvents};
use tank_arena_system_special_tanks::SpecialTanks;
use tank_arena_world::{self as world, query, World};

mod clock;

pub use clock::TickClock;

/// Owns the controllers and sequences them once per tick.
#[derive(Debug)]
pub struct Scheduler {
    movement: Movement,
    fire: Fire,
    ballistics: Ballistics,
    special_tanks: SpecialTanks,
    random_events: RandomEvents,
    backlog: Vec<Event>,
    commands: Vec<Command>,
}

impl Scheduler {
    /// Creates a scheduler whose controllers share `tuning`.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            movement: Movement::new(tuning.clone()),
            fire: Fire::new(tuning.clone()),
            ballistics: Ballistics::new(tuning),
            special_tanks: SpecialTanks::new(),
            random_events: RandomEvents::default(),
            backlog: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Runs `event` on every stage, drawing its randomness from `seed`.
    #[must_use]
    pub fn with_random_event(mut self, event: Option<RandomEvent>, seed: u64) -> Self {
        self.random_events = RandomEvents::new(event, seed);
        self
    }

    /// Applies a command from outside the tick loop, such as a stage load or spawn.
    ///
    /// The resulting events are forwarded to `out_events` and replayed to the
    /// controllers on the next step.
    pub fn apply(&mut self, world: &mut World, command: Command, out_events: &mut Vec<Event>) {
        let start = out_events.len();
        world::apply(world, command, out_events);
        self.backlog.extend_from_slice(&out_events[start..]);
    }

    /// Advances the simulation by `dt`.
    pub fn step(
        &mut self,
        world: &mut World,
        dt: Duration,
        inputs: &TankInputs,
        out_events: &mut Vec<Event>,
    ) {
        let mut events = std::mem::take(&mut self.backlog);
        let tick_start = events.len();
        world::apply(world, Command::Tick { dt }, &mut events);

        self.commands.clear();
        {
            let snapshot: &World = world;
            let tanks = query::tank_view(snapshot);
            let bullets = query::bullet_view(snapshot);
            self.movement
                .handle(&events, snapshot, inputs, &mut self.commands);
            self.fire.handle(
                &events,
                &tanks,
                &bullets,
                query::bots_frozen(snapshot),
                inputs,
                &mut self.commands,
            );
            self.ballistics
                .handle(&events, snapshot, &mut self.commands);
            self.special_tanks
                .handle(&events, snapshot, &mut self.commands);
            self.random_events
                .handle(&events, snapshot, &mut self.commands);
        }
        log::trace!(
            "tick {} proposed {} commands",
            query::tick_index(world),
            self.commands.len()
        );

        out_events.extend_from_slice(&events[tick_start..]);
        let produced_start = out_events.len();
        for command in self.commands.drain(..) {
            world::apply(world, command, out_events);
        }
        self.backlog.extend_from_slice(&out_events[produced_start..]);
    }

    /// Movement controller, exposing per-tank movement phases.
    #[must_use]
    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    /// Fire controller, exposing per-tank weapon phases.
    #[must_use]
    pub fn fire(&self) -> &Fire {
        &self.fire
    }

    /// Random event controller of the stage.
    #[must_use]
    pub fn random_events(&self) -> &RandomEvents {
        &self.random_events
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}
