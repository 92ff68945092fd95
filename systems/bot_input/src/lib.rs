#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded input provider that drives bot tanks during headless runs.
//!
//! Bots keep driving forward, occasionally pick a new heading, turn away when
//! they stop making progress and pull the trigger at random. The same seed
//! always yields the same input stream for the same world history.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tank_arena_core::{
    Direction, MovementInput, Side, TankId, TankInput, TankInputs, TankSnapshot, TankView,
};

/// Probabilities steering the bots' random decisions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BotBehaviour {
    /// Chance per tick that a bot picks a new heading unprompted.
    pub turn_chance: f64,
    /// Chance per tick that a bot holds the trigger.
    pub fire_chance: f64,
}

impl BotBehaviour {
    /// Returns a copy with both chances forced into `[0, 1]`; NaN counts as never.
    #[must_use]
    pub fn clamped(self) -> Self {
        let chance = |value: f64| {
            if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, 1.0)
            }
        };
        Self {
            turn_chance: chance(self.turn_chance),
            fire_chance: chance(self.fire_chance),
        }
    }
}

impl Default for BotBehaviour {
    fn default() -> Self {
        Self {
            turn_chance: 0.02,
            fire_chance: 0.05,
        }
    }
}

/// Random but reproducible bot controller.
#[derive(Debug)]
pub struct BotInput {
    rng: ChaCha8Rng,
    behaviour: BotBehaviour,
    last_positions: BTreeMap<TankId, (f32, f32)>,
}

impl BotInput {
    /// Creates a bot controller with the default behaviour.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_behaviour(seed, BotBehaviour::default())
    }

    /// Creates a bot controller with custom decision probabilities.
    ///
    /// Chances outside `[0, 1]` are clamped.
    #[must_use]
    pub fn with_behaviour(seed: u64, behaviour: BotBehaviour) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            behaviour: behaviour.clamped(),
            last_positions: BTreeMap::new(),
        }
    }

    /// Records an input for every living bot in `tanks`.
    ///
    /// Player tanks are left untouched so human or scripted input can be
    /// merged into the same set.
    pub fn fill(&mut self, tanks: &TankView, inputs: &mut TankInputs) {
        self.last_positions
            .retain(|id, _| tanks.get(*id).is_some_and(|tank| tank.alive));

        for tank in tanks
            .iter()
            .filter(|tank| tank.alive && tank.side == Side::Bot)
        {
            let input = self.drive(tank);
            inputs.set(tank.id, input);
        }
    }

    /// Decides the input for a single tank regardless of its side.
    ///
    /// Used to put a player tank on autopilot.
    pub fn drive(&mut self, tank: &TankSnapshot) -> TankInput {
        let position = (tank.x, tank.y);
        let stuck = tank.frozen_timeout.is_zero()
            && self.last_positions.insert(tank.id, position) == Some(position);

        let movement = if stuck || self.rng.gen_bool(self.behaviour.turn_chance) {
            let _ = self.last_positions.remove(&tank.id);
            MovementInput::Turn(self.new_heading(tank.direction))
        } else {
            MovementInput::forward()
        };

        TankInput {
            movement: Some(movement),
            fire: self.rng.gen_bool(self.behaviour.fire_chance),
        }
    }

    fn new_heading(&mut self, current: Direction) -> Direction {
        let choices: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| *direction != current)
            .collect();
        choices[self.rng.gen_range(0..choices.len())]
    }
}
