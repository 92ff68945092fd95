#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that drives tanks forward and snaps turns to the grid.
//!
//! Every decision is made against the world as it stood at the start of the
//! tick. The system never mutates the world; it only proposes commands.

use std::{collections::BTreeMap, time::Duration};

use tank_arena_core::{
    ceil8, elapsed, floor8, millis, move_speed, round8, Axis, Command, Direction, Event,
    MovementInput, Side, TankId, TankInputs, TankSnapshot, Tuning, BLOCK_SIZE,
    DEFAULT_THRESHOLD,
};
use tank_arena_world::{query, World};

/// Movement phase of a tank as observed after the last processed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementState {
    /// Standing still without pending input.
    Idle,
    /// Advancing along the current facing.
    Moving,
    /// Changed facing during the last tick.
    Turning,
    /// Prevented from driving forward by a freeze.
    Frozen,
}

/// Pure system that reacts to time advancing and emits movement commands.
#[derive(Debug)]
pub struct Movement {
    tuning: Tuning,
    states: BTreeMap<TankId, MovementState>,
}

impl Movement {
    /// Creates a movement system that reads its speed modifiers from `tuning`.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            states: BTreeMap::new(),
        }
    }

    /// Consumes world events and the tick's inputs to emit movement commands.
    ///
    /// Nothing happens unless `events` contains a `TimeAdvanced` event.
    pub fn handle(
        &mut self,
        events: &[Event],
        world: &World,
        inputs: &TankInputs,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::StageLoaded => self.states.clear(),
                Event::TankKilled { tank } => {
                    let _ = self.states.remove(tank);
                }
                _ => {}
            }
        }

        let dt = elapsed(events);
        if dt.is_zero() {
            return;
        }

        let bots_frozen = query::bots_frozen(world);
        let slowdown = query::slowdown_active(world);
        for tank in query::tank_view(world).iter().filter(|tank| tank.alive) {
            let mut planner = TankPlanner {
                world,
                tuning: &self.tuning,
                tank,
                frozen: !tank.frozen_timeout.is_zero()
                    || (bots_frozen && tank.side == Side::Bot),
                slowdown,
                out: &mut *out,
            };
            let state = planner.plan(dt, inputs.get(tank.id).movement);
            let _ = self.states.insert(tank.id, state);

            if !tank.frozen_timeout.is_zero() {
                out.push(Command::SetFrozenTimeout {
                    tank: tank.id,
                    timeout: tank.frozen_timeout.saturating_sub(dt),
                });
            }
        }
    }

    /// Movement phase the tank ended the last tick in.
    #[must_use]
    pub fn state_of(&self, tank: TankId) -> Option<MovementState> {
        self.states.get(&tank).copied()
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

/// Snaps `tank`'s coordinate on `axis` to the grid without entering an obstacle.
///
/// Both the floor-aligned and the ceil-aligned candidate are tested. When only
/// one is legal it wins, when both are legal the nearest one wins, and when
/// neither is legal `None` is returned.
#[must_use]
pub fn reserve(world: &World, tank: &TankSnapshot, axis: Axis) -> Option<f32> {
    let coordinate = tank.coordinate(axis);
    let floor = floor8(coordinate);
    let ceil = ceil8(coordinate);
    let legal = |value| query::can_move(world, &tank.with_coordinate(axis, value), DEFAULT_THRESHOLD);
    let floor_legal = legal(floor);
    let ceil_legal = legal(ceil);

    match (floor_legal, ceil_legal) {
        (true, true) => Some(round8(coordinate)),
        (true, false) => Some(floor),
        (false, true) => Some(ceil),
        (false, false) => None,
    }
}

struct TankPlanner<'a> {
    world: &'a World,
    tuning: &'a Tuning,
    tank: &'a TankSnapshot,
    frozen: bool,
    slowdown: bool,
    out: &'a mut Vec<Command>,
}

impl TankPlanner<'_> {
    fn plan(&mut self, dt: Duration, input: Option<MovementInput>) -> MovementState {
        match input {
            None => {
                if self.tank.moving {
                    let base = self.slide();
                    self.out.push(Command::StopMove { tank: base.id });
                }
                self.resting_state()
            }
            Some(MovementInput::Turn(direction)) => self.turn(direction),
            Some(MovementInput::Forward { max_distance }) => {
                if let Some(limit) = max_distance {
                    let valid = limit >= 0.0;
                    debug_assert!(valid, "invalid forward distance {limit}");
                    if !valid {
                        log::warn!(
                            "ignoring forward input with distance {limit} for tank {}",
                            self.tank.id.get()
                        );
                        return self.resting_state();
                    }
                }
                self.forward(dt, max_distance)
            }
        }
    }

    fn resting_state(&self) -> MovementState {
        if self.frozen {
            MovementState::Frozen
        } else {
            MovementState::Idle
        }
    }

    fn forward(&mut self, dt: Duration, max_distance: Option<f32>) -> MovementState {
        let paralysis_blocks =
            self.tuning.paralysis_blocks_movement && self.tank.energy.paralyzed();
        if self.frozen || paralysis_blocks {
            if self.tank.moving {
                self.out.push(Command::StopMove { tank: self.tank.id });
            }
            return self.resting_state();
        }

        let mut speed = move_speed(self.tank.side, self.tank.level, self.tank.tank_type);
        if self.slowdown {
            speed *= self.tuning.slowdown_factor;
        }
        let distance = max_distance.map_or(millis(dt) * speed, |limit| {
            (millis(dt) * speed).min(limit)
        });

        let moved = self.tank.advanced(distance);
        if !query::can_move(self.world, &moved, DEFAULT_THRESHOLD) {
            log::trace!("tank {} blocked", self.tank.id.get());
            return if self.tank.moving {
                MovementState::Moving
            } else {
                MovementState::Idle
            };
        }

        self.commit_move(&moved);
        if !self.tank.moving {
            self.out.push(Command::StartMove { tank: self.tank.id });
        }
        MovementState::Moving
    }

    fn turn(&mut self, direction: Direction) -> MovementState {
        if direction == self.tank.direction {
            return if self.tank.moving {
                MovementState::Moving
            } else {
                self.resting_state()
            };
        }

        if direction == self.tank.direction.reversed() {
            self.out.push(Command::MoveTank {
                tank: self.tank.id,
                x: self.tank.x,
                y: self.tank.y,
                direction,
                reserved_x: self.tank.reserved_x,
                reserved_y: self.tank.reserved_y,
            });
            return MovementState::Turning;
        }

        let base = self.slide();
        let axis = base.direction.axis();
        let Some(snapped) = reserve(self.world, &base, axis) else {
            log::trace!("tank {} cannot turn {direction:?}", base.id.get());
            return self.resting_state();
        };

        let mut turned = base.with_coordinate(axis, snapped);
        turned.direction = direction;
        self.out.push(Command::MoveTank {
            tank: turned.id,
            x: turned.x,
            y: turned.y,
            direction,
            reserved_x: turned.x,
            reserved_y: turned.y,
        });
        MovementState::Turning
    }

    /// Icy slide of one block taken before stopping or turning under slowdown.
    fn slide(&mut self) -> TankSnapshot {
        if !self.slowdown || !self.tank.moving {
            return self.tank.clone();
        }
        let slid = self.tank.advanced(BLOCK_SIZE);
        if !query::can_move(self.world, &slid, DEFAULT_THRESHOLD) {
            return self.tank.clone();
        }
        self.commit_move(&slid);
        slid
    }

    fn commit_move(&mut self, moved: &TankSnapshot) {
        let axis = moved.direction.axis();
        let reserved = reserve(self.world, moved, axis).unwrap_or(moved.coordinate(axis));
        let reserved_tank = moved.with_coordinate(axis, reserved);
        self.out.push(Command::MoveTank {
            tank: moved.id,
            x: moved.x,
            y: moved.y,
            direction: moved.direction,
            reserved_x: reserved_tank.x,
            reserved_y: reserved_tank.y,
        });
    }
}
