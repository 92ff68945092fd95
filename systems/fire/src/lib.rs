#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns fire triggers into bullets, cooldowns and energy updates.
//!
//! Each tank runs a small state machine over its cooldown and energy gauge.
//! Ordinary shots cost a little energy; holding the trigger with a charged
//! gauge starts an overcharge that ends in a burst followed by paralysis.

use std::{collections::BTreeMap, time::Duration};

use tank_arena_core::{
    bullet_interval, bullet_limit, bullet_power, bullet_speed, elapsed, BulletSpawn, BulletView,
    Command, Direction, EnergyState, Event, Side, TankId, TankInputs, TankSnapshot, TankView,
    Tuning, MAX_ENERGY,
};

/// Weapon phase of a tank after the last processed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireState {
    /// May fire immediately.
    Ready,
    /// Waiting for the cooldown to elapse.
    Cooling,
    /// Charging an overcharged burst.
    Overcharging,
    /// Locked out after an overcharge.
    Paralyzed,
}

impl FireState {
    fn classify(cooldown: Duration, energy: &EnergyState) -> Self {
        if energy.paralyzed() {
            Self::Paralyzed
        } else if energy.overcharging {
            Self::Overcharging
        } else if !cooldown.is_zero() {
            Self::Cooling
        } else {
            Self::Ready
        }
    }
}

/// Fire system that emits bullet and energy commands for every armed tank.
#[derive(Debug)]
pub struct Fire {
    tuning: Tuning,
    states: BTreeMap<TankId, FireState>,
    scratch: Vec<Command>,
}

impl Fire {
    /// Creates a fire system using the provided energy tuning.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            states: BTreeMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Consumes world events and immutable views to emit fire commands.
    ///
    /// Nothing happens unless `events` contains a `TimeAdvanced` event.
    pub fn handle(
        &mut self,
        events: &[Event],
        tanks: &TankView,
        bullets: &BulletView,
        bots_frozen: bool,
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

        self.scratch.clear();
        for tank in tanks.iter().filter(|tank| tank.alive) {
            let trigger = Trigger {
                held: inputs.get(tank.id).fire,
                bots_frozen,
                in_flight: bullets.in_flight(tank.id),
            };
            self.update_tank(tank, trigger, dt);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Weapon phase the tank ended the last tick in.
    #[must_use]
    pub fn state_of(&self, tank: TankId) -> Option<FireState> {
        self.states.get(&tank).copied()
    }

    fn update_tank(&mut self, tank: &TankSnapshot, trigger: Trigger, dt: Duration) {
        let mut cooldown = tank.cooldown.saturating_sub(dt);
        let mut energy = tank.energy;
        energy.paralysis_remaining = energy.paralysis_remaining.saturating_sub(dt);

        let locked =
            tank.energy.paralyzed() || (trigger.bots_frozen && tank.side == Side::Bot);
        if !locked {
            if energy.overcharging {
                if trigger.held {
                    self.continue_charge(tank, &mut energy, dt);
                } else {
                    log::debug!("tank {} released an overcharge", tank.id.get());
                    self.enter_paralysis(&mut energy);
                }
            } else if trigger.held {
                if tank.side == Side::Player && energy.energy >= self.tuning.overcharge_threshold {
                    energy.overcharging = true;
                    energy.overcharge_remaining = self.tuning.overcharge_charge_time();
                } else if energy.energy >= self.tuning.ordinary_shot_cost
                    && cooldown.is_zero()
                    && trigger.in_flight < bullet_limit(tank.side, tank.level)
                {
                    self.scratch.push(Command::AddBullet {
                        bullet: bullet_from(tank, tank.muzzle(), false),
                    });
                    if tank.side == Side::Player {
                        self.scratch.push(Command::PlayShotSound { tank: tank.id });
                    }
                    energy.energy -= self.tuning.ordinary_shot_cost;
                    cooldown = bullet_interval(tank.level, tank.tank_type);
                }
            } else if !tank.moving {
                let regained = self.tuning.energy_regen_per_second * dt.as_secs_f32();
                energy.energy = (energy.energy + regained).min(MAX_ENERGY);
            }
        }

        if cooldown != tank.cooldown {
            self.scratch.push(Command::SetCooldown {
                tank: tank.id,
                cooldown,
            });
        }
        let energy = energy.clamped();
        let _ = self
            .states
            .insert(tank.id, FireState::classify(cooldown, &energy));
        if energy != tank.energy {
            self.scratch.push(Command::UpdateTankEnergyState {
                tank: tank.id,
                energy,
            });
        }
    }

    fn continue_charge(&mut self, tank: &TankSnapshot, energy: &mut EnergyState, dt: Duration) {
        if energy.overcharge_remaining > dt {
            energy.overcharge_remaining -= dt;
            return;
        }

        let (x, y) = tank.muzzle();
        let count = self.tuning.burst_size;
        let centre = count.saturating_sub(1) as f32 / 2.0;
        for index in 0..count {
            let offset = (index as f32 - centre) * self.tuning.burst_spread;
            let muzzle = match tank.direction {
                Direction::Up | Direction::Down => (x + offset, y),
                Direction::Left | Direction::Right => (x, y + offset),
            };
            self.scratch.push(Command::AddBullet {
                bullet: bullet_from(tank, muzzle, true),
            });
        }
        if tank.side == Side::Player {
            self.scratch.push(Command::PlayShotSound { tank: tank.id });
        }
        log::debug!("tank {} fired an overcharged burst", tank.id.get());
        self.enter_paralysis(energy);
    }

    fn enter_paralysis(&self, energy: &mut EnergyState) {
        energy.energy = 0.0;
        energy.overcharging = false;
        energy.overcharge_remaining = Duration::ZERO;
        energy.paralysis_remaining = self.tuning.paralysis_time();
    }
}

impl Default for Fire {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

#[derive(Clone, Copy, Debug)]
struct Trigger {
    held: bool,
    bots_frozen: bool,
    in_flight: usize,
}

fn bullet_from(tank: &TankSnapshot, (x, y): (f32, f32), overcharged: bool) -> BulletSpawn {
    BulletSpawn {
        owner: tank.id,
        side: tank.side,
        direction: tank.direction,
        x,
        y,
        speed: bullet_speed(tank.side, tank.level, tank.tank_type),
        power: bullet_power(tank.side, tank.level, tank.tank_type),
        overcharged,
    }
}
