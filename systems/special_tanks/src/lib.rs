#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted behaviours of special bots.
//!
//! Suicide bots blow themselves up once they close in on a player or the
//! eagle. Stealth bots cycle between a visible phase and a hidden phase in
//! which they neither move nor shoot. All timers live on the tank snapshots,
//! so the system itself keeps no state between ticks.

use std::time::Duration;

use tank_arena_core::{elapsed, Command, Event, Side, TankLevel, TankSnapshot, BLOCK_SIZE};
use tank_arena_world::{query, World};

/// Distance along each axis at which a suicide bot detonates next to a player.
const PLAYER_TRIGGER_RANGE: f32 = 3.0 * BLOCK_SIZE;
/// Distance along each axis at which a suicide bot detonates next to the eagle.
const EAGLE_TRIGGER_RANGE: f32 = 2.0 * BLOCK_SIZE;
/// Time a stealth bot stays hidden.
pub const STEALTH_DURATION: Duration = Duration::from_millis(3_000);
/// Time a stealth bot stays visible before vanishing again.
pub const STEALTH_COOLDOWN: Duration = Duration::from_millis(5_000);

/// Drives every alive suicide and stealth bot.
#[derive(Debug, Default)]
pub struct SpecialTanks;

impl SpecialTanks {
    /// Creates the special-bot system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the world snapshot to emit special-bot commands.
    ///
    /// Nothing happens unless `events` contains a `TimeAdvanced` event.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        let dt = elapsed(events);
        if dt.is_zero() {
            return;
        }

        let tanks = query::tank_view(world);
        let players: Vec<&TankSnapshot> = tanks
            .iter()
            .filter(|tank| tank.alive && tank.side == Side::Player)
            .collect();
        let eagle = query::terrain(world).eagle();

        for bot in tanks
            .iter()
            .filter(|tank| tank.alive && tank.side == Side::Bot)
        {
            match bot.level {
                TankLevel::Suicide => {
                    let near_player = players.iter().any(|player| {
                        within(bot, player.x, player.y, PLAYER_TRIGGER_RANGE)
                    });
                    let near_eagle = eagle
                        .is_some_and(|eagle| within(bot, eagle.x, eagle.y, EAGLE_TRIGGER_RANGE));
                    if near_player || near_eagle {
                        log::debug!("suicide bot {} detonated", bot.id.get());
                        out.push(Command::SetTankToDead { tank: bot.id });
                    }
                }
                TankLevel::Stealth => stealth(bot, dt, out),
                _ => {}
            }
        }
    }
}

fn within(tank: &TankSnapshot, x: f32, y: f32, range: f32) -> bool {
    (tank.x - x).abs() < range && (tank.y - y).abs() < range
}

fn stealth(bot: &TankSnapshot, dt: Duration, out: &mut Vec<Command>) {
    let (invisible_timeout, invisible_cooldown) = if !bot.invisible_timeout.is_zero() {
        let left = bot.invisible_timeout.saturating_sub(dt);
        if left.is_zero() {
            (Duration::ZERO, STEALTH_COOLDOWN)
        } else {
            (left, bot.invisible_cooldown)
        }
    } else if !bot.invisible_cooldown.is_zero() {
        (Duration::ZERO, bot.invisible_cooldown.saturating_sub(dt))
    } else {
        // Hidden bots hold still and hold fire for the whole phase.
        out.push(Command::SetFrozenTimeout {
            tank: bot.id,
            timeout: STEALTH_DURATION,
        });
        out.push(Command::SetCooldown {
            tank: bot.id,
            cooldown: STEALTH_DURATION,
        });
        (STEALTH_DURATION, Duration::ZERO)
    };

    out.push(Command::SetStealth {
        tank: bot.id,
        invisible_timeout,
        invisible_cooldown,
    });
}
