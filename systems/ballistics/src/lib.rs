#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances bullets and resolves what they hit.
//!
//! Bullets are tested along the segment they travel during the tick, so fast
//! bullets cannot tunnel through thin walls on long frames.

use std::collections::BTreeSet;

use tank_arena_core::{
    elapsed, is_in_field, millis, test_collide, BulletId, BulletSnapshot, Command, Direction,
    Event, Rect, Side, TankView, TerrainLayer, Tuning, DEFAULT_THRESHOLD,
};
use tank_arena_world::{query, Terrain, World};

/// Width of the strip of bricks a bullet knocks out on impact.
const IMPACT_WIDTH: f32 = 8.0;
/// Power a bullet needs to break steel.
const STEEL_BREAKING_POWER: u32 = 3;

/// Ballistics system that moves bullets and emits impact commands.
#[derive(Debug)]
pub struct Ballistics {
    tuning: Tuning,
    resolved: BTreeSet<BulletId>,
}

impl Ballistics {
    /// Creates a ballistics system using the friendly-fire settings in `tuning`.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            resolved: BTreeSet::new(),
        }
    }

    /// Consumes world events and the world snapshot to emit bullet commands.
    ///
    /// Nothing happens unless `events` contains a `TimeAdvanced` event.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        let dt = millis(elapsed(events));
        if dt <= 0.0 {
            return;
        }

        let flights: Vec<Flight> = query::bullet_view(world)
            .into_vec()
            .into_iter()
            .map(|bullet| Flight::new(bullet, dt))
            .collect();
        self.resolved.clear();

        self.annihilate(&flights, out);

        let tanks = query::tank_view(world);
        let terrain = query::terrain(world);
        for flight in &flights {
            if self.resolved.contains(&flight.bullet.id) {
                continue;
            }
            let commands_before = out.len();
            let hit = self.hit_terrain(flight, terrain, out)
                || self.hit_tank(flight, &tanks, out);
            if hit || !is_in_field(&flight.landing) {
                out.push(Command::RemoveBullet {
                    bullet: flight.bullet.id,
                });
                let _ = self.resolved.insert(flight.bullet.id);
                log::trace!(
                    "bullet {} resolved with {} commands",
                    flight.bullet.id.get(),
                    out.len() - commands_before
                );
            } else {
                out.push(Command::MoveBullet {
                    bullet: flight.bullet.id,
                    x: flight.landing.x,
                    y: flight.landing.y,
                });
            }
        }
    }

    fn annihilate(&mut self, flights: &[Flight], out: &mut Vec<Command>) {
        for (index, first) in flights.iter().enumerate() {
            for second in &flights[index + 1..] {
                if first.bullet.side == second.bullet.side
                    || self.resolved.contains(&first.bullet.id)
                    || self.resolved.contains(&second.bullet.id)
                {
                    continue;
                }
                if test_collide(&first.swept, &second.swept, DEFAULT_THRESHOLD) {
                    for bullet in [first.bullet.id, second.bullet.id] {
                        out.push(Command::RemoveBullet { bullet });
                        let _ = self.resolved.insert(bullet);
                    }
                }
            }
        }
    }

    fn hit_terrain(&self, flight: &Flight, terrain: &Terrain, out: &mut Vec<Command>) -> bool {
        let swept = &flight.swept;
        let power = flight.bullet.power;
        let hits_bricks = terrain.collides(TerrainLayer::Brick, swept, DEFAULT_THRESHOLD);
        let hits_steel = terrain.collides(TerrainLayer::Steel, swept, DEFAULT_THRESHOLD);
        let hits_glass = terrain.collides(TerrainLayer::Glass, swept, DEFAULT_THRESHOLD);
        let hits_mountain = terrain.collides(TerrainLayer::Mountain, swept, DEFAULT_THRESHOLD);

        if hits_bricks || hits_steel || hits_glass || hits_mountain {
            let impact = flight.impact();
            // Glass shatters under any bullet; mountains are never damaged.
            let glasses = terrain.colliding_cells(TerrainLayer::Glass, &impact, DEFAULT_THRESHOLD);
            if !glasses.is_empty() {
                out.push(Command::RemoveGlasses { cells: glasses });
            }
            let bricks = terrain.colliding_cells(TerrainLayer::Brick, &impact, DEFAULT_THRESHOLD);
            if !bricks.is_empty() {
                out.push(Command::RemoveBricks { cells: bricks });
            }
            if power >= STEEL_BREAKING_POWER {
                let steels =
                    terrain.colliding_cells(TerrainLayer::Steel, &impact, DEFAULT_THRESHOLD);
                if !steels.is_empty() {
                    out.push(Command::RemoveSteels { cells: steels });
                }
            }
            return true;
        }

        match terrain.eagle() {
            Some(eagle) if !eagle.broken && test_collide(&eagle.rect(), swept, DEFAULT_THRESHOLD) => {
                out.push(Command::DestroyEagle);
                true
            }
            _ => false,
        }
    }

    fn hit_tank(&self, flight: &Flight, tanks: &TankView, out: &mut Vec<Command>) -> bool {
        let bullet = &flight.bullet;
        let target = tanks.iter().find(|tank| {
            tank.alive
                && tank.id != bullet.owner
                && !(tank.side == Side::Bot && bullet.side == Side::Bot)
                && test_collide(&tank.rect(), &flight.swept, DEFAULT_THRESHOLD)
        });
        let Some(target) = target else {
            return false;
        };

        if target.side == bullet.side {
            out.push(Command::SetFrozenTimeout {
                tank: target.id,
                timeout: self.tuning.friendly_fire_freeze(),
            });
        } else {
            out.push(Command::HurtTank {
                tank: target.id,
                attacker: bullet.owner,
            });
        }
        true
    }
}

impl Default for Ballistics {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

#[derive(Debug)]
struct Flight {
    bullet: BulletSnapshot,
    landing: Rect,
    swept: Rect,
}

impl Flight {
    fn new(bullet: BulletSnapshot, dt: f32) -> Self {
        let distance = bullet.speed * dt;
        let (dx, dy) = match bullet.direction {
            Direction::Up => (0.0, -distance),
            Direction::Down => (0.0, distance),
            Direction::Left => (-distance, 0.0),
            Direction::Right => (distance, 0.0),
        };
        let landing = Rect::bullet_at(bullet.x + dx, bullet.y + dy);
        let swept = bullet.rect().union(&landing);
        Self {
            bullet,
            landing,
            swept,
        }
    }

    /// Area of wall knocked out by the bullet.
    ///
    /// The strip is widened across the travel axis and reaches one extra brick
    /// layer deeper for every point of power above one.
    fn impact(&self) -> Rect {
        let depth = self.bullet.power.saturating_sub(1) as f32 * TerrainLayer::Brick.cell_size();
        let swept = self.swept;
        let centre_x = swept.x + swept.width / 2.0;
        let centre_y = swept.y + swept.height / 2.0;
        match self.bullet.direction {
            Direction::Up => Rect::new(
                centre_x - IMPACT_WIDTH / 2.0,
                swept.y - depth,
                IMPACT_WIDTH,
                swept.height + depth,
            ),
            Direction::Down => Rect::new(
                centre_x - IMPACT_WIDTH / 2.0,
                swept.y,
                IMPACT_WIDTH,
                swept.height + depth,
            ),
            Direction::Left => Rect::new(
                swept.x - depth,
                centre_y - IMPACT_WIDTH / 2.0,
                swept.width + depth,
                IMPACT_WIDTH,
            ),
            Direction::Right => Rect::new(
                swept.x,
                centre_y - IMPACT_WIDTH / 2.0,
                swept.width + depth,
                IMPACT_WIDTH,
            ),
        }
    }
}
