#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the tank arena.
//!
//! The world owns the entity store (tanks and bullets) and the terrain index.
//! It is mutated exclusively through [`apply`]; controllers only ever see it
//! through the read-only [`query`] functions.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use tank_arena_core::{
    initial_hp, BombingTarget, BulletId, BulletSnapshot, Command, EnergyState, Event, Side,
    TankId, TankSnapshot, TerrainLayer,
};

mod collision;
mod terrain;

pub use terrain::Terrain;

/// Represents the authoritative tank arena world state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    terrain: Terrain,
    tanks: BTreeMap<TankId, TankSnapshot>,
    bullets: BTreeMap<BulletId, BulletSnapshot>,
    next_tank_id: u32,
    next_bullet_id: u32,
    bot_frozen_timeout: Duration,
    slowdown: bool,
    bombing_target: Option<BombingTarget>,
    tick_index: u64,
}

impl World {
    /// Creates an empty world without terrain, tanks or bullets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_tank_id(&mut self) -> TankId {
        let id = TankId::new(self.next_tank_id);
        self.next_tank_id = self.next_tank_id.wrapping_add(1);
        id
    }

    fn allocate_bullet_id(&mut self) -> BulletId {
        let id = BulletId::new(self.next_bullet_id);
        self.next_bullet_id = self.next_bullet_id.wrapping_add(1);
        id
    }

    fn alive_tank_mut(&mut self, id: TankId) -> Option<&mut TankSnapshot> {
        let tank = self.tanks.get_mut(&id).filter(|tank| tank.alive);
        if tank.is_none() {
            log::debug!("ignoring command for missing or dead tank {}", id.get());
        }
        tank
    }

    fn kill(&mut self, id: TankId, out_events: &mut Vec<Event>) {
        let Some(tank) = self.alive_tank_mut(id) else {
            return;
        };

        tank.alive = false;
        tank.moving = false;
        tank.cooldown = Duration::ZERO;
        tank.frozen_timeout = Duration::ZERO;
        tank.helmet_duration = Duration::ZERO;
        tank.with_power_up = false;
        tank.invisible_timeout = Duration::ZERO;
        tank.invisible_cooldown = Duration::ZERO;
        tank.energy = EnergyState {
            overcharging: false,
            overcharge_remaining: Duration::ZERO,
            paralysis_remaining: Duration::ZERO,
            ..tank.energy
        };
        log::debug!("tank {} destroyed", id.get());
        out_events.push(Event::TankKilled { tank: id });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadStage { stage } => {
            if let Err(error) = stage.validate() {
                log::warn!("rejected stage: {error}");
                return;
            }
            world.terrain = Terrain::from_stage(stage);
            world.tanks.clear();
            world.bullets.clear();
            world.bot_frozen_timeout = Duration::ZERO;
            world.slowdown = false;
            world.bombing_target = None;
            out_events.push(Event::StageLoaded);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.bot_frozen_timeout = world.bot_frozen_timeout.saturating_sub(dt);
            for tank in world.tanks.values_mut().filter(|tank| tank.alive) {
                tank.helmet_duration = tank.helmet_duration.saturating_sub(dt);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnTank { spawn } => {
            let id = world.allocate_tank_id();
            let tank = TankSnapshot {
                id,
                side: spawn.side,
                level: spawn.level,
                tank_type: spawn.tank_type,
                x: spawn.x,
                y: spawn.y,
                direction: spawn.direction,
                alive: true,
                moving: false,
                reserved_x: spawn.x,
                reserved_y: spawn.y,
                hp: initial_hp(spawn.level),
                with_power_up: spawn.with_power_up,
                helmet_duration: spawn.helmet_duration,
                frozen_timeout: if spawn.side == Side::Bot {
                    world.bot_frozen_timeout
                } else {
                    Duration::ZERO
                },
                cooldown: Duration::ZERO,
                energy: EnergyState::full(),
                invisible_timeout: Duration::ZERO,
                invisible_cooldown: Duration::ZERO,
            };
            let _ = world.tanks.insert(id, tank.clone());
            out_events.push(Event::TankSpawned { tank });
        }
        Command::MoveTank {
            tank,
            x,
            y,
            direction,
            reserved_x,
            reserved_y,
        } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                record.x = x;
                record.y = y;
                record.direction = direction;
                record.reserved_x = reserved_x;
                record.reserved_y = reserved_y;
                out_events.push(Event::TankMoved {
                    tank,
                    x,
                    y,
                    direction,
                });
            }
        }
        Command::StartMove { tank } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                if !record.moving {
                    record.moving = true;
                    out_events.push(Event::TankStartedMoving { tank });
                }
            }
        }
        Command::StopMove { tank } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                if record.moving {
                    record.moving = false;
                    out_events.push(Event::TankStopped { tank });
                }
            }
        }
        Command::SetFrozenTimeout { tank, timeout } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                freeze(record, timeout, out_events);
            }
        }
        Command::SetBotFrozenTimeout { timeout } => {
            world.bot_frozen_timeout = timeout;
            for record in world
                .tanks
                .values_mut()
                .filter(|tank| tank.alive && tank.side == Side::Bot)
            {
                freeze(record, timeout, out_events);
            }
        }
        Command::SetCooldown { tank, cooldown } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                record.cooldown = cooldown;
                out_events.push(Event::CooldownChanged { tank, cooldown });
            }
        }
        Command::UpdateTankEnergyState { tank, energy } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                let energy = energy.clamped();
                record.energy = energy;
                out_events.push(Event::EnergyChanged { tank, energy });
            }
        }
        Command::SetHelmetDuration { tank, duration } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                record.helmet_duration = duration;
            }
        }
        Command::SetTankToDead { tank } => world.kill(tank, out_events),
        Command::HurtTank { tank, attacker } => {
            let Some(record) = world.alive_tank_mut(tank) else {
                return;
            };
            if !record.helmet_duration.is_zero() {
                log::trace!("helmet absorbed hit on tank {}", tank.get());
                return;
            }
            record.hp = record.hp.saturating_sub(1);
            let hp = record.hp;
            out_events.push(Event::TankHurt { tank, attacker, hp });
            if hp == 0 {
                world.kill(tank, out_events);
            }
        }
        Command::AddBullet { bullet } => {
            let id = world.allocate_bullet_id();
            let snapshot = BulletSnapshot {
                id,
                owner: bullet.owner,
                side: bullet.side,
                direction: bullet.direction,
                x: bullet.x,
                y: bullet.y,
                last_x: bullet.x,
                last_y: bullet.y,
                speed: bullet.speed,
                power: bullet.power,
                overcharged: bullet.overcharged,
            };
            let _ = world.bullets.insert(id, snapshot);
            out_events.push(Event::BulletFired { bullet: snapshot });
        }
        Command::PlayShotSound { tank } => out_events.push(Event::ShotSound { tank }),
        Command::MoveBullet { bullet, x, y } => {
            if let Some(record) = world.bullets.get_mut(&bullet) {
                record.last_x = record.x;
                record.last_y = record.y;
                record.x = x;
                record.y = y;
                out_events.push(Event::BulletMoved { bullet, x, y });
            }
        }
        Command::RemoveBullet { bullet } => {
            if world.bullets.remove(&bullet).is_some() {
                out_events.push(Event::BulletRemoved { bullet });
            }
        }
        Command::RemoveBricks { cells } => {
            let cells = world.terrain.clear_cells(TerrainLayer::Brick, &cells);
            if !cells.is_empty() {
                out_events.push(Event::BricksDestroyed { cells });
            }
        }
        Command::RemoveSteels { cells } => {
            let cells = world.terrain.clear_cells(TerrainLayer::Steel, &cells);
            if !cells.is_empty() {
                out_events.push(Event::SteelsDestroyed { cells });
            }
        }
        Command::RemoveGlasses { cells } => {
            let cells = world.terrain.clear_cells(TerrainLayer::Glass, &cells);
            if !cells.is_empty() {
                out_events.push(Event::GlassesDestroyed { cells });
            }
        }
        Command::RemoveForests { cells } => {
            let cells = world.terrain.clear_cells(TerrainLayer::Forest, &cells);
            if !cells.is_empty() {
                out_events.push(Event::ForestsDestroyed { cells });
            }
        }
        Command::DestroyEagle => {
            if world.terrain.break_eagle() {
                out_events.push(Event::EagleDestroyed);
            }
        }
        Command::AddRestrictedArea { area, rect } => {
            world.terrain.set_restricted_area(area, rect);
            out_events.push(Event::RestrictedAreaChanged {
                area,
                rect: Some(rect),
            });
        }
        Command::RemoveRestrictedArea { area } => {
            if world.terrain.remove_restricted_area(area) {
                out_events.push(Event::RestrictedAreaChanged { area, rect: None });
            }
        }
        Command::SetSlowdown { active } => {
            if world.slowdown != active {
                world.slowdown = active;
                out_events.push(Event::SlowdownChanged { active });
            }
        }
        Command::SetStealth {
            tank,
            invisible_timeout,
            invisible_cooldown,
        } => {
            if let Some(record) = world.alive_tank_mut(tank) {
                let was_invisible = record.invisible();
                record.invisible_timeout = invisible_timeout;
                record.invisible_cooldown = invisible_cooldown;
                let invisible = record.invisible();
                if invisible != was_invisible {
                    out_events.push(Event::TankVisibilityChanged { tank, invisible });
                }
            }
        }
        Command::SetBombingTarget { target } => {
            if world.bombing_target != target {
                world.bombing_target = target;
                out_events.push(Event::BombingTargetChanged { target });
            }
        }
    }
}

fn freeze(record: &mut TankSnapshot, timeout: Duration, out_events: &mut Vec<Event>) {
    record.frozen_timeout = timeout;
    out_events.push(Event::TankFrozen {
        tank: record.id,
        timeout,
    });
    if !timeout.is_zero() && record.moving {
        record.moving = false;
        out_events.push(Event::TankStopped { tank: record.id });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tank_arena_core::{BombingTarget, BulletView, TankId, TankSnapshot, TankView};

    use super::{Terrain, World};

    /// Captures a read-only view of every tank, alive or dead.
    #[must_use]
    pub fn tank_view(world: &World) -> TankView {
        TankView::from_snapshots(world.tanks.values().cloned().collect())
    }

    /// Looks up a single tank.
    #[must_use]
    pub fn tank(world: &World, id: TankId) -> Option<&TankSnapshot> {
        world.tanks.get(&id)
    }

    /// Captures a read-only view of every bullet in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(world.bullets.values().copied().collect())
    }

    /// Provides read-only access to the terrain index.
    #[must_use]
    pub fn terrain(world: &World) -> &Terrain {
        &world.terrain
    }

    /// Collision resolver: reports whether `tank` may occupy its live position.
    ///
    /// The check is pure; repeated calls against the same world agree.
    #[must_use]
    pub fn can_move(world: &World, tank: &TankSnapshot, threshold: f32) -> bool {
        super::collision::can_move(world, tank, threshold)
    }

    /// Reports whether bots are currently frozen.
    #[must_use]
    pub fn bots_frozen(world: &World) -> bool {
        !world.bot_frozen_timeout.is_zero()
    }

    /// Reports whether the terrain-wide slowdown is active.
    #[must_use]
    pub fn slowdown_active(world: &World) -> bool {
        world.slowdown
    }

    /// Spot the pending air raid will hit, if one is announced.
    #[must_use]
    pub fn bombing_target(world: &World) -> Option<BombingTarget> {
        world.bombing_target
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_arena_core::{
        BulletSpawn, Direction, Rect, StageMap, TankLevel, TankSpawn, TankType, MAX_ENERGY,
    };

    fn spawn(world: &mut World, spawn: TankSpawn) -> TankId {
        let mut events = Vec::new();
        apply(world, Command::SpawnTank { spawn }, &mut events);
        match events.as_slice() {
            [Event::TankSpawned { tank }] => tank.id,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    fn tank(world: &World, id: TankId) -> &TankSnapshot {
        query::tank(world, id).expect("tank exists")
    }

    #[test]
    fn spawned_tanks_receive_sequential_ids_and_full_energy() {
        let mut world = World::new();
        let first = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 64.0, 192.0));
        let second = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Armor, 0.0, 0.0));

        assert_eq!(second.get(), first.get() + 1);
        assert_eq!(tank(&world, second).hp, 4);
        assert_eq!(tank(&world, first).energy.energy, MAX_ENERGY);
        assert_eq!(
            (tank(&world, first).reserved_x, tank(&world, first).reserved_y),
            (64.0, 192.0)
        );
    }

    #[test]
    fn death_resets_transient_state() {
        let mut world = World::new();
        let id = spawn(
            &mut world,
            TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0)
                .with_helmet(Duration::from_secs(3)),
        );
        let mut events = Vec::new();
        for command in [
            Command::StartMove { tank: id },
            Command::SetCooldown {
                tank: id,
                cooldown: Duration::from_millis(200),
            },
            Command::SetFrozenTimeout {
                tank: id,
                timeout: Duration::ZERO,
            },
            Command::UpdateTankEnergyState {
                tank: id,
                energy: EnergyState {
                    energy: 60.0,
                    overcharging: true,
                    overcharge_remaining: Duration::from_millis(400),
                    paralysis_remaining: Duration::ZERO,
                },
            },
            Command::SetTankToDead { tank: id },
        ] {
            apply(&mut world, command, &mut events);
        }

        let dead = tank(&world, id);
        assert!(!dead.alive);
        assert!(!dead.moving);
        assert!(dead.cooldown.is_zero());
        assert!(dead.frozen_timeout.is_zero());
        assert!(dead.helmet_duration.is_zero());
        assert!(!dead.with_power_up);
        assert!(!dead.energy.overcharging);
        assert_eq!(events.last(), Some(&Event::TankKilled { tank: id }));
    }

    #[test]
    fn commands_for_dead_tanks_are_ignored() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Basic, 0.0, 0.0));
        let mut events = Vec::new();
        apply(&mut world, Command::SetTankToDead { tank: id }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::MoveTank {
                tank: id,
                x: 8.0,
                y: 8.0,
                direction: Direction::Down,
                reserved_x: 8.0,
                reserved_y: 8.0,
            },
            &mut events,
        );
        apply(&mut world, Command::SetTankToDead { tank: id }, &mut events);
        apply(&mut world, Command::StartMove { tank: TankId::new(77) }, &mut events);

        assert!(events.is_empty());
        assert_eq!((tank(&world, id).x, tank(&world, id).y), (0.0, 0.0));
    }

    #[test]
    fn helmet_absorbs_hits_until_it_expires() {
        let mut world = World::new();
        let attacker = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Basic, 0.0, 0.0));
        let id = spawn(
            &mut world,
            TankSpawn::new(Side::Player, TankLevel::Basic, 64.0, 64.0)
                .with_helmet(Duration::from_millis(100)),
        );
        let mut events = Vec::new();

        apply(&mut world, Command::HurtTank { tank: id, attacker }, &mut events);
        assert!(tank(&world, id).alive);
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        apply(&mut world, Command::HurtTank { tank: id, attacker }, &mut events);

        assert!(!tank(&world, id).alive);
        assert!(events.contains(&Event::TankHurt {
            tank: id,
            attacker,
            hp: 0
        }));
        assert!(events.contains(&Event::TankKilled { tank: id }));
    }

    #[test]
    fn armored_tanks_survive_three_hits() {
        let mut world = World::new();
        let attacker = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let id = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Armor, 64.0, 64.0));
        let mut events = Vec::new();
        for _ in 0..3 {
            apply(&mut world, Command::HurtTank { tank: id, attacker }, &mut events);
        }
        assert!(tank(&world, id).alive);
        assert_eq!(tank(&world, id).hp, 1);
    }

    #[test]
    fn freezing_a_moving_tank_stops_it() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let mut events = Vec::new();
        apply(&mut world, Command::StartMove { tank: id }, &mut events);
        apply(
            &mut world,
            Command::SetFrozenTimeout {
                tank: id,
                timeout: Duration::from_millis(500),
            },
            &mut events,
        );
        assert!(!tank(&world, id).moving);
        assert!(events.contains(&Event::TankStopped { tank: id }));
    }

    #[test]
    fn bot_freeze_applies_to_bots_only_and_expires() {
        let mut world = World::new();
        let player = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Basic, 64.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBotFrozenTimeout {
                timeout: Duration::from_millis(300),
            },
            &mut events,
        );

        assert!(query::bots_frozen(&world));
        assert_eq!(tank(&world, bot).frozen_timeout, Duration::from_millis(300));
        assert!(tank(&world, player).frozen_timeout.is_zero());

        let late_bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Fast, 128.0, 0.0));
        assert_eq!(tank(&world, late_bot).frozen_timeout, Duration::from_millis(300));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(400),
            },
            &mut events,
        );
        assert!(!query::bots_frozen(&world));
    }

    #[test]
    fn energy_writes_are_clamped() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::UpdateTankEnergyState {
                tank: id,
                energy: EnergyState {
                    energy: 180.0,
                    ..EnergyState::full()
                },
            },
            &mut events,
        );
        assert_eq!(tank(&world, id).energy.energy, MAX_ENERGY);
    }

    #[test]
    fn bullets_outlive_their_owner() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 64.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddBullet {
                bullet: BulletSpawn {
                    owner: id,
                    side: Side::Player,
                    direction: Direction::Up,
                    x: 6.0,
                    y: 64.0,
                    speed: 0.12,
                    power: 1,
                    overcharged: false,
                },
            },
            &mut events,
        );
        apply(&mut world, Command::SetTankToDead { tank: id }, &mut events);

        let bullets = query::bullet_view(&world).into_vec();
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].owner, id);
        assert!(query::tank(&world, id).is_some());
    }

    #[test]
    fn moving_a_bullet_remembers_the_previous_position() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddBullet {
                bullet: BulletSpawn {
                    owner: TankId::new(0),
                    side: Side::Bot,
                    direction: Direction::Down,
                    x: 10.0,
                    y: 10.0,
                    speed: 0.12,
                    power: 1,
                    overcharged: false,
                },
            },
            &mut events,
        );
        let id = query::bullet_view(&world).into_vec()[0].id;
        apply(
            &mut world,
            Command::MoveBullet {
                bullet: id,
                x: 10.0,
                y: 12.0,
            },
            &mut events,
        );
        let bullet = query::bullet_view(&world).into_vec()[0];
        assert_eq!((bullet.last_x, bullet.last_y, bullet.y), (10.0, 10.0, 12.0));
    }

    #[test]
    fn invalid_stage_is_rejected_without_side_effects() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let mut stage = StageMap::empty();
        stage.bricks.truncate(10);
        let mut events = Vec::new();
        apply(&mut world, Command::LoadStage { stage }, &mut events);

        assert!(events.is_empty());
        assert!(query::tank(&world, id).is_some());
    }

    #[test]
    fn destroyed_terrain_is_reported_once() {
        let mut world = World::new();
        let mut stage = StageMap::empty();
        stage.fill(TerrainLayer::Brick, Rect::new(0.0, 0.0, 8.0, 4.0));
        let mut events = Vec::new();
        apply(&mut world, Command::LoadStage { stage }, &mut events);
        events.clear();

        apply(&mut world, Command::RemoveBricks { cells: vec![0, 1, 2] }, &mut events);
        apply(&mut world, Command::RemoveBricks { cells: vec![0] }, &mut events);

        assert_eq!(events, vec![Event::BricksDestroyed { cells: vec![0, 1] }]);
    }

    #[test]
    fn spawned_tanks_keep_their_chassis() {
        let mut world = World::new();
        let id = spawn(
            &mut world,
            TankSpawn::new(Side::Bot, TankLevel::Basic, 0.0, 0.0).with_type(TankType::Heavy),
        );
        assert_eq!(tank(&world, id).tank_type, TankType::Heavy);
    }

    #[test]
    fn stealth_reports_visibility_flips_and_resets_on_death() {
        let mut world = World::new();
        let id = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Stealth, 0.0, 0.0));
        let stealth = |timeout: u64, cooldown: u64| Command::SetStealth {
            tank: id,
            invisible_timeout: Duration::from_millis(timeout),
            invisible_cooldown: Duration::from_millis(cooldown),
        };
        let mut events = Vec::new();
        apply(&mut world, stealth(3_000, 0), &mut events);
        apply(&mut world, stealth(2_900, 0), &mut events);
        assert_eq!(
            events,
            vec![Event::TankVisibilityChanged {
                tank: id,
                invisible: true
            }]
        );
        assert!(tank(&world, id).invisible());

        apply(&mut world, Command::SetTankToDead { tank: id }, &mut events);
        let dead = tank(&world, id);
        assert!(!dead.invisible());
        assert!(dead.invisible_cooldown.is_zero());
    }

    #[test]
    fn glass_and_forest_removal_is_reported() {
        let mut world = World::new();
        let mut stage = StageMap::empty();
        stage.fill(TerrainLayer::Glass, Rect::new(0.0, 0.0, 8.0, 8.0));
        stage.fill(TerrainLayer::Forest, Rect::new(16.0, 0.0, 16.0, 16.0));
        let mut events = Vec::new();
        apply(&mut world, Command::LoadStage { stage }, &mut events);
        events.clear();

        apply(&mut world, Command::RemoveGlasses { cells: vec![0, 1] }, &mut events);
        apply(&mut world, Command::RemoveForests { cells: vec![1] }, &mut events);
        apply(&mut world, Command::RemoveForests { cells: vec![1] }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::GlassesDestroyed { cells: vec![0] },
                Event::ForestsDestroyed { cells: vec![1] },
            ]
        );
    }

    #[test]
    fn bombing_target_changes_are_reported_once() {
        let mut world = World::new();
        let target = Some(BombingTarget { x: 40.0, y: 40.0 });
        let mut events = Vec::new();
        apply(&mut world, Command::SetBombingTarget { target }, &mut events);
        apply(&mut world, Command::SetBombingTarget { target }, &mut events);
        assert_eq!(query::bombing_target(&world), target);
        apply(&mut world, Command::LoadStage { stage: StageMap::empty() }, &mut events);
        assert_eq!(query::bombing_target(&world), None);
        assert_eq!(
            events,
            vec![Event::BombingTargetChanged { target }, Event::StageLoaded]
        );
    }

    #[test]
    fn mountains_and_glass_block_tanks() {
        let mut world = World::new();
        let mut stage = StageMap::empty();
        stage.fill(TerrainLayer::Mountain, Rect::new(32.0, 0.0, 16.0, 16.0));
        stage.fill(TerrainLayer::Glass, Rect::new(0.0, 32.0, 16.0, 16.0));
        let mut events = Vec::new();
        apply(&mut world, Command::LoadStage { stage }, &mut events);
        let id = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 0.0, 0.0));
        let resting = tank(&world, id).clone();

        let threshold = tank_arena_core::DEFAULT_THRESHOLD;
        assert!(query::can_move(&world, &resting, threshold));
        let east = resting.with_coordinate(tank_arena_core::Axis::X, 20.0);
        assert!(!query::can_move(&world, &east, threshold));
        let south = resting.with_coordinate(tank_arena_core::Axis::Y, 20.0);
        assert!(!query::can_move(&world, &south, threshold));
    }

    #[test]
    fn world_round_trips_through_bincode() {
        let mut world = World::new();
        let _ = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Power, 32.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddRestrictedArea {
                area: tank_arena_core::AreaId::new(1),
                rect: Rect::tank_at(96.0, 0.0),
            },
            &mut events,
        );
        let bytes = bincode::serialize(&world).expect("serialize");
        let restored: World = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, world);
    }
}
