use std::time::Duration;

use tank_arena_core::{Command, Eagle, Event, Side, StageMap, TankId, TankLevel, TankSpawn};
use tank_arena_system_special_tanks::{SpecialTanks, STEALTH_COOLDOWN, STEALTH_DURATION};
use tank_arena_world::{self as world, query, World};

fn arena(eagle: Option<Eagle>) -> World {
    let mut stage = StageMap::empty();
    stage.eagle = eagle;
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadStage { stage }, &mut events);
    world
}

fn spawn(world: &mut World, spawn: TankSpawn) -> TankId {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnTank { spawn }, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::TankSpawned { tank } => Some(tank.id),
            _ => None,
        })
        .expect("spawn event")
}

fn step(world: &mut World, specials: &mut SpecialTanks, ms: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(ms),
        },
        &mut events,
    );
    let mut commands = Vec::new();
    specials.handle(&events, world, &mut commands);
    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

fn alive(world: &World, id: TankId) -> bool {
    query::tank(world, id).is_some_and(|tank| tank.alive)
}

#[test]
fn suicide_bot_detonates_next_to_a_player() {
    let mut world = arena(None);
    let bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Suicide, 96.0, 64.0));
    let player = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 96.0, 100.0));
    let mut specials = SpecialTanks::new();

    let events = step(&mut world, &mut specials, 16);

    assert_eq!(events, vec![Event::TankKilled { tank: bot }]);
    assert!(alive(&world, player));
}

#[test]
fn suicide_bot_ignores_distant_and_dead_players() {
    let mut world = arena(None);
    let bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Suicide, 0.0, 0.0));
    let _far = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 48.0, 0.0));
    let dead = spawn(&mut world, TankSpawn::new(Side::Player, TankLevel::Basic, 16.0, 16.0));
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetTankToDead { tank: dead }, &mut events);
    let mut specials = SpecialTanks::new();

    assert!(step(&mut world, &mut specials, 16).is_empty());
    assert!(alive(&world, bot));
}

#[test]
fn suicide_bot_detonates_next_to_the_eagle() {
    let mut world = arena(Some(Eagle::at(96.0, 192.0)));
    let bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Suicide, 72.0, 168.0));
    let ordinary = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Basic, 120.0, 168.0));
    let mut specials = SpecialTanks::new();

    let _ = step(&mut world, &mut specials, 16);

    assert!(!alive(&world, bot));
    assert!(alive(&world, ordinary));
}

#[test]
fn stealth_bot_vanishes_freezes_and_reappears() {
    let mut world = arena(None);
    let bot = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Stealth, 0.0, 0.0));
    let mut specials = SpecialTanks::new();

    let events = step(&mut world, &mut specials, 100);
    assert!(events.contains(&Event::TankVisibilityChanged {
        tank: bot,
        invisible: true
    }));
    let hidden = query::tank(&world, bot).expect("bot").clone();
    assert!(hidden.invisible());
    assert_eq!(hidden.frozen_timeout, STEALTH_DURATION);
    assert_eq!(hidden.cooldown, STEALTH_DURATION);

    let mut reappeared = Vec::new();
    for _ in 0..30 {
        reappeared.extend(step(&mut world, &mut specials, 100));
    }
    assert_eq!(
        reappeared,
        vec![Event::TankVisibilityChanged {
            tank: bot,
            invisible: false
        }]
    );
    let visible = query::tank(&world, bot).expect("bot");
    assert_eq!(visible.invisible_cooldown, STEALTH_COOLDOWN);

    for _ in 0..50 {
        let _ = step(&mut world, &mut specials, 100);
    }
    let waiting = query::tank(&world, bot).expect("bot");
    assert!(!waiting.invisible());
    assert!(waiting.invisible_cooldown.is_zero());

    let events = step(&mut world, &mut specials, 100);
    assert!(events.contains(&Event::TankVisibilityChanged {
        tank: bot,
        invisible: true
    }));
}

#[test]
fn nothing_happens_without_time_advancing() {
    let mut world = arena(None);
    let _ = spawn(&mut world, TankSpawn::new(Side::Bot, TankLevel::Stealth, 0.0, 0.0));
    let mut commands = Vec::new();
    SpecialTanks::new().handle(&[Event::StageLoaded], &world, &mut commands);
    assert!(commands.is_empty());
}
