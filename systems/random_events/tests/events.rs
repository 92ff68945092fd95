use std::time::Duration;

use tank_arena_core::{
    BombingTarget, Command, Event, Rect, Side, StageMap, TankId, TankLevel, TankSpawn,
    TerrainLayer, FIELD_SIZE,
};
use tank_arena_system_random_events::{RandomEvent, RandomEvents, BLAST_RADIUS};
use tank_arena_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(100);

fn arena(stage: StageMap) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadStage { stage }, &mut events);
    world
}

fn step(world: &mut World, system: &mut RandomEvents, extra: &[Event]) -> Vec<Event> {
    let mut events = extra.to_vec();
    world::apply(world, Command::Tick { dt: TICK }, &mut events);
    let mut commands = Vec::new();
    system.handle(&events, world, &mut commands);
    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

fn announced(events: &[Event]) -> Option<BombingTarget> {
    events.iter().find_map(|event| match event {
        Event::BombingTargetChanged { target } => *target,
        _ => None,
    })
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

#[test]
fn blizzard_keeps_the_slowdown_on() {
    let mut world = arena(StageMap::empty());
    let mut system = RandomEvents::new(Some(RandomEvent::Blizzard), 1);

    let events = step(&mut world, &mut system, &[]);
    assert_eq!(events, vec![Event::SlowdownChanged { active: true }]);
    assert!(step(&mut world, &mut system, &[]).is_empty());

    let mut reload = Vec::new();
    world::apply(
        &mut world,
        Command::LoadStage {
            stage: StageMap::empty(),
        },
        &mut reload,
    );
    assert!(!query::slowdown_active(&world));
    let _ = step(&mut world, &mut system, &reload);
    assert!(query::slowdown_active(&world));
}

#[test]
fn disabled_events_do_nothing() {
    let mut world = arena(StageMap::empty());
    let mut system = RandomEvents::new(None, 1);
    for _ in 0..200 {
        assert!(step(&mut world, &mut system, &[]).is_empty());
    }
}

#[test]
fn bombing_announces_then_destroys_the_blast_area() {
    let mut stage = StageMap::empty();
    stage.fill(TerrainLayer::Brick, Rect::new(0.0, 0.0, FIELD_SIZE, FIELD_SIZE));
    let mut world = arena(stage);
    let mut system = RandomEvents::new(Some(RandomEvent::Bombing), 21);

    let mut waited = Duration::ZERO;
    let target = loop {
        let events = step(&mut world, &mut system, &[]);
        waited += TICK;
        if let Some(target) = announced(&events) {
            break target;
        }
        assert!(waited <= Duration::from_millis(10_100), "no raid announced");
    };
    assert!(waited >= Duration::from_millis(6_000));
    assert_eq!(query::bombing_target(&world), Some(target));

    let victim = spawn(
        &mut world,
        TankSpawn::new(Side::Bot, TankLevel::Armor, target.x - 8.0, target.y - 8.0),
    );
    let shielded = spawn(
        &mut world,
        TankSpawn::new(Side::Player, TankLevel::Basic, target.x - 8.0, target.y - 8.0)
            .with_helmet(Duration::from_secs(10)),
    );

    // The warning lasts 2000 ms, so the twentieth tick detonates.
    for _ in 0..19 {
        assert!(step(&mut world, &mut system, &[]).is_empty());
    }
    let detonation = step(&mut world, &mut system, &[]);

    assert!(detonation.contains(&Event::TankKilled { tank: victim }));
    assert!(query::tank(&world, shielded).is_some_and(|tank| tank.alive));
    assert_eq!(
        detonation.last(),
        Some(&Event::BombingTargetChanged { target: None })
    );
    let cells = detonation
        .iter()
        .find_map(|event| match event {
            Event::BricksDestroyed { cells } => Some(cells.clone()),
            _ => None,
        })
        .expect("bricks destroyed");
    assert!(!cells.is_empty());
    for cell in cells {
        let (x, y) = TerrainLayer::Brick.cell_rect(cell).centre();
        assert!(target.covers(x, y, BLAST_RADIUS));
    }
    let terrain = query::terrain(&world);
    let survivors = (0..TerrainLayer::Brick.cell_count())
        .filter(|cell| terrain.is_set(TerrainLayer::Brick, *cell))
        .count();
    assert!(survivors > 0);
}

#[test]
fn raids_are_reproducible_for_a_seed() {
    let run = |seed: u64| {
        let mut world = arena(StageMap::empty());
        let mut system = RandomEvents::new(Some(RandomEvent::Bombing), seed);
        let mut log = Vec::new();
        for _ in 0..400 {
            log.extend(step(&mut world, &mut system, &[]));
        }
        log
    };
    let first = run(5);
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::BombingTargetChanged { target: Some(_) })));
    assert_eq!(first, run(5));
}
