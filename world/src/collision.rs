//! Legality test for a candidate tank position.

use tank_arena_core::{is_in_field, test_collide, Direction, TankSnapshot, TerrainLayer};

use crate::World;

const BLOCKING_LAYERS: [TerrainLayer; 5] = [
    TerrainLayer::Brick,
    TerrainLayer::Steel,
    TerrainLayer::River,
    TerrainLayer::Mountain,
    TerrainLayer::Glass,
];

/// Checks whether `tank` may occupy its live position.
///
/// Other tanks are tested at their reserved positions, and only those lying
/// ahead of `tank` along its facing are considered so queued tanks never
/// block the tank behind them from backing away.
pub(crate) fn can_move(world: &World, tank: &TankSnapshot, threshold: f32) -> bool {
    let target = tank.rect();

    if !is_in_field(&target) {
        return false;
    }

    let terrain = &world.terrain;
    if let Some(eagle) = terrain.eagle() {
        if test_collide(&eagle.rect(), &target, threshold) {
            return false;
        }
    }

    if BLOCKING_LAYERS
        .iter()
        .any(|layer| terrain.collides(*layer, &target, threshold))
    {
        return false;
    }

    if terrain
        .restricted_areas()
        .any(|(_, area)| test_collide(&area, &target, threshold))
    {
        return false;
    }

    !world
        .tanks
        .values()
        .filter(|other| other.alive && other.id != tank.id)
        .any(|other| {
            is_in_front(other, tank) && test_collide(&other.reserved_rect(), &target, threshold)
        })
}

fn is_in_front(other: &TankSnapshot, tank: &TankSnapshot) -> bool {
    match tank.direction {
        Direction::Left => other.reserved_x < tank.x,
        Direction::Right => other.reserved_x > tank.x,
        Direction::Up => other.reserved_y < tank.y,
        Direction::Down => other.reserved_y > tank.y,
    }
}
