//! Per-layer occupancy grids queried by the collision checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tank_arena_core::{test_collide, AreaId, Eagle, Rect, StageMap, TerrainLayer};

/// Read-only terrain of the current stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    bricks: Layer,
    steels: Layer,
    rivers: Layer,
    forests: Layer,
    mountains: Layer,
    glasses: Layer,
    eagle: Option<Eagle>,
    restricted_areas: BTreeMap<AreaId, Rect>,
}

impl Terrain {
    pub(crate) fn from_stage(stage: StageMap) -> Self {
        Self {
            bricks: Layer::new(TerrainLayer::Brick, stage.bricks),
            steels: Layer::new(TerrainLayer::Steel, stage.steels),
            rivers: Layer::new(TerrainLayer::River, stage.rivers),
            forests: Layer::new(TerrainLayer::Forest, stage.forests),
            mountains: Layer::new(TerrainLayer::Mountain, stage.mountains),
            glasses: Layer::new(TerrainLayer::Glass, stage.glasses),
            eagle: stage.eagle,
            restricted_areas: BTreeMap::new(),
        }
    }

    /// Eagle of the current stage, if any.
    #[must_use]
    pub fn eagle(&self) -> Option<Eagle> {
        self.eagle
    }

    /// Restricted areas ordered by identifier.
    pub fn restricted_areas(&self) -> impl Iterator<Item = (AreaId, Rect)> + '_ {
        self.restricted_areas.iter().map(|(id, rect)| (*id, *rect))
    }

    /// Reports whether a single cell of the layer is occupied.
    #[must_use]
    pub fn is_set(&self, layer: TerrainLayer, index: usize) -> bool {
        self.layer(layer).is_set(index)
    }

    /// Occupied cells of `layer` that collide with `rect` under `threshold`.
    #[must_use]
    pub fn colliding_cells(&self, layer: TerrainLayer, rect: &Rect, threshold: f32) -> Vec<usize> {
        self.layer(layer).colliding(rect, threshold).collect()
    }

    /// Reports whether any occupied cell of `layer` collides with `rect`.
    #[must_use]
    pub fn collides(&self, layer: TerrainLayer, rect: &Rect, threshold: f32) -> bool {
        self.layer(layer).colliding(rect, threshold).next().is_some()
    }

    fn layer(&self, layer: TerrainLayer) -> &Layer {
        match layer {
            TerrainLayer::Brick => &self.bricks,
            TerrainLayer::Steel => &self.steels,
            TerrainLayer::River => &self.rivers,
            TerrainLayer::Forest => &self.forests,
            TerrainLayer::Mountain => &self.mountains,
            TerrainLayer::Glass => &self.glasses,
        }
    }

    pub(crate) fn clear_cells(&mut self, layer: TerrainLayer, cells: &[usize]) -> Vec<usize> {
        let layer = match layer {
            TerrainLayer::Brick => &mut self.bricks,
            TerrainLayer::Steel => &mut self.steels,
            TerrainLayer::River => &mut self.rivers,
            TerrainLayer::Forest => &mut self.forests,
            TerrainLayer::Mountain => &mut self.mountains,
            TerrainLayer::Glass => &mut self.glasses,
        };
        cells
            .iter()
            .copied()
            .filter(|index| layer.clear(*index))
            .collect()
    }

    pub(crate) fn break_eagle(&mut self) -> bool {
        match self.eagle.as_mut() {
            Some(eagle) if !eagle.broken => {
                eagle.broken = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_restricted_area(&mut self, area: AreaId, rect: Rect) {
        let _ = self.restricted_areas.insert(area, rect);
    }

    pub(crate) fn remove_restricted_area(&mut self, area: AreaId) -> bool {
        self.restricted_areas.remove(&area).is_some()
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::from_stage(StageMap::empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Layer {
    kind: TerrainLayer,
    side: usize,
    cells: Vec<bool>,
}

impl Layer {
    fn new(kind: TerrainLayer, mut cells: Vec<bool>) -> Self {
        cells.resize(kind.cell_count(), false);
        Self {
            kind,
            side: kind.cells_per_side(),
            cells,
        }
    }

    fn is_set(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    fn clear(&mut self, index: usize) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if *cell => {
                *cell = false;
                true
            }
            _ => false,
        }
    }

    /// Indices of the cells whose bounds may touch the rectangle, clamped to the grid.
    fn candidates(&self, rect: &Rect) -> impl Iterator<Item = usize> {
        let size = self.kind.cell_size();
        let last = self.side.saturating_sub(1) as f32;
        let span = |low: f32, high: f32| {
            let first = (low / size).floor().clamp(0.0, last) as usize;
            let end = (high / size).floor().clamp(0.0, last) as usize;
            (first, end)
        };
        let (column_start, column_end) = span(rect.x, rect.right());
        let (row_start, row_end) = span(rect.y, rect.bottom());
        let side = self.side;
        let empty = self.side == 0;
        (row_start..=row_end)
            .flat_map(move |row| (column_start..=column_end).map(move |column| row * side + column))
            .filter(move |_| !empty)
    }

    fn colliding<'a>(&'a self, rect: &'a Rect, threshold: f32) -> impl Iterator<Item = usize> + 'a {
        self.candidates(rect).filter(move |index| {
            self.is_set(*index) && test_collide(&self.kind.cell_rect(*index), rect, threshold)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_arena_core::DEFAULT_THRESHOLD;

    fn terrain_with(layer: TerrainLayer, area: Rect) -> Terrain {
        let mut stage = StageMap::empty();
        stage.fill(layer, area);
        Terrain::from_stage(stage)
    }

    #[test]
    fn adjacent_tank_does_not_touch_wall() {
        let terrain = terrain_with(TerrainLayer::Brick, Rect::new(32.0, 0.0, 16.0, 16.0));
        assert!(!terrain.collides(TerrainLayer::Brick, &Rect::tank_at(16.0, 0.0), DEFAULT_THRESHOLD));
        assert!(terrain.collides(TerrainLayer::Brick, &Rect::tank_at(16.5, 0.0), DEFAULT_THRESHOLD));
    }

    #[test]
    fn colliding_cells_lists_every_overlapped_brick() {
        let terrain = terrain_with(TerrainLayer::Brick, Rect::new(0.0, 0.0, 16.0, 16.0));
        let cells = terrain.colliding_cells(TerrainLayer::Brick, &Rect::new(0.0, 0.0, 8.0, 4.0), DEFAULT_THRESHOLD);
        assert_eq!(cells, vec![0, 1]);
    }

    #[test]
    fn rectangles_outside_the_grid_are_clamped() {
        let terrain = terrain_with(TerrainLayer::Steel, Rect::new(200.0, 200.0, 8.0, 8.0));
        assert!(terrain.collides(TerrainLayer::Steel, &Rect::tank_at(199.0, 199.0), DEFAULT_THRESHOLD));
        assert!(!terrain.collides(TerrainLayer::Steel, &Rect::tank_at(-40.0, -40.0), DEFAULT_THRESHOLD));
    }

    #[test]
    fn clearing_reports_only_cells_that_were_set() {
        let mut terrain = terrain_with(TerrainLayer::Brick, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(terrain.clear_cells(TerrainLayer::Brick, &[0, 1]), vec![0]);
        assert!(!terrain.is_set(TerrainLayer::Brick, 0));
    }

    #[test]
    fn mountain_and_glass_cells_are_queryable() {
        let mut stage = StageMap::empty();
        stage.fill(TerrainLayer::Mountain, Rect::new(48.0, 48.0, 16.0, 16.0));
        stage.fill(TerrainLayer::Glass, Rect::new(0.0, 0.0, 8.0, 8.0));
        let mut terrain = Terrain::from_stage(stage);
        assert!(terrain.is_set(TerrainLayer::Mountain, 13 * 3 + 3));
        assert!(terrain.collides(TerrainLayer::Glass, &Rect::tank_at(0.0, 0.0), DEFAULT_THRESHOLD));
        assert_eq!(terrain.clear_cells(TerrainLayer::Glass, &[0, 1]), vec![0]);
        assert!(!terrain.collides(TerrainLayer::Glass, &Rect::tank_at(0.0, 0.0), DEFAULT_THRESHOLD));
    }

    #[test]
    fn eagle_breaks_once() {
        let mut stage = StageMap::empty();
        stage.eagle = Some(Eagle::at(96.0, 192.0));
        let mut terrain = Terrain::from_stage(stage);
        assert!(terrain.break_eagle());
        assert!(!terrain.break_eagle());
        assert!(terrain.eagle().map_or(false, |eagle| eagle.broken));
    }
}
