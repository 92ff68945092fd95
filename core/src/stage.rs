//! Static terrain description supplied when a stage is loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Rect, BLOCK_SIZE, FIELD_SIZE};

/// Occupancy layers that make up the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainLayer {
    /// Destructible walls; block tanks and bullets.
    Brick,
    /// Armoured walls; block tanks and bullets, destroyed only by strong shots.
    Steel,
    /// Water; blocks tanks but not bullets.
    River,
    /// Foliage drawn over tanks; never blocks anything.
    Forest,
    /// Rock; blocks tanks and bullets and is never destroyed.
    Mountain,
    /// Panes; block tanks and shatter under any bullet.
    Glass,
}

impl TerrainLayer {
    /// Every layer in declaration order.
    pub const ALL: [TerrainLayer; 6] = [
        TerrainLayer::Brick,
        TerrainLayer::Steel,
        TerrainLayer::River,
        TerrainLayer::Forest,
        TerrainLayer::Mountain,
        TerrainLayer::Glass,
    ];

    /// Edge length of one cell of the layer in world units.
    #[must_use]
    pub const fn cell_size(self) -> f32 {
        match self {
            Self::Brick => 4.0,
            Self::Steel | Self::Glass => 8.0,
            Self::River | Self::Forest | Self::Mountain => BLOCK_SIZE,
        }
    }

    /// Number of cells along each edge of the field for this layer.
    #[must_use]
    pub fn cells_per_side(self) -> usize {
        (FIELD_SIZE / self.cell_size()) as usize
    }

    /// Total number of cells in the layer.
    #[must_use]
    pub fn cell_count(self) -> usize {
        self.cells_per_side() * self.cells_per_side()
    }

    /// Rectangle covered by the cell at the provided row-major index.
    #[must_use]
    pub fn cell_rect(self, index: usize) -> Rect {
        let side = self.cells_per_side().max(1);
        let size = self.cell_size();
        let column = (index % side) as f32;
        let row = (index / side) as f32;
        Rect::new(column * size, row * size, size, size)
    }
}

/// Base the bots try to destroy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Eagle {
    /// Left edge of the eagle's block.
    pub x: f32,
    /// Top edge of the eagle's block.
    pub y: f32,
    /// Whether a bullet already destroyed the eagle.
    pub broken: bool,
}

impl Eagle {
    /// Places an intact eagle at the provided block corner.
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            broken: false,
        }
    }

    /// Footprint of the eagle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BLOCK_SIZE, BLOCK_SIZE)
    }
}

/// Terrain snapshot describing one stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageMap {
    /// Brick occupancy in row-major order.
    pub bricks: Vec<bool>,
    /// Steel occupancy in row-major order.
    pub steels: Vec<bool>,
    /// River occupancy in row-major order.
    pub rivers: Vec<bool>,
    /// Forest occupancy in row-major order.
    pub forests: Vec<bool>,
    /// Mountain occupancy in row-major order.
    #[serde(default = "empty_mountains")]
    pub mountains: Vec<bool>,
    /// Glass occupancy in row-major order.
    #[serde(default = "empty_glasses")]
    pub glasses: Vec<bool>,
    /// Eagle placement, if the stage has one.
    pub eagle: Option<Eagle>,
}

impl StageMap {
    /// Creates a stage without any terrain or eagle.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bricks: vec![false; TerrainLayer::Brick.cell_count()],
            steels: vec![false; TerrainLayer::Steel.cell_count()],
            rivers: vec![false; TerrainLayer::River.cell_count()],
            forests: vec![false; TerrainLayer::Forest.cell_count()],
            mountains: empty_mountains(),
            glasses: empty_glasses(),
            eagle: None,
        }
    }

    /// Read-only access to a layer's cells.
    #[must_use]
    pub fn layer(&self, layer: TerrainLayer) -> &[bool] {
        match layer {
            TerrainLayer::Brick => &self.bricks,
            TerrainLayer::Steel => &self.steels,
            TerrainLayer::River => &self.rivers,
            TerrainLayer::Forest => &self.forests,
            TerrainLayer::Mountain => &self.mountains,
            TerrainLayer::Glass => &self.glasses,
        }
    }

    fn layer_mut(&mut self, layer: TerrainLayer) -> &mut Vec<bool> {
        match layer {
            TerrainLayer::Brick => &mut self.bricks,
            TerrainLayer::Steel => &mut self.steels,
            TerrainLayer::River => &mut self.rivers,
            TerrainLayer::Forest => &mut self.forests,
            TerrainLayer::Mountain => &mut self.mountains,
            TerrainLayer::Glass => &mut self.glasses,
        }
    }

    /// Marks every cell of `layer` lying entirely inside `area` as occupied.
    pub fn fill(&mut self, layer: TerrainLayer, area: Rect) {
        let cells = self.layer_mut(layer);
        for (index, cell) in cells.iter_mut().enumerate() {
            let rect = layer.cell_rect(index);
            if rect.x >= area.x
                && rect.y >= area.y
                && rect.right() <= area.right()
                && rect.bottom() <= area.bottom()
            {
                *cell = true;
            }
        }
    }

    /// Checks that every layer has the size its cell grid requires.
    pub fn validate(&self) -> Result<(), StageError> {
        for layer in TerrainLayer::ALL {
            let expected = layer.cell_count();
            let actual = self.layer(layer).len();
            if actual != expected {
                return Err(StageError::LayerSize {
                    layer,
                    expected,
                    actual,
                });
            }
        }

        if let Some(eagle) = self.eagle {
            if !crate::is_in_field(&eagle.rect()) {
                return Err(StageError::EagleOutOfField {
                    x: eagle.x,
                    y: eagle.y,
                });
            }
        }

        Ok(())
    }
}

fn empty_mountains() -> Vec<bool> {
    vec![false; TerrainLayer::Mountain.cell_count()]
}

fn empty_glasses() -> Vec<bool> {
    vec![false; TerrainLayer::Glass.cell_count()]
}

impl Default for StageMap {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reasons a stage description is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StageError {
    /// A layer does not contain one entry per cell.
    #[error("{layer:?} layer has {actual} cells, expected {expected}")]
    LayerSize {
        /// Offending layer.
        layer: TerrainLayer,
        /// Required number of cells.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// The eagle does not fit inside the field.
    #[error("eagle at ({x}, {y}) lies outside the field")]
    EagleOutOfField {
        /// Requested left edge.
        x: f32,
        /// Requested top edge.
        y: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_dimensions_follow_cell_sizes() {
        assert_eq!(TerrainLayer::Brick.cells_per_side(), 52);
        assert_eq!(TerrainLayer::Steel.cells_per_side(), 26);
        assert_eq!(TerrainLayer::River.cells_per_side(), 13);
        assert_eq!(TerrainLayer::Mountain.cells_per_side(), 13);
        assert_eq!(TerrainLayer::Glass.cells_per_side(), 26);
    }

    #[test]
    fn stages_without_mountains_or_glass_still_deserialize() {
        let mut value = serde_json::to_value(StageMap::empty()).expect("serialize");
        let fields = value.as_object_mut().expect("object");
        let _ = fields.remove("mountains");
        let _ = fields.remove("glasses");
        let stage: StageMap = serde_json::from_value(value).expect("deserialize");
        assert_eq!(stage, StageMap::empty());
        assert_eq!(stage.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_truncated_glass() {
        let mut stage = StageMap::empty();
        let _ = stage.glasses.pop();
        assert!(matches!(
            stage.validate(),
            Err(StageError::LayerSize {
                layer: TerrainLayer::Glass,
                ..
            })
        ));
    }

    #[test]
    fn fill_marks_cells_inside_the_area() {
        let mut stage = StageMap::empty();
        stage.fill(TerrainLayer::Steel, Rect::new(16.0, 16.0, 16.0, 16.0));
        let occupied: Vec<usize> = stage
            .steels
            .iter()
            .enumerate()
            .filter_map(|(index, set)| set.then_some(index))
            .collect();
        assert_eq!(occupied, vec![26 * 2 + 2, 26 * 2 + 3, 26 * 3 + 2, 26 * 3 + 3]);
    }

    #[test]
    fn validate_rejects_truncated_layers() {
        let mut stage = StageMap::empty();
        let _ = stage.rivers.pop();
        assert_eq!(
            stage.validate(),
            Err(StageError::LayerSize {
                layer: TerrainLayer::River,
                expected: 169,
                actual: 168,
            })
        );
    }

    #[test]
    fn validate_rejects_eagle_outside_field() {
        let mut stage = StageMap::empty();
        stage.eagle = Some(Eagle::at(200.0, 192.0));
        assert!(matches!(
            stage.validate(),
            Err(StageError::EagleOutOfField { .. })
        ));
    }
}
