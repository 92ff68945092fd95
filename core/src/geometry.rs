//! Axis-aligned geometry shared by the collision resolver and the controllers.

use serde::{Deserialize, Serialize};

/// Edge length of a single map block measured in world units.
pub const BLOCK_SIZE: f32 = 16.0;
/// Number of blocks along each edge of the square battle field.
pub const FIELD_BLOCKS: u32 = 13;
/// Edge length of the battle field measured in world units.
pub const FIELD_SIZE: f32 = BLOCK_SIZE * FIELD_BLOCKS as f32;
/// Edge length of a tank's square footprint.
pub const TANK_SIZE: f32 = BLOCK_SIZE;
/// Edge length of a bullet's square footprint.
pub const BULLET_SIZE: f32 = 3.0;
/// Grid unit that turning tanks snap their off-axis coordinate to.
pub const SNAP_UNIT: f32 = 8.0;
/// Overlap tolerance used by tank movement checks.
///
/// Negative values shrink the collision test so rectangles that merely share
/// an edge are not reported as colliding.
pub const DEFAULT_THRESHOLD: f32 = -0.01;

/// Axis-aligned rectangle expressed in world units with `y` growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates the square footprint of a tank anchored at `(x, y)`.
    #[must_use]
    pub const fn tank_at(x: f32, y: f32) -> Self {
        Self::new(x, y, TANK_SIZE, TANK_SIZE)
    }

    /// Creates the square footprint of a bullet anchored at `(x, y)`.
    #[must_use]
    pub const fn bullet_at(x: f32, y: f32) -> Self {
        Self::new(x, y, BULLET_SIZE, BULLET_SIZE)
    }

    /// Right edge of the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge of the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn centre(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle that contains both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Cardinal axis along which a direction travels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Facing of a tank or travel direction of a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward decreasing `y`.
    Up,
    /// Toward increasing `y`.
    Down,
    /// Toward decreasing `x`.
    Left,
    /// Toward increasing `x`.
    Right,
}

impl Direction {
    /// All directions in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// Sign applied to a distance travelled along [`Direction::axis`].
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Up | Self::Left => -1.0,
            Self::Down | Self::Right => 1.0,
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Tests whether two rectangles overlap, widened by `threshold` on every side.
///
/// A negative threshold tolerates overlaps up to its magnitude, so rectangles
/// that share an edge do not collide under [`DEFAULT_THRESHOLD`].
#[must_use]
pub fn test_collide(subject: &Rect, object: &Rect, threshold: f32) -> bool {
    between(
        subject.x - object.width,
        object.x,
        subject.right(),
        threshold,
    ) && between(
        subject.y - object.height,
        object.y,
        subject.bottom(),
        threshold,
    )
}

fn between(min: f32, value: f32, max: f32, threshold: f32) -> bool {
    min - threshold <= value && value <= max + threshold
}

/// Reports whether the rectangle lies fully inside the battle field.
#[must_use]
pub fn is_in_field(rect: &Rect) -> bool {
    rect.x >= 0.0 && rect.y >= 0.0 && rect.right() <= FIELD_SIZE && rect.bottom() <= FIELD_SIZE
}

/// Largest multiple of [`SNAP_UNIT`] not greater than `value`.
#[must_use]
pub fn floor8(value: f32) -> f32 {
    (value / SNAP_UNIT).floor() * SNAP_UNIT
}

/// Smallest multiple of [`SNAP_UNIT`] not less than `value`.
#[must_use]
pub fn ceil8(value: f32) -> f32 {
    (value / SNAP_UNIT).ceil() * SNAP_UNIT
}

/// Multiple of [`SNAP_UNIT`] nearest to `value`.
#[must_use]
pub fn round8(value: f32) -> f32 {
    (value / SNAP_UNIT).round() * SNAP_UNIT
}
