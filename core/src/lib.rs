#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tank arena engine.
//!
//! This crate defines the message surface that connects input providers, the
//! authoritative world, and the per-tick controllers. Controllers read an
//! immutable world snapshot, emit [`Command`] values describing the mutations
//! they want, and the world executes those commands via its `apply` entry
//! point before broadcasting [`Event`] values to downstream observers such as
//! renderers or achievement trackers.

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod geometry;
mod stage;
mod values;

pub use geometry::{
    ceil8, floor8, is_in_field, round8, test_collide, Axis, Direction, Rect, BLOCK_SIZE,
    BULLET_SIZE, DEFAULT_THRESHOLD, FIELD_BLOCKS, FIELD_SIZE, SNAP_UNIT, TANK_SIZE,
};
pub use stage::{Eagle, StageError, StageMap, TerrainLayer};
pub use values::{
    bullet_interval, bullet_limit, bullet_power, bullet_speed, initial_hp, millis, move_speed,
    Tuning, MAX_ENERGY,
};

/// Unique identifier assigned to a tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankId(u32);

impl TankId {
    /// Creates a new tank identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a restricted area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(u32);

impl AreaId {
    /// Creates a new area identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Team a tank fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Human or autopilot controlled tank defending the eagle.
    Player,
    /// Computer controlled attacker.
    Bot,
}

/// Tier of a tank; drives speed, bullet power and bullet limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankLevel {
    /// Entry level tank.
    Basic,
    /// Quick tank with a single bullet.
    Fast,
    /// Tank with faster or stronger bullets.
    Power,
    /// Heavily armoured tank.
    Armor,
    /// Bot that blows itself up next to a player or the eagle.
    Suicide,
    /// Bot that periodically turns invisible and holds still.
    Stealth,
}

impl TankLevel {
    /// Reports whether the level carries a scripted bot behaviour.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Suicide | Self::Stealth)
    }
}

/// Chassis a tank is built on; scales speed, reload and bullet strength.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankType {
    /// Balanced chassis without modifiers.
    #[default]
    Normal,
    /// Slow chassis.
    Heavy,
    /// Slower chassis with slow but wall-breaking bullets.
    TankDestroyer,
    /// Fast chassis with a long reload.
    Light,
    /// Artillery with very slow bullets and a very long reload.
    SelfPropelledGun,
}

impl TankType {
    /// Every chassis in declaration order.
    pub const ALL: [TankType; 5] = [
        TankType::Normal,
        TankType::Heavy,
        TankType::TankDestroyer,
        TankType::Light,
        TankType::SelfPropelledGun,
    ];

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Heavy => "heavy",
            Self::TankDestroyer => "tank_destroyer",
            Self::Light => "light",
            Self::SelfPropelledGun => "self_propelled_gun",
        }
    }
}

impl fmt::Display for TankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TankType {
    type Err = UnknownTankType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tank_type| tank_type.name() == value)
            .ok_or_else(|| UnknownTankType(value.to_owned()))
    }
}

/// Name that does not match any [`TankType`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tank type '{0}'")]
pub struct UnknownTankType(pub String);

/// Energy gauge and overcharge bookkeeping of a tank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    /// Current energy in `[0, 100]`.
    pub energy: f32,
    /// Whether the tank is charging an overcharged burst.
    pub overcharging: bool,
    /// Charge time left before the burst fires.
    pub overcharge_remaining: Duration,
    /// Lockout left after an overcharge ended.
    pub paralysis_remaining: Duration,
}

impl EnergyState {
    /// Full gauge with no overcharge in progress.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            energy: MAX_ENERGY,
            overcharging: false,
            overcharge_remaining: Duration::ZERO,
            paralysis_remaining: Duration::ZERO,
        }
    }

    /// Reports whether the post-overcharge lockout is active.
    #[must_use]
    pub const fn paralyzed(&self) -> bool {
        !self.paralysis_remaining.is_zero()
    }

    /// Returns a copy with energy clamped to `[0, 100]`.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.energy = if self.energy.is_nan() {
            0.0
        } else {
            self.energy.clamp(0.0, MAX_ENERGY)
        };
        self
    }
}

impl Default for EnergyState {
    fn default() -> Self {
        Self::full()
    }
}

/// Complete state of one tank.
///
/// The world stores tanks in this shape and hands out clones as snapshots, so
/// a snapshot captures everything needed to restore the tank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Identifier allocated by the world.
    pub id: TankId,
    /// Team of the tank.
    pub side: Side,
    /// Tier of the tank.
    pub level: TankLevel,
    /// Chassis of the tank.
    pub tank_type: TankType,
    /// Left edge of the footprint.
    pub x: f32,
    /// Top edge of the footprint.
    pub y: f32,
    /// Current facing.
    pub direction: Direction,
    /// Whether the tank is still on the battlefield.
    pub alive: bool,
    /// Whether the tank advanced on its last forward input.
    pub moving: bool,
    /// Grid-snapped position other tanks collide against.
    pub reserved_x: f32,
    /// Grid-snapped position other tanks collide against.
    pub reserved_y: f32,
    /// Remaining hits before destruction.
    pub hp: u32,
    /// Whether destroying the tank drops a power-up.
    pub with_power_up: bool,
    /// Remaining invulnerability.
    pub helmet_duration: Duration,
    /// Time left before the tank may move again.
    pub frozen_timeout: Duration,
    /// Time left before the next ordinary shot.
    pub cooldown: Duration,
    /// Energy and overcharge state.
    pub energy: EnergyState,
    /// Time left invisible; stealth bots only.
    pub invisible_timeout: Duration,
    /// Time left before a stealth bot may vanish again.
    pub invisible_cooldown: Duration,
}

impl TankSnapshot {
    /// Reports whether the tank is currently hidden.
    #[must_use]
    pub const fn invisible(&self) -> bool {
        !self.invisible_timeout.is_zero()
    }

    /// Footprint at the live position.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::tank_at(self.x, self.y)
    }

    /// Footprint at the reserved position.
    #[must_use]
    pub const fn reserved_rect(&self) -> Rect {
        Rect::tank_at(self.reserved_x, self.reserved_y)
    }

    /// Live coordinate along the provided axis.
    #[must_use]
    pub const fn coordinate(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Copy of the tank with the live coordinate on `axis` replaced.
    #[must_use]
    pub fn with_coordinate(&self, axis: Axis, value: f32) -> Self {
        let mut tank = self.clone();
        match axis {
            Axis::X => tank.x = value,
            Axis::Y => tank.y = value,
        }
        tank
    }

    /// Copy of the tank moved `distance` units along its facing.
    #[must_use]
    pub fn advanced(&self, distance: f32) -> Self {
        let axis = self.direction.axis();
        let value = self.coordinate(axis) + self.direction.sign() * distance;
        self.with_coordinate(axis, value)
    }

    /// Spawn point of a bullet fired from the tank's muzzle.
    #[must_use]
    pub fn muzzle(&self) -> (f32, f32) {
        match self.direction {
            Direction::Up => (self.x + 6.0, self.y),
            Direction::Down => (self.x + 6.0, self.y + 13.0),
            Direction::Left => (self.x, self.y + 6.0),
            Direction::Right => (self.x + 13.0, self.y + 6.0),
        }
    }
}

/// Parameters of a tank placed by a spawn command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankSpawn {
    /// Team of the new tank.
    pub side: Side,
    /// Tier of the new tank.
    pub level: TankLevel,
    /// Chassis of the new tank.
    pub tank_type: TankType,
    /// Left edge of the footprint.
    pub x: f32,
    /// Top edge of the footprint.
    pub y: f32,
    /// Initial facing.
    pub direction: Direction,
    /// Whether destroying the tank drops a power-up.
    pub with_power_up: bool,
    /// Initial invulnerability.
    pub helmet_duration: Duration,
}

impl TankSpawn {
    /// Describes a tank facing up with no power-up or helmet.
    #[must_use]
    pub const fn new(side: Side, level: TankLevel, x: f32, y: f32) -> Self {
        Self {
            side,
            level,
            tank_type: TankType::Normal,
            x,
            y,
            direction: Direction::Up,
            with_power_up: false,
            helmet_duration: Duration::ZERO,
        }
    }

    /// Replaces the initial facing.
    #[must_use]
    pub const fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Replaces the chassis.
    #[must_use]
    pub const fn with_type(mut self, tank_type: TankType) -> Self {
        self.tank_type = tank_type;
        self
    }

    /// Replaces the initial helmet duration.
    #[must_use]
    pub const fn with_helmet(mut self, duration: Duration) -> Self {
        self.helmet_duration = duration;
        self
    }
}

/// Complete state of one bullet in flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    /// Identifier allocated by the world.
    pub id: BulletId,
    /// Tank that fired the bullet; it may since have died.
    pub owner: TankId,
    /// Team of the firing tank.
    pub side: Side,
    /// Travel direction.
    pub direction: Direction,
    /// Left edge of the footprint.
    pub x: f32,
    /// Top edge of the footprint.
    pub y: f32,
    /// Left edge before the latest advance.
    pub last_x: f32,
    /// Top edge before the latest advance.
    pub last_y: f32,
    /// Speed in world units per millisecond.
    pub speed: f32,
    /// Wall layers the bullet can destroy.
    pub power: u32,
    /// Whether the bullet belongs to an overcharged burst.
    pub overcharged: bool,
}

impl BulletSnapshot {
    /// Footprint at the current position.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::bullet_at(self.x, self.y)
    }
}

/// Parameters of a bullet requested by a fire controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletSpawn {
    /// Tank firing the bullet.
    pub owner: TankId,
    /// Team of the firing tank.
    pub side: Side,
    /// Travel direction.
    pub direction: Direction,
    /// Left edge of the footprint.
    pub x: f32,
    /// Top edge of the footprint.
    pub y: f32,
    /// Speed in world units per millisecond.
    pub speed: f32,
    /// Wall layers the bullet can destroy.
    pub power: u32,
    /// Whether the bullet belongs to an overcharged burst.
    pub overcharged: bool,
}

/// Centre of an announced air raid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BombingTarget {
    /// Horizontal centre of the blast.
    pub x: f32,
    /// Vertical centre of the blast.
    pub y: f32,
}

impl BombingTarget {
    /// Reports whether a point lies inside the square blast of the given
    /// half-width.
    #[must_use]
    pub fn covers(&self, x: f32, y: f32, radius: f32) -> bool {
        (x - self.x).abs() < radius && (y - self.y).abs() < radius
    }
}

/// Read-only snapshot describing all tanks in deterministic order.
#[derive(Clone, Debug, Default)]
pub struct TankView {
    snapshots: Vec<TankSnapshot>,
}

impl TankView {
    /// Creates a new tank view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TankSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tank snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &TankSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single tank.
    #[must_use]
    pub fn get(&self, id: TankId) -> Option<&TankSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TankSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all bullets in deterministic order.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured bullet snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Counts every bullet a tank currently has in flight, bursts included.
    #[must_use]
    pub fn in_flight(&self, owner: TankId) -> usize {
        self.snapshots
            .iter()
            .filter(|bullet| bullet.owner == owner)
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BulletSnapshot> {
        self.snapshots
    }
}

/// Movement request supplied for one tank on one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementInput {
    /// Face the provided direction.
    Turn(Direction),
    /// Drive along the current facing, optionally capped to a distance.
    Forward {
        /// Largest distance the tank may travel this tick.
        max_distance: Option<f32>,
    },
}

impl MovementInput {
    /// Forward input without a distance cap.
    #[must_use]
    pub const fn forward() -> Self {
        Self::Forward { max_distance: None }
    }
}

/// Combined movement and weapon input for one tank on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TankInput {
    /// Movement request; `None` means no command.
    pub movement: Option<MovementInput>,
    /// Whether the fire trigger is held.
    pub fire: bool,
}

/// Inputs gathered from every provider for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TankInputs {
    inputs: BTreeMap<TankId, TankInput>,
}

impl TankInputs {
    /// Creates an empty input set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the input for a tank, replacing any previous entry.
    pub fn set(&mut self, tank: TankId, input: TankInput) {
        let _ = self.inputs.insert(tank, input);
    }

    /// Input recorded for the tank, or the empty input.
    #[must_use]
    pub fn get(&self, tank: TankId) -> TankInput {
        self.inputs.get(&tank).copied().unwrap_or_default()
    }

    /// Removes every recorded input.
    pub fn clear(&mut self) {
        self.inputs.clear();
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the terrain and clears all tanks, bullets and restricted areas.
    LoadStage {
        /// Terrain of the new stage.
        stage: StageMap,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places a new tank on the battlefield.
    SpawnTank {
        /// Parameters of the tank.
        spawn: TankSpawn,
    },
    /// Commits a new live and reserved position together with a facing.
    MoveTank {
        /// Tank to move.
        tank: TankId,
        /// New left edge.
        x: f32,
        /// New top edge.
        y: f32,
        /// New facing.
        direction: Direction,
        /// New reserved left edge.
        reserved_x: f32,
        /// New reserved top edge.
        reserved_y: f32,
    },
    /// Marks a tank as moving.
    StartMove {
        /// Tank that started moving.
        tank: TankId,
    },
    /// Marks a tank as stationary.
    StopMove {
        /// Tank that stopped.
        tank: TankId,
    },
    /// Replaces a tank's frozen timeout.
    SetFrozenTimeout {
        /// Affected tank.
        tank: TankId,
        /// Time before the tank may move again.
        timeout: Duration,
    },
    /// Freezes every bot for the provided duration.
    SetBotFrozenTimeout {
        /// Time before bots may move or fire again.
        timeout: Duration,
    },
    /// Replaces a tank's fire cooldown.
    SetCooldown {
        /// Affected tank.
        tank: TankId,
        /// Time before the next ordinary shot.
        cooldown: Duration,
    },
    /// Replaces a tank's energy and overcharge state.
    UpdateTankEnergyState {
        /// Affected tank.
        tank: TankId,
        /// New energy state; energy is clamped on write.
        energy: EnergyState,
    },
    /// Replaces a tank's helmet duration.
    SetHelmetDuration {
        /// Affected tank.
        tank: TankId,
        /// Remaining invulnerability.
        duration: Duration,
    },
    /// Removes a tank from play while keeping its record.
    SetTankToDead {
        /// Tank to kill.
        tank: TankId,
    },
    /// Deals one hit to a tank.
    HurtTank {
        /// Tank that was hit.
        tank: TankId,
        /// Tank whose bullet landed the hit.
        attacker: TankId,
    },
    /// Launches a bullet.
    AddBullet {
        /// Parameters of the bullet.
        bullet: BulletSpawn,
    },
    /// Requests the shot sound for a player's shot or burst.
    PlayShotSound {
        /// Tank that fired.
        tank: TankId,
    },
    /// Moves a bullet, remembering its previous position.
    MoveBullet {
        /// Bullet to move.
        bullet: BulletId,
        /// New left edge.
        x: f32,
        /// New top edge.
        y: f32,
    },
    /// Removes a resolved bullet.
    RemoveBullet {
        /// Bullet to remove.
        bullet: BulletId,
    },
    /// Clears brick cells.
    RemoveBricks {
        /// Row-major brick cell indices.
        cells: Vec<usize>,
    },
    /// Clears steel cells.
    RemoveSteels {
        /// Row-major steel cell indices.
        cells: Vec<usize>,
    },
    /// Clears glass cells.
    RemoveGlasses {
        /// Row-major glass cell indices.
        cells: Vec<usize>,
    },
    /// Clears forest cells.
    RemoveForests {
        /// Row-major forest cell indices.
        cells: Vec<usize>,
    },
    /// Marks the eagle as destroyed.
    DestroyEagle,
    /// Adds or replaces a restricted area.
    AddRestrictedArea {
        /// Identifier of the area.
        area: AreaId,
        /// Blocked rectangle.
        rect: Rect,
    },
    /// Removes a restricted area.
    RemoveRestrictedArea {
        /// Identifier of the area.
        area: AreaId,
    },
    /// Toggles the terrain-wide slowdown event.
    SetSlowdown {
        /// Whether the slowdown is active.
        active: bool,
    },
    /// Replaces a stealth bot's invisibility timers.
    SetStealth {
        /// Affected tank.
        tank: TankId,
        /// Time left invisible.
        invisible_timeout: Duration,
        /// Time before the tank may vanish again.
        invisible_cooldown: Duration,
    },
    /// Marks or clears the spot an air raid is about to hit.
    SetBombingTarget {
        /// Impact point, or `None` once the bomb went off.
        target: Option<BombingTarget>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A new stage replaced the terrain.
    StageLoaded,
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A tank joined the battlefield.
    TankSpawned {
        /// Full state of the new tank.
        tank: TankSnapshot,
    },
    /// A tank's position or facing changed.
    TankMoved {
        /// Tank that moved.
        tank: TankId,
        /// New left edge.
        x: f32,
        /// New top edge.
        y: f32,
        /// New facing.
        direction: Direction,
    },
    /// A stationary tank started moving.
    TankStartedMoving {
        /// Tank that started moving.
        tank: TankId,
    },
    /// A moving tank stopped.
    TankStopped {
        /// Tank that stopped.
        tank: TankId,
    },
    /// A tank's frozen timeout changed.
    TankFrozen {
        /// Affected tank.
        tank: TankId,
        /// New timeout.
        timeout: Duration,
    },
    /// A tank's fire cooldown changed.
    CooldownChanged {
        /// Affected tank.
        tank: TankId,
        /// New cooldown.
        cooldown: Duration,
    },
    /// A tank's energy state changed.
    EnergyChanged {
        /// Affected tank.
        tank: TankId,
        /// New energy state.
        energy: EnergyState,
    },
    /// A bullet was launched.
    BulletFired {
        /// Full state of the new bullet.
        bullet: BulletSnapshot,
    },
    /// A player's shot should be heard.
    ShotSound {
        /// Tank that fired.
        tank: TankId,
    },
    /// A bullet advanced.
    BulletMoved {
        /// Bullet that moved.
        bullet: BulletId,
        /// New left edge.
        x: f32,
        /// New top edge.
        y: f32,
    },
    /// A bullet left play.
    BulletRemoved {
        /// Bullet that was removed.
        bullet: BulletId,
    },
    /// A tank lost a hit point.
    TankHurt {
        /// Tank that was hit.
        tank: TankId,
        /// Tank whose bullet landed the hit.
        attacker: TankId,
        /// Hit points left.
        hp: u32,
    },
    /// A tank was destroyed.
    TankKilled {
        /// Tank that died.
        tank: TankId,
    },
    /// Brick cells were cleared.
    BricksDestroyed {
        /// Row-major brick cell indices.
        cells: Vec<usize>,
    },
    /// Steel cells were cleared.
    SteelsDestroyed {
        /// Row-major steel cell indices.
        cells: Vec<usize>,
    },
    /// Glass cells were cleared.
    GlassesDestroyed {
        /// Row-major glass cell indices.
        cells: Vec<usize>,
    },
    /// Forest cells were cleared.
    ForestsDestroyed {
        /// Row-major forest cell indices.
        cells: Vec<usize>,
    },
    /// The eagle was destroyed.
    EagleDestroyed,
    /// A restricted area was added, replaced or removed.
    RestrictedAreaChanged {
        /// Identifier of the area.
        area: AreaId,
        /// Blocked rectangle, or `None` when removed.
        rect: Option<Rect>,
    },
    /// The slowdown event toggled.
    SlowdownChanged {
        /// Whether the slowdown is active.
        active: bool,
    },
    /// A stealth bot appeared or vanished.
    TankVisibilityChanged {
        /// Affected tank.
        tank: TankId,
        /// Whether the tank is now hidden.
        invisible: bool,
    },
    /// An air raid target was marked or cleared.
    BombingTargetChanged {
        /// Marked impact point, or `None` once cleared.
        target: Option<BombingTarget>,
    },
}

/// Sums the simulated time advanced by the provided events.
#[must_use]
pub fn elapsed(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}
