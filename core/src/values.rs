//! Tuning tables that translate a tank's side and level into gameplay numbers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Side, TankLevel, TankType};

/// Tunable constants consumed by the controllers.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Multiplier applied to movement speed while the slowdown event is active.
    pub slowdown_factor: f32,
    /// Energy consumed by an ordinary shot.
    pub ordinary_shot_cost: f32,
    /// Minimum energy required to begin an overcharge.
    pub overcharge_threshold: f32,
    /// Milliseconds an overcharge must be held before the burst fires.
    pub overcharge_charge_ms: u64,
    /// Milliseconds a tank stays paralyzed after an overcharge ends.
    pub paralysis_ms: u64,
    /// Energy regained per second while idle.
    pub energy_regen_per_second: f32,
    /// Number of bullets in an overcharged burst.
    pub burst_size: u32,
    /// Lateral distance between neighbouring bullets of a burst.
    pub burst_spread: f32,
    /// Milliseconds a player stays frozen after being hit by another player.
    pub friendly_fire_freeze_ms: u64,
    /// Whether paralysis also prevents forward movement.
    pub paralysis_blocks_movement: bool,
    /// Upper bound applied to a single frame delta, in milliseconds.
    pub max_frame_delta_ms: u64,
}

impl Tuning {
    /// Duration an overcharge must be held before the burst fires.
    #[must_use]
    pub const fn overcharge_charge_time(&self) -> Duration {
        Duration::from_millis(self.overcharge_charge_ms)
    }

    /// Duration of the post-overcharge paralysis.
    #[must_use]
    pub const fn paralysis_time(&self) -> Duration {
        Duration::from_millis(self.paralysis_ms)
    }

    /// Duration a player is frozen by a teammate's bullet.
    #[must_use]
    pub const fn friendly_fire_freeze(&self) -> Duration {
        Duration::from_millis(self.friendly_fire_freeze_ms)
    }

    /// Largest delta a single tick may advance the simulation by.
    #[must_use]
    pub const fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            slowdown_factor: 0.8,
            ordinary_shot_cost: 5.0,
            overcharge_threshold: 50.0,
            overcharge_charge_ms: 1_000,
            paralysis_ms: 1_000,
            energy_regen_per_second: 2.0,
            burst_size: 3,
            burst_spread: 4.0,
            friendly_fire_freeze_ms: 1_000,
            paralysis_blocks_movement: false,
            max_frame_delta_ms: 50,
        }
    }
}

/// Upper bound of a tank's energy gauge.
pub const MAX_ENERGY: f32 = 100.0;

impl TankType {
    /// Multiplier applied to the level's movement speed.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Heavy => 0.6,
            Self::TankDestroyer | Self::SelfPropelledGun => 0.8,
            Self::Light => 1.5,
        }
    }

    /// Multiplier applied to the level's bullet speed.
    #[must_use]
    pub const fn bullet_speed_multiplier(self) -> f32 {
        match self {
            Self::Normal | Self::Heavy | Self::Light => 1.0,
            Self::TankDestroyer => 0.7,
            Self::SelfPropelledGun => 0.4,
        }
    }

    /// Extra reload time added to the level's bullet interval.
    #[must_use]
    pub const fn extra_interval(self) -> Duration {
        match self {
            Self::Light => Duration::from_millis(1_000),
            Self::SelfPropelledGun => Duration::from_millis(2_000),
            _ => Duration::ZERO,
        }
    }

    /// Bullet power of the chassis before level overrides.
    #[must_use]
    pub const fn base_power(self) -> u32 {
        match self {
            Self::TankDestroyer => 2,
            _ => 1,
        }
    }
}

/// Movement speed in world units per millisecond.
#[must_use]
pub fn move_speed(side: Side, level: TankLevel, tank_type: TankType) -> f32 {
    let base = match side {
        Side::Player => 0.045,
        Side::Bot => match level {
            TankLevel::Power => 0.045,
            TankLevel::Fast => 0.06,
            TankLevel::Basic | TankLevel::Armor | TankLevel::Suicide | TankLevel::Stealth => 0.03,
        },
    };
    base * tank_type.speed_multiplier()
}

/// Bullet speed in world units per millisecond.
#[must_use]
pub fn bullet_speed(side: Side, level: TankLevel, tank_type: TankType) -> f32 {
    let base = match (side, level) {
        (_, TankLevel::Basic) => 0.12,
        (Side::Bot, TankLevel::Power) => 0.24,
        _ => 0.18,
    };
    base * tank_type.bullet_speed_multiplier()
}

/// Number of wall layers a bullet fired by the tank can destroy.
///
/// Armored players and power bots override the chassis power. A power of
/// three or more also breaks steel.
#[must_use]
pub const fn bullet_power(side: Side, level: TankLevel, tank_type: TankType) -> u32 {
    match (side, level) {
        (Side::Player, TankLevel::Armor) => 3,
        (Side::Bot, TankLevel::Power) => 2,
        _ => tank_type.base_power(),
    }
}

/// Minimum time between two ordinary shots.
#[must_use]
pub const fn bullet_interval(level: TankLevel, tank_type: TankType) -> Duration {
    let base = match level {
        TankLevel::Basic => Duration::from_millis(300),
        _ => Duration::from_millis(200),
    };
    base.saturating_add(tank_type.extra_interval())
}

/// Maximum number of bullets a tank may have in flight, bursts included.
#[must_use]
pub const fn bullet_limit(side: Side, level: TankLevel) -> usize {
    match (side, level) {
        (Side::Bot, _) | (_, TankLevel::Basic) | (_, TankLevel::Fast) => 1,
        _ => 2,
    }
}

/// Hits a freshly spawned tank can absorb.
#[must_use]
pub const fn initial_hp(level: TankLevel) -> u32 {
    match level {
        TankLevel::Armor => 4,
        _ => 1,
    }
}

/// Converts a tick delta into fractional milliseconds.
#[must_use]
pub fn millis(dt: Duration) -> f32 {
    dt.as_secs_f32() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_limit_depends_on_side_and_level() {
        assert_eq!(bullet_limit(Side::Bot, TankLevel::Armor), 1);
        assert_eq!(bullet_limit(Side::Player, TankLevel::Basic), 1);
        assert_eq!(bullet_limit(Side::Player, TankLevel::Fast), 1);
        assert_eq!(bullet_limit(Side::Player, TankLevel::Power), 2);
        assert_eq!(bullet_limit(Side::Player, TankLevel::Armor), 2);
    }

    #[test]
    fn bots_move_slower_unless_fast() {
        let normal = TankType::Normal;
        assert!(
            move_speed(Side::Bot, TankLevel::Basic, normal)
                < move_speed(Side::Player, TankLevel::Basic, normal)
        );
        assert!(
            move_speed(Side::Bot, TankLevel::Fast, normal)
                > move_speed(Side::Player, TankLevel::Basic, normal)
        );
        assert_eq!(
            move_speed(Side::Bot, TankLevel::Stealth, normal),
            move_speed(Side::Bot, TankLevel::Basic, normal)
        );
    }

    #[test]
    fn only_armored_players_break_steel() {
        let normal = TankType::Normal;
        assert_eq!(bullet_power(Side::Player, TankLevel::Armor, normal), 3);
        assert_eq!(bullet_power(Side::Bot, TankLevel::Armor, normal), 1);
        assert_eq!(bullet_power(Side::Bot, TankLevel::Power, normal), 2);
    }

    #[test]
    fn chassis_scales_speed_and_reload() {
        let player = |tank_type| move_speed(Side::Player, TankLevel::Basic, tank_type);
        assert!((player(TankType::Heavy) - 0.027).abs() < 1e-6);
        assert!((player(TankType::Light) - 0.0675).abs() < 1e-6);
        let shell = bullet_speed(Side::Player, TankLevel::Power, TankType::SelfPropelledGun);
        assert!((shell - 0.072).abs() < 1e-6);
        assert_eq!(
            bullet_interval(TankLevel::Basic, TankType::Light),
            Duration::from_millis(1_300)
        );
        assert_eq!(
            bullet_interval(TankLevel::Fast, TankType::SelfPropelledGun),
            Duration::from_millis(2_200)
        );
        assert_eq!(
            bullet_interval(TankLevel::Fast, TankType::Heavy),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn level_power_overrides_tank_destroyer_power() {
        let destroyer = TankType::TankDestroyer;
        assert_eq!(bullet_power(Side::Player, TankLevel::Basic, destroyer), 2);
        assert_eq!(bullet_power(Side::Player, TankLevel::Armor, destroyer), 3);
        assert_eq!(bullet_power(Side::Bot, TankLevel::Basic, destroyer), 2);
    }

    #[test]
    fn partial_tuning_overrides_keep_remaining_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"paralysis_ms": 1500}"#).expect("parse");
        assert_eq!(tuning.paralysis_time(), Duration::from_millis(1_500));
        assert_eq!(tuning.burst_size, Tuning::default().burst_size);
    }

    #[test]
    fn millis_keeps_fractions() {
        assert!((millis(Duration::from_micros(16_667)) - 16.667).abs() < 1e-3);
    }
}
