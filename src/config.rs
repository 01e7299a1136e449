//! Arena and skill tuning
//!
//! Plain serializable data. Loading and persisting configuration belongs to
//! the embedding application; the core only sanitizes what it is handed:
//! every non-finite or non-positive numeric field is replaced by its
//! documented default and the substitution is logged.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Full tuning record for one arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Arena width in arena units
    pub width: f64,
    /// Arena height in arena units
    pub height: f64,
    /// Round length in seconds (drives the `remaining` clock in snapshots)
    pub round_seconds: f64,

    /// Number of obstacle bodies (0 is legal, the arena is just emptier)
    pub obstacle_count: usize,
    pub player_radius: f64,
    pub player_mass: f64,
    pub goal_radius: f64,
    pub goal_mass: f64,
    pub obstacle_radius: f64,
    pub obstacle_mass: f64,

    /// Brake drag constant k in F = -k * v * m
    pub brake_k: f64,

    /// Magnetize force magnitude numerator (F = strength / d^2)
    pub magnet_strength: f64,
    /// Magnetize effect radius
    pub magnet_radius: f64,

    /// Gravity well force magnitude numerator (F = strength / d^2)
    pub well_strength: f64,
    /// Gravity well effect radius
    pub well_effect_radius: f64,
    /// Well lifetime in seconds
    pub well_duration: f64,
    /// Any movable body inside this distance collapses the well
    pub well_unsafe_radius: f64,
    /// Radius of the well sensor body (never collides)
    pub well_body_radius: f64,
    /// Nominal mass for well bodies
    pub well_mass: f64,

    /// Minimum distance below which inverse-square forces are skipped
    pub min_force_distance: f64,

    /// Continuous pool drain per simulated frame
    pub brake_drain_per_frame: f64,
    pub magnet_drain_per_frame: f64,
    /// Frames after release before continuous pools recharge
    pub recharge_delay_frames: u32,
    /// Continuous pool recharge rate (charge per second)
    pub recharge_per_second: f64,
    /// Gravity bomb slot count
    pub bomb_slots: usize,
    /// Seconds for a spent bomb slot to fully recharge
    pub bomb_recharge_seconds: f64,

    /// Slow-motion throttle fraction, (0, 1]
    pub slow_motion_factor: f64,

    /// RNG seed for spawn placement
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            round_seconds: ROUND_SECONDS,
            obstacle_count: OBSTACLE_COUNT,
            player_radius: PLAYER_RADIUS,
            player_mass: PLAYER_MASS,
            goal_radius: GOAL_RADIUS,
            goal_mass: GOAL_MASS,
            obstacle_radius: OBSTACLE_RADIUS,
            obstacle_mass: OBSTACLE_MASS,
            brake_k: BRAKE_K,
            magnet_strength: MAGNET_STRENGTH,
            magnet_radius: MAGNET_RADIUS,
            well_strength: WELL_STRENGTH,
            well_effect_radius: WELL_EFFECT_RADIUS,
            well_duration: WELL_DURATION,
            well_unsafe_radius: WELL_UNSAFE_RADIUS,
            well_body_radius: WELL_BODY_RADIUS,
            well_mass: WELL_MASS,
            min_force_distance: MIN_FORCE_DISTANCE,
            brake_drain_per_frame: BRAKE_DRAIN_PER_FRAME,
            magnet_drain_per_frame: MAGNET_DRAIN_PER_FRAME,
            recharge_delay_frames: RECHARGE_DELAY_FRAMES,
            recharge_per_second: RECHARGE_PER_SECOND,
            bomb_slots: BOMB_SLOTS,
            bomb_recharge_seconds: BOMB_RECHARGE_SECONDS,
            slow_motion_factor: SLOW_MOTION_FACTOR,
            seed: 0,
        }
    }
}

/// Replace a bad positive-finite field with its default, logging the swap
fn positive(name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("config: {name} = {value} is not a positive finite number, using {default}");
        default
    }
}

impl ArenaConfig {
    /// Return a copy with every invalid numeric field replaced by its
    /// documented default. Never fails.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let mut cfg = self.clone();
        cfg.width = positive("width", cfg.width, d.width);
        cfg.height = positive("height", cfg.height, d.height);
        cfg.round_seconds = positive("round_seconds", cfg.round_seconds, d.round_seconds);
        cfg.player_radius = positive("player_radius", cfg.player_radius, d.player_radius);
        cfg.player_mass = positive("player_mass", cfg.player_mass, d.player_mass);
        cfg.goal_radius = positive("goal_radius", cfg.goal_radius, d.goal_radius);
        cfg.goal_mass = positive("goal_mass", cfg.goal_mass, d.goal_mass);
        cfg.obstacle_radius = positive("obstacle_radius", cfg.obstacle_radius, d.obstacle_radius);
        cfg.obstacle_mass = positive("obstacle_mass", cfg.obstacle_mass, d.obstacle_mass);
        cfg.brake_k = positive("brake_k", cfg.brake_k, d.brake_k);
        cfg.magnet_strength = positive("magnet_strength", cfg.magnet_strength, d.magnet_strength);
        cfg.magnet_radius = positive("magnet_radius", cfg.magnet_radius, d.magnet_radius);
        cfg.well_strength = positive("well_strength", cfg.well_strength, d.well_strength);
        cfg.well_effect_radius =
            positive("well_effect_radius", cfg.well_effect_radius, d.well_effect_radius);
        cfg.well_duration = positive("well_duration", cfg.well_duration, d.well_duration);
        cfg.well_unsafe_radius =
            positive("well_unsafe_radius", cfg.well_unsafe_radius, d.well_unsafe_radius);
        cfg.well_body_radius =
            positive("well_body_radius", cfg.well_body_radius, d.well_body_radius);
        cfg.well_mass = positive("well_mass", cfg.well_mass, d.well_mass);
        cfg.min_force_distance =
            positive("min_force_distance", cfg.min_force_distance, d.min_force_distance);
        cfg.brake_drain_per_frame = positive(
            "brake_drain_per_frame",
            cfg.brake_drain_per_frame,
            d.brake_drain_per_frame,
        );
        cfg.magnet_drain_per_frame = positive(
            "magnet_drain_per_frame",
            cfg.magnet_drain_per_frame,
            d.magnet_drain_per_frame,
        );
        cfg.recharge_per_second =
            positive("recharge_per_second", cfg.recharge_per_second, d.recharge_per_second);
        cfg.bomb_recharge_seconds = positive(
            "bomb_recharge_seconds",
            cfg.bomb_recharge_seconds,
            d.bomb_recharge_seconds,
        );
        // The throttle must also stay at or below real time
        cfg.slow_motion_factor =
            positive("slow_motion_factor", cfg.slow_motion_factor, d.slow_motion_factor);
        if cfg.slow_motion_factor > 1.0 {
            log::warn!(
                "config: slow_motion_factor = {} exceeds 1.0, using {}",
                cfg.slow_motion_factor,
                d.slow_motion_factor
            );
            cfg.slow_motion_factor = d.slow_motion_factor;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_survives_sanitize_unchanged() {
        let cfg = ArenaConfig::default();
        let clean = cfg.sanitized();
        assert_eq!(cfg.width, clean.width);
        assert_eq!(cfg.brake_k, clean.brake_k);
        assert_eq!(cfg.bomb_slots, clean.bomb_slots);
    }

    #[test]
    fn bad_fields_fall_back_to_defaults() {
        let cfg = ArenaConfig {
            width: f64::NAN,
            player_mass: -3.0,
            well_duration: 0.0,
            slow_motion_factor: 2.5,
            ..Default::default()
        };
        let clean = cfg.sanitized();
        assert_eq!(clean.width, ARENA_WIDTH);
        assert_eq!(clean.player_mass, PLAYER_MASS);
        assert_eq!(clean.well_duration, WELL_DURATION);
        assert_eq!(clean.slow_motion_factor, SLOW_MOTION_FACTOR);
    }

    #[test]
    fn valid_custom_fields_are_kept() {
        let cfg = ArenaConfig {
            width: 1024.0,
            brake_k: 0.001,
            ..Default::default()
        };
        let clean = cfg.sanitized();
        assert_eq!(clean.width, 1024.0);
        assert_eq!(clean.brake_k, 0.001);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = ArenaConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ArenaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.magnet_radius, cfg.magnet_radius);
        assert_eq!(back.seed, cfg.seed);
    }
}
