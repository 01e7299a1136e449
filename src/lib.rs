//! Driftwell - a zero-gravity 2D arena game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, elastic collisions, skill
//!   forces, charge pools, the step scheduler)
//! - `config`: Data-driven arena and skill tuning
//!
//! The crate owns physics and control only. Rendering, input mapping and
//! score display consume the core through [`sim::Arena`]: advance it once
//! per frame, read the post-advance snapshot, drain the event list.

pub mod config;
pub mod sim;

pub use config::ArenaConfig;
pub use sim::{Arena, ArenaEvent, Skill, SkillRejected};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum physics advances per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Arena dimensions (arena units, pixel-scaled)
    pub const ARENA_WIDTH: f64 = 800.0;
    pub const ARENA_HEIGHT: f64 = 600.0;
    /// Round length in seconds
    pub const ROUND_SECONDS: f64 = 90.0;

    /// Body defaults
    pub const PLAYER_RADIUS: f64 = 15.0;
    pub const PLAYER_MASS: f64 = 5.0;
    pub const GOAL_RADIUS: f64 = 10.0;
    pub const GOAL_MASS: f64 = 1.0;
    pub const OBSTACLE_RADIUS: f64 = 22.0;
    pub const OBSTACLE_MASS: f64 = 8.0;
    pub const OBSTACLE_COUNT: usize = 4;

    /// Brake drag constant (F = -k * v * m)
    pub const BRAKE_K: f64 = 4.0;

    /// Magnetize: force magnitude is MAGNET_STRENGTH / d^2
    pub const MAGNET_STRENGTH: f64 = 6.0e6;
    /// Magnetize effect radius
    pub const MAGNET_RADIUS: f64 = 260.0;

    /// Gravity well: force magnitude is WELL_STRENGTH / d^2
    pub const WELL_STRENGTH: f64 = 8.0e6;
    /// Gravity well effect radius
    pub const WELL_EFFECT_RADIUS: f64 = 220.0;
    /// Well lifetime in seconds
    pub const WELL_DURATION: f64 = 5.0;
    /// A body this close to a well center collapses it
    pub const WELL_UNSAFE_RADIUS: f64 = 18.0;
    /// Sensor radius of the well body (presentation only, wells never collide)
    pub const WELL_BODY_RADIUS: f64 = 12.0;
    /// Nominal mass for well bodies
    pub const WELL_MASS: f64 = 1.0;

    /// Minimum distance for inverse-square forces (singular-force guard)
    pub const MIN_FORCE_DISTANCE: f64 = 12.0;

    /// Charge pools run 0..=100
    pub const CHARGE_MAX: f64 = 100.0;
    /// Continuous pool drain per simulated frame while the skill is held
    pub const BRAKE_DRAIN_PER_FRAME: f64 = 0.6;
    pub const MAGNET_DRAIN_PER_FRAME: f64 = 0.45;
    /// Frames after release before a continuous pool starts recharging
    pub const RECHARGE_DELAY_FRAMES: u32 = 45;
    /// Continuous pool recharge rate (charge per second)
    pub const RECHARGE_PER_SECOND: f64 = 25.0;
    /// Gravity bomb slots and full-recharge time per slot
    pub const BOMB_SLOTS: usize = 3;
    pub const BOMB_RECHARGE_SECONDS: f64 = 8.0;

    /// Slow-motion throttle: physics runs at this fraction of real time
    /// while brake is held with charge remaining
    pub const SLOW_MOTION_FACTOR: f64 = 0.3;
}
