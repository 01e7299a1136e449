//! Deterministic simulation module
//!
//! All physics and control logic lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod body;
pub mod charge;
pub mod collision;
pub mod forces;
pub mod scheduler;
pub mod snapshot;

pub use arena::{Arena, ArenaEvent, Skill, SkillRejected};
pub use body::{Bodies, Body, BodyId, BodyNotFound, BodyRole, BodySpec, Boundary};
pub use charge::{BombSlots, ChargePool};
pub use collision::{reflect, resolve_contacts};
pub use forces::MagnetPull;
pub use scheduler::StepScheduler;
pub use snapshot::{ArenaState, BodySnapshot};
