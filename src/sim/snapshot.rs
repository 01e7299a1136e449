//! Externally observed arena state
//!
//! Consumers (rendering, scoring, controllers) only ever see the world
//! through these types, produced synchronously after an advance. A snapshot
//! is a value: once handed out it never changes under the reader.

use glam::DVec2;
use serde::Serialize;

use super::body::{Bodies, Body, BodyId, BodyRole};

/// One body as seen from outside the simulator
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub role: BodyRole,
    /// Presentation position: interpolated during slow motion
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
}

impl BodySnapshot {
    pub fn of(body: &Body, pos: DVec2) -> Self {
        Self {
            id: body.id,
            role: body.role,
            pos,
            vel: body.vel,
            radius: body.radius,
        }
    }
}

/// The full externally observed tuple
#[derive(Debug, Clone, Serialize)]
pub struct ArenaState {
    /// All live bodies in creation order
    pub bodies: Vec<BodySnapshot>,
    /// Simulated seconds since init/reset
    pub elapsed: f64,
    /// Seconds left on the round clock (floored at zero)
    pub remaining: f64,
    /// Goals captured this round
    pub score: u64,
    /// Names of skills asserted this frame
    pub active_skills: Vec<&'static str>,
}

/// Number of observation values per body: (x, y, vx, vy)
pub const OBS_PER_BODY: usize = 4;

/// Flatten the world for a learning controller: player, goal, then
/// obstacles in stable creation order, four values each. The length is
/// always `(2 + obstacle_count) * 4` regardless of what is currently alive;
/// a vacant slot (an eaten goal awaiting respawn) reads as zeros. This
/// layout is a frozen compatibility contract.
pub fn flat_observation(
    bodies: &Bodies,
    obstacle_ids: &[BodyId],
    obstacle_count: usize,
) -> Vec<f64> {
    let mut obs = Vec::with_capacity((2 + obstacle_count) * OBS_PER_BODY);

    push_body(&mut obs, bodies.find_by_role(BodyRole::Player));
    push_body(&mut obs, bodies.find_by_role(BodyRole::Goal));
    for id in obstacle_ids.iter().take(obstacle_count) {
        push_body(&mut obs, bodies.get(*id));
    }
    // pad out vanished obstacles so the arity never drifts
    while obs.len() < (2 + obstacle_count) * OBS_PER_BODY {
        obs.push(0.0);
    }
    obs
}

fn push_body(obs: &mut Vec<f64>, body: Option<&Body>) {
    match body {
        Some(b) => {
            obs.push(b.pos.x);
            obs.push(b.pos.y);
            obs.push(b.vel.x);
            obs.push(b.vel.y);
        }
        None => obs.extend_from_slice(&[0.0; OBS_PER_BODY]),
    }
}
