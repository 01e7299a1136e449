//! Circular bodies, the arena boundary, and the body registry
//!
//! Bodies are rotation-locked circles: position, velocity, radius, mass.
//! The registry owns them, hands out stable creation-ordered ids, and runs
//! the integrate-then-resolve advance.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision;

/// Stable body identifier, monotonic in creation order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BodyId(pub u32);

/// What a body is to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    /// The player-controlled ball
    Player,
    /// The ball the player is chasing
    Goal,
    /// Free-drifting hazard
    Obstacle,
    /// Gravity-bomb sensor: attracts, never collides, never moves
    ForceWell,
}

impl BodyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRole::Player => "player",
            BodyRole::Goal => "goal",
            BodyRole::Obstacle => "obstacle",
            BodyRole::ForceWell => "force-well",
        }
    }
}

/// A simulated circular rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub role: BodyRole,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub mass: f64,
    /// Immobile bodies never integrate and never receive impulses
    pub movable: bool,
}

impl Body {
    /// Kinetic energy (1/2 m v^2)
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// Force-wells are sensors: they attract but never take part in contacts
    #[inline]
    pub fn collides(&self) -> bool {
        self.role != BodyRole::ForceWell
    }
}

/// Creation parameters for a body
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub role: BodyRole,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub movable: bool,
}

impl BodySpec {
    /// A movable body at rest
    pub fn at_rest(role: BodyRole, pos: DVec2, radius: f64, mass: f64) -> Self {
        Self {
            role,
            pos,
            vel: DVec2::ZERO,
            radius,
            mass,
            movable: true,
        }
    }

    /// An immobile force-well sensor
    pub fn well(pos: DVec2, radius: f64, mass: f64) -> Self {
        Self {
            role: BodyRole::ForceWell,
            pos,
            vel: DVec2::ZERO,
            radius,
            mass,
            movable: false,
        }
    }
}

/// The rectangular arena bounds: four immovable walls with inward normals
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Boundary {
    pub min: DVec2,
    pub max: DVec2,
}

impl Boundary {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            min: DVec2::ZERO,
            max: DVec2::new(width, height),
        }
    }

    /// Whether a circle of the given radius fits fully inside
    pub fn contains_circle(&self, center: DVec2, radius: f64) -> bool {
        center.x - radius >= self.min.x
            && center.x + radius <= self.max.x
            && center.y - radius >= self.min.y
            && center.y + radius <= self.max.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Reference to a body id that no longer exists. Benign: a vanished body is
/// a race with capture/expiry, not a bug in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no body with id {0:?}")]
pub struct BodyNotFound(pub BodyId);

/// The body registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bodies {
    list: Vec<Body>,
    next_id: u32,
}

impl Default for Bodies {
    fn default() -> Self {
        Self::new()
    }
}

impl Bodies {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            next_id: 1,
        }
    }

    /// Insert a new body, returning its id. Ids are never reused, so the
    /// list stays sorted by id without further work.
    pub fn create(&mut self, spec: BodySpec) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.list.push(Body {
            id,
            role: spec.role,
            pos: spec.pos,
            vel: spec.vel,
            radius: spec.radius,
            mass: spec.mass,
            movable: spec.movable,
        });
        id
    }

    /// Remove a body. Other bodies are untouched either way.
    pub fn remove(&mut self, id: BodyId) -> Result<Body, BodyNotFound> {
        match self.list.iter().position(|b| b.id == id) {
            Some(idx) => Ok(self.list.remove(idx)),
            None => Err(BodyNotFound(id)),
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.list.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.list.iter_mut().find(|b| b.id == id)
    }

    /// First body with the given role, in creation order
    pub fn find_by_role(&self, role: BodyRole) -> Option<&Body> {
        self.list.iter().find(|b| b.role == role)
    }

    /// All bodies, creation order
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.list.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.list.iter_mut()
    }

    /// All bodies except the given roles
    pub fn iter_excluding<'a>(
        &'a self,
        roles: &'a [BodyRole],
    ) -> impl Iterator<Item = &'a Body> {
        self.list.iter().filter(move |b| !roles.contains(&b.role))
    }

    pub fn retain(&mut self, keep: impl FnMut(&Body) -> bool) {
        self.list.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Integrate all movable bodies by their velocities, then resolve every
    /// contact once on the post-integration positions. `exempt` names pairs
    /// the caller consumes itself (the player/goal capture pair).
    pub fn advance(
        &mut self,
        dt: f64,
        boundary: &Boundary,
        exempt: impl Fn(&Body, &Body) -> bool,
    ) {
        for body in self.list.iter_mut().filter(|b| b.movable) {
            body.pos += body.vel * dt;
        }
        collision::resolve_contacts(&mut self.list, boundary, exempt);
    }
}
