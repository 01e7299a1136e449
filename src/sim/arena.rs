//! The arena handle
//!
//! One `Arena` is one independent simulation: the body registry, the charge
//! pools, the scheduler, a seeded RNG and the round bookkeeping, advanced
//! strictly sequentially with no hidden shared state. Everything external
//! (input translation, rendering, a learning controller) drives it through
//! `activate_skill` + `advance_frame` and reads back through `snapshot`,
//! `flat_observation` and `drain_events`.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;
use thiserror::Error;

use crate::config::ArenaConfig;

use super::body::{Bodies, BodyId, BodyRole, BodySpec, Boundary};
use super::charge::{BombSlots, ChargePool};
use super::forces::{self, MagnetPull};
use super::scheduler::StepScheduler;
use super::snapshot::{self, ArenaState, BodySnapshot};

/// Player-invocable skills. `None` clears the held skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Skill {
    #[default]
    None,
    Brake,
    Magnetize,
    GravityWell,
}

impl Skill {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::None => "none",
            Skill::Brake => "brake",
            Skill::Magnetize => "magnetize",
            Skill::GravityWell => "gravity-well",
        }
    }

    /// Parse a wire/config id. Unknown ids get `None` (the Option, not the
    /// skill), so callers can reject them without a crash.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "none" => Some(Skill::None),
            "brake" => Some(Skill::Brake),
            "magnetize" => Some(Skill::Magnetize),
            "gravity-well" | "gravity_well" | "gravityWell" => Some(Skill::GravityWell),
            _ => None,
        }
    }
}

/// Why an activation request was refused. Always benign: nothing in the
/// arena changes when one of these comes back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillRejected {
    #[error("brake charge is empty")]
    BrakeDepleted,
    #[error("magnetize charge is empty")]
    MagnetizeDepleted,
    #[error("no gravity bomb slot is fully charged")]
    NoBombCharge,
    #[error("gravity bomb requires a target position")]
    MissingTarget,
    #[error("gravity bomb target must be finite")]
    InvalidTarget,
    #[error("unknown skill id `{0}`")]
    UnknownSkill(String),
}

/// Things that happened during an advance, drained by the presentation
/// layer (explosion effects, goal-respawn scheduling, HUD flashes).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArenaEvent {
    /// Player reached the goal; the goal body is already gone
    GoalCaptured { goal: BodyId, score: u64 },
    WellSpawned { well: BodyId, pos: DVec2 },
    /// Lifetime ran out
    WellExpired { well: BodyId },
    /// A body came dangerously close and the well destroyed itself
    WellCollapsed { well: BodyId },
}

/// Arena-side lifecycle record for one force-well body
#[derive(Debug, Clone)]
struct Well {
    id: BodyId,
    center: DVec2,
    expires_at: f64,
}

/// One independent simulated arena
pub struct Arena {
    config: ArenaConfig,
    boundary: Boundary,
    bodies: Bodies,
    player: BodyId,
    goal: Option<BodyId>,
    obstacles: Vec<BodyId>,
    wells: Vec<Well>,

    brake_pool: ChargePool,
    magnet_pool: ChargePool,
    bombs: BombSlots,

    scheduler: StepScheduler,
    rng: Pcg32,

    active_skill: Skill,
    score: u64,
    elapsed: f64,
    events: Vec<ArenaEvent>,
    magnet_pulls: Vec<MagnetPull>,
    /// Positions at the previous advance, for presentation interpolation
    prev_pos: Vec<(BodyId, DVec2)>,
}

impl Arena {
    /// Build an arena from a config. Invalid numeric fields fall back to
    /// their documented defaults (logged), never to a crash.
    pub fn new(config: ArenaConfig) -> Self {
        let config = config.sanitized();
        let boundary = Boundary::new(config.width, config.height);
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let (bodies, player, goal, obstacles) = populate(&config, &boundary, &mut rng);

        log::info!(
            "arena initialized: {}x{}, {} obstacles, seed {}",
            config.width,
            config.height,
            config.obstacle_count,
            config.seed
        );

        let mut arena = Self {
            brake_pool: ChargePool::full(
                config.brake_drain_per_frame,
                config.recharge_delay_frames,
                config.recharge_per_second,
            ),
            magnet_pool: ChargePool::full(
                config.magnet_drain_per_frame,
                config.recharge_delay_frames,
                config.recharge_per_second,
            ),
            bombs: BombSlots::new(config.bomb_slots, config.bomb_recharge_seconds),
            scheduler: StepScheduler::new(crate::consts::SIM_DT, config.slow_motion_factor),
            boundary,
            bodies,
            player,
            goal: Some(goal),
            obstacles,
            wells: Vec::new(),
            rng,
            active_skill: Skill::None,
            score: 0,
            elapsed: 0.0,
            events: Vec::new(),
            magnet_pulls: Vec::new(),
            prev_pos: Vec::new(),
            config,
        };
        arena.remember_positions();
        arena
    }

    /// Destroy and recreate all movable bodies at fresh randomized
    /// positions with zero velocity; clear wells, refill pools, zero the
    /// clock and score. The new body set is staged first, so a reader
    /// either sees the old state or the completed reset, never a partial
    /// body list.
    pub fn reset(&mut self) {
        let (bodies, player, goal, obstacles) =
            populate(&self.config, &self.boundary, &mut self.rng);
        self.bodies = bodies;
        self.player = player;
        self.goal = Some(goal);
        self.obstacles = obstacles;
        self.wells.clear();
        self.brake_pool.refill();
        self.magnet_pool.refill();
        self.bombs.refill();
        self.scheduler.reset();
        self.active_skill = Skill::None;
        self.score = 0;
        self.elapsed = 0.0;
        self.events.clear();
        self.magnet_pulls.clear();
        self.remember_positions();
        log::info!("arena reset");
    }

    /// Run one scheduler tick worth of simulation for a rendered frame.
    pub fn advance_frame(&mut self, real_dt: f64) {
        let slow = self.active_skill == Skill::Brake && !self.brake_pool.is_empty();
        self.scheduler.set_slow_motion(slow);
        let steps = self.scheduler.advance(real_dt);
        for _ in 0..steps {
            self.step();
        }
    }

    /// Sole control entry point, shared by human input translation and any
    /// automated controller. Rejections mutate nothing.
    pub fn activate_skill(
        &mut self,
        skill: Skill,
        target: Option<DVec2>,
    ) -> Result<(), SkillRejected> {
        match skill {
            Skill::None => {
                self.active_skill = Skill::None;
                Ok(())
            }
            Skill::Brake => {
                if !self.brake_pool.can_activate() {
                    return Err(SkillRejected::BrakeDepleted);
                }
                self.active_skill = Skill::Brake;
                Ok(())
            }
            Skill::Magnetize => {
                if !self.magnet_pool.can_activate() {
                    return Err(SkillRejected::MagnetizeDepleted);
                }
                self.active_skill = Skill::Magnetize;
                Ok(())
            }
            Skill::GravityWell => {
                let pos = target.ok_or(SkillRejected::MissingTarget)?;
                if !pos.is_finite() {
                    return Err(SkillRejected::InvalidTarget);
                }
                if !self.bombs.try_spend() {
                    return Err(SkillRejected::NoBombCharge);
                }
                let pos = pos.clamp(self.boundary.min, self.boundary.max);
                let id = self.bodies.create(BodySpec::well(
                    pos,
                    self.config.well_body_radius,
                    self.config.well_mass,
                ));
                self.wells.push(Well {
                    id,
                    center: pos,
                    expires_at: self.elapsed + self.config.well_duration,
                });
                self.events.push(ArenaEvent::WellSpawned { well: id, pos });
                log::debug!("gravity well {id:?} spawned at {pos}");
                Ok(())
            }
        }
    }

    /// String-id variant of [`activate_skill`](Self::activate_skill) for
    /// callers speaking the wire vocabulary. Unknown ids are rejected with
    /// no side effects.
    pub fn activate_skill_id(
        &mut self,
        id: &str,
        target: Option<DVec2>,
    ) -> Result<(), SkillRejected> {
        let skill = Skill::parse(id).ok_or_else(|| SkillRejected::UnknownSkill(id.to_string()))?;
        self.activate_skill(skill, target)
    }

    /// The post-advance snapshot. Positions are presentation positions:
    /// during slow motion they are interpolated between the previous and
    /// current advance by the scheduler's fractional progress. The
    /// interpolation never feeds back into the simulator.
    pub fn snapshot(&self) -> ArenaState {
        let blend = self.scheduler.blend();
        let bodies = self
            .bodies
            .iter()
            .map(|b| {
                let prev = self
                    .prev_pos
                    .iter()
                    .find(|(id, _)| *id == b.id)
                    .map(|(_, p)| *p)
                    .unwrap_or(b.pos);
                BodySnapshot::of(b, prev.lerp(b.pos, blend))
            })
            .collect();
        let active_skills = match self.active_skill {
            Skill::None => Vec::new(),
            skill => vec![skill.as_str()],
        };
        ArenaState {
            bodies,
            elapsed: self.elapsed,
            remaining: (self.config.round_seconds - self.elapsed).max(0.0),
            score: self.score,
            active_skills,
        }
    }

    /// Fixed-order flattening for learning controllers: player, goal,
    /// obstacles in creation order, `(x, y, vx, vy)` each. Frozen contract;
    /// see [`snapshot::flat_observation`].
    pub fn flat_observation(&self) -> Vec<f64> {
        snapshot::flat_observation(&self.bodies, &self.obstacles, self.config.obstacle_count)
    }

    /// Take everything that happened since the last drain.
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn a fresh goal after a capture. The respawn *delay* is the
    /// presentation layer's business; it calls this when its animation is
    /// done. Idempotent while a goal is alive.
    pub fn spawn_goal(&mut self) -> BodyId {
        if let Some(id) = self.goal {
            return id;
        }
        let pos = random_spot(
            &self.bodies,
            &self.boundary,
            self.config.goal_radius,
            &mut self.rng,
        );
        let id = self.bodies.create(BodySpec::at_rest(
            BodyRole::Goal,
            pos,
            self.config.goal_radius,
            self.config.goal_mass,
        ));
        self.goal = Some(id);
        log::debug!("goal respawned as {id:?} at {pos}");
        id
    }

    // --- read-side accessors -------------------------------------------

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn active_skill(&self) -> Skill {
        self.active_skill
    }

    pub fn brake_charge(&self) -> f64 {
        self.brake_pool.charge()
    }

    pub fn magnet_charge(&self) -> f64 {
        self.magnet_pool.charge()
    }

    pub fn bomb_charges(&self) -> &[f64] {
        self.bombs.charges()
    }

    /// Bodies pulled by the last magnetize frame, for beam rendering
    pub fn magnet_pulls(&self) -> &[MagnetPull] {
        &self.magnet_pulls
    }

    // --- one fixed physics advance -------------------------------------

    fn step(&mut self) {
        let dt = self.scheduler.sim_dt();
        self.remember_positions();

        // charge accounting first: this frame's hold costs this frame
        let brake_held = self.active_skill == Skill::Brake;
        let magnet_held = self.active_skill == Skill::Magnetize;
        self.brake_pool.tick(brake_held, dt);
        self.magnet_pool.tick(magnet_held, dt);
        self.bombs.tick(dt);
        if (brake_held && self.brake_pool.is_empty())
            || (magnet_held && self.magnet_pool.is_empty())
        {
            // the pool ran dry under the player's thumb
            self.active_skill = Skill::None;
        }

        self.run_well_lifecycle();
        self.apply_skill_forces(dt);

        // integrate + resolve, leaving the capture pair for us
        let player = self.player;
        let goal = self.goal;
        self.bodies.advance(dt, &self.boundary, move |a, b| {
            let pair = (Some(a.id), Some(b.id));
            pair == (Some(player), goal) || pair == (goal, Some(player))
        });

        self.check_goal_capture();
        self.elapsed += dt;
    }

    fn remember_positions(&mut self) {
        self.prev_pos.clear();
        self.prev_pos
            .extend(self.bodies.iter().map(|b| (b.id, b.pos)));
    }

    /// Expire wells whose lifetime ran out; collapse wells any movable body
    /// has come unsafely close to. Both are surfaced as events so the
    /// presentation layer can detonate something pretty.
    fn run_well_lifecycle(&mut self) {
        let elapsed = self.elapsed;
        let unsafe_radius = self.config.well_unsafe_radius;
        let mut removed: Vec<(BodyId, ArenaEvent)> = Vec::new();

        for well in &self.wells {
            if elapsed >= well.expires_at {
                removed.push((well.id, ArenaEvent::WellExpired { well: well.id }));
                continue;
            }
            let too_close = self
                .bodies
                .iter()
                .filter(|b| b.movable && b.role != BodyRole::ForceWell)
                .any(|b| b.pos.distance_squared(well.center) < unsafe_radius * unsafe_radius);
            if too_close {
                removed.push((well.id, ArenaEvent::WellCollapsed { well: well.id }));
            }
        }

        for (id, event) in removed {
            // the body may already be gone after a reset race; that is fine
            let _ = self.bodies.remove(id);
            self.wells.retain(|w| w.id != id);
            log::debug!("well {id:?} removed: {event:?}");
            self.events.push(event);
        }
    }

    fn apply_skill_forces(&mut self, dt: f64) {
        match self.active_skill {
            Skill::Brake => {
                self.magnet_pulls.clear();
                if let Some(player) = self.bodies.get_mut(self.player) {
                    forces::apply_brake(player, self.config.brake_k, dt);
                }
            }
            Skill::Magnetize => {
                self.magnet_pulls = forces::apply_magnetize(
                    &mut self.bodies,
                    self.player,
                    self.config.magnet_strength,
                    self.config.magnet_radius,
                    self.config.min_force_distance,
                    dt,
                );
            }
            _ => self.magnet_pulls.clear(),
        }

        for well in &self.wells {
            forces::apply_gravity_well(
                &mut self.bodies,
                well.center,
                self.config.well_strength,
                self.config.well_effect_radius,
                self.config.min_force_distance,
                dt,
            );
        }
    }

    fn check_goal_capture(&mut self) {
        let Some(goal_id) = self.goal else {
            return;
        };
        let (Some(player), Some(goal)) = (self.bodies.get(self.player), self.bodies.get(goal_id))
        else {
            return;
        };
        let reach = player.radius + goal.radius;
        if player.pos.distance_squared(goal.pos) > reach * reach {
            return;
        }
        // eaten: remove now, respawn is the caller's call
        let _ = self.bodies.remove(goal_id);
        self.goal = None;
        self.score += 1;
        self.events.push(ArenaEvent::GoalCaptured {
            goal: goal_id,
            score: self.score,
        });
        log::debug!("goal {goal_id:?} captured, score {}", self.score);
    }
}

/// Build the initial body set: player at the arena center, goal and
/// obstacles at randomized non-overlapping spots, everything at rest.
fn populate(
    config: &ArenaConfig,
    boundary: &Boundary,
    rng: &mut Pcg32,
) -> (Bodies, BodyId, BodyId, Vec<BodyId>) {
    let mut bodies = Bodies::new();

    let player = bodies.create(BodySpec::at_rest(
        BodyRole::Player,
        boundary.center(),
        config.player_radius,
        config.player_mass,
    ));

    let goal_pos = random_spot(&bodies, boundary, config.goal_radius, rng);
    let goal = bodies.create(BodySpec::at_rest(
        BodyRole::Goal,
        goal_pos,
        config.goal_radius,
        config.goal_mass,
    ));

    let obstacles = (0..config.obstacle_count)
        .map(|_| {
            let pos = random_spot(&bodies, boundary, config.obstacle_radius, rng);
            bodies.create(BodySpec::at_rest(
                BodyRole::Obstacle,
                pos,
                config.obstacle_radius,
                config.obstacle_mass,
            ))
        })
        .collect();

    (bodies, player, goal, obstacles)
}

/// Rejection-sample a spawn position that fits inside the boundary and
/// clears every existing body. Falls back to the last sample when the
/// arena is too crowded to please everyone.
fn random_spot(bodies: &Bodies, boundary: &Boundary, radius: f64, rng: &mut Pcg32) -> DVec2 {
    const ATTEMPTS: u32 = 64;
    const CLEARANCE: f64 = 6.0;

    let margin = radius + CLEARANCE;
    // a body too large for the arena just spawns at the center
    if boundary.min.x + margin >= boundary.max.x - margin
        || boundary.min.y + margin >= boundary.max.y - margin
    {
        return boundary.center();
    }
    let mut pos = boundary.center();
    for _ in 0..ATTEMPTS {
        pos = DVec2::new(
            rng.random_range(boundary.min.x + margin..boundary.max.x - margin),
            rng.random_range(boundary.min.y + margin..boundary.max.y - margin),
        );
        let clear = bodies.iter().all(|b| {
            let gap = radius + b.radius + CLEARANCE;
            b.pos.distance_squared(pos) > gap * gap
        });
        if clear {
            break;
        }
    }
    pos
}
