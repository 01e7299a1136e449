//! The three skill-force models
//!
//! Each model is a pure pass over the current body set plus its tuning
//! constants. None of them touches a body outside its target set, and none
//! of them touches the boundary.
//!
//! The gravity well is the delicate one: it must bend trajectories without
//! changing speed. Letting the integrator apply the pull as an ordinary
//! impulse would pump energy in near the center, so the well computes the
//! hypothetical post-impulse velocity and rescales it back to the original
//! speed in closed form. Direction bends, |v| is invariant.

use glam::DVec2;
use serde::Serialize;

use super::body::{Bodies, Body, BodyId, BodyRole};

/// One body affected by a magnetize pass. Output contract for presentation:
/// the renderer draws pull beams scaled by `force` and `distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnetPull {
    pub id: BodyId,
    /// Force magnitude applied this frame (strength / d^2)
    pub force: f64,
    /// Center distance at the time of application
    pub distance: f64,
}

/// Braking drag on the controlled body: F = -k * v * m.
///
/// Anti-parallel to velocity by construction, so the heading never changes;
/// repeated application walks speed toward zero without a hard floor. A
/// resting body gets no force at all, which also keeps float noise from
/// nudging it into drift.
pub fn apply_brake(player: &mut Body, k: f64, dt: f64) {
    if player.vel == DVec2::ZERO {
        return;
    }
    // a = F/m = -k * v
    player.vel += -k * player.vel * dt;
}

/// Inverse-square attraction of every movable body within `radius` toward
/// the controlled body, with the exact negated force recoiling the
/// controller (Newton's third law, so magnetize cannot create momentum).
///
/// The magnitude is `strength / d^2`, deliberately mass-independent; the
/// acceleration each side sees is the shared force over its own mass.
/// Returns the affected list for visual feedback.
pub fn apply_magnetize(
    bodies: &mut Bodies,
    player_id: BodyId,
    strength: f64,
    radius: f64,
    min_distance: f64,
    dt: f64,
) -> Vec<MagnetPull> {
    let Some(player) = bodies.get(player_id) else {
        return Vec::new();
    };
    let player_pos = player.pos;
    let player_mass = player.mass;

    let mut pulls = Vec::new();
    let mut recoil = DVec2::ZERO;

    for body in bodies.iter_mut() {
        if body.id == player_id || !body.movable {
            continue;
        }
        let delta = player_pos - body.pos;
        let dist_sq = delta.length_squared();
        if dist_sq < min_distance * min_distance || dist_sq > radius * radius {
            continue;
        }
        let dist = dist_sq.sqrt();
        let dir = delta / dist;
        let force = strength / dist_sq;

        body.vel += dir * (force / body.mass) * dt;
        recoil -= dir * force * dt;
        pulls.push(MagnetPull {
            id: body.id,
            force,
            distance: dist,
        });
    }

    if let Some(player) = bodies.get_mut(player_id) {
        player.vel += recoil / player_mass;
    }
    pulls
}

/// Inverse-square deflection toward a fixed well center, speed-conserving.
///
/// For each movable body within `effect_radius`: compute what one naive
/// force step would do, `v' = v + (F/m) * dt`, then rescale by
/// `alpha = sqrt(|v|^2 / |v'|^2)` and store `alpha * v'` directly. This is
/// the core energy contract: |alpha * v'| == |v| to floating tolerance.
/// `dt` must be the actual physics step of this advance, not an assumed
/// 1/60, or the rescale conserves the wrong quantity.
pub fn apply_gravity_well(
    bodies: &mut Bodies,
    center: DVec2,
    strength: f64,
    effect_radius: f64,
    min_distance: f64,
    dt: f64,
) {
    for body in bodies.iter_mut() {
        if !body.movable || body.role == BodyRole::ForceWell {
            continue;
        }
        let delta = center - body.pos;
        let dist_sq = delta.length_squared();
        if dist_sq < min_distance * min_distance || dist_sq > effect_radius * effect_radius {
            continue;
        }
        let dist = dist_sq.sqrt();
        let dir = delta / dist;
        let accel = strength / dist_sq / body.mass;

        let speed_sq = body.vel.length_squared();
        let deflected = body.vel + dir * accel * dt;
        let deflected_sq = deflected.length_squared();
        if deflected_sq <= f64::EPSILON {
            // a body at rest (or cancelled exactly) has no speed to conserve
            continue;
        }
        let alpha = (speed_sq / deflected_sq).sqrt();
        body.vel = deflected * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodySpec;
    use glam::DVec2;
    use proptest::prelude::*;

    fn arena_with_player(pos: DVec2, mass: f64) -> (Bodies, BodyId) {
        let mut bodies = Bodies::new();
        let id = bodies.create(BodySpec::at_rest(BodyRole::Player, pos, 15.0, mass));
        (bodies, id)
    }

    #[test]
    fn brake_reduces_speed_and_keeps_direction() {
        let (mut bodies, id) = arena_with_player(DVec2::new(400.0, 300.0), 1.0);
        bodies.get_mut(id).unwrap().vel = DVec2::new(10.0, 0.0);
        let player = bodies.get_mut(id).unwrap();
        apply_brake(player, 0.001, 1.0 / 60.0);
        assert!(player.vel.length() < 10.0);
        assert_eq!(player.vel.y, 0.0);
        assert!(player.vel.x > 0.0);
        // heading is exactly (1, 0)
        assert_eq!(player.vel.normalize(), DVec2::X);
    }

    #[test]
    fn brake_heading_invariant_off_axis() {
        let (mut bodies, id) = arena_with_player(DVec2::new(400.0, 300.0), 2.5);
        bodies.get_mut(id).unwrap().vel = DVec2::new(-37.0, 19.5);
        let player = bodies.get_mut(id).unwrap();
        let heading_before = player.vel.y.atan2(player.vel.x);
        let speed_before = player.vel.length();
        apply_brake(player, 4.0, 1.0 / 60.0);
        let heading_after = player.vel.y.atan2(player.vel.x);
        assert!(player.vel.length() < speed_before);
        assert!((heading_after - heading_before).abs() < 1e-12);
    }

    #[test]
    fn brake_at_rest_is_a_no_op() {
        let (mut bodies, id) = arena_with_player(DVec2::new(400.0, 300.0), 1.0);
        let player = bodies.get_mut(id).unwrap();
        apply_brake(player, 4.0, 1.0 / 60.0);
        assert_eq!(player.vel, DVec2::ZERO);
    }

    #[test]
    fn magnetize_cutoff_at_radius() {
        let (mut bodies, player) = arena_with_player(DVec2::new(400.0, 300.0), 5.0);
        let near = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(500.0, 300.0),
            20.0,
            8.0,
        ));
        let far = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(400.0, 0.0), // 300 away, outside R = 260
            20.0,
            8.0,
        ));
        let pulls = apply_magnetize(&mut bodies, player, 6.0e6, 260.0, 12.0, 1.0 / 60.0);
        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].id, near);
        assert!((pulls[0].distance - 100.0).abs() < 1e-9);
        assert_ne!(bodies.get(near).unwrap().vel, DVec2::ZERO);
        assert_eq!(bodies.get(far).unwrap().vel, DVec2::ZERO);
    }

    #[test]
    fn magnetize_min_distance_guard() {
        let (mut bodies, player) = arena_with_player(DVec2::new(400.0, 300.0), 5.0);
        let tight = bodies.create(BodySpec::at_rest(
            BodyRole::Goal,
            DVec2::new(405.0, 300.0), // 5 away, under the 12 unit guard
            10.0,
            1.0,
        ));
        let pulls = apply_magnetize(&mut bodies, player, 6.0e6, 260.0, 12.0, 1.0 / 60.0);
        assert!(pulls.is_empty());
        assert_eq!(bodies.get(tight).unwrap().vel, DVec2::ZERO);
    }

    #[test]
    fn magnetize_recoil_conserves_momentum() {
        let (mut bodies, player) = arena_with_player(DVec2::new(400.0, 300.0), 5.0);
        bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(520.0, 340.0),
            20.0,
            8.0,
        ));
        bodies.create(BodySpec::at_rest(
            BodyRole::Goal,
            DVec2::new(330.0, 250.0),
            10.0,
            1.0,
        ));
        apply_magnetize(&mut bodies, player, 6.0e6, 260.0, 12.0, 1.0 / 60.0);
        let momentum: DVec2 = bodies.iter().map(|b| b.vel * b.mass).sum();
        assert!(momentum.length() < 1e-6);
    }

    #[test]
    fn magnetize_ignores_immobile_wells() {
        let (mut bodies, player) = arena_with_player(DVec2::new(400.0, 300.0), 5.0);
        let well = bodies.create(BodySpec::well(DVec2::new(480.0, 300.0), 12.0, 1.0));
        let pulls = apply_magnetize(&mut bodies, player, 6.0e6, 260.0, 12.0, 1.0 / 60.0);
        assert!(pulls.is_empty());
        assert_eq!(bodies.get(well).unwrap().vel, DVec2::ZERO);
    }

    #[test]
    fn well_preserves_speed_while_bending() {
        let mut bodies = Bodies::new();
        let id = bodies.create(BodySpec::at_rest(
            BodyRole::Player,
            DVec2::new(100.0, 0.0),
            15.0,
            1.0,
        ));
        bodies.get_mut(id).unwrap().vel = DVec2::new(0.0, 10.0);
        apply_gravity_well(&mut bodies, DVec2::ZERO, 8.0e6, 220.0, 12.0, 1.0 / 60.0);
        let v = bodies.get(id).unwrap().vel;
        // pulled toward the origin: vx goes negative
        assert!(v.x < 0.0);
        // speed is exactly conserved
        assert!((v.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn well_leaves_resting_bodies_at_rest() {
        let mut bodies = Bodies::new();
        let id = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(100.0, 0.0),
            20.0,
            8.0,
        ));
        apply_gravity_well(&mut bodies, DVec2::ZERO, 8.0e6, 220.0, 12.0, 1.0 / 60.0);
        // alpha would be 0; a deflection field cannot start motion
        assert_eq!(bodies.get(id).unwrap().vel, DVec2::ZERO);
    }

    #[test]
    fn well_respects_effect_radius_and_guard() {
        let mut bodies = Bodies::new();
        let outside = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(300.0, 0.0),
            20.0,
            8.0,
        ));
        let tight = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(5.0, 0.0),
            20.0,
            8.0,
        ));
        bodies.get_mut(outside).unwrap().vel = DVec2::new(0.0, 40.0);
        bodies.get_mut(tight).unwrap().vel = DVec2::new(0.0, 40.0);
        apply_gravity_well(&mut bodies, DVec2::ZERO, 8.0e6, 220.0, 12.0, 1.0 / 60.0);
        assert_eq!(bodies.get(outside).unwrap().vel, DVec2::new(0.0, 40.0));
        assert_eq!(bodies.get(tight).unwrap().vel, DVec2::new(0.0, 40.0));
    }

    proptest! {
        #[test]
        fn well_speed_invariant_for_random_bodies(
            px in -200.0f64..200.0,
            py in -200.0f64..200.0,
            vx in -400.0f64..400.0,
            vy in -400.0f64..400.0,
            mass in 0.5f64..20.0,
        ) {
            prop_assume!(DVec2::new(px, py).length() > 15.0);
            let mut bodies = Bodies::new();
            let id = bodies.create(BodySpec::at_rest(
                BodyRole::Obstacle,
                DVec2::new(px, py),
                10.0,
                mass,
            ));
            bodies.get_mut(id).unwrap().vel = DVec2::new(vx, vy);
            let speed_before = bodies.get(id).unwrap().vel.length();
            apply_gravity_well(&mut bodies, DVec2::ZERO, 8.0e6, 220.0, 12.0, 1.0 / 60.0);
            let speed_after = bodies.get(id).unwrap().vel.length();
            prop_assert!((speed_after - speed_before).abs() <= speed_before.max(1.0) * 1e-9);
        }

        #[test]
        fn brake_never_flips_heading(
            vx in -500.0f64..500.0,
            vy in -500.0f64..500.0,
            k in 1e-4f64..10.0,
        ) {
            prop_assume!(DVec2::new(vx, vy).length() > 1e-3);
            let (mut bodies, id) = arena_with_player(DVec2::new(400.0, 300.0), 1.0);
            bodies.get_mut(id).unwrap().vel = DVec2::new(vx, vy);
            let player = bodies.get_mut(id).unwrap();
            let before = player.vel;
            apply_brake(player, k, 1.0 / 60.0);
            prop_assert!(player.vel.length() < before.length());
            prop_assert!(player.vel.dot(before) >= 0.0);
        }
    }
}
