//! Contact detection and exact elastic response
//!
//! The resolver runs once per advance, after integration. Wall hits get a
//! specular reflection written straight onto the body's velocity; body/body
//! hits get the closed-form 1-D elastic exchange along the contact normal.
//! Velocities are always overwritten, never accumulated through forces: an
//! iterative solver pass would bleed energy into damping and slop, and the
//! game's contract is that collisions lose nothing.

use glam::DVec2;

use super::body::{Body, Boundary};

/// Distances below this are treated as "same point": the contact normal is
/// undefined, so the pair is skipped rather than divided by near-zero.
pub const CONTACT_EPSILON: f64 = 1e-3;

/// Fixed post-collision translation that pulls an overlapping pair apart so
/// touching geometry cannot stick across steps.
pub const SEPARATION_NUDGE: f64 = 0.5;

/// Specular reflection: v' = v - 2(v.n)n
#[inline]
pub fn reflect(vel: DVec2, normal: DVec2) -> DVec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// Resolve every contact among `bodies` against each other and the boundary.
///
/// `exempt` marks pairs the caller owns (the player/goal capture contact);
/// those are left untouched for the caller to consume. Malformed contacts
/// (NaN velocity, degenerate normal) are skipped pair-by-pair; one bad body
/// never aborts the step.
pub fn resolve_contacts(
    bodies: &mut [Body],
    boundary: &Boundary,
    exempt: impl Fn(&Body, &Body) -> bool,
) {
    for body in bodies.iter_mut() {
        if body.movable && body.collides() {
            resolve_walls(body, boundary);
        }
    }

    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.movable || !a.collides() {
            continue;
        }
        for b in tail.iter_mut() {
            if !b.movable || !b.collides() || exempt(a, b) {
                continue;
            }
            resolve_pair(a, b);
        }
    }
}

/// Reflect a body off each arena wall it is penetrating while moving inward.
///
/// The reflection only fires when the velocity points into the wall, so a
/// body already corrected this step is not flipped back and forth.
fn resolve_walls(body: &mut Body, boundary: &Boundary) {
    if !body.vel.is_finite() {
        return;
    }

    // Each wall: (inward normal, signed penetration depth)
    let contacts = [
        (DVec2::X, boundary.min.x - (body.pos.x - body.radius)),
        (DVec2::NEG_X, (body.pos.x + body.radius) - boundary.max.x),
        (DVec2::Y, boundary.min.y - (body.pos.y - body.radius)),
        (DVec2::NEG_Y, (body.pos.y + body.radius) - boundary.max.y),
    ];

    for (normal, penetration) in contacts {
        if penetration <= 0.0 {
            continue;
        }
        if body.vel.dot(normal) < 0.0 {
            body.vel = reflect(body.vel, normal);
        }
        // clamp back inside regardless, so a resting contact cannot sink in
        body.pos += normal * penetration;
    }
}

/// Exact two-body elastic exchange along the center-line normal.
fn resolve_pair(a: &mut Body, b: &mut Body) {
    if !a.vel.is_finite() || !b.vel.is_finite() {
        return;
    }

    let delta = b.pos - a.pos;
    let dist_sq = delta.length_squared();
    let reach = a.radius + b.radius;
    if dist_sq > reach * reach {
        return;
    }
    if dist_sq < CONTACT_EPSILON * CONTACT_EPSILON {
        // centers coincide, no usable normal
        return;
    }

    let dist = dist_sq.sqrt();
    let normal = delta / dist;

    // Relative speed along the normal; <= 0 means the pair is already
    // separating (possibly corrected earlier this step), so a second
    // exchange would double-apply.
    let vn = (a.vel - b.vel).dot(normal);
    if !(vn > 0.0) {
        return;
    }

    let j = 2.0 * vn / (a.mass + b.mass);
    a.vel -= j * b.mass * normal;
    b.vel += j * a.mass * normal;

    // pull the pair apart so overlapping geometry cannot re-trigger next step
    a.pos -= normal * SEPARATION_NUDGE;
    b.pos += normal * SEPARATION_NUDGE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{Bodies, BodyRole, BodySpec};
    use glam::DVec2;
    use proptest::prelude::*;

    fn movable(x: f64, y: f64, vx: f64, vy: f64, radius: f64, mass: f64) -> Body {
        Body {
            id: crate::sim::BodyId(0),
            role: BodyRole::Obstacle,
            pos: DVec2::new(x, y),
            vel: DVec2::new(vx, vy),
            radius,
            mass,
            movable: true,
        }
    }

    fn total_energy(bodies: &[Body]) -> f64 {
        bodies.iter().map(|b| b.kinetic_energy()).sum()
    }

    fn total_momentum(bodies: &[Body]) -> DVec2 {
        bodies.iter().map(|b| b.vel * b.mass).sum()
    }

    #[test]
    fn reflection_preserves_speed_and_mirrors_angle() {
        // 30 degrees onto a vertical wall with inward normal +x
        let v = DVec2::new(-100.0, 57.735);
        let n = DVec2::X;
        let r = reflect(v, n);
        assert!((r.length() - v.length()).abs() < 1e-9);
        // incidence angle equals reflection angle: normal component flips,
        // tangential component is untouched
        assert!((r.x - 100.0).abs() < 1e-9);
        assert!((r.y - 57.735).abs() < 1e-9);
    }

    #[test]
    fn wall_hit_reflects_and_clamps_inside() {
        let boundary = Boundary::new(800.0, 600.0);
        let mut bodies = vec![movable(795.0, 300.0, 50.0, 20.0, 10.0, 1.0)];
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        let b = &bodies[0];
        assert!((b.vel.x - -50.0).abs() < 1e-9);
        assert!((b.vel.y - 20.0).abs() < 1e-9);
        assert!(b.pos.x + b.radius <= 800.0 + 1e-9);
    }

    #[test]
    fn wall_hit_while_separating_is_not_reflected_again() {
        let boundary = Boundary::new(800.0, 600.0);
        // overlapping the right wall but already heading back in
        let mut bodies = vec![movable(795.0, 300.0, -50.0, 0.0, 10.0, 1.0)];
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        assert!((bodies[0].vel.x - -50.0).abs() < 1e-9);
    }

    #[test]
    fn equal_mass_head_on_swaps_velocities() {
        let mut bodies = vec![
            movable(100.0, 100.0, 5.0, 0.0, 10.0, 2.0),
            movable(118.0, 100.0, -5.0, 0.0, 10.0, 2.0),
        ];
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        assert!((bodies[0].vel.x - -5.0).abs() < 1e-9);
        assert!((bodies[1].vel.x - 5.0).abs() < 1e-9);
        assert!(bodies[0].vel.y.abs() < 1e-9);
        assert!(bodies[1].vel.y.abs() < 1e-9);
    }

    #[test]
    fn unequal_mass_collision_conserves_energy_and_momentum() {
        let mut bodies = vec![
            movable(100.0, 100.0, 40.0, 10.0, 10.0, 3.0),
            movable(117.0, 103.0, -25.0, -5.0, 10.0, 7.0),
        ];
        let e0 = total_energy(&bodies);
        let p0 = total_momentum(&bodies);
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        let e1 = total_energy(&bodies);
        let p1 = total_momentum(&bodies);
        assert!((e1 - e0).abs() / e0 < 0.01);
        assert!((p1 - p0).length() < 1e-6);
    }

    #[test]
    fn separating_pair_is_left_alone() {
        let mut bodies = vec![
            movable(100.0, 100.0, -5.0, 0.0, 10.0, 1.0),
            movable(115.0, 100.0, 5.0, 0.0, 10.0, 1.0),
        ];
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        assert_eq!(bodies[0].vel, DVec2::new(-5.0, 0.0));
        assert_eq!(bodies[1].vel, DVec2::new(5.0, 0.0));
        assert_eq!(bodies[0].pos, DVec2::new(100.0, 100.0));
    }

    #[test]
    fn coincident_centers_are_skipped() {
        let mut bodies = vec![
            movable(100.0, 100.0, 5.0, 0.0, 10.0, 1.0),
            movable(100.0, 100.0, -5.0, 0.0, 10.0, 1.0),
        ];
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        // no usable normal, velocities untouched
        assert_eq!(bodies[0].vel, DVec2::new(5.0, 0.0));
        assert_eq!(bodies[1].vel, DVec2::new(-5.0, 0.0));
    }

    #[test]
    fn nan_velocity_poisons_only_its_own_pair() {
        let mut bodies = vec![
            movable(100.0, 100.0, f64::NAN, 0.0, 10.0, 1.0),
            movable(115.0, 100.0, -5.0, 0.0, 10.0, 1.0),
            movable(300.0, 100.0, 10.0, 0.0, 10.0, 1.0),
            movable(315.0, 100.0, -10.0, 0.0, 10.0, 1.0),
        ];
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| false);
        // the healthy pair still swapped
        assert!((bodies[2].vel.x - -10.0).abs() < 1e-9);
        assert!((bodies[3].vel.x - 10.0).abs() < 1e-9);
        // the poisoned partner was not written to
        assert_eq!(bodies[1].vel, DVec2::new(-5.0, 0.0));
    }

    #[test]
    fn force_wells_never_take_part_in_contacts() {
        let mut bodies = Bodies::new();
        let ball = bodies.create(BodySpec::at_rest(
            BodyRole::Obstacle,
            DVec2::new(100.0, 100.0),
            10.0,
            1.0,
        ));
        bodies.get_mut(ball).unwrap().vel = DVec2::new(50.0, 0.0);
        bodies.create(BodySpec::well(DVec2::new(105.0, 100.0), 12.0, 1.0));
        let boundary = Boundary::new(800.0, 600.0);
        bodies.advance(0.0, &boundary, |_, _| false);
        // overlapping the well sensor changes nothing
        assert_eq!(bodies.get(ball).unwrap().vel, DVec2::new(50.0, 0.0));
    }

    #[test]
    fn exempt_pairs_are_skipped() {
        let mut bodies = vec![
            movable(100.0, 100.0, 5.0, 0.0, 10.0, 1.0),
            movable(115.0, 100.0, -5.0, 0.0, 10.0, 1.0),
        ];
        let boundary = Boundary::new(800.0, 600.0);
        resolve_contacts(&mut bodies, &boundary, |_, _| true);
        assert_eq!(bodies[0].vel, DVec2::new(5.0, 0.0));
        assert_eq!(bodies[1].vel, DVec2::new(-5.0, 0.0));
    }

    proptest! {
        #[test]
        fn random_contacts_conserve_energy_and_momentum(
            m1 in 0.5f64..50.0,
            m2 in 0.5f64..50.0,
            v1x in -300.0f64..300.0,
            v1y in -300.0f64..300.0,
            v2x in -300.0f64..300.0,
            v2y in -300.0f64..300.0,
            angle in 0.0f64..std::f64::consts::TAU,
        ) {
            // second body placed just inside contact range at a random bearing
            let offset = DVec2::new(angle.cos(), angle.sin()) * 19.0;
            let mut bodies = vec![
                movable(400.0, 300.0, v1x, v1y, 10.0, m1),
                movable(400.0 + offset.x, 300.0 + offset.y, v2x, v2y, 10.0, m2),
            ];
            let e0 = total_energy(&bodies);
            let p0 = total_momentum(&bodies);
            let boundary = Boundary::new(800.0, 600.0);
            resolve_contacts(&mut bodies, &boundary, |_, _| false);
            let e1 = total_energy(&bodies);
            let p1 = total_momentum(&bodies);
            prop_assert!((e1 - e0).abs() <= e0.max(1e-9) * 0.01);
            prop_assert!((p1 - p0).length() < 1e-6 * (1.0 + p0.length()));
        }
    }
}
