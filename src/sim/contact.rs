//! Resting contact and friction
//!
//! Handles balls sitting on or rolling along a surface: the normal support
//! that cancels gravity, and a Coulomb friction impulse in either the static
//! regime (no slip, oppose the slip acceleration) or the dynamic regime
//! (oppose the slip velocity).

use glam::Vec3;

use super::ball::Ball;
use super::event::{CollisionEvent, Response};
use crate::clamp_impulse;
use crate::consts::MIN_TANGENT_SQ;
use crate::tuning::PhysicsTuning;

/// Support a ball resting on a surface for one step
///
/// Adds just enough normal velocity to cancel gravity along the normal over
/// `dt` plus any remaining approach speed; the support never pulls. Then
/// applies friction. Returns `None` when the ball is frozen or already
/// leaving faster than the contact threshold.
///
/// The ball's current normal velocity is used rather than the one recorded
/// in the event, so resolving an already supported ball again is a no-op.
pub fn apply_resting_contact(
    ball: &mut Ball,
    event: &CollisionEvent,
    friction: f32,
    dt: f32,
    gravity: Vec3,
    tuning: &PhysicsTuning,
) -> Option<Response> {
    if ball.is_frozen() {
        return None;
    }
    let normal = event.hit_normal;
    let norm_vel = ball.velocity.dot(normal);
    if norm_vel > tuning.contact_vel {
        return None;
    }

    let support = (-(gravity.dot(normal) * dt + norm_vel)).max(0.0);
    ball.velocity += normal * support;

    let friction_impulse = apply_friction(ball, normal, norm_vel, dt, friction, gravity, tuning);

    Some(Response {
        impact_speed: (-norm_vel).max(0.0),
        normal_impulse: support_impulse(ball, normal, dt, gravity),
        friction_impulse,
    })
}

/// Impulse the surface must deliver over `dt` to hold the ball against
/// gravity; the Coulomb cone is measured against this
#[inline]
pub fn support_impulse(ball: &Ball, hit_normal: Vec3, dt: f32, gravity: Vec3) -> f32 {
    ball.mass() * (-gravity.dot(hit_normal)).max(0.0) * dt
}

/// Friction impulse at the contact point of a ball resting on a surface
///
/// The static regime opposes the tangential acceleration and applies when
/// the contact point does not slip, or when `normal_velocity` (the ball's
/// normal speed before support was applied) is at most
/// `rubber_contact_vel`. Otherwise the dynamic regime opposes the slip
/// velocity. Returns the magnitude of the applied impulse; a non-finite
/// impulse is rejected and nothing is applied.
pub fn apply_friction(
    ball: &mut Ball,
    hit_normal: Vec3,
    normal_velocity: f32,
    dt: f32,
    friction: f32,
    gravity: Vec3,
    tuning: &PhysicsTuning,
) -> f32 {
    let surf_p = -ball.radius * hit_normal;
    let surf_vel = ball.surface_velocity(surf_p);
    let slip = surf_vel - hit_normal * surf_vel.dot(hit_normal);
    let slip_speed = slip.length();

    let max_impulse = friction * support_impulse(ball, hit_normal, dt, gravity);

    let is_static =
        slip_speed < tuning.precision || normal_velocity <= tuning.rubber_contact_vel;
    let (slip_dir, wanted) = if is_static {
        // Static: cancel the tangential acceleration over the step
        let surf_acc = ball.surface_acceleration(surf_p, gravity);
        let slip_acc = surf_acc - hit_normal * surf_acc.dot(hit_normal);
        if slip_acc.length_squared() < MIN_TANGENT_SQ {
            return 0.0;
        }
        let dir = slip_acc.normalize();
        (dir, -dir.dot(surf_acc) * dt)
    } else {
        // Dynamic: cancel the slip velocity
        let dir = slip / slip_speed;
        (dir, -dir.dot(surf_vel))
    };

    let cp = surf_p.cross(slip_dir);
    let denom = ball.inv_mass() + slip_dir.dot((cp / ball.inertia()).cross(surf_p));
    let Some(impulse) = clamp_impulse(wanted / denom, max_impulse) else {
        log::warn!("Ball {}: rejected non-finite contact friction", ball.id);
        return 0.0;
    };
    ball.apply_surface_impulse(cp * impulse, slip_dir * impulse);
    impulse.abs()
}
