//! Collision response for impacts
//!
//! Impulse-based resolution of a ball against a surface normal and of two
//! balls against each other, with positional correction for penetration and
//! a kick for embedded bodies.

use glam::{Quat, Vec3};
use rand::Rng;

use super::ball::Ball;
use super::event::{CollisionEvent, Response};
use super::material::Material;
use crate::consts::*;
use crate::tuning::PhysicsTuning;
use crate::{clamp_impulse, elasticity_with_falloff};

/// Normal speed to resolve with, or `None` for a no-op
///
/// Clearly receding contacts are skipped. Contacts inside the low-velocity
/// band are skipped too unless the bodies overlap past the embedded depth,
/// in which case a small synthetic approach speed kicks them apart.
fn approach_speed(dot: f32, hit_distance: f32, tuning: &PhysicsTuning) -> Option<f32> {
    if dot < -tuning.low_norm_vel {
        return Some(dot);
    }
    if dot > tuning.low_norm_vel {
        return None;
    }
    if hit_distance < -tuning.embedded {
        Some(-tuning.embed_shot)
    } else {
        None
    }
}

/// Displacement that moves a penetrating body back to free space
///
/// A fixed fraction of the penetration depth, capped at `disp_limit` so a
/// large step cannot throw the ball across thin geometry. Zero for gaps and
/// negligible overlaps.
#[inline]
pub fn correction_distance(hit_distance: f32, tuning: &PhysicsTuning) -> f32 {
    let depth = -tuning.disp_gain * hit_distance;
    if depth > MIN_CORRECTION {
        depth.min(tuning.disp_limit)
    } else {
        0.0
    }
}

/// Resolve an impact of `ball` against a surface
///
/// Reflects the normal velocity with speed-dependent restitution, applies a
/// Coulomb-bounded friction impulse at the contact point and optionally
/// scatters the outgoing tangential velocity. Returns `None` when nothing
/// was applied; a frozen ball is never touched.
pub fn resolve_surface_collision<R: Rng + ?Sized>(
    ball: &mut Ball,
    material: &Material,
    event: &CollisionEvent,
    hit_normal: Vec3,
    rng: &mut R,
    tuning: &PhysicsTuning,
) -> Option<Response> {
    if ball.is_frozen() {
        return None;
    }
    let dot = approach_speed(ball.velocity.dot(hit_normal), event.hit_distance, tuning)?;

    let push = correction_distance(event.hit_distance, tuning);
    if push > 0.0 {
        ball.position += hit_normal * push;
    }

    // Impulse just sufficient to stop penetration; bounds friction
    let reaction_impulse = ball.mass() * dot.abs();

    let elasticity = elasticity_with_falloff(material.elasticity, material.elasticity_falloff, dot);
    let bounce = -(1.0 + elasticity) * dot;
    ball.velocity += hit_normal * bounce;

    let friction_impulse =
        apply_impact_friction(ball, hit_normal, material.friction * reaction_impulse);

    let mut scatter_angle = material.scatter;
    if scatter_angle < 0.0 {
        scatter_angle = tuning.hard_scatter;
    }
    scatter_angle *= tuning.scatter_difficulty;
    if bounce > MIN_SCATTER_SPEED && scatter_angle > MIN_SCATTER_ANGLE {
        scatter_tangent(ball, hit_normal, scatter_angle, rng);
    }

    Some(Response {
        impact_speed: -dot,
        normal_impulse: reaction_impulse,
        friction_impulse,
    })
}

/// Friction impulse opposing slip at the contact point, clamped to
/// `max_impulse`; returns the applied magnitude
fn apply_impact_friction(ball: &mut Ball, hit_normal: Vec3, max_impulse: f32) -> f32 {
    let surf_p = -ball.radius * hit_normal;
    let surf_vel = ball.surface_velocity(surf_p);
    let tangent = surf_vel - hit_normal * surf_vel.dot(hit_normal);

    let tangent_sq = tangent.length_squared();
    if tangent_sq <= MIN_TANGENT_SQ {
        return 0.0;
    }
    let tangent = tangent / tangent_sq.sqrt();
    let vt = surf_vel.dot(tangent);

    let cross = surf_p.cross(tangent);
    // Effective inverse mass along the tangent, including the spin coupling
    let kt = ball.inv_mass() + tangent.dot((cross / ball.inertia()).cross(surf_p));

    let Some(jt) = clamp_impulse(-vt / kt, max_impulse) else {
        log::warn!("Ball {}: rejected non-finite impact friction", ball.id);
        return 0.0;
    };
    ball.apply_surface_impulse(cross * jt, tangent * jt);
    jt.abs()
}

/// Rotate the tangential velocity about the normal by a random angle
///
/// The sample `x ∈ [-1, 1)` is shaped by `x·(1 - x²)` so small deflections
/// are more likely than large ones.
fn scatter_tangent<R: Rng + ?Sized>(
    ball: &mut Ball,
    hit_normal: Vec3,
    scatter_angle: f32,
    rng: &mut R,
) {
    let x: f32 = rng.random_range(-1.0..1.0);
    let angle = x * (1.0 - x * x) * SCATTER_SHAPE_SCALE * scatter_angle;

    let normal_part = hit_normal * ball.velocity.dot(hit_normal);
    let tangent_part = ball.velocity - normal_part;
    ball.velocity = normal_part + Quat::from_axis_angle(hit_normal, angle) * tangent_part;
    log::trace!("Ball {}: scatter {:.4} rad", ball.id, angle);
}

/// Resolve an impact between two balls
///
/// `event` belongs to `ball`; `colliding_event` belongs to `colliding` and
/// its normal points from `ball` toward `colliding`. Each pair is reported
/// once from each side; only the call where `colliding` has the higher id
/// (lower with `swap`) acts, so the pair is resolved exactly once. A frozen
/// `ball` has no event of its own and always acts.
pub fn resolve_ball_collision(
    ball: &mut Ball,
    colliding: &mut Ball,
    event: &CollisionEvent,
    colliding_event: &CollisionEvent,
    swap: bool,
    tuning: &PhysicsTuning,
) -> Option<Response> {
    let deferred = if swap {
        colliding.id >= ball.id
    } else {
        colliding.id <= ball.id
    };
    if deferred && !ball.is_frozen() {
        return None;
    }

    let normal = colliding_event.hit_normal;
    let v_rel = colliding.velocity - ball.velocity;
    let dot = approach_speed(v_rel.dot(normal), colliding_event.hit_distance, tuning)?;

    apply_pair_correction(ball, colliding, event, colliding_event, tuning);

    let inv_mass_sum = ball.inv_mass() + colliding.inv_mass();
    if inv_mass_sum <= 0.0 {
        // Both immovable
        return None;
    }
    let impulse = -(1.0 + tuning.ball_ball_restitution) * dot / inv_mass_sum;
    ball.velocity -= normal * (impulse * ball.inv_mass());
    colliding.velocity += normal * (impulse * colliding.inv_mass());

    log::debug!(
        "Balls {} <-> {}: impact {:.4}, impulse {:.4}",
        ball.id,
        colliding.id,
        -dot,
        impulse
    );
    Some(Response {
        impact_speed: -dot,
        normal_impulse: impulse,
        friction_impulse: 0.0,
    })
}

/// Push two overlapping balls apart along the contact normal
///
/// The correction is split evenly when both can move; a frozen ball stays
/// put and its counterpart takes the whole displacement.
fn apply_pair_correction(
    ball: &mut Ball,
    colliding: &mut Ball,
    event: &CollisionEvent,
    colliding_event: &CollisionEvent,
    tuning: &PhysicsTuning,
) {
    let normal = colliding_event.hit_normal;
    let share = match (ball.is_frozen(), colliding.is_frozen()) {
        (false, false) => 0.5,
        (true, true) => return,
        _ => 1.0,
    };

    if !colliding.is_frozen() {
        let push = correction_distance(colliding_event.hit_distance, tuning) * share;
        colliding.position += normal * push;
    }
    if !ball.is_frozen() {
        let push = correction_distance(event.hit_distance, tuning) * share;
        ball.position -= normal * push;
    }
}
