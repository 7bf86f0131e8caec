//! Time of impact between two balls
//!
//! Swept sphere/sphere test: the earliest time within the step at which the
//! surfaces of two moving balls touch, found from the relative motion
//! `|d + dv·t| = r1 + r2`.

use super::ball::Ball;
use super::event::CollisionEvent;
use crate::consts::{COINCIDENT_DISTANCE, MIN_APPROACH_SPEED_SQ};
use crate::solve_quadratic;
use crate::tuning::PhysicsTuning;

/// Earliest contact of `hitting` with `other` within `[0, dt]`
///
/// The returned event's normal points from `other` toward `hitting`.
/// Returns `None` when the balls recede, never meet within the step, or the
/// geometry is degenerate.
///
/// Two balls sitting center over center have no line of centers. In that
/// case `hitting` is lifted by `embedded_separation` and given a downward
/// velocity delta of `embedded_velocity_delta` so the pair separates
/// deterministically; this is a stability fallback, not physics.
pub fn ball_time_of_impact(
    hitting: &mut Ball,
    other: &Ball,
    dt: f32,
    tuning: &PhysicsTuning,
) -> Option<CollisionEvent> {
    let mut d = other.position - hitting.position;
    let mut dv = other.velocity - hitting.velocity;
    let mut dist_sq = d.length_squared();
    let mut dist = dist_sq.sqrt();

    if dist < COINCIDENT_DISTANCE {
        log::warn!(
            "Balls {} and {} are center over center, separating",
            hitting.id,
            other.id
        );
        hitting.position.z += tuning.embedded_separation;
        hitting.velocity.z -= tuning.embedded_velocity_delta;
        d = other.position - hitting.position;
        dv = other.velocity - hitting.velocity;
        dist_sq = d.length_squared();
        dist = dist_sq.sqrt();
    }

    let b = dv.dot(d);
    // Normal speed of the balls toward each other (negative = approaching)
    let bnv = b / dist;
    if bnv > tuning.low_norm_vel {
        return None;
    }

    let total_radius = hitting.radius + other.radius;
    // Distance between the ball surfaces
    let bnd = dist - total_radius;

    let mut is_contact = false;
    let hit_time = if bnd <= tuning.phys_touch {
        if bnd < hitting.radius * -2.0 {
            // Embedded too deep to recover from here
            return None;
        }
        is_contact = bnv.abs() <= tuning.contact_vel;
        if !is_contact || bnd <= -tuning.phys_touch || bnv >= 0.0 {
            0.0
        } else {
            (bnd / -bnv).max(0.0)
        }
    } else {
        let a = dv.length_squared();
        if a < MIN_APPROACH_SPEED_SQ {
            // Too slow to close the gap; wait for contact
            return None;
        }
        let (t1, t2) = solve_quadratic(a, 2.0 * b, dist_sq - total_radius * total_radius)?;
        // Smallest non-negative root
        if t1 * t2 < 0.0 { t1.max(t2) } else { t1.min(t2) }
    };

    if !hit_time.is_finite() || hit_time < 0.0 || hit_time > dt {
        return None;
    }

    let hitting_at = hitting.position + hitting.velocity * hit_time;
    let other_at = other.position + other.velocity * hit_time;
    let hit_normal = hitting_at - other_at;
    if hit_normal.abs().max_element() <= f32::MIN_POSITIVE {
        return None;
    }
    let hit_normal = hit_normal.try_normalize()?;

    Some(CollisionEvent {
        hit_normal,
        hit_distance: bnd,
        is_contact,
        hit_org_normal_velocity: if is_contact { bnv } else { 0.0 },
        hit_time,
    })
}
