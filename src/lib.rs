//! Pinball Physics - narrow-phase collision engine for pinball balls
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball state, time of impact, resolvers, step cycle)
//! - `tuning`: Data-driven physics constants
//! - `error`: Construction and configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::PhysicsError;
pub use tuning::PhysicsTuning;

/// Physics constants
///
/// Distances are in table units, time in physics ticks. Every value here is
/// also the default of a field in [`PhysicsTuning`].
pub mod consts {
    /// Distance below which two surfaces are considered touching
    pub const PHYS_TOUCH: f32 = 0.05;
    /// Normal speed band treated as neither approaching nor receding
    pub const LOW_NORM_VEL: f32 = 0.0001;
    /// Penetration depth past which a slow ball counts as embedded
    pub const EMBEDDED: f32 = 0.0;
    /// Synthetic approach speed used to kick an embedded ball free
    pub const EMBED_SHOT: f32 = 0.05;
    /// Fraction of the penetration depth corrected per resolution
    pub const DISP_GAIN: f32 = 0.9875;
    /// Maximum positional correction per resolution
    pub const DISP_LIMIT: f32 = 5.0;
    /// Normal speed at or below which a touch is a resting contact
    pub const CONTACT_VEL: f32 = 0.099;
    /// Slip speed below which friction uses the static regime
    pub const PRECISION: f32 = 0.01;
    /// Fixed restitution for ball/ball impacts
    pub const BALL_BALL_RESTITUTION: f32 = 0.8;
    /// Outward normal speed above which a non-slipping ball gets no static
    /// friction (tuned for balls pushed off rubbers)
    pub const RUBBER_CONTACT_VEL: f32 = 0.025;
    /// Difficulty weighting applied to material scatter angles
    pub const SCATTER_DIFFICULTY: f32 = 0.2;
    /// Scatter angle (radians) for materials that request the global value
    pub const HARD_SCATTER: f32 = 0.0;
    /// Sub-step length below which the cycle counts a stall
    pub const STATIC_TIME: f32 = 0.005;
    /// Stalled sub-steps tolerated before forcing progress
    pub const STATIC_COUNTS: u32 = 10;
    /// Vertical separation injected for two center-over-center balls
    pub const EMBEDDED_SEPARATION: f32 = 1.0;
    /// Vertical velocity delta injected for two center-over-center balls
    pub const EMBEDDED_VELOCITY_DELTA: f32 = 0.1;
    /// Default step duration (one physics tick)
    pub const STEP_DURATION: f32 = 1.0;
    /// Default gravity magnitude per tick squared; below `CONTACT_VEL` so a
    /// ball at rest stays a resting contact between ticks
    pub const STANDARD_GRAVITY: f32 = 0.02;
    /// Impact speed normalizing the elasticity falloff curve
    pub const FALLOFF_REFERENCE_SPEED: f32 = 18.53;
    /// Squared relative speed below which two balls never meet within a step
    pub const MIN_APPROACH_SPEED_SQ: f32 = 1.0e-8;
    /// Center distance below which two balls are treated as coincident
    pub const COINCIDENT_DISTANCE: f32 = 1.0e-8;
    /// Correction depth below which no displacement is applied
    pub const MIN_CORRECTION: f32 = 1.0e-4;
    /// Squared tangential magnitude below which no friction applies
    pub const MIN_TANGENT_SQ: f32 = 1.0e-6;
    /// Impact speed below which no scatter is applied
    pub const MIN_SCATTER_SPEED: f32 = 1.0;
    /// Scatter angle below which scatter is skipped
    pub const MIN_SCATTER_ANGLE: f32 = 1.0e-5;
    /// Peak of `x * (1 - x^2)` on `[-1, 1]` is `2 / (3 * sqrt(3))`; this
    /// rescales the shaped scatter sample to `[-1, 1]`
    pub const SCATTER_SHAPE_SCALE: f32 = 2.59808;
}

/// Restitution reduced by impact speed
///
/// A positive `falloff` lowers the elasticity as `|speed|` grows; zero or
/// negative falloff leaves it unchanged.
#[inline]
pub fn elasticity_with_falloff(elasticity: f32, falloff: f32, speed: f32) -> f32 {
    if falloff > 0.0 {
        elasticity / (1.0 + falloff * speed.abs() / consts::FALLOFF_REFERENCE_SPEED)
    } else {
        elasticity
    }
}

/// Real roots of `a·t² + b·t + c = 0`
///
/// Uses the cancellation-free form `q = -(b + sign(b)·√disc) / 2`,
/// `t1 = q / a`, `t2 = c / q`. Returns `None` for a negative discriminant or
/// a degenerate equation.
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a == 0.0 {
        return None;
    }
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 {
        return None;
    }
    let root = discr.sqrt();
    let q = if b < 0.0 {
        -0.5 * (b - root)
    } else {
        -0.5 * (b + root)
    };
    if q == 0.0 {
        // b == 0 and c == 0: double root at zero
        return Some((0.0, 0.0));
    }
    Some((q / a, c / q))
}

/// Clamp a friction impulse to the Coulomb bound `[-bound, bound]`
///
/// A negative bound allows no impulse. Returns `None` when the impulse is
/// not finite or the bound is NaN, so degenerate input never reaches the
/// ball.
#[inline]
pub fn clamp_impulse(impulse: f32, bound: f32) -> Option<f32> {
    if !impulse.is_finite() || bound.is_nan() {
        return None;
    }
    let bound = bound.max(0.0);
    Some(impulse.clamp(-bound, bound))
}
