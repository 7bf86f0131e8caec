//! Ball state
//!
//! The free parameters of one simulated sphere. Mutated in place by the
//! resolvers and by the step cycle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// A simulated ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Monotonically increasing identifier, also the processing order
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_momentum: Vec3,
    pub radius: f32,
    mass: f32,
    /// Zero iff the ball is frozen
    inv_mass: f32,
    /// Scalar moment of inertia of a solid sphere
    inertia: f32,
    /// Immovable mode (captured by a mechanism)
    frozen: bool,
}

impl Ball {
    /// Create a ball at rest
    pub fn new(id: u32, position: Vec3, radius: f32, mass: f32) -> Result<Self, PhysicsError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidBall(format!(
                "radius must be positive, got {}",
                radius
            )));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidBall(format!(
                "mass must be positive, got {}",
                mass
            )));
        }
        if !position.is_finite() {
            return Err(PhysicsError::InvalidBall("position is not finite".into()));
        }
        Ok(Self {
            id,
            position,
            velocity: Vec3::ZERO,
            angular_momentum: Vec3::ZERO,
            radius,
            mass,
            inv_mass: 1.0 / mass,
            inertia: 0.4 * mass * radius * radius,
            frozen: false,
        })
    }

    /// Builder-style initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Toggle immovable mode, keeping the inverse mass consistent
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        self.inv_mass = if frozen { 0.0 } else { 1.0 / self.mass };
        if frozen {
            self.velocity = Vec3::ZERO;
            self.angular_momentum = Vec3::ZERO;
        }
    }

    #[inline]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_momentum / self.inertia
    }

    /// Velocity of a point on the surface, `offset` relative to the center
    #[inline]
    pub fn surface_velocity(&self, offset: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity().cross(offset)
    }

    /// Acceleration of a surface point under gravity plus the centripetal
    /// term of the current spin
    #[inline]
    pub fn surface_acceleration(&self, offset: Vec3, gravity: Vec3) -> Vec3 {
        let omega = self.angular_velocity();
        gravity + omega.cross(omega.cross(offset))
    }

    /// Apply an impulse at the surface: `rotational` is the angular impulse
    /// (offset × impulse), `linear` the impulse itself
    #[inline]
    pub fn apply_surface_impulse(&mut self, rotational: Vec3, linear: Vec3) {
        self.velocity += linear * self.inv_mass;
        self.angular_momentum += rotational;
    }

    /// Kinematic position update
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        if !self.frozen {
            self.position += self.velocity * dt;
        }
    }

    /// Integrate external acceleration into velocity
    #[inline]
    pub fn apply_gravity(&mut self, gravity: Vec3, dt: f32) {
        if !self.frozen {
            self.velocity += gravity * dt;
        }
    }
}
