//! Static table surfaces
//!
//! A surface is anything the ball can hit that knows its own normal and
//! material. The narrow-phase resolvers only need a [`CollisionEvent`], so a
//! surface's job is its hit test.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::event::CollisionEvent;
use super::material::Material;
use crate::tuning::PhysicsTuning;

/// Infinite plane `normal · p = distance`, solid on the negative side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub id: u32,
    /// Unit normal pointing into free space
    pub normal: Vec3,
    pub distance: f32,
    pub material: Material,
}

impl Plane {
    pub fn new(id: u32, normal: Vec3, distance: f32, material: Material) -> Self {
        Self {
            id,
            normal: normal.normalize_or_zero(),
            distance,
            material,
        }
    }

    /// Earliest contact of `ball` with the plane within `[0, dt]`
    pub fn hit_test(&self, ball: &Ball, dt: f32, tuning: &PhysicsTuning) -> Option<CollisionEvent> {
        let bnv = self.normal.dot(ball.velocity);
        if bnv > tuning.contact_vel {
            // Clearly moving away
            return None;
        }

        // Gap between the ball surface and the plane
        let bnd = self.normal.dot(ball.position) - ball.radius - self.distance;
        if bnd < ball.radius * -2.0 {
            // Passed through; not ours to fix
            return None;
        }

        let mut event = CollisionEvent {
            hit_normal: self.normal,
            hit_distance: bnd,
            ..Default::default()
        };

        let hit_time = if bnv.abs() <= tuning.contact_vel {
            if bnd.abs() <= tuning.phys_touch {
                event.is_contact = true;
                event.hit_org_normal_velocity = bnv;
                0.0
            } else if bnd <= tuning.phys_touch {
                // Slow but embedded
                0.0
            } else {
                return None;
            }
        } else {
            (bnd / -bnv).max(0.0)
        };

        if !hit_time.is_finite() || hit_time > dt {
            return None;
        }
        event.hit_time = hit_time;
        Some(event)
    }
}

/// Collidable table geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
}

impl Surface {
    pub fn id(&self) -> u32 {
        match self {
            Surface::Plane(plane) => plane.id,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Surface::Plane(plane) => &plane.material,
        }
    }

    pub fn hit_test(&self, ball: &Ball, dt: f32, tuning: &PhysicsTuning) -> Option<CollisionEvent> {
        match self {
            Surface::Plane(plane) => plane.hit_test(ball, dt, tuning),
        }
    }
}
