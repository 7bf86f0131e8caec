//! Collision events and emitted records
//!
//! A [`CollisionEvent`] is produced by a hit test and consumed once by a
//! resolver. A [`CollisionRecord`] is what the step hands downstream
//! (audio, lighting, scoring) as an ordered list.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Geometry and kinematics of one detected contact
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Unit normal pointing from the obstacle toward the ball
    pub hit_normal: Vec3,
    /// Gap between the surfaces; negative when penetrating
    pub hit_distance: f32,
    /// Resting contact rather than an impact
    pub is_contact: bool,
    /// Normal velocity at detection, meaningful only for resting contacts.
    /// Kept for diagnostics; resolvers read the ball's current normal
    /// velocity instead so that repeated resolution is idempotent.
    pub hit_org_normal_velocity: f32,
    /// Time of contact within the step
    pub hit_time: f32,
}

impl CollisionEvent {
    /// The same contact seen from the other ball of a pair
    pub fn mirrored(&self) -> Self {
        Self {
            hit_normal: -self.hit_normal,
            ..*self
        }
    }
}

/// What a resolver did, returned only when it acted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Response {
    /// Approach speed along the normal before resolution
    pub impact_speed: f32,
    /// Normal reaction impulse bounding the friction impulse
    pub normal_impulse: f32,
    /// Magnitude of the applied tangential impulse
    pub friction_impulse: f32,
}

/// The other participant of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Surface(u32),
    Ball(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Impact,
    Contact,
}

/// A resolved contact, emitted in processing order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    /// Step index the contact happened in
    pub step: u64,
    /// Offset from the start of the step
    pub time: f32,
    pub ball_id: u32,
    pub target: Target,
    pub kind: RecordKind,
    pub impact_speed: f32,
}
