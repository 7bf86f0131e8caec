//! Table state
//!
//! Everything the step cycle reads and mutates lives here, passed around
//! explicitly instead of through globals.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::material::Material;
use super::surface::{Plane, Surface};
use crate::error::PhysicsError;
use crate::tuning::PhysicsTuning;

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        if self.stream == 0 {
            Pcg32::seed_from_u64(self.seed)
        } else {
            Pcg32::new(self.seed, self.stream)
        }
    }
}

/// Complete table state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// RNG seed for scatter
    pub rng_state: RngState,
    pub tuning: PhysicsTuning,
    /// Steps simulated so far
    pub step_index: u64,
    /// Active balls (sorted by id for determinism)
    pub balls: Vec<Ball>,
    /// Static geometry (sorted by id for determinism)
    pub surfaces: Vec<Surface>,
    /// Next ball ID
    next_ball_id: u32,
    /// Next surface ID
    next_surface_id: u32,
}

impl Table {
    /// Empty table; rejects tuning the step cycle cannot run with
    pub fn new(seed: u64, tuning: PhysicsTuning) -> Result<Self, PhysicsError> {
        tuning.validate()?;
        Ok(Self {
            rng_state: RngState::new(seed),
            tuning,
            step_index: 0,
            balls: Vec::new(),
            surfaces: Vec::new(),
            next_ball_id: 1,
            next_surface_id: 1,
        })
    }

    /// Put a new ball in play; returns its id
    pub fn spawn_ball(
        &mut self,
        position: Vec3,
        radius: f32,
        mass: f32,
    ) -> Result<u32, PhysicsError> {
        let id = self.next_ball_id;
        let ball = Ball::new(id, position, radius, mass)?;
        self.next_ball_id += 1;
        self.balls.push(ball);
        log::debug!("Spawned ball {} at {}", id, position);
        Ok(id)
    }

    /// Take a ball off the table
    pub fn remove_ball(&mut self, id: u32) -> Result<Ball, PhysicsError> {
        let index = self.index_of(id)?;
        Ok(self.balls.remove(index))
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_mut(&mut self, id: u32) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Capture or release a ball
    pub fn set_frozen(&mut self, id: u32, frozen: bool) -> Result<(), PhysicsError> {
        let index = self.index_of(id)?;
        self.balls[index].set_frozen(frozen);
        Ok(())
    }

    /// Add a plane; returns its surface id
    pub fn add_plane(&mut self, normal: Vec3, distance: f32, material: Material) -> u32 {
        let id = self.next_surface_id;
        self.next_surface_id += 1;
        self.surfaces
            .push(Surface::Plane(Plane::new(id, normal, distance, material)));
        id
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.surfaces.sort_by_key(|s| s.id());
    }

    fn index_of(&self, id: u32) -> Result<usize, PhysicsError> {
        self.balls
            .iter()
            .position(|b| b.id == id)
            .ok_or(PhysicsError::UnknownBall(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_ids_are_monotonic() {
        let mut table = Table::new(1, PhysicsTuning::default()).unwrap();
        let a = table.spawn_ball(Vec3::ZERO, 25.0, 1.0).unwrap();
        let b = table.spawn_ball(Vec3::X * 100.0, 25.0, 1.0).unwrap();
        table.remove_ball(a).unwrap();
        let c = table.spawn_ball(Vec3::ZERO, 25.0, 1.0).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_invalid_ball_does_not_consume_id() {
        let mut table = Table::new(1, PhysicsTuning::default()).unwrap();
        assert!(table.spawn_ball(Vec3::ZERO, -1.0, 1.0).is_err());
        assert_eq!(table.spawn_ball(Vec3::ZERO, 25.0, 1.0).unwrap(), 1);
    }

    #[test]
    fn test_unknown_ball() {
        let mut table = Table::new(1, PhysicsTuning::default()).unwrap();
        assert!(matches!(
            table.set_frozen(42, true),
            Err(PhysicsError::UnknownBall(42))
        ));
        assert!(table.remove_ball(42).is_err());
    }

    #[test]
    fn test_freeze_through_table() {
        let mut table = Table::new(1, PhysicsTuning::default()).unwrap();
        let id = table.spawn_ball(Vec3::ZERO, 25.0, 1.0).unwrap();
        table.set_frozen(id, true).unwrap();
        assert!(table.ball(id).unwrap().is_frozen());
        assert_eq!(table.ball(id).unwrap().inv_mass(), 0.0);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = PhysicsTuning {
            static_time: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Table::new(1, tuning),
            Err(PhysicsError::InvalidTuning(_))
        ));
    }

    #[test]
    fn test_rng_state_reproducible() {
        let state = RngState::new(1234);
        let a: u32 = state.to_rng().random();
        let b: u32 = state.to_rng().random();
        assert_eq!(a, b);
    }
}
