//! Physics tuning
//!
//! Every empirically tuned constant of the collision engine lives here so it
//! can be adjusted per table without recompiling. Persisted as JSON; missing
//! fields fall back to the defaults in [`crate::consts`].

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PhysicsError;

/// Tunable physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    // === Step ===
    /// Duration of one simulation step
    pub step_duration: f32,
    /// Gravity acceleration (table units per tick squared)
    pub gravity: Vec3,

    // === Contact thresholds ===
    pub phys_touch: f32,
    pub low_norm_vel: f32,
    pub contact_vel: f32,
    pub precision: f32,
    /// Outward normal speed above which a non-slipping ball skips static friction
    pub rubber_contact_vel: f32,

    // === Embedding recovery ===
    pub embedded: f32,
    pub embed_shot: f32,
    pub disp_gain: f32,
    pub disp_limit: f32,
    pub embedded_separation: f32,
    pub embedded_velocity_delta: f32,

    // === Response ===
    pub ball_ball_restitution: f32,
    /// Difficulty weighting of material scatter
    pub scatter_difficulty: f32,
    /// Scatter used by materials with a negative scatter angle
    pub hard_scatter: f32,

    // === Cycle ===
    pub static_time: f32,
    pub static_counts: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            step_duration: STEP_DURATION,
            gravity: Vec3::new(0.0, 0.0, -STANDARD_GRAVITY),

            phys_touch: PHYS_TOUCH,
            low_norm_vel: LOW_NORM_VEL,
            contact_vel: CONTACT_VEL,
            precision: PRECISION,
            rubber_contact_vel: RUBBER_CONTACT_VEL,

            embedded: EMBEDDED,
            embed_shot: EMBED_SHOT,
            disp_gain: DISP_GAIN,
            disp_limit: DISP_LIMIT,
            embedded_separation: EMBEDDED_SEPARATION,
            embedded_velocity_delta: EMBEDDED_VELOCITY_DELTA,

            ball_ball_restitution: BALL_BALL_RESTITUTION,
            scatter_difficulty: SCATTER_DIFFICULTY,
            hard_scatter: HARD_SCATTER,

            static_time: STATIC_TIME,
            static_counts: STATIC_COUNTS,
        }
    }
}

impl PhysicsTuning {
    /// Parse tuning from a JSON string and validate it
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        let tuning: PhysicsTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PhysicsError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&contents)?;
        log::info!("Loaded physics tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable by the solver
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let scalars = [
            ("step_duration", self.step_duration),
            ("phys_touch", self.phys_touch),
            ("low_norm_vel", self.low_norm_vel),
            ("contact_vel", self.contact_vel),
            ("precision", self.precision),
            ("rubber_contact_vel", self.rubber_contact_vel),
            ("embedded", self.embedded),
            ("embed_shot", self.embed_shot),
            ("disp_gain", self.disp_gain),
            ("disp_limit", self.disp_limit),
            ("embedded_separation", self.embedded_separation),
            ("embedded_velocity_delta", self.embedded_velocity_delta),
            ("ball_ball_restitution", self.ball_ball_restitution),
            ("scatter_difficulty", self.scatter_difficulty),
            ("hard_scatter", self.hard_scatter),
            ("static_time", self.static_time),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PhysicsError::InvalidTuning(format!("{} is not finite", name)));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidTuning("gravity is not finite".into()));
        }

        let positive = [
            ("step_duration", self.step_duration),
            ("disp_limit", self.disp_limit),
            ("contact_vel", self.contact_vel),
            ("precision", self.precision),
            ("static_time", self.static_time),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(PhysicsError::InvalidTuning(format!(
                "{} must be positive, got {}",
                name, v
            )));
        }

        if !(0.0..=1.0).contains(&self.ball_ball_restitution) {
            return Err(PhysicsError::InvalidTuning(format!(
                "ball_ball_restitution must be in [0, 1], got {}",
                self.ball_ball_restitution
            )));
        }
        Ok(())
    }
}
