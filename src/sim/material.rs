//! Surface materials

use serde::{Deserialize, Serialize};

/// Per-surface physical coefficients, immutable during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base restitution
    pub elasticity: f32,
    /// How fast restitution drops with impact speed (0 = constant)
    pub elasticity_falloff: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Maximum random deflection (radians); negative uses the global hard scatter
    pub scatter: f32,
}

impl Material {
    pub const fn new(
        elasticity: f32,
        elasticity_falloff: f32,
        friction: f32,
        scatter: f32,
    ) -> Self {
        Self {
            elasticity,
            elasticity_falloff,
            friction,
            scatter,
        }
    }

    /// Lively rubber: bouncy, grippy, speed dependent
    pub const RUBBER: Material = Material::new(0.8, 0.3, 0.6, 0.0);
    /// Metal guides and ramps
    pub const METAL: Material = Material::new(0.3, 0.0, 0.2, 0.0);
    /// Wooden playfield
    pub const PLAYFIELD: Material = Material::new(0.25, 0.0, 0.15, 0.0);
}

impl Default for Material {
    fn default() -> Self {
        Self::PLAYFIELD
    }
}
