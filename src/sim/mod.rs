//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, threaded explicitly
//! - Stable iteration order (by ball ID)
//! - No rendering, audio or platform dependencies

pub mod ball;
pub mod collision;
pub mod contact;
pub mod event;
pub mod material;
pub mod state;
pub mod surface;
pub mod tick;
pub mod toi;

pub use ball::Ball;
pub use collision::{correction_distance, resolve_ball_collision, resolve_surface_collision};
pub use contact::{apply_friction, apply_resting_contact, support_impulse};
pub use event::{CollisionEvent, CollisionRecord, RecordKind, Response, Target};
pub use material::Material;
pub use state::{RngState, Table};
pub use surface::{Plane, Surface};
pub use tick::{AllPairs, BroadPhase, tick, tick_with};
pub use toi::ball_time_of_impact;
