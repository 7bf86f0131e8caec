//! Errors for construction and configuration
//!
//! Collision detection and resolution never fail; they return `None` for
//! no-ops. Only building balls and loading tuning can go wrong.

use std::fmt;

/// Error type for table setup and tuning loading.
#[derive(Debug)]
pub enum PhysicsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidBall(String),
    InvalidTuning(String),
    UnknownBall(u32),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::Io(e) => write!(f, "IO error: {}", e),
            PhysicsError::Parse(e) => write!(f, "JSON parse error: {}", e),
            PhysicsError::InvalidBall(msg) => write!(f, "Invalid ball: {}", msg),
            PhysicsError::InvalidTuning(msg) => write!(f, "Invalid tuning: {}", msg),
            PhysicsError::UnknownBall(id) => write!(f, "Unknown ball id: {}", id),
        }
    }
}

impl std::error::Error for PhysicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PhysicsError::Io(e) => Some(e),
            PhysicsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PhysicsError {
    fn from(err: std::io::Error) -> Self {
        PhysicsError::Io(err)
    }
}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        PhysicsError::Parse(err)
    }
}
