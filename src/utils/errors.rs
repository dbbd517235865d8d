use std::error::Error;
use std::fmt;

/// Represents errors that can occur while building or querying a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GalaxyError {
    /// Indicates a particle mass that is negative or not finite.
    InvalidMass,
    /// Indicates a particle position that is not finite.
    InvalidPosition,
    /// Indicates a region whose bounds are not finite or not ordered.
    InvalidRegion(String),
    /// Indicates a tunable that is outside its allowed range.
    InvalidConstant(String),
    /// A node lock was poisoned while the tree was being built.
    LockPoisoned,
}

impl fmt::Display for GalaxyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GalaxyError::InvalidMass => write!(f, "Invalid mass value"),
            GalaxyError::InvalidPosition => write!(f, "Invalid position value"),
            GalaxyError::InvalidRegion(msg) => write!(f, "Invalid region: {}", msg),
            GalaxyError::InvalidConstant(msg) => write!(f, "Invalid constant: {}", msg),
            GalaxyError::LockPoisoned => write!(f, "Quadrant lock poisoned during build"),
        }
    }
}

impl Error for GalaxyError {}
