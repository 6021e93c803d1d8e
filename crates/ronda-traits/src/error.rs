//! Error types for the ronda crates.
//!
//! Two kinds of failure matter to the engine: configuration problems, which
//! abort an evaluation before any work is done, and degenerate input, which
//! is raised only where a scalar statistic cannot be defined. Per-bucket
//! degeneracy is never an error; it is recorded as a missing observation.

use thiserror::Error;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// Invalid evaluation or smoothing parameters, or panels that cannot be
    /// aligned at all.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Too few observations (or zero dispersion) to compute a statistic.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Malformed input data at a loading boundary.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl RondaError {
    /// Returns true for configuration failures.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true for degenerate-input failures.
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput(_))
    }
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;
