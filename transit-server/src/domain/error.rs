//! Domain error types.
//!
//! These errors represent validation failures in ingested records. They are
//! distinct from IO and parse errors, which live in the loader.

use super::{InvalidCategory, InvalidStationId};

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    InvalidStationId(#[from] InvalidStationId),

    #[error(transparent)]
    InvalidCategory(#[from] InvalidCategory),

    /// Coordinates outside the WGS84 range
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Travel times must not be negative in ingested data
    #[error("route {0} has a negative travel time")]
    NegativeTravelTime(String),
}
