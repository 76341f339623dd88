//! Domain types for the transit network.
//!
//! Stations, routes and lines as they exist after ingestion. Types validate
//! at construction time, so code receiving them can trust their invariants.

mod error;
mod geo;
mod route;
mod station;

pub use error::DomainError;
pub use geo::Coordinates;
pub use route::{Line, Route};
pub use station::{InvalidCategory, InvalidStationId, Station, StationCategory, StationId};
