//! Web layer for the transit engine.
//!
//! Provides JSON endpoints for station lookup, routing and network
//! analysis.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
