//! Lookup structures built once at ingestion.
//!
//! [`StationIndex`] answers exact, prefix and substring queries over
//! stations; [`RouteIndex`] finds the routes incident to a station or
//! contained in a station set.

mod bplus;
mod routes;
mod stations;

pub use bplus::{BPlusTree, DEFAULT_ORDER, Iter, TreeStats};
pub use routes::RouteIndex;
pub use stations::StationIndex;
