//! Transit network graph engine.
//!
//! Loads a public-transit network from CSV and answers routing and capacity
//! questions over it: fastest and alternative routes, congestion-aware
//! routes, max-flow bottlenecks, a minimum spanning tree and a conflict-free
//! coloring of stations.

pub mod analysis;
pub mod domain;
pub mod graph;
pub mod index;
pub mod loader;
pub mod network;
pub mod planner;
pub mod web;
