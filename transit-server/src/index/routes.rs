//! Route lookup by endpoint station.

use std::collections::{HashMap, HashSet};

use crate::domain::{Route, StationId};

/// Multimaps from station id to incident routes.
///
/// Routes are stored once; the maps hold positions into that list.
#[derive(Debug, Default)]
pub struct RouteIndex {
    routes: Vec<Route>,
    by_origin: HashMap<StationId, Vec<usize>>,
    by_destination: HashMap<StationId, Vec<usize>>,
}

impl RouteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `routes`.
    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut index = Self::new();
        for route in routes {
            index.insert(route);
        }
        index
    }

    pub fn insert(&mut self, route: Route) {
        let pos = self.routes.len();
        self.by_origin
            .entry(route.origin.clone())
            .or_default()
            .push(pos);
        self.by_destination
            .entry(route.destination.clone())
            .or_default()
            .push(pos);
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All routes in insertion order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes leaving `station`.
    pub fn routes_from(&self, station: &StationId) -> Vec<&Route> {
        self.lookup(&self.by_origin, station)
    }

    /// Routes arriving at `station`.
    pub fn routes_to(&self, station: &StationId) -> Vec<&Route> {
        self.lookup(&self.by_destination, station)
    }

    /// Routes leaving or arriving at `station`. A loop route appears once.
    pub fn routes_touching(&self, station: &StationId) -> Vec<&Route> {
        let mut positions: Vec<usize> = self
            .by_origin
            .get(station)
            .into_iter()
            .chain(self.by_destination.get(station))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|p| &self.routes[p]).collect()
    }

    /// Routes whose origin and destination both belong to `stations`,
    /// each route id reported once.
    pub fn routes_for_station_set(&self, stations: &HashSet<StationId>) -> Vec<&Route> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for station in stations {
            let Some(positions) = self.by_origin.get(station) else {
                continue;
            };
            for &pos in positions {
                let route = &self.routes[pos];
                if stations.contains(&route.destination) && seen.insert(route.id.as_str()) {
                    found.push(route);
                }
            }
        }
        found
    }

    fn lookup(&self, map: &HashMap<StationId, Vec<usize>>, station: &StationId) -> Vec<&Route> {
        map.get(station)
            .map(|positions| positions.iter().map(|&p| &self.routes[p]).collect())
            .unwrap_or_default()
    }
}
