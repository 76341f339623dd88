//! Station lookup by id and name.

use std::collections::HashSet;

use crate::domain::Station;

use super::bplus::{BPlusTree, DEFAULT_ORDER, TreeStats};

/// Ordered station lookup.
///
/// Keeps two B+ trees over the same stations, keyed by lowercased id and by
/// lowercased name. Two stations with the same name share a key, so the
/// later insert wins in the name tree while both stay reachable by id.
#[derive(Debug)]
pub struct StationIndex {
    by_id: BPlusTree<String, Station>,
    by_name: BPlusTree<String, Station>,
}

impl Default for StationIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl StationIndex {
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    pub fn with_order(order: usize) -> Self {
        Self {
            by_id: BPlusTree::with_order(order),
            by_name: BPlusTree::with_order(order),
        }
    }

    /// Build an index over `stations`.
    pub fn from_stations<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Self {
        let mut index = Self::new();
        for station in stations {
            index.insert(station.clone());
        }
        index
    }

    /// Add or replace a station.
    pub fn insert(&mut self, station: Station) {
        self.by_name
            .insert(station.name.to_lowercase(), station.clone());
        self.by_id
            .insert(station.id.as_str().to_lowercase(), station);
    }

    /// Look up a station by id, ignoring case.
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.by_id.get(id.trim().to_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Stations whose name starts with `prefix`, ignoring case.
    pub fn search_by_name_prefix(&self, prefix: &str, limit: usize) -> Vec<&Station> {
        self.by_name
            .search_prefix(&prefix.trim().to_lowercase(), limit)
    }

    /// Free-text station search.
    ///
    /// Name-prefix matches come first, then name-substring matches, then
    /// id-substring matches. Each station appears once, and at most `limit`
    /// are returned. A blank query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Station> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        let candidates = self
            .by_name
            .search_prefix(&needle, limit)
            .into_iter()
            .chain(self.by_name.search_contains(&needle, limit))
            .chain(self.by_id.search_contains(&needle, limit));

        for station in candidates {
            if results.len() >= limit {
                break;
            }
            if seen.insert(&station.id) {
                results.push(station);
            }
        }
        results
    }

    /// All stations in id order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.by_id.iter().map(|(_, station)| station)
    }

    /// Shape of the id tree and the name tree.
    pub fn stats(&self) -> (TreeStats, TreeStats) {
        (self.by_id.stats(), self.by_name.stats())
    }
}
