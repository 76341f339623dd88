//! Ingested connection and line records.

use serde::{Deserialize, Serialize};

use super::{StationCategory, StationId};

/// A directed connection between two stations as ingested.
///
/// Each route becomes one edge of the master graph. Several routes may
/// connect the same pair of stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub origin: StationId,
    pub destination: StationId,
    /// Travel time in minutes.
    pub travel_time: i64,
    /// Passengers per interval.
    pub capacity: u64,
    /// Length of the connection in metres.
    pub distance_m: f64,
}

impl Route {
    /// Create a new route.
    pub fn new(
        id: impl Into<String>,
        origin: StationId,
        destination: StationId,
        travel_time: i64,
        capacity: u64,
        distance_m: f64,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            destination,
            travel_time,
            capacity,
            distance_m,
        }
    }
}

/// A named service line grouping an ordered list of stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    pub name: String,
    pub category: StationCategory,
    pub stations: Vec<StationId>,
}

impl Line {
    /// Whether the line calls at `station`.
    pub fn serves(&self, station: &StationId) -> bool {
        self.stations.contains(station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    #[test]
    fn line_serves_member_stations() {
        let line = Line {
            id: "L1".to_string(),
            name: "Linea 1".to_string(),
            category: StationCategory::Metro,
            stations: vec![sid("A"), sid("B")],
        };

        assert!(line.serves(&sid("A")));
        assert!(!line.serves(&sid("C")));
    }

    #[test]
    fn route_serializes_with_plain_ids() {
        let route = Route::new("R1", sid("A"), sid("B"), 5, 1000, 1200.0);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["origin"], "A");
        assert_eq!(json["destination"], "B");
        assert_eq!(json["travel_time"], 5);
    }
}
