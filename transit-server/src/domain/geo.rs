//! Geographic coordinates and distance helpers.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude in kilometres.
const KM_PER_DEGREE: f64 = 111.0;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new position.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a position, rejecting values outside the WGS84 range.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Perpendicular distance in kilometres from this point to the infinite
    /// line through `a` and `b`.
    ///
    /// Works in planar degree space and converts with a flat 111 km/degree,
    /// which is adequate at city scale. When `a` and `b` coincide this is the
    /// great-circle distance to `a`.
    pub fn distance_to_line_km(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        let (x0, y0) = (self.longitude, self.latitude);
        let (x1, y1) = (a.longitude, a.latitude);
        let (x2, y2) = (b.longitude, b.latitude);

        let denominator = ((y2 - y1).powi(2) + (x2 - x1).powi(2)).sqrt();
        if denominator == 0.0 {
            return self.distance_km(a);
        }

        let numerator = ((y2 - y1) * x0 - (x2 - x1) * y0 + x2 * y1 - y2 * x1).abs();
        numerator / denominator * KM_PER_DEGREE
    }
}
