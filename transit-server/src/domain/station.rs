//! Station identity and attribute types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geo::Coordinates;

/// Error returned when parsing an invalid station id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A station identifier.
///
/// Identity is by value: two ids are equal when their text is equal, so
/// the type is safe to use as a map key. Surrounding whitespace is trimmed
/// at parse time; ids are otherwise case-sensitive.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StationId;
///
/// let id = StationId::parse(" TM042 ").unwrap();
/// assert_eq!(id.as_str(), "TM042");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("A B").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id.
    ///
    /// The trimmed input must be non-empty and free of whitespace and
    /// control characters.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(InvalidStationId {
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationId::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an unknown station category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown station category: {0}")]
pub struct InvalidCategory(pub String);

/// The kind of service a station belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StationCategory {
    Metro,
    BusRapid,
    Feeder,
    Intermodal,
}

impl StationCategory {
    /// Parse a category name as it appears in ingested data.
    ///
    /// Accepts the canonical names plus the local system names the data
    /// feeds use (`tm` for bus rapid transit, `sitp` for feeders).
    pub fn parse(s: &str) -> Result<Self, InvalidCategory> {
        match s.trim().to_lowercase().as_str() {
            "metro" => Ok(StationCategory::Metro),
            "bus-rapid" | "brt" | "tm" | "transmilenio" => Ok(StationCategory::BusRapid),
            "feeder" | "sitp" => Ok(StationCategory::Feeder),
            "intermodal" => Ok(StationCategory::Intermodal),
            _ => Err(InvalidCategory(s.to_string())),
        }
    }

    /// Returns the canonical name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            StationCategory::Metro => "metro",
            StationCategory::BusRapid => "bus-rapid",
            StationCategory::Feeder => "feeder",
            StationCategory::Intermodal => "intermodal",
        }
    }
}

impl fmt::Display for StationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A station of the transit network. Immutable after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub category: StationCategory,
    pub coordinates: Coordinates,
    /// Nominal passenger capacity.
    pub capacity: u64,
}

impl Station {
    /// Create a new station.
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        category: StationCategory,
        coordinates: Coordinates,
        capacity: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            coordinates,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("E001").is_ok());
        assert!(StationId::parse("tm-portal_80").is_ok());
        assert!(StationId::parse("7").is_ok());
    }

    #[test]
    fn parse_trims_whitespace() {
        let id = StationId::parse("  E001\t").unwrap();
        assert_eq!(id.as_str(), "E001");
    }

    #[test]
    fn reject_empty() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("   ").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(StationId::parse("E 001").is_err());
        assert!(StationId::parse("E\u{0007}1").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::parse("E001").unwrap();
        assert_eq!(format!("{}", id), "E001");
        assert_eq!(format!("{:?}", id), "StationId(E001)");
    }

    #[test]
    fn hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(StationId::parse("E001").unwrap());
        assert!(set.contains(&StationId::parse(" E001").unwrap()));
        assert!(!set.contains(&StationId::parse("E002").unwrap()));
    }

    #[test]
    fn serde_rejects_invalid_id() {
        let ok: Result<StationId, _> = serde_json::from_str("\"E001\"");
        assert!(ok.is_ok());
        let bad: Result<StationId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    #[test]
    fn category_aliases() {
        assert_eq!(StationCategory::parse("metro"), Ok(StationCategory::Metro));
        assert_eq!(StationCategory::parse("TM"), Ok(StationCategory::BusRapid));
        assert_eq!(StationCategory::parse("bus-rapid"), Ok(StationCategory::BusRapid));
        assert_eq!(StationCategory::parse("sitp"), Ok(StationCategory::Feeder));
        assert_eq!(StationCategory::parse(" Intermodal "), Ok(StationCategory::Intermodal));
        assert!(StationCategory::parse("tram").is_err());
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&StationCategory::BusRapid).unwrap();
        assert_eq!(json, "\"bus-rapid\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing is stable: parse(as_str(parse(s))) == parse(s)
        #[test]
        fn reparse_is_identity(s in "[A-Za-z0-9_-]{1,12}") {
            let id = StationId::parse(&s).unwrap();
            let again = StationId::parse(id.as_str()).unwrap();
            prop_assert_eq!(id, again);
        }

        /// Padding never changes identity
        #[test]
        fn padding_ignored(s in "[A-Za-z0-9]{1,8}", pad in " {0,3}") {
            let padded = format!("{pad}{s}{pad}");
            prop_assert_eq!(StationId::parse(&padded).unwrap(), StationId::parse(&s).unwrap());
        }
    }
}
