//! CSV ingestion of stations, routes and lines.
//!
//! A data directory holds `stations.csv` and `routes.csv`, plus an optional
//! `lines.csv`. Every file has a header row; fields are trimmed.
//!
//! ```text
//! stations.csv  id,name,category,latitude,longitude,capacity
//! routes.csv    id,origin,destination,travel_time,capacity,distance_m
//! lines.csv     id,name,category,stations
//! ```
//!
//! The `stations` column of `lines.csv` is a quoted, comma-separated list of
//! station ids.

mod error;

pub use error::LoadError;

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{
    Coordinates, DomainError, Line, Route, Station, StationCategory, StationId,
};
use crate::network::TransitNetwork;

const STATIONS_FILE: &str = "stations.csv";
const ROUTES_FILE: &str = "routes.csv";
const LINES_FILE: &str = "lines.csv";

#[derive(Debug, Deserialize)]
struct StationRow {
    id: String,
    name: String,
    category: String,
    latitude: f64,
    longitude: f64,
    capacity: u64,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    id: String,
    origin: String,
    destination: String,
    travel_time: i64,
    capacity: u64,
    distance_m: f64,
}

#[derive(Debug, Deserialize)]
struct LineRow {
    id: String,
    name: String,
    category: String,
    stations: String,
}

/// Load a network from the CSV files in `dir`.
///
/// Routes with an unknown endpoint are dropped by
/// [`TransitNetwork::new`]; line members that are not known stations are
/// dropped here.
pub fn load_dir(dir: &Path) -> Result<TransitNetwork, LoadError> {
    let stations = read_stations(open(&dir.join(STATIONS_FILE))?)?;
    let routes = read_routes(open(&dir.join(ROUTES_FILE))?)?;

    let lines_path = dir.join(LINES_FILE);
    let mut lines = if lines_path.exists() {
        read_lines(open(&lines_path)?)?
    } else {
        info!(path = %lines_path.display(), "No lines file, continuing without lines");
        Vec::new()
    };

    let known: HashSet<&StationId> = stations.iter().map(|s| &s.id).collect();
    for line in &mut lines {
        let before = line.stations.len();
        line.stations.retain(|id| known.contains(id));
        let dropped = before - line.stations.len();
        if dropped > 0 {
            warn!(line = %line.id, dropped, "Dropping unknown stations from line");
        }
    }

    info!(
        dir = %dir.display(),
        stations = stations.len(),
        routes = routes.len(),
        lines = lines.len(),
        "Loaded network data"
    );

    Ok(TransitNetwork::new(stations, routes, lines))
}

/// Read station records.
pub fn read_stations<R: io::Read>(reader: R) -> Result<Vec<Station>, LoadError> {
    let mut stations = Vec::new();
    for (i, row) in csv_reader(reader).deserialize::<StationRow>().enumerate() {
        let row = row.map_err(|source| LoadError::Csv {
            file: STATIONS_FILE,
            source,
        })?;
        let station = station_from_row(row).map_err(|source| LoadError::InvalidRecord {
            file: STATIONS_FILE,
            row: i + 1,
            source,
        })?;
        stations.push(station);
    }
    Ok(stations)
}

/// Read route records. Negative travel times are rejected.
pub fn read_routes<R: io::Read>(reader: R) -> Result<Vec<Route>, LoadError> {
    let mut routes = Vec::new();
    for (i, row) in csv_reader(reader).deserialize::<RouteRow>().enumerate() {
        let row = row.map_err(|source| LoadError::Csv {
            file: ROUTES_FILE,
            source,
        })?;
        let route = route_from_row(row).map_err(|source| LoadError::InvalidRecord {
            file: ROUTES_FILE,
            row: i + 1,
            source,
        })?;
        routes.push(route);
    }
    Ok(routes)
}

/// Read line records. Member ids are not checked against any station list.
pub fn read_lines<R: io::Read>(reader: R) -> Result<Vec<Line>, LoadError> {
    let mut lines = Vec::new();
    for (i, row) in csv_reader(reader).deserialize::<LineRow>().enumerate() {
        let row = row.map_err(|source| LoadError::Csv {
            file: LINES_FILE,
            source,
        })?;
        let line = line_from_row(row).map_err(|source| LoadError::InvalidRecord {
            file: LINES_FILE,
            row: i + 1,
            source,
        })?;
        lines.push(line);
    }
    Ok(lines)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn station_from_row(row: StationRow) -> Result<Station, DomainError> {
    Ok(Station::new(
        StationId::parse(&row.id)?,
        row.name,
        StationCategory::parse(&row.category)?,
        Coordinates::checked(row.latitude, row.longitude)?,
        row.capacity,
    ))
}

fn route_from_row(row: RouteRow) -> Result<Route, DomainError> {
    if row.travel_time < 0 {
        return Err(DomainError::NegativeTravelTime(row.id));
    }
    Ok(Route::new(
        row.id,
        StationId::parse(&row.origin)?,
        StationId::parse(&row.destination)?,
        row.travel_time,
        row.capacity,
        row.distance_m,
    ))
}

fn line_from_row(row: LineRow) -> Result<Line, DomainError> {
    let stations = row
        .stations
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(StationId::parse)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Line {
        id: row.id,
        name: row.name,
        category: StationCategory::parse(&row.category)?,
        stations,
    })
}
