//! CSV coordinate loader.
//!
//! # CSV format
//!
//! Exactly two numeric columns per row: latitude (`y`) first, longitude
//! (`x`) second.  A header row is optional; it is recognised as a first row
//! whose fields do not parse as numbers.  Fields are trimmed.
//!
//! ```csv
//! y,x
//! 30.6944,-88.0431
//! 30.6968,-88.0399
//! ```
//!
//! Every row is validated before anything is returned, so a malformed file
//! fails here, before any network or geocoding work starts.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use sn_core::GeoPoint;

use crate::{CoordinateSet, Point, PointsError, PointsResult};

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a WGS84 [`CoordinateSet`] from a CSV file.
pub fn load_coords_csv(path: &Path) -> PointsResult<CoordinateSet> {
    if !path.is_file() {
        return Err(PointsError::MissingFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    load_coords_reader(file, &path.display().to_string())
}

/// Like [`load_coords_csv`] but accepts any `Read` source.
///
/// `source_name` only labels error messages.
pub fn load_coords_reader<R: Read>(reader: R, source_name: &str) -> PointsResult<CoordinateSet> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut record = StringRecord::new();
    let mut first = true;

    loop {
        let more = csv_reader
            .read_record(&mut record)
            .map_err(|e| ingestion(source_name, e.position().map_or(0, |p| p.line()), e.to_string()))?;
        if !more {
            break;
        }
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse_row(&record) {
            Ok(p) => points.push(Point::from(p)),
            Err(_) if first && looks_like_header(&record) => {}
            Err(reason) => return Err(ingestion(source_name, line, reason)),
        }
        first = false;
    }

    if points.is_empty() {
        return Err(ingestion(source_name, 0, "no coordinate rows".to_string()));
    }
    Ok(CoordinateSet::from_points(points, sn_core::Crs::Wgs84))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ingestion(source_name: &str, line: u64, reason: String) -> PointsError {
    PointsError::Ingestion { source_name: source_name.to_string(), line, reason }
}

fn parse_row(record: &StringRecord) -> Result<GeoPoint, String> {
    if record.len() != 2 {
        return Err(format!("expected 2 columns (y, x), found {}", record.len()));
    }
    let lat = parse_field(&record[0], "y")?;
    let lon = parse_field(&record[1], "x")?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} outside [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {lon} outside [-180, 180]"));
    }
    Ok(GeoPoint::new(lat, lon))
}

fn parse_field(field: &str, name: &str) -> Result<f64, String> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{name} value {field:?} is not a number"))
}

/// A header has two fields, neither of them numeric.
fn looks_like_header(record: &StringRecord) -> bool {
    record.len() == 2 && record.iter().all(|f| f.parse::<f64>().is_err())
}
