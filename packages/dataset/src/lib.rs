#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Immutable geo-dataset store for the company atlas.
//!
//! A [`Dataset`] is loaded once at widget initialization from one of two
//! accepted payload shapes (a GeoJSON `FeatureCollection` of point
//! features, or a tabular CSV document converted via a configurable column
//! mapping) and is read-only for the rest of the session. Source rows
//! with missing, non-finite, out-of-range, or `(0, 0)` coordinates are
//! dropped during load; they never fail the load as a whole.

pub mod loader;

pub use loader::{CsvOptions, DatasetLoader};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Property keys checked, in order, for a record's display name.
///
/// Source schemas vary between the native GeoJSON exports and older CSV
/// dumps, so the first non-empty match wins.
pub const NAME_FIELDS: &[&str] = &["Company Name", "company_name"];

/// Property key holding a record's sector classification.
pub const SECTOR_FIELD: &str = "Sector";

/// Errors that can occur while loading a dataset payload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// GeoJSON payload could not be parsed at all.
    #[error("GeoJSON parse error: {0}")]
    Geojson(#[from] geojson::Error),

    /// CSV payload could not be read.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The payload parsed but matches neither accepted dataset shape.
    #[error("Unsupported dataset format: {message}")]
    UnsupportedFormat {
        /// Description of what the payload looked like instead.
        message: String,
    },
}

/// Accepted payload shapes for the dataset source file.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatasetFormat {
    /// A GeoJSON `FeatureCollection` of point features.
    Geojson,
    /// A tabular CSV document convertible via a column mapping.
    #[default]
    Csv,
}

/// One geolocated record in the dataset.
///
/// Coordinates are WGS84 and validated at load time. Properties are an
/// open mapping with no fixed schema beyond the fields the filters
/// reference ([`NAME_FIELDS`], [`SECTOR_FIELD`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Open property mapping from the source document.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl CompanyRecord {
    /// Returns the record's display name, trying the [`NAME_FIELDS`]
    /// aliases in order. `None` when no alias holds a non-empty string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        NAME_FIELDS
            .iter()
            .filter_map(|field| self.properties.get(*field))
            .filter_map(serde_json::Value::as_str)
            .find(|value| !value.is_empty())
    }

    /// Returns the record's sector string, if present and non-empty.
    #[must_use]
    pub fn sector(&self) -> Option<&str> {
        self.properties
            .get(SECTOR_FIELD)
            .and_then(serde_json::Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// The immutable loaded dataset.
///
/// Created once by a [`DatasetLoader`]; read-only thereafter, so it is
/// safe to share across threads and re-filter concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CompanyRecord>,
    sectors: Vec<String>,
    dropped: usize,
}

impl Dataset {
    /// Builds a dataset from validated records, deriving the sector
    /// enumeration.
    #[must_use]
    pub fn new(records: Vec<CompanyRecord>, dropped: usize) -> Self {
        let sectors: std::collections::BTreeSet<String> = records
            .iter()
            .filter_map(CompanyRecord::sector)
            .map(str::to_string)
            .collect();

        Self {
            records,
            sectors: sectors.into_iter().collect(),
            dropped,
        }
    }

    /// All records, in source order.
    #[must_use]
    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    /// Number of records that survived loading.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Deduplicated, sorted sector values found in the data.
    ///
    /// This drives the sector dropdown and is independent of the fixed
    /// marker-color taxonomy; sectors outside that taxonomy appear here
    /// and filter normally.
    #[must_use]
    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    /// Number of source rows dropped for failing coordinate validation.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Whether a latitude/longitude pair is usable as a record position.
///
/// Rejects non-finite values, out-of-range coordinates, and the exact
/// `(0, 0)` pair, which the upstream geocoding pipeline writes as a
/// failed-geocode sentinel.
#[must_use]
pub const fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && latitude.abs() <= 90.0
        && longitude.abs() <= 180.0
        && !(latitude == 0.0 && longitude == 0.0)
}
