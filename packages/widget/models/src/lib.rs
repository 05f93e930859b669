#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Widget configuration shared across the atlas packages.

use company_atlas_dataset::{CsvOptions, DatasetFormat};
use company_atlas_filter::Coordinate;
use serde::{Deserialize, Serialize};

/// Map center used when no deployment overrides it (Chicago Loop).
pub const DEFAULT_CENTROID: Coordinate = Coordinate::new(41.881_832, -87.623_177);

/// Zoom level used for unanchored views.
pub const DEFAULT_ZOOM: u8 = 9;

/// Search radius in meters applied when a search does not carry one
/// (about half a mile).
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 805.0;

/// Everything a deployment can tune about one map instance.
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Dataset location: an `http(s)` URL or a filesystem path.
    pub file_path: String,
    /// Declared payload shape of `file_path`.
    pub file_type: DatasetFormat,
    /// Column mapping and dialect for tabular payloads.
    pub csv_options: CsvOptions,
    /// Map center for unanchored views.
    pub map_centroid: Coordinate,
    /// Zoom level for unanchored views.
    pub default_zoom: u8,
    /// Radius in meters applied when a search does not specify one.
    pub search_radius: f64,
    /// Noun for a single matched record, e.g. `"company"`.
    pub record_name: String,
    /// Noun for several matched records, e.g. `"companies"`.
    pub record_name_plural: String,
    /// Whether the marker layer should be clustered by the host map.
    pub clustered: bool,
    /// Cluster radius hint in pixels for the host map.
    pub max_cluster_radius: u32,
    /// Emit per-stage result counts at `debug` level.
    pub debug: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            file_type: DatasetFormat::default(),
            csv_options: CsvOptions::default(),
            map_centroid: DEFAULT_CENTROID,
            default_zoom: DEFAULT_ZOOM,
            search_radius: DEFAULT_SEARCH_RADIUS_METERS,
            record_name: "result".to_string(),
            record_name_plural: "results".to_string(),
            clustered: false,
            max_cluster_radius: 25,
            debug: false,
        }
    }
}

impl MapOptions {
    /// Parses options from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error if the document is
    /// not valid TOML or a key has the wrong shape.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Resolves the radius a search should use: the requested value when
    /// it is positive, the configured default otherwise.
    #[must_use]
    pub const fn effective_radius(&self, requested: Option<f64>) -> f64 {
        match requested {
            Some(radius) if radius > 0.0 => radius,
            _ => self.search_radius,
        }
    }
}
