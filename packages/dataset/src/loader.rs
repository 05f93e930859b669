//! Payload parsing for the two accepted dataset shapes.
//!
//! GeoJSON payloads go through the `geojson` crate; tabular payloads go
//! through the `csv` crate with a configurable column mapping. Coordinate
//! column aliases are tried in order, first present header wins, so a
//! deployment can point the loader at schemas we have never seen.

use geojson::{GeoJson, Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::{CompanyRecord, Dataset, DatasetFormat, LoadError, valid_coordinates};

/// Column mapping and dialect options for tabular payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator; only the first byte is used.
    pub separator: String,
    /// Quote character; only the first byte is used.
    pub quote: String,
    /// Header names for the latitude column, tried in order.
    pub latitude_fields: Vec<String>,
    /// Header names for the longitude column, tried in order.
    pub longitude_fields: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            quote: "\"".to_string(),
            latitude_fields: vec![
                "Latitude".to_string(),
                "latitude".to_string(),
                "lat".to_string(),
            ],
            longitude_fields: vec![
                "Longitude".to_string(),
                "longitude".to_string(),
                "lng".to_string(),
                "lon".to_string(),
            ],
        }
    }
}

impl CsvOptions {
    fn separator_byte(&self) -> u8 {
        self.separator.as_bytes().first().copied().unwrap_or(b',')
    }

    fn quote_byte(&self) -> u8 {
        self.quote.as_bytes().first().copied().unwrap_or(b'"')
    }
}

/// Parses raw dataset payloads into a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    format: DatasetFormat,
    csv: CsvOptions,
}

impl DatasetLoader {
    /// Creates a loader for the given declared payload format.
    #[must_use]
    pub fn new(format: DatasetFormat) -> Self {
        Self {
            format,
            csv: CsvOptions::default(),
        }
    }

    /// Overrides the tabular column mapping and dialect.
    #[must_use]
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }

    /// Parses a raw payload into an immutable [`Dataset`].
    ///
    /// Individual rows/features with unusable coordinates are dropped and
    /// tallied; they never fail the load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the payload cannot be parsed at all or
    /// does not match the declared shape.
    pub fn load(&self, raw: &str) -> Result<Dataset, LoadError> {
        match self.format {
            DatasetFormat::Geojson => load_geojson(raw),
            DatasetFormat::Csv => load_csv(raw, &self.csv),
        }
    }
}

fn load_geojson(raw: &str) -> Result<Dataset, LoadError> {
    let geojson: GeoJson = raw.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::UnsupportedFormat {
            message: "expected a GeoJSON FeatureCollection of point features".to_string(),
        });
    };

    let total = collection.features.len();
    let mut records = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for feature in collection.features {
        let Some((longitude, latitude)) = point_position(feature.geometry.as_ref()) else {
            dropped += 1;
            continue;
        };
        if !valid_coordinates(latitude, longitude) {
            dropped += 1;
            continue;
        }
        records.push(CompanyRecord {
            latitude,
            longitude,
            properties: feature.properties.unwrap_or_default(),
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total} GeoJSON features with unusable coordinates");
    }

    Ok(Dataset::new(records, dropped))
}

/// Extracts `(longitude, latitude)` from a point geometry.
fn point_position(geometry: Option<&Geometry>) -> Option<(f64, f64)> {
    match &geometry?.value {
        Value::Point(position) if position.len() >= 2 => Some((position[0], position[1])),
        _ => None,
    }
}

fn load_csv(raw: &str, options: &CsvOptions) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.separator_byte())
        .quote(options.quote_byte())
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.clone();
    let latitude_column = find_column(&headers, &options.latitude_fields);
    let longitude_column = find_column(&headers, &options.longitude_fields);

    let (Some(latitude_column), Some(longitude_column)) = (latitude_column, longitude_column)
    else {
        return Err(LoadError::UnsupportedFormat {
            message: format!(
                "CSV headers contain no coordinate columns (tried {:?} and {:?})",
                options.latitude_fields, options.longitude_fields
            ),
        });
    };

    let mut records = Vec::new();
    let mut total = 0usize;
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row?;
        total += 1;

        let Some((latitude, longitude)) =
            row_coordinates(&row, latitude_column, longitude_column)
        else {
            dropped += 1;
            continue;
        };

        let mut properties = serde_json::Map::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(value) = row.get(index) {
                properties.insert(
                    header.to_string(),
                    serde_json::Value::String(value.to_string()),
                );
            }
        }

        records.push(CompanyRecord {
            latitude,
            longitude,
            properties,
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total} CSV rows with unusable coordinates");
    }

    Ok(Dataset::new(records, dropped))
}

/// Finds the position of the first alias present in the headers.
fn find_column(headers: &csv::StringRecord, aliases: &[String]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|header| header == alias))
}

fn row_coordinates(
    row: &csv::StringRecord,
    latitude_column: usize,
    longitude_column: usize,
) -> Option<(f64, f64)> {
    let latitude = row.get(latitude_column)?.trim().parse::<f64>().ok()?;
    let longitude = row.get(longitude_column)?.trim().parse::<f64>().ok()?;
    if !valid_coordinates(latitude, longitude) {
        return None;
    }
    Some((latitude, longitude))
}
