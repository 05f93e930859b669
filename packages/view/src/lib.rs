#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Turns a result set into everything the surfaces need to redraw.
//!
//! [`render`] is the single entry point: it derives the marker layer,
//! the list rows, the result counter, the viewport, and the anchor
//! overlay from one search result, so the map and the list can never
//! disagree about what matched.

use company_atlas_dataset::CompanyRecord;
use company_atlas_filter::{Coordinate, ResultSet, SearchCriteria};
use company_atlas_sector_models::{IconColor, MarkerCategory};
use company_atlas_widget_models::MapOptions;
use serde::Serialize;

/// One map pin, borrowing its display data from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub category: MarkerCategory,
    pub icon: IconColor,
    pub name: Option<&'a str>,
    pub properties: &'a serde_json::Map<String, serde_json::Value>,
}

/// The full pin set plus the clustering hints the host map needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayer<'a> {
    pub markers: Vec<Marker<'a>>,
    pub clustered: bool,
    pub max_cluster_radius: u32,
}

/// One list entry; rows appear in the same order as the markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow<'a> {
    pub name: Option<&'a str>,
    pub sector: Option<&'a str>,
    pub properties: &'a serde_json::Map<String, serde_json::Value>,
}

/// Count of matches plus the ready-to-display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCounter {
    pub count: usize,
    pub label: String,
}

impl ResultCounter {
    /// Builds the `"1,234 companies found"` label, picking the singular
    /// noun only for exactly one match.
    #[must_use]
    pub fn new(count: usize, singular: &str, plural: &str) -> Self {
        let noun = if count == 1 { singular } else { plural };
        Self {
            count,
            label: format!("{} {noun} found", group_thousands(count)),
        }
    }
}

/// Where the map should pan and how far it should zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// The anchor pushpin and translucent radius circle for anchored
/// searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorOverlay {
    pub center: Coordinate,
    pub radius_meters: f64,
}

/// Everything the surfaces redraw after one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate<'a> {
    pub markers: MarkerLayer<'a>,
    pub rows: Vec<ListRow<'a>>,
    pub counter: ResultCounter,
    pub viewport: Viewport,
    pub anchor: Option<AnchorOverlay>,
}

/// Radius-to-zoom steps; a radius at or above the threshold maps to
/// that zoom. Zoom 10 has no step; the table goes from 9 straight
/// to 11.
const ZOOM_STEPS: &[(f64, u8)] = &[
    (1_610_000.0, 4),
    (805_000.0, 5),
    (402_500.0, 6),
    (161_000.0, 7),
    (80_500.0, 8),
    (40_250.0, 9),
    (16_100.0, 11),
    (8_050.0, 12),
    (3_220.0, 13),
    (1_610.0, 14),
    (805.0, 15),
    (400.0, 16),
];

/// Maps a search radius in meters onto a tile zoom level.
#[must_use]
pub fn zoom_for_radius(radius_meters: f64) -> u8 {
    for &(threshold, zoom) in ZOOM_STEPS {
        if radius_meters >= threshold {
            return zoom;
        }
    }
    16
}

/// Derives the complete view state for one search result.
///
/// Anchored searches center on the anchor with a radius-derived zoom
/// and carry the anchor overlay; unanchored searches reset to the
/// configured centroid and zoom with no overlay.
#[must_use]
pub fn render<'a>(
    results: &ResultSet<'a>,
    criteria: &SearchCriteria,
    options: &MapOptions,
) -> ViewUpdate<'a> {
    let markers = results
        .iter()
        .map(|record| {
            let category = category_of(record);
            Marker {
                latitude: record.latitude,
                longitude: record.longitude,
                category,
                icon: category.icon_color(),
                name: record.name(),
                properties: &record.properties,
            }
        })
        .collect();

    let rows = results
        .iter()
        .map(|record| ListRow {
            name: record.name(),
            sector: record.sector(),
            properties: &record.properties,
        })
        .collect();

    let viewport = criteria.radius.map_or(
        Viewport {
            center: options.map_centroid,
            zoom: options.default_zoom,
        },
        |radius| Viewport {
            center: radius.center,
            zoom: zoom_for_radius(radius.radius_meters),
        },
    );

    ViewUpdate {
        markers: MarkerLayer {
            markers,
            clustered: options.clustered,
            max_cluster_radius: options.max_cluster_radius,
        },
        rows,
        counter: ResultCounter::new(
            results.len(),
            &options.record_name,
            &options.record_name_plural,
        ),
        viewport,
        anchor: criteria.radius.map(|radius| AnchorOverlay {
            center: radius.center,
            radius_meters: radius.radius_meters,
        }),
    }
}

/// Marker category for a record, from its `Sector` property.
#[must_use]
pub fn category_of(record: &CompanyRecord) -> MarkerCategory {
    MarkerCategory::for_sector(record.sector().unwrap_or_default())
}

/// Groups a count into comma-separated thousands, en style.
fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
