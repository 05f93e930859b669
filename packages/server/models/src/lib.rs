#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the company atlas server.
//!
//! These types are serialized to JSON for the REST API. They own their
//! data, unlike the borrowed view types they are built from, so the
//! API contract can evolve independently of the render pipeline.

use company_atlas_sector_models::{IconColor, MarkerCategory};
use company_atlas_view::{AnchorOverlay, ListRow, Marker, Viewport};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    /// Free-form address text to anchor the search on.
    pub address: Option<String>,
    /// Search radius in meters around the geocoded address.
    pub radius: Option<f64>,
    /// Case-insensitive company name substring.
    pub name: Option<String>,
    /// Exact sector value.
    pub sector: Option<String>,
}

/// A matched company marker as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarker {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Marker category from the sector taxonomy.
    pub category: MarkerCategory,
    /// Pin color for the category.
    pub icon: IconColor,
    /// Display name, when the record has one.
    pub name: Option<String>,
    /// Full source properties for the detail popup.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<&Marker<'_>> for ApiMarker {
    fn from(marker: &Marker<'_>) -> Self {
        Self {
            latitude: marker.latitude,
            longitude: marker.longitude,
            category: marker.category,
            icon: marker.icon,
            name: marker.name.map(String::from),
            properties: marker.properties.clone(),
        }
    }
}

/// A matched company list row as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRow {
    /// Display name, when the record has one.
    pub name: Option<String>,
    /// Sector value, when the record has one.
    pub sector: Option<String>,
    /// Full source properties for the row template.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl From<&ListRow<'_>> for ApiRow {
    fn from(row: &ListRow<'_>) -> Self {
        Self {
            name: row.name.map(String::from),
            sector: row.sector.map(String::from),
            properties: row.properties.clone(),
        }
    }
}

/// Where the map should pan and zoom after the search.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiViewport {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Tile zoom level.
    pub zoom: u8,
}

impl From<Viewport> for ApiViewport {
    fn from(viewport: Viewport) -> Self {
        Self {
            latitude: viewport.center.latitude,
            longitude: viewport.center.longitude,
            zoom: viewport.zoom,
        }
    }
}

/// The anchor pushpin and radius circle for anchored searches.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnchor {
    /// Anchor latitude.
    pub latitude: f64,
    /// Anchor longitude.
    pub longitude: f64,
    /// Radius of the overlay circle in meters.
    pub radius_meters: f64,
}

impl From<AnchorOverlay> for ApiAnchor {
    fn from(overlay: AnchorOverlay) -> Self {
        Self {
            latitude: overlay.center.latitude,
            longitude: overlay.center.longitude,
            radius_meters: overlay.radius_meters,
        }
    }
}

/// Response from the search endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchResponse {
    /// Matched markers in dataset order.
    pub markers: Vec<ApiMarker>,
    /// Matched list rows, mirroring the marker order.
    pub rows: Vec<ApiRow>,
    /// Number of matches.
    pub count: usize,
    /// Ready-to-display counter label.
    pub label: String,
    /// Viewport for the host map.
    pub viewport: ApiViewport,
    /// Anchor overlay, present for anchored searches.
    pub anchor: Option<ApiAnchor>,
    /// Whether the host map should cluster the markers.
    pub clustered: bool,
    /// Cluster radius hint in pixels.
    pub max_cluster_radius: u32,
    /// Query string for the address bar.
    pub permalink: String,
}
