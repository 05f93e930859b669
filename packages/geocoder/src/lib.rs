#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address geocoding for the company atlas.
//!
//! Converts free-form address text into latitude/longitude coordinates
//! via Nominatim / OpenStreetMap. The [`Geocode`] trait is the seam the
//! widget talks through, so hosts can substitute another provider or a
//! stub without touching the search lifecycle.

pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

pub use nominatim::Nominatim;

/// A geocoding result with coordinates and the canonical address.
#[derive(Debug, Clone)]
pub struct GeocodedAddress {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves free-form address text to coordinates.
///
/// `Ok(None)` means the service answered and found no match; `Err` is
/// reserved for transport and protocol failures. No retries happen at
/// this layer.
#[async_trait]
pub trait Geocode: Send + Sync {
    /// Geocodes a single free-form query.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing
    /// fails.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;
}
