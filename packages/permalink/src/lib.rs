#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! URL query codec for shareable searches.
//!
//! A search is mirrored into four query parameters: `address`,
//! `radius`, `name`, and `sector`. The anchor coordinate itself is
//! never written; reloading a permalink re-geocodes the address, so the
//! URL stays human-readable and survives dataset updates.

use company_atlas_filter::SearchCriteria;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped in query parameter values. The RFC 3986
/// unreserved set stays literal so radii like `805.5` read naturally.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The search state carried by a permalink.
///
/// Only what the user typed is kept. The radius travels without its
/// center; the consumer geocodes `address` again to rebuild the anchor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharedSearch {
    pub address: Option<String>,
    pub radius_meters: Option<f64>,
    pub name: Option<String>,
    pub sector: Option<String>,
}

/// Encodes the current search into a query string, e.g.
/// `address=123%20Main%20St&radius=1610&sector=Energy`.
///
/// Absent stages write no parameter at all; an empty criteria with no
/// address yields an empty string.
#[must_use]
pub fn to_query(address: Option<&str>, criteria: &SearchCriteria) -> String {
    let mut parameters: Vec<String> = Vec::new();

    if let Some(address) = address {
        if !address.is_empty() {
            parameters.push(format!("address={}", encode(address)));
        }
    }
    if let Some(radius) = &criteria.radius {
        parameters.push(format!("radius={}", format_radius(radius.radius_meters)));
    }
    if let Some(name) = &criteria.name_contains {
        if !name.is_empty() {
            parameters.push(format!("name={}", encode(name)));
        }
    }
    if let Some(sector) = &criteria.sector {
        if !sector.is_empty() {
            parameters.push(format!("sector={}", encode(sector)));
        }
    }

    parameters.join("&")
}

/// Decodes a query string back into a [`SharedSearch`].
///
/// Total: unknown parameters are ignored, malformed pairs are skipped,
/// and an unparseable radius is treated as absent so the consumer can
/// fall back to its configured default.
#[must_use]
pub fn parse_query(query: &str) -> SharedSearch {
    let mut shared = SharedSearch::default();

    for pair in query.trim_start_matches('?').split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = decode(value);
        if value.is_empty() {
            continue;
        }
        match decode(key).as_str() {
            "address" => shared.address = Some(value),
            "radius" => shared.radius_meters = value.parse().ok(),
            "name" => shared.name = Some(value),
            "sector" => shared.sector = Some(value),
            _ => {}
        }
    }

    shared
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Whole-meter radii print without a trailing `.0`.
fn format_radius(radius_meters: f64) -> String {
    if radius_meters.fract() == 0.0 {
        format!("{radius_meters:.0}")
    } else {
        radius_meters.to_string()
    }
}

#[cfg(test)]
mod tests {
    use company_atlas_filter::{Coordinate, RadiusFilter};

    use super::*;

    #[test]
    fn empty_search_writes_nothing() {
        assert_eq!(to_query(None, &SearchCriteria::new()), "");
    }

    #[test]
    fn address_and_radius_are_written_together() {
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(Coordinate::new(41.88, -87.62), 1610.0)),
            ..SearchCriteria::default()
        };
        assert_eq!(
            to_query(Some("123 Main St, Chicago, IL"), &criteria),
            "address=123%20Main%20St%2C%20Chicago%2C%20IL&radius=1610"
        );
    }

    #[test]
    fn name_and_sector_parameters_round_trip() {
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(Coordinate::new(41.88, -87.62), 805.0)),
            name_contains: Some("acme".to_string()),
            sector: Some("Real Estate".to_string()),
        };
        let query = to_query(Some("233 S Wacker Dr"), &criteria);
        let shared = parse_query(&query);

        assert_eq!(shared.address.as_deref(), Some("233 S Wacker Dr"));
        assert_eq!(shared.radius_meters, Some(805.0));
        assert_eq!(shared.name.as_deref(), Some("acme"));
        assert_eq!(shared.sector.as_deref(), Some("Real Estate"));
    }

    #[test]
    fn fractional_radius_survives() {
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(Coordinate::new(0.0, 1.0), 805.5)),
            ..SearchCriteria::default()
        };
        let query = to_query(None, &criteria);
        assert_eq!(query, "radius=805.5");
        assert_eq!(parse_query(&query).radius_meters, Some(805.5));
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let shared = parse_query("zoom=12&address=Chicago&utm_source=mail");
        assert_eq!(shared.address.as_deref(), Some("Chicago"));
        assert_eq!(shared.radius_meters, None);
        assert_eq!(shared.name, None);
    }

    #[test]
    fn malformed_input_is_tolerated() {
        let shared = parse_query("?radius=eight-hundred&name&sector=");
        assert_eq!(shared.radius_meters, None);
        assert_eq!(shared.name, None);
        assert_eq!(shared.sector, None);
    }

    #[test]
    fn leading_question_mark_is_accepted() {
        let shared = parse_query("?address=Chicago&radius=805");
        assert_eq!(shared.address.as_deref(), Some("Chicago"));
        assert_eq!(shared.radius_meters, Some(805.0));
    }
}
