#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Search criteria and the in-memory filter engine.
//!
//! A [`SearchCriteria`] holds up to three independent stages: a
//! great-circle radius around an anchor point, a case-insensitive
//! substring over company names, and an exact sector match. Stages
//! compose conjunctively; an absent stage excludes nothing. [`search`]
//! runs the stages over a dataset and returns borrowed matches in
//! dataset order.

use company_atlas_dataset::{CompanyRecord, Dataset};
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate, in meters.
    #[must_use]
    pub fn distance_meters(self, other: Self) -> f64 {
        Haversine.distance(
            Point::new(self.longitude, self.latitude),
            Point::new(other.longitude, other.latitude),
        )
    }
}

/// The spatial stage of a search: an anchor point and an inclusive
/// radius around it. The two only ever exist together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusFilter {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl RadiusFilter {
    #[must_use]
    pub const fn new(center: Coordinate, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Whether the record lies within the radius. A record exactly on
    /// the boundary counts as inside.
    #[must_use]
    pub fn contains(&self, record: &CompanyRecord) -> bool {
        let position = Coordinate::new(record.latitude, record.longitude);
        self.center.distance_meters(position) <= self.radius_meters
    }
}

/// Everything a single search asks for. Absent stages match every
/// record, so the default criteria return the whole dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Spatial stage; `None` when no anchor has been resolved.
    pub radius: Option<RadiusFilter>,
    /// Case-insensitive substring matched against the display name.
    pub name_contains: Option<String>,
    /// Exact, case-sensitive sector value.
    pub sector: Option<String>,
}

impl SearchCriteria {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            radius: None,
            name_contains: None,
            sector: None,
        }
    }

    /// True when no stage is active.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.radius.is_none() && self.name_contains.is_none() && self.sector.is_none()
    }
}

/// The records that passed every stage, borrowed from the dataset and
/// kept in dataset order.
#[derive(Debug, Clone)]
pub struct ResultSet<'a> {
    matches: Vec<&'a CompanyRecord>,
}

impl<'a> ResultSet<'a> {
    #[must_use]
    pub fn records(&self) -> &[&'a CompanyRecord] {
        &self.matches
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &'a CompanyRecord> + '_ {
        self.matches.iter().copied()
    }
}

impl<'s, 'a> IntoIterator for &'s ResultSet<'a> {
    type Item = &'a CompanyRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, &'a CompanyRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter().copied()
    }
}

/// Runs the criteria over the dataset, narrowing stage by stage.
///
/// Every search walks the full dataset again; results never feed back
/// into the next search, so repeating the same criteria always returns
/// the same records.
#[must_use]
pub fn search<'a>(dataset: &'a Dataset, criteria: &SearchCriteria) -> ResultSet<'a> {
    let mut matches: Vec<&CompanyRecord> = dataset.records().iter().collect();

    if criteria.is_unfiltered() {
        return ResultSet { matches };
    }

    if let Some(radius) = &criteria.radius {
        let before = matches.len();
        matches.retain(|record| radius.contains(record));
        log::debug!(
            "Radius stage ({}m) kept {} of {before} records",
            radius.radius_meters,
            matches.len()
        );
    }

    if let Some(needle) = &criteria.name_contains {
        let needle = needle.to_lowercase();
        let before = matches.len();
        matches.retain(|record| {
            record
                .name()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        });
        log::debug!(
            "Name stage ({needle:?}) kept {} of {before} records",
            matches.len()
        );
    }

    if let Some(sector) = &criteria.sector {
        let before = matches.len();
        matches.retain(|record| record.sector() == Some(sector.as_str()));
        log::debug!(
            "Sector stage ({sector:?}) kept {} of {before} records",
            matches.len()
        );
    }

    ResultSet { matches }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, sector: &str, latitude: f64, longitude: f64) -> CompanyRecord {
        let mut properties = serde_json::Map::new();
        properties.insert(
            "Company Name".to_string(),
            serde_json::Value::String(name.to_string()),
        );
        if !sector.is_empty() {
            properties.insert(
                "Sector".to_string(),
                serde_json::Value::String(sector.to_string()),
            );
        }
        CompanyRecord {
            latitude,
            longitude,
            properties,
        }
    }

    fn chicago_dataset() -> Dataset {
        Dataset::new(
            vec![
                // ~75m from the Chicago anchor.
                record("Acme Corp", "Energy", 41.8825, -87.6230),
                // ~1.1km out.
                record("ACME Industries", "Information Technology", 41.8920, -87.6235),
                // ~13km out.
                record("Beta Inc", "Energy", 42.0, -87.6232),
            ],
            0,
        )
    }

    const CHICAGO: Coordinate = Coordinate::new(41.881_832, -87.623_177);

    fn names<'a>(results: &ResultSet<'a>) -> Vec<&'a str> {
        results.iter().filter_map(CompanyRecord::name).collect()
    }

    #[test]
    fn haversine_distance_is_sane() {
        let berlin = Coordinate::new(52.52, 13.405);
        let paris = Coordinate::new(48.8566, 2.3522);
        let km = berlin.distance_meters(paris) / 1000.0;
        assert!((km - 878.0).abs() < 10.0, "got {km} km");
    }

    #[test]
    fn unfiltered_criteria_return_every_record() {
        let dataset = chicago_dataset();
        let results = search(&dataset, &SearchCriteria::new());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn radius_keeps_only_nearby_records() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, 805.0)),
            ..SearchCriteria::default()
        };
        assert_eq!(names(&search(&dataset, &criteria)), ["Acme Corp"]);
    }

    #[test]
    fn mile_radius_keeps_the_two_near_records() {
        // Two records sit within a mile of the anchor, the third is
        // ~13 km out.
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, 1610.0)),
            ..SearchCriteria::default()
        };
        let results = search(&dataset, &criteria);
        assert_eq!(results.len(), 2);
        assert_eq!(names(&results), ["Acme Corp", "ACME Industries"]);
    }

    #[test]
    fn anchorless_search_equals_the_non_spatial_subset() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            name_contains: Some("acme".to_string()),
            sector: Some("Energy".to_string()),
            ..SearchCriteria::default()
        };

        let by_hand: Vec<&str> = dataset
            .records()
            .iter()
            .filter(|record| {
                record
                    .name()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains("acme")
                    && record.sector() == Some("Energy")
            })
            .filter_map(CompanyRecord::name)
            .collect();

        assert_eq!(names(&search(&dataset, &criteria)), by_hand);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let dataset = chicago_dataset();
        let near = Coordinate::new(
            dataset.records()[0].latitude,
            dataset.records()[0].longitude,
        );
        let boundary = CHICAGO.distance_meters(near);

        let exactly_on = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, boundary)),
            ..SearchCriteria::default()
        };
        assert_eq!(names(&search(&dataset, &exactly_on)), ["Acme Corp"]);

        let just_inside = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, boundary - 1.0)),
            ..SearchCriteria::default()
        };
        assert!(search(&dataset, &just_inside).is_empty());
    }

    #[test]
    fn widening_the_radius_never_drops_a_match() {
        let dataset = chicago_dataset();
        let radii = [805.0, 1610.0, 8050.0, 16_100.0];
        let mut previous: Vec<&str> = Vec::new();
        for radius in radii {
            let criteria = SearchCriteria {
                radius: Some(RadiusFilter::new(CHICAGO, radius)),
                ..SearchCriteria::default()
            };
            let current = names(&search(&dataset, &criteria));
            assert!(
                previous.iter().all(|name| current.contains(name)),
                "radius {radius} lost a match from the smaller radius"
            );
            previous = current;
        }
        assert_eq!(previous.len(), 3);
    }

    #[test]
    fn repeating_a_search_returns_identical_results() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, 1610.0)),
            name_contains: Some("acme".to_string()),
            ..SearchCriteria::default()
        };
        let first = names(&search(&dataset, &criteria));
        let second = names(&search(&dataset, &criteria));
        assert_eq!(first, second);
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        let dataset = chicago_dataset();
        for needle in ["acme", "ACME", "Acme"] {
            let criteria = SearchCriteria {
                name_contains: Some(needle.to_string()),
                ..SearchCriteria::default()
            };
            assert_eq!(
                names(&search(&dataset, &criteria)),
                ["Acme Corp", "ACME Industries"],
                "needle {needle:?}"
            );
        }
    }

    #[test]
    fn records_without_a_name_never_match_a_needle() {
        let dataset = Dataset::new(vec![record("", "Energy", 41.9, -87.6)], 0);
        let criteria = SearchCriteria {
            name_contains: Some("acme".to_string()),
            ..SearchCriteria::default()
        };
        assert!(search(&dataset, &criteria).is_empty());
    }

    #[test]
    fn sector_matching_is_exact() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            sector: Some("Energy".to_string()),
            ..SearchCriteria::default()
        };
        assert_eq!(names(&search(&dataset, &criteria)), ["Acme Corp", "Beta Inc"]);

        let wrong_case = SearchCriteria {
            sector: Some("energy".to_string()),
            ..SearchCriteria::default()
        };
        assert!(search(&dataset, &wrong_case).is_empty());
    }

    #[test]
    fn stages_compose_conjunctively() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            radius: Some(RadiusFilter::new(CHICAGO, 16_100.0)),
            name_contains: Some("acme".to_string()),
            sector: Some("Energy".to_string()),
        };
        assert_eq!(names(&search(&dataset, &criteria)), ["Acme Corp"]);
    }

    #[test]
    fn results_preserve_dataset_order() {
        let dataset = chicago_dataset();
        let criteria = SearchCriteria {
            sector: Some("Energy".to_string()),
            ..SearchCriteria::default()
        };
        let results = search(&dataset, &criteria);
        assert_eq!(names(&results), ["Acme Corp", "Beta Inc"]);
    }
}
