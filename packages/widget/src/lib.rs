#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The searchable map widget: one instance per map on a page.
//!
//! [`SearchableMap`] owns the loaded dataset, the current search
//! criteria, and a search generation counter. User actions come in as
//! [`WidgetEvent`]s; an event either completes immediately
//! ([`SearchDirective::Filtered`]) or asks the host to geocode first
//! ([`SearchDirective::NeedsGeocode`]). Geocode results are handed back
//! through [`SearchableMap::resolve_geocode`] with the generation they
//! belong to, so a slow response for an abandoned search can never
//! clobber a newer one.

use company_atlas_dataset::{Dataset, DatasetLoader, LoadError};
use company_atlas_filter::{Coordinate, RadiusFilter, SearchCriteria, search};
use company_atlas_geocoder::{Geocode, GeocodeError, GeocodedAddress};
use company_atlas_permalink::{parse_query, to_query};
use company_atlas_view::{ViewUpdate, render};
use company_atlas_widget_models::MapOptions;
use thiserror::Error;

/// Shown when the geocoder answered but found nothing.
pub const NO_MATCH_ALERT: &str =
    "We could not find your address. Please try a different search.";

/// Shown when the geocoder could not be reached at all.
pub const SERVICE_UNAVAILABLE_ALERT: &str =
    "Geocoding service is unavailable. Please try again later.";

/// Errors that can occur while setting up a widget.
///
/// Everything here is fatal to initialization; once a widget exists,
/// searches never fail (geocoding trouble surfaces as alerts instead).
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The dataset payload could not be parsed.
    #[error("Dataset load failed: {0}")]
    Load(#[from] LoadError),

    /// The dataset payload could not be fetched.
    #[error("Dataset fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The options file is not valid TOML.
    #[error("Options parse failed: {0}")]
    Options(#[from] toml::de::Error),
}

/// A user action on one of the widget's controls.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The search button: free-form address text plus an optional
    /// radius in meters.
    SubmitSearch {
        address: String,
        radius_meters: Option<f64>,
    },
    /// The name filter input changed.
    NameChanged { name: String },
    /// The sector dropdown changed; `None` is the all-sectors choice.
    SectorChanged { sector: Option<String> },
    /// The reset control: drop the anchor and every filter.
    FiltersCleared,
}

/// What the widget needs from its host after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchDirective {
    /// The criteria changed and filtering already ran; repaint via
    /// [`SearchableMap::current`].
    Filtered,
    /// An address needs to be resolved before filtering can run. Hand
    /// the outcome back through [`SearchableMap::resolve_geocode`] with
    /// this generation.
    NeedsGeocode { generation: u64, address: String },
}

/// The result of an address lookup, as the widget consumes it.
#[derive(Debug, Clone)]
pub enum GeocodeOutcome {
    /// The service answered with a location.
    Found(GeocodedAddress),
    /// The service answered and nothing matched.
    NoMatch,
    /// The service could not be reached or gave a malformed answer.
    Failed {
        /// Description of the failure, for the log.
        message: String,
    },
}

impl GeocodeOutcome {
    /// Folds a [`Geocode`] call result into an outcome.
    #[must_use]
    pub fn from_result(result: Result<Option<GeocodedAddress>, GeocodeError>) -> Self {
        match result {
            Ok(Some(located)) => Self::Found(located),
            Ok(None) => Self::NoMatch,
            Err(error) => Self::Failed {
                message: error.to_string(),
            },
        }
    }
}

/// How a handed-back geocode outcome was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeResolution {
    /// The outcome belonged to the current search and was applied;
    /// repaint via [`SearchableMap::current`], surfacing the alert if
    /// one is set.
    Applied { alert: Option<&'static str> },
    /// A newer search superseded this one; nothing changed.
    Stale,
}

/// Everything a host surface needs after a completed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutput<'a> {
    /// Markers, rows, counter, viewport, and anchor overlay.
    pub view: ViewUpdate<'a>,
    /// Query string mirroring the current search for the address bar.
    pub permalink: String,
    /// User-facing message, set when a geocode attempt went nowhere.
    pub alert: Option<&'static str>,
}

/// An address submission waiting on its geocode result.
#[derive(Debug, Clone)]
struct PendingSearch {
    address: String,
    radius_meters: f64,
}

/// One searchable map instance. Instances are independent; nothing here
/// is global.
#[derive(Debug)]
pub struct SearchableMap {
    options: MapOptions,
    dataset: Dataset,
    criteria: SearchCriteria,
    /// Address text backing the current anchor, for the permalink.
    address: Option<String>,
    pending: Option<PendingSearch>,
    /// Bumped on every event; geocode outcomes carry the generation
    /// they were issued for.
    generation: u64,
}

impl SearchableMap {
    /// Parses the dataset payload and builds a widget with empty
    /// criteria.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Load`] if the payload cannot be parsed;
    /// a widget with no dataset is useless, so this is fatal.
    pub fn initialize(options: MapOptions, payload: &str) -> Result<Self, WidgetError> {
        let loader = DatasetLoader::new(options.file_type)
            .with_csv_options(options.csv_options.clone());
        let dataset = loader.load(payload)?;
        log::info!(
            "Loaded {} records ({} dropped), {} sectors",
            dataset.len(),
            dataset.dropped(),
            dataset.sectors().len()
        );

        Ok(Self {
            options,
            dataset,
            criteria: SearchCriteria::new(),
            address: None,
            pending: None,
            generation: 0,
        })
    }

    #[must_use]
    pub const fn options(&self) -> &MapOptions {
        &self.options
    }

    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub const fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// The address text backing the current anchor, if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Runs the current criteria and renders the full view state.
    #[must_use]
    pub fn current(&self) -> SearchOutput<'_> {
        self.output(None)
    }

    /// Applies one user action.
    ///
    /// Every event starts a new search generation, so an outstanding
    /// geocode for an older action becomes stale the moment this runs.
    pub fn handle_event(&mut self, event: WidgetEvent) -> SearchDirective {
        self.generation += 1;
        self.pending = None;

        match event {
            WidgetEvent::SubmitSearch {
                address,
                radius_meters,
            } => {
                let address = address.trim().to_string();
                let radius_meters = self.options.effective_radius(radius_meters);
                if address.is_empty() {
                    self.criteria.radius = None;
                    self.address = None;
                    return SearchDirective::Filtered;
                }
                self.pending = Some(PendingSearch {
                    address: address.clone(),
                    radius_meters,
                });
                SearchDirective::NeedsGeocode {
                    generation: self.generation,
                    address,
                }
            }
            WidgetEvent::NameChanged { name } => {
                let name = name.trim();
                self.criteria.name_contains =
                    (!name.is_empty()).then(|| name.to_string());
                SearchDirective::Filtered
            }
            WidgetEvent::SectorChanged { sector } => {
                self.criteria.sector = sector.filter(|sector| !sector.trim().is_empty());
                SearchDirective::Filtered
            }
            WidgetEvent::FiltersCleared => {
                self.criteria = SearchCriteria::new();
                self.address = None;
                SearchDirective::Filtered
            }
        }
    }

    /// Hands a geocode outcome back to the widget.
    ///
    /// The outcome is applied only when `generation` is still current;
    /// otherwise nothing changes and [`GeocodeResolution::Stale`] is
    /// returned. Lookup failures keep the previous criteria (and any
    /// previous anchor) and surface an alert instead.
    pub fn resolve_geocode(
        &mut self,
        generation: u64,
        outcome: GeocodeOutcome,
    ) -> GeocodeResolution {
        if generation != self.generation {
            log::debug!(
                "Dropping geocode result for superseded generation {generation} (now {})",
                self.generation
            );
            return GeocodeResolution::Stale;
        }
        let Some(pending) = self.pending.take() else {
            return GeocodeResolution::Stale;
        };

        match outcome {
            GeocodeOutcome::Found(located) => {
                self.criteria.radius = Some(RadiusFilter::new(
                    Coordinate::new(located.latitude, located.longitude),
                    pending.radius_meters,
                ));
                self.address = Some(pending.address);
                GeocodeResolution::Applied { alert: None }
            }
            GeocodeOutcome::NoMatch => {
                log::warn!("No geocoding match for {:?}", pending.address);
                GeocodeResolution::Applied {
                    alert: Some(NO_MATCH_ALERT),
                }
            }
            GeocodeOutcome::Failed { message } => {
                log::error!("Geocoding {:?} failed: {message}", pending.address);
                GeocodeResolution::Applied {
                    alert: Some(SERVICE_UNAVAILABLE_ALERT),
                }
            }
        }
    }

    /// Seeds the widget from a shared-search query string (the URL
    /// read-on-load path) and runs the seeded search.
    pub fn restore(&mut self, query: &str) -> SearchDirective {
        let shared = parse_query(query);
        self.criteria.name_contains = shared.name;
        self.criteria.sector = shared.sector;

        let Some(address) = shared.address else {
            self.generation += 1;
            return SearchDirective::Filtered;
        };
        self.handle_event(WidgetEvent::SubmitSearch {
            address,
            radius_meters: shared.radius_meters,
        })
    }

    /// Drives one event end-to-end against a geocoder, returning the
    /// finished view state.
    pub async fn run_search(
        &mut self,
        geocoder: &dyn Geocode,
        event: WidgetEvent,
    ) -> SearchOutput<'_> {
        match self.handle_event(event) {
            SearchDirective::Filtered => self.current(),
            SearchDirective::NeedsGeocode {
                generation,
                address,
            } => {
                let outcome = GeocodeOutcome::from_result(geocoder.geocode(&address).await);
                match self.resolve_geocode(generation, outcome) {
                    GeocodeResolution::Applied { alert } => self.output(alert),
                    // Nothing else can bump the generation while the
                    // caller holds the exclusive borrow.
                    GeocodeResolution::Stale => self.current(),
                }
            }
        }
    }

    fn output(&self, alert: Option<&'static str>) -> SearchOutput<'_> {
        if self.options.debug {
            log::debug!("Search criteria: {:?}", self.criteria);
        }
        let results = search(&self.dataset, &self.criteria);
        let view = render(&results, &self.criteria, &self.options);
        SearchOutput {
            view,
            permalink: to_query(self.address.as_deref(), &self.criteria),
            alert,
        }
    }
}

/// Reads the dataset payload from an `http(s)` URL or a local path.
///
/// # Errors
///
/// Returns [`WidgetError`] if the request or the file read fails.
pub async fn fetch_payload(
    client: &reqwest::Client,
    location: &str,
) -> Result<String, WidgetError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let response = client.get(location).send().await?.error_for_status()?;
        Ok(response.text().await?)
    } else {
        Ok(tokio::fs::read_to_string(location).await?)
    }
}

/// Reads map options from a TOML file.
///
/// # Errors
///
/// Returns [`WidgetError`] if the file cannot be read or parsed.
pub async fn load_options(path: &str) -> Result<MapOptions, WidgetError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(MapOptions::from_toml(&raw)?)
}

/// Fetches the configured dataset and builds the widget in one step.
///
/// # Errors
///
/// Returns [`WidgetError`] if the fetch or the load fails.
pub async fn bootstrap(
    client: &reqwest::Client,
    options: MapOptions,
) -> Result<SearchableMap, WidgetError> {
    let payload = fetch_payload(client, &options.file_path).await?;
    SearchableMap::initialize(options, &payload)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    const PAYLOAD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-87.6230, 41.8825]},
                "properties": {"Company Name": "Acme Corp", "Sector": "Energy"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-87.6235, 41.8920]},
                "properties": {"Company Name": "ACME Industries", "Sector": "Information Technology"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-87.6232, 42.0]},
                "properties": {"Company Name": "Beta Inc", "Sector": "Energy"}
            }
        ]
    }"#;

    const WACKER: &str = "233 S Wacker Dr";

    fn options() -> MapOptions {
        MapOptions {
            file_type: company_atlas_dataset::DatasetFormat::Geojson,
            record_name: "company".to_string(),
            record_name_plural: "companies".to_string(),
            ..MapOptions::default()
        }
    }

    fn widget() -> SearchableMap {
        SearchableMap::initialize(options(), PAYLOAD).unwrap()
    }

    fn downtown() -> GeocodedAddress {
        GeocodedAddress {
            latitude: 41.881_832,
            longitude: -87.623_177,
            matched_address: Some("233, South Wacker Drive, Chicago".to_string()),
        }
    }

    struct StubGeocoder(Option<GeocodedAddress>);

    #[async_trait]
    impl Geocode for StubGeocoder {
        async fn geocode(
            &self,
            _query: &str,
        ) -> Result<Option<GeocodedAddress>, GeocodeError> {
            Ok(self.0.clone())
        }
    }

    struct DownGeocoder;

    #[async_trait]
    impl Geocode for DownGeocoder {
        async fn geocode(
            &self,
            _query: &str,
        ) -> Result<Option<GeocodedAddress>, GeocodeError> {
            Err(GeocodeError::RateLimited)
        }
    }

    #[test]
    fn initial_render_shows_the_whole_dataset() {
        let map = widget();
        let output = map.current();
        assert_eq!(output.view.counter.label, "3 companies found");
        assert_eq!(output.view.viewport.zoom, 9);
        assert!(output.view.anchor.is_none());
        assert_eq!(output.permalink, "");
        assert!(output.alert.is_none());
    }

    #[test]
    fn bad_payload_is_fatal() {
        let err = SearchableMap::initialize(options(), "not geojson").unwrap_err();
        assert!(matches!(err, WidgetError::Load(_)));
    }

    #[test]
    fn blank_address_submits_run_unanchored() {
        let mut map = widget();
        let directive = map.handle_event(WidgetEvent::SubmitSearch {
            address: "   ".to_string(),
            radius_meters: Some(1610.0),
        });
        assert_eq!(directive, SearchDirective::Filtered);
        assert!(map.criteria().radius.is_none());
    }

    #[test]
    fn submit_resolves_into_an_anchored_search() {
        let mut map = widget();
        let directive = map.handle_event(WidgetEvent::SubmitSearch {
            address: WACKER.to_string(),
            radius_meters: None,
        });
        let SearchDirective::NeedsGeocode {
            generation,
            address,
        } = directive
        else {
            panic!("expected a geocode directive");
        };
        assert_eq!(generation, 1);
        assert_eq!(address, WACKER);

        let resolution = map.resolve_geocode(generation, GeocodeOutcome::Found(downtown()));
        assert_eq!(resolution, GeocodeResolution::Applied { alert: None });

        let output = map.current();
        assert_eq!(output.view.counter.label, "1 company found");
        assert_eq!(output.view.viewport.zoom, 15);
        assert_eq!(output.permalink, "address=233%20S%20Wacker%20Dr&radius=805");
        let overlay = output.view.anchor.unwrap();
        assert!((overlay.radius_meters - 805.0).abs() < f64::EPSILON);
    }

    #[test]
    fn requested_radius_overrides_the_default() {
        let mut map = widget();
        let SearchDirective::NeedsGeocode { generation, .. } =
            map.handle_event(WidgetEvent::SubmitSearch {
                address: WACKER.to_string(),
                radius_meters: Some(16_100.0),
            })
        else {
            panic!("expected a geocode directive");
        };
        map.resolve_geocode(generation, GeocodeOutcome::Found(downtown()));

        let output = map.current();
        assert_eq!(output.view.counter.count, 3);
        assert_eq!(output.view.viewport.zoom, 11);
    }

    #[test]
    fn stale_geocode_results_change_nothing() {
        let mut map = widget();
        let SearchDirective::NeedsGeocode {
            generation: first, ..
        } = map.handle_event(WidgetEvent::SubmitSearch {
            address: "old address".to_string(),
            radius_meters: None,
        })
        else {
            panic!("expected a geocode directive");
        };
        let SearchDirective::NeedsGeocode {
            generation: second, ..
        } = map.handle_event(WidgetEvent::SubmitSearch {
            address: WACKER.to_string(),
            radius_meters: None,
        })
        else {
            panic!("expected a geocode directive");
        };

        assert_eq!(
            map.resolve_geocode(first, GeocodeOutcome::Found(downtown())),
            GeocodeResolution::Stale
        );
        assert!(map.criteria().radius.is_none(), "stale result applied");

        assert_eq!(
            map.resolve_geocode(second, GeocodeOutcome::Found(downtown())),
            GeocodeResolution::Applied { alert: None }
        );
        assert_eq!(map.address(), Some(WACKER));
    }

    #[test]
    fn failed_geocodes_keep_the_previous_anchor() {
        let mut map = widget();
        let SearchDirective::NeedsGeocode { generation, .. } =
            map.handle_event(WidgetEvent::SubmitSearch {
                address: WACKER.to_string(),
                radius_meters: None,
            })
        else {
            panic!("expected a geocode directive");
        };
        map.resolve_geocode(generation, GeocodeOutcome::Found(downtown()));
        let anchored = map.criteria().radius;

        let SearchDirective::NeedsGeocode { generation, .. } =
            map.handle_event(WidgetEvent::SubmitSearch {
                address: "nowhere at all".to_string(),
                radius_meters: None,
            })
        else {
            panic!("expected a geocode directive");
        };
        let resolution = map.resolve_geocode(generation, GeocodeOutcome::NoMatch);
        assert_eq!(
            resolution,
            GeocodeResolution::Applied {
                alert: Some(NO_MATCH_ALERT)
            }
        );
        assert_eq!(map.criteria().radius, anchored);
        assert_eq!(map.address(), Some(WACKER));
    }

    #[test]
    fn name_and_sector_events_filter_immediately() {
        let mut map = widget();
        assert_eq!(
            map.handle_event(WidgetEvent::NameChanged {
                name: "  acme ".to_string()
            }),
            SearchDirective::Filtered
        );
        assert_eq!(map.current().view.counter.count, 2);

        map.handle_event(WidgetEvent::SectorChanged {
            sector: Some("Energy".to_string()),
        });
        assert_eq!(map.current().view.counter.label, "1 company found");

        map.handle_event(WidgetEvent::SectorChanged { sector: None });
        assert_eq!(map.current().view.counter.count, 2);

        map.handle_event(WidgetEvent::FiltersCleared);
        assert_eq!(map.current().view.counter.count, 3);
        assert_eq!(map.current().permalink, "");
    }

    #[test]
    fn restore_reproduces_a_shared_search() {
        let mut map = widget();
        let directive =
            map.restore("address=233%20S%20Wacker%20Dr&radius=1610&name=acme&sector=Energy");
        let SearchDirective::NeedsGeocode {
            generation,
            address,
        } = directive
        else {
            panic!("expected a geocode directive");
        };
        assert_eq!(address, WACKER);

        map.resolve_geocode(generation, GeocodeOutcome::Found(downtown()));
        let criteria = map.criteria();
        assert_eq!(criteria.name_contains.as_deref(), Some("acme"));
        assert_eq!(criteria.sector.as_deref(), Some("Energy"));
        let radius = criteria.radius.unwrap();
        assert!((radius.radius_meters - 1610.0).abs() < f64::EPSILON);

        // The permalink written back matches what was restored.
        assert_eq!(
            map.current().permalink,
            "address=233%20S%20Wacker%20Dr&radius=1610&name=acme&sector=Energy"
        );
    }

    #[test]
    fn restore_without_an_address_filters_directly() {
        let mut map = widget();
        assert_eq!(map.restore("name=beta"), SearchDirective::Filtered);
        assert_eq!(map.current().view.counter.count, 1);
    }

    #[tokio::test]
    async fn run_search_drives_the_two_phase_protocol() {
        let mut map = widget();
        let geocoder = StubGeocoder(Some(downtown()));
        let output = map
            .run_search(
                &geocoder,
                WidgetEvent::SubmitSearch {
                    address: WACKER.to_string(),
                    radius_meters: None,
                },
            )
            .await;
        assert_eq!(output.view.counter.count, 1);
        assert!(output.alert.is_none());
    }

    #[tokio::test]
    async fn run_search_surfaces_no_match_alerts() {
        let mut map = widget();
        let geocoder = StubGeocoder(None);
        let output = map
            .run_search(
                &geocoder,
                WidgetEvent::SubmitSearch {
                    address: "nowhere at all".to_string(),
                    radius_meters: None,
                },
            )
            .await;
        assert_eq!(output.alert, Some(NO_MATCH_ALERT));
        assert_eq!(output.view.counter.count, 3, "criteria must be untouched");
    }

    #[tokio::test]
    async fn run_search_surfaces_outage_alerts() {
        let mut map = widget();
        let output = map
            .run_search(
                &DownGeocoder,
                WidgetEvent::SubmitSearch {
                    address: WACKER.to_string(),
                    radius_meters: None,
                },
            )
            .await;
        assert_eq!(output.alert, Some(SERVICE_UNAVAILABLE_ALERT));
    }
}
