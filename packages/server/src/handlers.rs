//! HTTP handler functions for the company atlas API.

use actix_web::{HttpResponse, web};
use company_atlas_filter::{self as filter, Coordinate, RadiusFilter, SearchCriteria};
use company_atlas_permalink::to_query;
use company_atlas_server_models::{
    ApiAnchor, ApiHealth, ApiMarker, ApiRow, ApiSearchResponse, SearchQueryParams,
};
use company_atlas_view::render;
use company_atlas_widget::{NO_MATCH_ALERT, SERVICE_UNAVAILABLE_ALERT};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/sectors`
///
/// Returns the distinct sector values present in the dataset, for the
/// sector filter dropdown.
pub async fn sectors(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.atlas.dataset().sectors())
}

/// `GET /api/search`
///
/// Runs one complete search: an optional geocoded address anchor plus
/// name and sector filters, rendered into markers, list rows, counter,
/// viewport, and permalink. Responds 404 when the address does not
/// geocode and 502 when the geocoding service cannot be reached; the
/// error body carries the user-facing alert text.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let options = state.atlas.options();

    let mut criteria = SearchCriteria {
        radius: None,
        name_contains: non_empty(params.name.as_deref()),
        sector: non_empty(params.sector.as_deref()),
    };

    let mut address = None;
    if let Some(query) = non_empty(params.address.as_deref()) {
        match state.geocoder.geocode(&query).await {
            Ok(Some(located)) => {
                criteria.radius = Some(RadiusFilter::new(
                    Coordinate::new(located.latitude, located.longitude),
                    options.effective_radius(params.radius),
                ));
                address = Some(query);
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": NO_MATCH_ALERT,
                }));
            }
            Err(e) => {
                log::error!("Geocoding failed for {query:?}: {e:?}");
                return HttpResponse::BadGateway().json(serde_json::json!({
                    "error": SERVICE_UNAVAILABLE_ALERT,
                }));
            }
        }
    }

    let results = filter::search(state.atlas.dataset(), &criteria);
    let view = render(&results, &criteria, options);

    HttpResponse::Ok().json(ApiSearchResponse {
        markers: view.markers.markers.iter().map(ApiMarker::from).collect(),
        rows: view.rows.iter().map(ApiRow::from).collect(),
        count: view.counter.count,
        label: view.counter.label,
        viewport: view.viewport.into(),
        anchor: view.anchor.map(ApiAnchor::from),
        clustered: view.markers.clustered,
        max_cluster_radius: view.markers.max_cluster_radius,
        permalink: to_query(address.as_deref(), &criteria),
    })
}

/// Treats missing, empty, and whitespace-only parameters as absent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
