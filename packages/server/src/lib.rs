#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the company atlas search widget.
//!
//! Serves the REST API the frontend widget talks to: one-shot searches
//! (an optional geocoded address anchor plus name and sector filters,
//! rendered into markers, list rows, counter label, and viewport), the
//! sector list for the filter dropdown, and a health check. Also serves
//! the widget bundle from `app/dist` and raw dataset files from `data/`
//! so relative `file_path` options resolve against the same host.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use company_atlas_geocoder::{Geocode, Nominatim};
use company_atlas_widget::{SearchableMap, bootstrap, load_options};

/// Map options file read at startup, overridable via `ATLAS_OPTIONS`.
pub const DEFAULT_OPTIONS_PATH: &str = "atlas.toml";

/// Shared application state.
///
/// Searches are stateless per request: every request carries its full
/// criteria in the query string, so the only shared state is the loaded
/// dataset and the geocoding backend.
pub struct AppState {
    /// Loaded dataset plus the map options it was configured with.
    pub atlas: Arc<SearchableMap>,
    /// Geocoding backend for address-anchored searches.
    pub geocoder: Arc<dyn Geocode>,
}

/// Starts the company atlas API server.
///
/// Reads the map options file, fetches and parses the dataset it points
/// at, and starts the Actix-Web HTTP server. This is a regular async
/// function; the caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the options file cannot be read, the HTTP client cannot be
/// built, or the dataset the options point at cannot be fetched and
/// parsed.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let options_path =
        std::env::var("ATLAS_OPTIONS").unwrap_or_else(|_| DEFAULT_OPTIONS_PATH.to_string());
    log::info!("Reading map options from {options_path}...");
    let options = load_options(&options_path)
        .await
        .expect("Failed to read map options");

    let client = reqwest::Client::builder()
        .user_agent("company-atlas/0.1 (https://github.com/company-atlas/company-atlas)")
        .build()
        .expect("Failed to build HTTP client");

    log::info!("Loading dataset from {}...", options.file_path);
    let atlas = bootstrap(&client, options)
        .await
        .expect("Failed to load dataset");

    let state = web::Data::new(AppState {
        atlas: Arc::new(atlas),
        geocoder: Arc::new(Nominatim::new(client)),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/search", web::get().to(handlers::search))
                    .route("/sectors", web::get().to(handlers::sectors)),
            )
            // Serve dataset files referenced by relative file_path options
            .service(Files::new("/data", "data").show_files_listing())
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
