#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for inspecting and searching company map datasets.
//!
//! ```text
//! company_atlas_cli inspect data/companies.csv
//! company_atlas_cli search data/companies.csv --address "233 S Wacker Dr" --radius 1610
//! company_atlas_cli search data/companies.csv --name acme --sector Energy
//! ```
//!
//! `search` runs the same pipeline the widget runs in the browser:
//! geocode the address via Nominatim, filter by radius, name, and
//! sector, then print the counter label and the matching rows.

use clap::{Parser, Subcommand};
use company_atlas_dataset::{DatasetFormat, DatasetLoader};
use company_atlas_geocoder::Nominatim;
use company_atlas_sector_models::MarkerCategory;
use company_atlas_widget::{WidgetEvent, bootstrap, fetch_payload};
use company_atlas_widget_models::MapOptions;

#[derive(Parser)]
#[command(
    name = "company_atlas_cli",
    about = "Inspect and search company map datasets from the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a dataset: record counts and the sector taxonomy
    Inspect {
        /// Dataset file path or http(s) URL
        dataset: String,
        /// Dataset format: csv or geojson
        #[arg(long, default_value = "csv")]
        format: DatasetFormat,
    },
    /// Run a one-shot search against a dataset
    Search {
        /// Dataset file path or http(s) URL
        dataset: String,
        /// Dataset format: csv or geojson
        #[arg(long, default_value = "csv")]
        format: DatasetFormat,
        /// Address to anchor the search on (geocoded via Nominatim)
        #[arg(long)]
        address: Option<String>,
        /// Search radius in meters around the geocoded address
        #[arg(long)]
        radius: Option<f64>,
        /// Case-insensitive company name substring
        #[arg(long)]
        name: Option<String>,
        /// Exact sector value
        #[arg(long)]
        sector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .user_agent("company-atlas/0.1 (https://github.com/company-atlas/company-atlas)")
        .build()?;

    match cli.command {
        Commands::Inspect { dataset, format } => {
            let payload = fetch_payload(&client, &dataset).await?;
            let loaded = DatasetLoader::new(format).load(&payload)?;

            println!(
                "{} record(s) loaded from {dataset}, {} dropped for invalid coordinates",
                loaded.records().len(),
                loaded.dropped()
            );

            if !loaded.sectors().is_empty() {
                println!();
                println!("{:<34} {:<14} COLOR", "SECTOR", "CATEGORY");
                println!("{}", "-".repeat(60));

                for sector in loaded.sectors() {
                    let category = MarkerCategory::for_sector(sector);
                    let color = category.icon_color();
                    println!("{sector:<34} {category:<14} {color}");
                }
            }
        }
        Commands::Search {
            dataset,
            format,
            address,
            radius,
            name,
            sector,
        } => {
            let options = MapOptions {
                file_path: dataset,
                file_type: format,
                ..MapOptions::default()
            };
            let mut atlas = bootstrap(&client, options).await?;
            let geocoder = Nominatim::new(client);

            if let Some(name) = name {
                atlas.handle_event(WidgetEvent::NameChanged { name });
            }
            if sector.is_some() {
                atlas.handle_event(WidgetEvent::SectorChanged { sector });
            }

            let output = atlas
                .run_search(
                    &geocoder,
                    WidgetEvent::SubmitSearch {
                        address: address.unwrap_or_default(),
                        radius_meters: radius,
                    },
                )
                .await;

            if let Some(alert) = output.alert {
                eprintln!("{alert}");
                std::process::exit(1);
            }

            println!("{}", output.view.counter.label);

            if !output.view.rows.is_empty() {
                println!();
                println!(
                    "{:<36} {:<26} {:>10} {:>11}",
                    "NAME", "SECTOR", "LATITUDE", "LONGITUDE"
                );
                println!("{}", "-".repeat(86));

                for (marker, row) in output.view.markers.markers.iter().zip(&output.view.rows) {
                    let name = marker.name.unwrap_or("(unnamed)");
                    let sector = row.sector.unwrap_or("-");
                    println!(
                        "{name:<36} {sector:<26} {:>10.4} {:>11.4}",
                        marker.latitude, marker.longitude
                    );
                }
            }

            if let Some(anchor) = output.view.anchor {
                println!();
                println!(
                    "Anchored at {:.6}, {:.6} with a {} m radius (zoom {})",
                    anchor.center.latitude,
                    anchor.center.longitude,
                    anchor.radius_meters,
                    output.view.viewport.zoom
                );
            }

            if !output.permalink.is_empty() {
                println!();
                println!("Permalink: {}", output.permalink);
            }
        }
    }

    Ok(())
}
