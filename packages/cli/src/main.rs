#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for Parking Spotter.
//!
//! ```text
//! parking_spotter suggest <query> [--limit 10]
//! parking_spotter search <address> [--count 1]
//! parking_spotter nearby --lat <lat> --lng <lng> [--count 5]
//! parking_spotter local --lat <lat> --lng <lng> [--radius-km 2] [--limit 5]
//! parking_spotter cameras
//! ```
//!
//! Running `parking_spotter` with no subcommand opens the interactive home
//! menu. `--dataset` swaps the bundled camera table for a JSON file and
//! `--backend-url` overrides `BACKEND_URL`.

mod commands;
mod interactive;
mod render;

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use parking_spotter_camera::CameraTable;
use parking_spotter_camera::address::SUGGESTION_LIMIT;
use parking_spotter_camera::nearby::DEFAULT_RADIUS_KM;
use parking_spotter_camera_models::GeoCoordinate;
use parking_spotter_cli_utils::MultiProgress;
use parking_spotter_client::ClientConfig;

#[derive(Parser)]
#[command(
    name = "parking_spotter",
    about = "Find NYC traffic cameras by address or near a location"
)]
struct Cli {
    /// Camera dataset JSON file (defaults to the bundled NYC table)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Backend base URL (overrides `BACKEND_URL`)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest camera addresses matching a partial address
    Suggest {
        /// Partial address, e.g. "broadway"
        query: String,
        /// Maximum number of suggestions
        #[arg(long, default_value_t = SUGGESTION_LIMIT)]
        limit: usize,
    },
    /// Show the camera image for an address
    Search {
        /// Camera address key or partial address (first match is used)
        query: String,
        /// Number of cameras to request
        #[arg(long, default_value = "1")]
        count: NonZeroU32,
    },
    /// Ask the backend for the cameras nearest to a position
    Nearby {
        /// Latitude of the position
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the position
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Number of cameras to request
        #[arg(long, default_value = "5")]
        count: NonZeroU32,
    },
    /// List cameras near a position using only the local table
    Local {
        /// Latitude of the position
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the position
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in kilometers
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius_km: f64,
        /// Maximum number of cameras to list
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// List every known camera address
    Cameras,
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = parking_spotter_cli_utils::init_logger();
    let cli = Cli::parse();

    match run(cli, &multi).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {e:?}");
            eprintln!("{}", render::error_report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let table = match &cli.dataset {
        Some(path) => CameraTable::load(path)?,
        None => CameraTable::embedded(),
    };

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.backend_url {
        config = config.with_base_url(url)?;
    }
    log::debug!(
        "Using {:?} backend at {}",
        config.environment,
        config.base_url
    );

    let Some(command) = cli.command else {
        return interactive::run(&table, &config, multi).await;
    };

    match command {
        Commands::Suggest { query, limit } => commands::suggest(&table, &query, limit),
        Commands::Search { query, count } => {
            commands::search(&table, &config, &query, count, multi).await?;
        }
        Commands::Nearby { lat, lng, count } => {
            commands::nearby(&config, GeoCoordinate::new(lat, lng), count, multi).await?;
        }
        Commands::Local {
            lat,
            lng,
            radius_km,
            limit,
        } => commands::local(&table, GeoCoordinate::new(lat, lng), radius_km, limit),
        Commands::Cameras => commands::cameras(&table),
    }

    Ok(())
}
