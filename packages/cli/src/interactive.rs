//! Interactive home menu.
//!
//! Mirrors the two screens of the mobile app: "Nearest Parking" runs the
//! nearby search for a position typed at the prompt, and "Direct Search"
//! narrows the camera table with autocomplete before fetching one image.

use std::num::NonZeroU32;

use dialoguer::{Input, Select};
use parking_spotter_camera::CameraTable;
use parking_spotter_camera::address::{SUGGESTION_LIMIT, sanitize_input, suggestions};
use parking_spotter_camera_models::GeoCoordinate;
use parking_spotter_cli_utils::{MenuItem, MultiProgress, select};
use parking_spotter_client::ClientConfig;

use crate::{commands, render};

/// Cameras requested by the nearest parking screen.
const NEAREST_COUNT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Empire State Building, used as the default typed position.
const DEFAULT_POSITION: GeoCoordinate = GeoCoordinate::new(40.7484, -73.9857);

enum HomeAction {
    NearestParking,
    DirectSearch,
    Quit,
}

impl MenuItem for HomeAction {
    const ALL: &'static [Self] = &[Self::NearestParking, Self::DirectSearch, Self::Quit];

    fn label(&self) -> &'static str {
        match self {
            Self::NearestParking => "Nearest Parking",
            Self::DirectSearch => "Direct Search",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the home menu until the user quits.
///
/// A failed search is reported and the menu is shown again.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub async fn run(
    table: &CameraTable,
    config: &ClientConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Parking Spotter");
    println!();

    loop {
        let result = match select::<HomeAction>("What would you like to do?")? {
            HomeAction::NearestParking => nearest_parking(config, multi).await,
            HomeAction::DirectSearch => direct_search(table, config, multi).await,
            HomeAction::Quit => return Ok(()),
        };

        if let Err(e) = result {
            eprintln!("{}", render::error_report(e.as_ref()));
        }
        println!();
    }
}

async fn nearest_parking(
    config: &ClientConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let lat: f64 = Input::new()
        .with_prompt("Latitude")
        .default(DEFAULT_POSITION.lat)
        .interact_text()?;
    let lng: f64 = Input::new()
        .with_prompt("Longitude")
        .default(DEFAULT_POSITION.lng)
        .interact_text()?;

    commands::nearby(config, GeoCoordinate::new(lat, lng), NEAREST_COUNT, multi).await
}

async fn direct_search(
    table: &CameraTable,
    config: &ClientConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let query: String = Input::new()
        .with_prompt("Address")
        .allow_empty(true)
        .interact_text()?;

    let matches = suggestions(&sanitize_input(&query), table, Some(SUGGESTION_LIMIT));
    if matches.is_empty() {
        println!("No matching camera addresses.");
        return Ok(());
    }

    let mut labels: Vec<&str> = matches.iter().map(|s| s.display.as_str()).collect();
    labels.push("Back");

    let idx = Select::new()
        .with_prompt("Select an address")
        .items(&labels)
        .default(0)
        .interact()?;

    let Some(choice) = matches.get(idx) else {
        return Ok(());
    };

    commands::search_key(config, choice.key, NonZeroU32::MIN, multi).await
}
