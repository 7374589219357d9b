//! Command handlers shared by the subcommands and the interactive menu.

use std::num::NonZeroU32;
use std::sync::Arc;

use parking_spotter_camera::CameraTable;
use parking_spotter_camera::address::{self, sanitize_input};
use parking_spotter_camera::nearby::cameras_within;
use parking_spotter_camera_models::GeoCoordinate;
use parking_spotter_cli_utils::{MultiProgress, spinner};
use parking_spotter_client::{BackendClient, ClientConfig};
use parking_spotter_locate::{AlwaysGranted, FixedPosition, NearbySearch, SearchState};

use crate::render;

/// Picks the canonical key for `query`: the key itself when it is one,
/// otherwise the first autocomplete match.
pub fn resolve_address<'a>(table: &'a CameraTable, query: &str) -> Option<&'a str> {
    let query = sanitize_input(query);
    if let Some(record) = table.get(&query) {
        return Some(record.address_key.as_str());
    }
    address::suggest(&query, table, Some(1)).into_iter().next()
}

pub fn suggest(table: &CameraTable, query: &str, limit: usize) {
    let suggestions = address::suggestions(&sanitize_input(query), table, Some(limit));

    if suggestions.is_empty() {
        println!("No matching camera addresses.");
        return;
    }

    for suggestion in &suggestions {
        println!("{:<40} {}", suggestion.display, suggestion.key);
    }
}

/// Resolves `query` and shows the camera image for it.
///
/// # Errors
///
/// Returns an error if nothing matches `query` or the backend request
/// fails.
pub async fn search(
    table: &CameraTable,
    config: &ClientConfig,
    query: &str,
    count: NonZeroU32,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(key) = resolve_address(table, query) else {
        return Err(format!("No camera matches '{}'", sanitize_input(query)).into());
    };
    search_key(config, key, count, multi).await
}

/// Shows the camera image for a canonical address key.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn search_key(
    config: &ClientConfig,
    key: &str,
    count: NonZeroU32,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(config.clone())?;

    let bar = spinner(multi, &format!("Fetching camera at {}", address::display_address(key)));
    let photos = client.search_cameras(&[key.to_string()], count).await;
    bar.finish_and_clear();

    println!("{}", render::direct_result(key, &photos?));
    Ok(())
}

/// Runs the nearby search for a fixed position, showing each step on a
/// spinner.
///
/// # Errors
///
/// Returns the [`parking_spotter_locate::SearchError`] if the search
/// fails.
pub async fn nearby(
    config: &ClientConfig,
    position: GeoCoordinate,
    count: NonZeroU32,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(config.clone())?;
    let search = NearbySearch::new(
        Arc::new(AlwaysGranted),
        Arc::new(FixedPosition(position)),
        Arc::new(client),
    );
    let mut updates = search.subscribe();

    let bar = spinner(multi, "Starting search");
    let run = search.run_search(count);
    tokio::pin!(run);

    let state = loop {
        tokio::select! {
            state = &mut run => break state,
            Ok(()) = updates.changed() => {
                if let Some(label) = render::progress_label(&updates.borrow_and_update().state) {
                    bar.set_message(label);
                }
            }
        }
    };
    bar.finish_and_clear();

    match state {
        SearchState::Failed(error) => Err(error.into()),
        state => {
            println!("{}", render::nearby_results(&state));
            Ok(())
        }
    }
}

pub fn local(table: &CameraTable, origin: GeoCoordinate, radius_km: f64, limit: usize) {
    let found = cameras_within(table, origin, radius_km, Some(limit));

    if found.is_empty() {
        println!("No cameras within {radius_km} km of {origin}.");
        return;
    }

    for camera in &found {
        println!(
            "{:>6.2} km  {:<40} camera {}",
            camera.distance_km,
            address::display_address(&camera.record.address_key),
            camera.record.camera_id
        );
    }
}

pub fn cameras(table: &CameraTable) {
    for record in table.records() {
        println!("{}", render::camera_line(record));
    }
    println!("\n{} camera(s)", table.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CameraTable {
        CameraTable::from_json_str(
            r#"{
                "Broadway_42nd_St": { "camera_id": "1" },
                "Broadway_@_34th_St": { "camera_id": "2" },
                "5th_Ave_@_42nd_St": { "camera_id": "3" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_exact_key() {
        assert_eq!(
            resolve_address(&table(), "Broadway_@_34th_St"),
            Some("Broadway_@_34th_St")
        );
    }

    #[test]
    fn resolves_partial_query_to_first_match() {
        assert_eq!(resolve_address(&table(), "broadway"), Some("Broadway_42nd_St"));
        assert_eq!(resolve_address(&table(), "5th"), Some("5th_Ave_@_42nd_St"));
    }

    #[test]
    fn strips_markup_before_matching() {
        assert_eq!(resolve_address(&table(), "<34th>"), Some("Broadway_@_34th_St"));
    }

    #[test]
    fn query_whitespace_is_part_of_the_match() {
        let table = CameraTable::from_json_str(r#"{ "West_Broadway": { "camera_id": "9" } }"#)
            .unwrap();
        assert_eq!(resolve_address(&table, "broadway "), None);
        assert_eq!(resolve_address(&table, " broadway"), Some("West_Broadway"));
        assert_eq!(resolve_address(&table, "<broadway>"), Some("West_Broadway"));
    }

    #[test]
    fn unresolvable_query_is_none() {
        assert_eq!(resolve_address(&table(), "Queens Blvd"), None);
        assert_eq!(resolve_address(&table(), "   "), None);
    }
}
