//! Text rendering for command output.

use std::fmt::Write as _;

use parking_spotter_camera::address::display_address;
use parking_spotter_camera_models::{CameraLocationRecord, PhotoResult};
use parking_spotter_client::{BackendError, messages};
use parking_spotter_locate::{NYC_BOUNDS, SearchError, SearchState};

/// Spinner text for an in-progress state.
pub const fn progress_label(state: &SearchState) -> Option<&'static str> {
    match state {
        SearchState::RequestingPermission => Some("Requesting location permission"),
        SearchState::AcquiringPosition => Some("Finding your location"),
        SearchState::ValidatingBounds { .. } => Some("Checking service area"),
        SearchState::FetchingResults { .. } => Some("Fetching nearby cameras"),
        SearchState::Idle | SearchState::Completed { .. } | SearchState::Failed(_) => None,
    }
}

/// Result list of a completed nearby search, nearest camera first.
pub fn nearby_results(state: &SearchState) -> String {
    let results = state.results();
    let Some(coordinate) = state.coordinate() else {
        return "No search has completed.".to_string();
    };

    if results.is_empty() {
        return format!("No cameras found near {coordinate}.");
    }

    let mut out = format!("Cameras near {coordinate}:\n");
    for (i, photo) in results.iter().enumerate() {
        let _ = write!(
            out,
            "\n{:>2}. {}\n    {}",
            i + 1,
            display_address(&photo.address),
            photo.image_uri
        );
    }
    out
}

/// Direct search answer: the first image, or a placeholder.
pub fn direct_result(key: &str, photos: &[PhotoResult]) -> String {
    let image = photos
        .first()
        .map_or(messages::NO_IMAGE, |photo| photo.image_uri.as_str());
    format!("{}\n{image}", display_address(key))
}

pub fn camera_line(record: &CameraLocationRecord) -> String {
    let position = record
        .coordinate()
        .map_or_else(|| "no coordinates".to_string(), |c| c.to_string());
    format!(
        "{:<40} camera {:<8} {position}",
        display_address(&record.address_key),
        record.camera_id
    )
}

/// User-facing description of a command failure.
pub fn error_report(error: &(dyn std::error::Error + 'static)) -> String {
    if let Some(e) = error.downcast_ref::<BackendError>() {
        return e.user_message().to_string();
    }

    match error.downcast_ref::<SearchError>() {
        Some(e @ SearchError::OutOfServiceArea { coordinate }) => format!(
            "{e}\nYour location: {coordinate}\n\
             Hint: pass --lat/--lng between {} and {} latitude, {} and {} longitude.",
            NYC_BOUNDS.lat_min, NYC_BOUNDS.lat_max, NYC_BOUNDS.lng_min, NYC_BOUNDS.lng_max
        ),
        Some(e @ SearchError::PermissionDenied) => format!("{e}. {}", messages::LOCATION),
        Some(e) => e.to_string(),
        None => format!("Error: {error}"),
    }
}
