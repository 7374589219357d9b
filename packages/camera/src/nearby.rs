//! Offline proximity lookup over the reference table.
//!
//! Uses great-circle (haversine) distance between the caller and every
//! camera with known coordinates. This mirrors the backend's own radius
//! filter and lets the CLI preview which cameras a nearby search would
//! consider without a network round trip.

use geo::{Distance, Haversine, Point};
use parking_spotter_camera_models::{CameraLocationRecord, GeoCoordinate};

use crate::CameraTable;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 2.0;

/// A camera within the search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyCamera<'a> {
    /// The matching camera.
    pub record: &'a CameraLocationRecord,
    /// Distance from the query point in kilometers.
    pub distance_km: f64,
}

/// Great-circle distance between two coordinates in kilometers.
#[must_use]
pub fn distance_km(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    // geo points are (x = longitude, y = latitude)
    let a = Point::new(a.lng, a.lat);
    let b = Point::new(b.lng, b.lat);
    Haversine.distance(a, b) / 1000.0
}

/// Returns cameras within `radius_km` of `origin`, nearest first.
///
/// Cameras without coordinates are skipped. Ties keep dataset order. At
/// most `limit` cameras are returned when a limit is given.
#[must_use]
pub fn cameras_within(
    table: &CameraTable,
    origin: GeoCoordinate,
    radius_km: f64,
    limit: Option<usize>,
) -> Vec<NearbyCamera<'_>> {
    let mut found: Vec<NearbyCamera<'_>> = table
        .records()
        .filter_map(|record| {
            let position = record.coordinate()?;
            let distance = distance_km(origin, position);
            (distance <= radius_km).then_some(NearbyCamera {
                record,
                distance_km: distance,
            })
        })
        .collect();

    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    if let Some(limit) = limit {
        found.truncate(limit);
    }

    log::debug!(
        "{} cameras within {radius_km} km of {origin}",
        found.len()
    );

    found
}
