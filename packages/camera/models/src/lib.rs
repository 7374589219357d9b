#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Camera location, coordinate, and photo result types.
//!
//! These types are shared between the reference camera table, the backend
//! client, and the nearby-search workflow. The `Api*` types mirror the
//! backend's JSON contract and are kept separate from the domain types so
//! the two can evolve independently.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Separator used between words of a canonical address key
/// (e.g. `"Broadway_42nd_St"`).
pub const ADDRESS_SEPARATOR: char = '_';

/// One camera from the static reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraLocationRecord {
    /// Canonical, separator-delimited address key. This is both the key of
    /// the reference table and the value sent back to the backend.
    pub address_key: String,
    /// Backend camera identifier. Empty when the dataset omits it.
    pub camera_id: String,
    /// Camera latitude, when known.
    pub latitude: Option<f64>,
    /// Camera longitude, when known.
    pub longitude: Option<f64>,
}

impl CameraLocationRecord {
    /// Returns the camera position when both coordinates are present.
    #[must_use]
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoCoordinate { lat, lng }),
            _ => None,
        }
    }
}

/// A WGS84 position as reported by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoCoordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat {:.5}, Lng {:.5}", self.lat, self.lng)
    }
}

/// A camera image returned for a search.
///
/// Ordering of a result list is meaningful: index 0 is the nearest or
/// primary match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResult {
    /// Canonical address key of the camera.
    pub address: String,
    /// URI of the captured image.
    pub image_uri: String,
}

impl From<ApiCameraImage> for PhotoResult {
    fn from(image: ApiCameraImage) -> Self {
        Self {
            address: image.address,
            image_uri: image.url,
        }
    }
}

/// Request body for the nearest-cameras endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestCamerasRequest {
    /// Latitude of the caller.
    pub lat: f64,
    /// Longitude of the caller.
    pub lng: f64,
    /// Number of cameras wanted.
    pub num_cams: NonZeroU32,
}

/// Request body for the address-based camera search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCamerasRequest {
    /// Canonical address keys to look up.
    pub addresses: Vec<String>,
    /// Number of cameras wanted.
    pub num_cams: NonZeroU32,
}

/// A single image entry in a backend response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCameraImage {
    /// Canonical address key of the camera.
    pub address: String,
    /// Public URL of the captured image.
    pub url: String,
}

/// Successful response body shared by both camera endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesResponse {
    /// Images in backend order. May be missing or `null`.
    #[serde(default)]
    pub images: Option<Vec<ApiCameraImage>>,
}

impl ImagesResponse {
    /// Converts the response into photo results, preserving order.
    ///
    /// A missing or `null` image list yields no results.
    #[must_use]
    pub fn into_photos(self) -> Vec<PhotoResult> {
        self.images
            .unwrap_or_default()
            .into_iter()
            .map(PhotoResult::from)
            .collect()
    }
}

/// Error body returned by the backend alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Backend-provided description of the failure.
    pub error: String,
}
