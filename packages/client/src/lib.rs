#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the Parking Spotter camera backend.
//!
//! The backend exposes two `POST` endpoints that both answer with
//! `{ "images": [ { "address", "url" } ] }`:
//!
//! - **nearest cameras** (`/fiveNearest`): `{ lat, lng, numCams }`
//! - **address search** (`/search_cameras`): `{ addresses, numCams }`
//!
//! Each call is a single request. Nothing is retried; non-2xx statuses and
//! malformed bodies are reported as [`BackendError`]. An empty or missing
//! `images` list is a valid, empty answer.

pub mod config;
pub mod messages;

use std::num::NonZeroU32;

use parking_spotter_camera_models::{
    ApiErrorBody, GeoCoordinate, ImagesResponse, NearestCamerasRequest, PhotoResult,
    SearchCamerasRequest,
};
use serde::Serialize;
use thiserror::Error;

pub use config::{ClientConfig, ConfigError, Environment};

/// Maximum number of addresses the search endpoint accepts per request.
pub const MAX_SEARCH_ADDRESSES: usize = 5;

/// Maximum length of a response body included in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Errors from backend requests.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Backend-provided error description, if any.
        message: Option<String>,
    },

    /// The success body was not the expected JSON shape.
    #[error("Malformed backend response: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// An address search was attempted with no addresses.
    #[error("No addresses provided")]
    NoAddresses,

    /// An address search exceeded [`MAX_SEARCH_ADDRESSES`].
    #[error("Too many addresses: {count} (at most 5 per search)")]
    TooManyAddresses {
        /// Number of addresses requested.
        count: usize,
    },
}

impl BackendError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => messages::TIMEOUT,
            Self::Http(_) => messages::NETWORK,
            Self::Status { .. } | Self::Parse { .. } => messages::SERVER,
            Self::NoAddresses => "Select an address to search for.",
            Self::TooManyAddresses { .. } => "Search for at most five addresses at a time.",
        }
    }
}

/// Client for the camera backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl BackendClient {
    /// Builds a client applying the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the HTTP client cannot be built
    /// (e.g. TLS backend initialization fails).
    pub fn new(config: ClientConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Requests the `num_cams` cameras nearest to `coordinate`.
    ///
    /// Results keep the backend's order; index 0 is the nearest camera.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, non-success status, or
    /// a malformed body.
    pub async fn nearest_cameras(
        &self,
        coordinate: GeoCoordinate,
        num_cams: NonZeroU32,
    ) -> Result<Vec<PhotoResult>, BackendError> {
        let body = NearestCamerasRequest {
            lat: coordinate.lat,
            lng: coordinate.lng,
            num_cams,
        };
        self.post_images(&self.config.nearest_url(), &body).await
    }

    /// Requests camera images for canonical address keys.
    ///
    /// An empty result means the backend had no image for the addresses.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NoAddresses`] or
    /// [`BackendError::TooManyAddresses`] without sending anything when the
    /// address count is out of range, otherwise the same errors as
    /// [`Self::nearest_cameras`].
    pub async fn search_cameras(
        &self,
        addresses: &[String],
        num_cams: NonZeroU32,
    ) -> Result<Vec<PhotoResult>, BackendError> {
        if addresses.is_empty() {
            return Err(BackendError::NoAddresses);
        }
        if addresses.len() > MAX_SEARCH_ADDRESSES {
            return Err(BackendError::TooManyAddresses {
                count: addresses.len(),
            });
        }

        let body = SearchCamerasRequest {
            addresses: addresses.to_vec(),
            num_cams,
        };
        self.post_images(&self.config.search_url(), &body).await
    }

    async fn post_images<T: Serialize + Sync>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Vec<PhotoResult>, BackendError> {
        log::debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            log::warn!("POST {url} returned {status}");
            return Err(BackendError::Status {
                status,
                message: parse_error_message(&text),
            });
        }

        let photos = parse_images(&text)?;
        log::debug!("POST {url} returned {} images", photos.len());
        Ok(photos)
    }
}

/// Parses a success body into photo results, preserving order.
fn parse_images(text: &str) -> Result<Vec<PhotoResult>, BackendError> {
    serde_json::from_str::<ImagesResponse>(text)
        .map(ImagesResponse::into_photos)
        .map_err(|e| BackendError::Parse {
            message: format!("{e} (body: {})", preview(text)),
        })
}

/// Extracts a description from an error body.
///
/// Uses the backend's `{ "error": "..." }` shape when present, otherwise a
/// preview of the raw body.
fn parse_error_message(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<ApiErrorBody>(text)
            .map_or_else(|_| preview(text), |body| body.error),
    )
}

fn preview(text: &str) -> String {
    if text.len() > BODY_PREVIEW_LEN {
        let end = text
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= BODY_PREVIEW_LEN)
            .last()
            .unwrap_or(0);
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}
