//! Platform collaborators of the nearby search: location permission and
//! position fixes.
//!
//! The workflow only depends on these traits. A mobile shell would back
//! them with the OS permission dialog and GPS; the CLI uses
//! [`AlwaysGranted`] and [`FixedPosition`].

use std::time::Duration;

use async_trait::async_trait;
use parking_spotter_camera_models::GeoCoordinate;
use thiserror::Error;

/// Outcome of a location permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask the provider for its most accurate fix.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// Accept a cached fix no older than this.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(10),
        }
    }
}

/// Errors reported by a [`PositionProvider`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    /// No fix within the requested timeout.
    #[error("Location request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider could not produce a fix.
    #[error("{0}")]
    Unavailable(String),
}

/// Asks the platform for permission to read the device location.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;
}

/// Reads the device's current position.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if no fix can be obtained.
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoCoordinate, PositionError>;
}

/// Permission provider for platforms without a runtime permission prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

#[async_trait]
impl PermissionProvider for AlwaysGranted {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

/// Position provider that always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoCoordinate);

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoCoordinate, PositionError> {
        if self.0.lat.is_finite() && self.0.lng.is_finite() {
            Ok(self.0)
        } else {
            Err(PositionError::Unavailable(format!(
                "invalid coordinate {:?}",
                self.0
            )))
        }
    }
}
