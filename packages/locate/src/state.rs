//! Observable state of the nearby search.
//!
//! Each variant is one step of the workflow. Data only exists in the steps
//! where it is meaningful, so combinations like "loading with an error" or
//! "failed with results" cannot be expressed.

use parking_spotter_camera_models::{GeoCoordinate, PhotoResult};
use thiserror::Error;

/// Why a nearby search failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The platform declined location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// No position fix could be obtained.
    #[error("{message}")]
    PositionUnavailable {
        /// Provider or timeout description, shown as is.
        message: String,
    },

    /// The position is outside the area the backend serves. The resolved
    /// coordinate is kept so it can be shown to the user.
    #[error(
        "This Feature of Parking Spotter Only Works in NYC. Check your location services or VPNs"
    )]
    OutOfServiceArea {
        /// The resolved position.
        coordinate: GeoCoordinate,
    },

    /// The backend request failed or answered with an unusable response.
    #[error("Failed to fetch photos: {message}")]
    NetworkError {
        /// Transport, status, or parse failure description.
        message: String,
    },
}

/// Discriminant of [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    PermissionDenied,
    PositionUnavailable,
    OutOfServiceArea,
    NetworkError,
}

impl std::fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::PermissionDenied => "PermissionDenied",
            Self::PositionUnavailable => "PositionUnavailable",
            Self::OutOfServiceArea => "OutOfServiceArea",
            Self::NetworkError => "NetworkError",
        })
    }
}

impl SearchError {
    #[must_use]
    pub const fn kind(&self) -> SearchErrorKind {
        match self {
            Self::PermissionDenied => SearchErrorKind::PermissionDenied,
            Self::PositionUnavailable { .. } => SearchErrorKind::PositionUnavailable,
            Self::OutOfServiceArea { .. } => SearchErrorKind::OutOfServiceArea,
            Self::NetworkError { .. } => SearchErrorKind::NetworkError,
        }
    }
}

/// One state of the nearby search state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// No search has been started.
    Idle,
    /// Waiting on the location permission prompt.
    RequestingPermission,
    /// Waiting on a position fix.
    AcquiringPosition,
    /// Checking the fix against the service area.
    ValidatingBounds {
        coordinate: GeoCoordinate,
    },
    /// Waiting on the backend.
    FetchingResults {
        coordinate: GeoCoordinate,
    },
    /// Terminal: the backend answered. `results` may be empty.
    Completed {
        coordinate: GeoCoordinate,
        results: Vec<PhotoResult>,
    },
    /// Terminal: a step failed.
    Failed(SearchError),
}

impl SearchState {
    /// Whether a step is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::RequestingPermission
                | Self::AcquiringPosition
                | Self::ValidatingBounds { .. }
                | Self::FetchingResults { .. }
        )
    }

    /// Whether no further transition happens without a new search.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed(_))
    }

    /// The resolved position, where the state has one.
    ///
    /// Of the failures, only [`SearchError::OutOfServiceArea`] keeps it.
    #[must_use]
    pub const fn coordinate(&self) -> Option<GeoCoordinate> {
        match self {
            Self::ValidatingBounds { coordinate }
            | Self::FetchingResults { coordinate }
            | Self::Completed { coordinate, .. }
            | Self::Failed(SearchError::OutOfServiceArea { coordinate }) => Some(*coordinate),
            _ => None,
        }
    }

    /// Results of a completed search, otherwise empty.
    #[must_use]
    pub fn results(&self) -> &[PhotoResult] {
        match self {
            Self::Completed { results, .. } => results,
            _ => &[],
        }
    }

    /// The failure, if the search failed.
    #[must_use]
    pub const fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Human-readable failure message, if the search failed.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}
