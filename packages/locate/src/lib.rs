#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nearby camera search driven by the device location.
//!
//! [`NearbySearch::run_search`] asks for location permission, acquires a
//! position fix, checks it against the NYC service area, and only then asks
//! the backend for the nearest cameras. Progress is observable through
//! [`NearbySearch::subscribe`].

pub mod bounds;
pub mod provider;
pub mod state;
pub mod workflow;

pub use bounds::{Bounds, NYC_BOUNDS};
pub use provider::{
    AlwaysGranted, FixedPosition, PermissionProvider, PermissionStatus, PositionError,
    PositionOptions, PositionProvider,
};
pub use state::{SearchError, SearchErrorKind, SearchState};
pub use workflow::{CameraBackend, NearbySearch, SearchSnapshot};
