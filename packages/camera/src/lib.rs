#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! NYC traffic camera reference data.
//!
//! Holds the static table of known camera addresses ([`table`]), the
//! autocomplete engine that matches partial queries against it
//! ([`address`]), and an offline haversine proximity lookup ([`nearby`]).
//!
//! The table is loaded once at start-up and never mutated, so it can be
//! shared by reference across any number of concurrent lookups.

pub mod address;
pub mod nearby;
pub mod table;

pub use table::CameraTable;

use thiserror::Error;

/// Errors from loading the camera reference dataset.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The dataset file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not a valid address-to-camera JSON object.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dataset contains an entry that cannot be used.
    #[error("Invalid camera record '{address_key}': {message}")]
    InvalidRecord {
        /// Address key of the offending entry.
        address_key: String,
        /// Description of what is wrong with it.
        message: String,
    },
}
