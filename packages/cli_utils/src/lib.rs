#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for Parking Spotter.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so log
//! lines and spinners never fight for the terminal. [`spinner`] creates the
//! spinner shown while a request is in flight, and [`select`] presents a
//! [`MenuItem`] enum as a `dialoguer` menu.

use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An enum that can be offered as a menu.
pub trait MenuItem: Sized + 'static {
    /// Every entry, in menu order.
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
}

/// Shows a menu of every `T` and returns the chosen entry.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn select<T: MenuItem>(prompt: &str) -> dialoguer::Result<&'static T> {
    let labels: Vec<&str> = T::ALL.iter().map(MenuItem::label).collect();

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(&T::ALL[idx])
}

/// Adds a ticking spinner with `message` to `multi`.
///
/// Call [`ProgressBar::finish_and_clear`] once the work is done.
#[must_use]
pub fn spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Filter used when `RUST_LOG` is unset: warnings from this workspace only.
pub const DEFAULT_LOG_FILTER: &str = "parking_spotter=warn";

/// Initializes the global `pretty_env_logger` logger wrapped in
/// `indicatif-log-bridge`.
///
/// `RUST_LOG` selects the filter, falling back to [`DEFAULT_LOG_FILTER`].
/// Returns the [`MultiProgress`] that spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let filter = log_filter(std::env::var("RUST_LOG").ok());
    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(&filter)
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_err()
    {
        log::debug!("Logger already installed, keeping it");
    }
    log::set_max_level(level);

    multi
}

fn log_filter(env: Option<String>) -> String {
    env.filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}
