//! The nearby search: permission, position, service-area check, backend
//! fetch.
//!
//! A [`NearbySearch`] publishes every transition on a
//! [`tokio::sync::watch`] channel. Each run is stamped with a generation;
//! starting a new run bumps the generation, and any later update from an
//! older run is dropped, so a slow superseded request can never overwrite
//! the newer run's state.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use parking_spotter_camera_models::{GeoCoordinate, PhotoResult};
use parking_spotter_client::{BackendClient, BackendError};
use tokio::sync::watch;

use crate::bounds::{Bounds, NYC_BOUNDS};
use crate::provider::{
    PermissionProvider, PermissionStatus, PositionError, PositionOptions, PositionProvider,
};
use crate::state::{SearchError, SearchState};

/// Source of nearest-camera results.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Returns up to `num_cams` cameras nearest to `coordinate`, nearest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    async fn nearest_cameras(
        &self,
        coordinate: GeoCoordinate,
        num_cams: NonZeroU32,
    ) -> Result<Vec<PhotoResult>, BackendError>;
}

#[async_trait]
impl CameraBackend for BackendClient {
    async fn nearest_cameras(
        &self,
        coordinate: GeoCoordinate,
        num_cams: NonZeroU32,
    ) -> Result<Vec<PhotoResult>, BackendError> {
        Self::nearest_cameras(self, coordinate, num_cams).await
    }
}

/// A state tagged with the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    /// Number of runs started so far; 0 before the first run.
    pub generation: u64,
    pub state: SearchState,
}

/// Runs nearby searches and publishes their progress.
pub struct NearbySearch {
    permission: Arc<dyn PermissionProvider>,
    position: Arc<dyn PositionProvider>,
    backend: Arc<dyn CameraBackend>,
    options: PositionOptions,
    bounds: Bounds,
    state: watch::Sender<SearchSnapshot>,
}

impl NearbySearch {
    /// Creates an idle search over the NYC service area with default
    /// position options.
    #[must_use]
    pub fn new(
        permission: Arc<dyn PermissionProvider>,
        position: Arc<dyn PositionProvider>,
        backend: Arc<dyn CameraBackend>,
    ) -> Self {
        let (state, _) = watch::channel(SearchSnapshot {
            generation: 0,
            state: SearchState::Idle,
        });
        Self {
            permission,
            position,
            backend,
            options: PositionOptions::default(),
            bounds: NYC_BOUNDS,
            state,
        }
    }

    #[must_use]
    pub const fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Subscribes to state changes. The receiver starts at the current
    /// snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.subscribe()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn current(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// Runs one search to completion and returns its terminal state.
    ///
    /// Starting a run while another is in flight supersedes the older one:
    /// the older run still finishes and returns its own terminal state, but
    /// publishes nothing further.
    ///
    /// The backend is only contacted after permission was granted and the
    /// position fell inside the service area.
    pub async fn run_search(&self, desired_count: NonZeroU32) -> SearchState {
        let generation = self.begin();

        let terminal = match self.execute(generation, desired_count).await {
            Ok((coordinate, results)) => {
                log::info!(
                    "Nearby search {generation} found {} cameras near {coordinate}",
                    results.len()
                );
                SearchState::Completed {
                    coordinate,
                    results,
                }
            }
            Err(error @ SearchError::OutOfServiceArea { .. }) => {
                log::info!("Nearby search {generation}: {error}");
                SearchState::Failed(error)
            }
            Err(error) => {
                log::warn!("Nearby search {generation} failed: {error}");
                SearchState::Failed(error)
            }
        };

        self.publish(generation, terminal.clone());
        terminal
    }

    async fn execute(
        &self,
        generation: u64,
        desired_count: NonZeroU32,
    ) -> Result<(GeoCoordinate, Vec<PhotoResult>), SearchError> {
        if self.permission.request_permission().await == PermissionStatus::Denied {
            return Err(SearchError::PermissionDenied);
        }

        self.publish(generation, SearchState::AcquiringPosition);
        let coordinate = self.acquire_position().await?;

        self.publish(generation, SearchState::ValidatingBounds { coordinate });
        if !self.bounds.contains(coordinate) {
            return Err(SearchError::OutOfServiceArea { coordinate });
        }

        self.publish(generation, SearchState::FetchingResults { coordinate });
        let results = self
            .backend
            .nearest_cameras(coordinate, desired_count)
            .await
            .map_err(|e| SearchError::NetworkError {
                message: e.to_string(),
            })?;

        Ok((coordinate, results))
    }

    async fn acquire_position(&self) -> Result<GeoCoordinate, SearchError> {
        let timeout = self.options.timeout;
        tokio::time::timeout(timeout, self.position.current_position(&self.options))
            .await
            .unwrap_or(Err(PositionError::Timeout(timeout)))
            .map_err(|e| SearchError::PositionUnavailable {
                message: e.to_string(),
            })
    }

    /// Starts a new generation in `RequestingPermission`, clearing any
    /// previous results or error.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = SearchState::RequestingPermission;
            generation = snapshot.generation;
        });
        log::debug!("Nearby search {generation}: RequestingPermission");
        generation
    }

    /// Publishes `state` if `generation` is still the current run.
    fn publish(&self, generation: u64, state: SearchState) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                log::debug!(
                    "Dropping update from superseded search {generation} (current {})",
                    snapshot.generation
                );
                return false;
            }
            log::debug!("Nearby search {generation}: {state:?}");
            snapshot.state = state;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;
    use crate::provider::{AlwaysGranted, FixedPosition};
    use crate::state::SearchErrorKind;

    const MIDTOWN: GeoCoordinate = GeoCoordinate::new(40.7484, -73.9857);
    const NORTH_OF_NYC: GeoCoordinate = GeoCoordinate::new(41.0, -73.9857);
    const OUT_OF_AREA_MESSAGE: &str =
        "This Feature of Parking Spotter Only Works in NYC. Check your location services or VPNs";

    fn count(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn photo(address: &str, uri: &str) -> PhotoResult {
        PhotoResult {
            address: address.to_string(),
            image_uri: uri.to_string(),
        }
    }

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct Permission {
        status: PermissionStatus,
        calls: CallLog,
    }

    #[async_trait]
    impl PermissionProvider for Permission {
        async fn request_permission(&self) -> PermissionStatus {
            self.calls.lock().unwrap().push("permission");
            self.status
        }
    }

    struct Position {
        fix: Result<GeoCoordinate, PositionError>,
        calls: CallLog,
    }

    #[async_trait]
    impl PositionProvider for Position {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<GeoCoordinate, PositionError> {
            self.calls.lock().unwrap().push("position");
            self.fix.clone()
        }
    }

    struct NeverFixes;

    #[async_trait]
    impl PositionProvider for NeverFixes {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<GeoCoordinate, PositionError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(MIDTOWN)
        }
    }

    struct Backend {
        photos: Option<Vec<PhotoResult>>,
        calls: CallLog,
        requests: AtomicUsize,
    }

    impl Backend {
        fn answering(photos: Vec<PhotoResult>, calls: CallLog) -> Self {
            Self {
                photos: Some(photos),
                calls,
                requests: AtomicUsize::new(0),
            }
        }

        fn failing(calls: CallLog) -> Self {
            Self {
                photos: None,
                calls,
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CameraBackend for Backend {
        async fn nearest_cameras(
            &self,
            _coordinate: GeoCoordinate,
            num_cams: NonZeroU32,
        ) -> Result<Vec<PhotoResult>, BackendError> {
            self.calls.lock().unwrap().push("backend");
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.photos.as_ref().map_or_else(
                || {
                    Err(BackendError::Parse {
                        message: "HTTP 500".to_string(),
                    })
                },
                |photos| Ok(photos.iter().take(num_cams.get() as usize).cloned().collect()),
            )
        }
    }

    fn search(
        status: PermissionStatus,
        fix: Result<GeoCoordinate, PositionError>,
        backend: Arc<Backend>,
        calls: &CallLog,
    ) -> NearbySearch {
        NearbySearch::new(
            Arc::new(Permission {
                status,
                calls: calls.clone(),
            }),
            Arc::new(Position {
                fix,
                calls: calls.clone(),
            }),
            backend,
        )
    }

    #[tokio::test]
    async fn starts_idle() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![], calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend, &calls);
        assert_eq!(
            search.current(),
            SearchSnapshot {
                generation: 0,
                state: SearchState::Idle
            }
        );
    }

    #[tokio::test]
    async fn in_area_search_completes_with_backend_order() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(
            vec![photo("A_St", "a"), photo("B_St", "b"), photo("C_St", "c")],
            calls.clone(),
        ));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend, &calls);

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state,
            SearchState::Completed {
                coordinate: MIDTOWN,
                results: vec![photo("A_St", "a"), photo("B_St", "b"), photo("C_St", "c")],
            }
        );
        assert!(!state.is_loading());
        assert!(state.error_message().is_none());
        assert_eq!(search.current().state, state);
        assert_eq!(*calls.lock().unwrap(), ["permission", "position", "backend"]);
    }

    #[tokio::test]
    async fn empty_backend_answer_is_completed_not_failed() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![], calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend, &calls);

        let state = search.run_search(count(5)).await;

        assert!(matches!(state, SearchState::Completed { ref results, .. } if results.is_empty()));
    }

    #[tokio::test]
    async fn desired_count_is_forwarded() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(
            vec![photo("A_St", "a"), photo("B_St", "b"), photo("C_St", "c")],
            calls.clone(),
        ));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend, &calls);

        let state = search.run_search(count(2)).await;

        assert_eq!(state.results().len(), 2);
    }

    #[tokio::test]
    async fn out_of_area_fails_with_coordinate_and_skips_backend() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![photo("A_St", "a")], calls.clone()));
        let search = search(
            PermissionStatus::Granted,
            Ok(NORTH_OF_NYC),
            backend.clone(),
            &calls,
        );

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state.error().map(SearchError::kind),
            Some(SearchErrorKind::OutOfServiceArea)
        );
        assert_eq!(state.coordinate(), Some(NORTH_OF_NYC));
        assert!(state.results().is_empty());
        assert_eq!(
            state.error_message().as_deref(),
            Some(OUT_OF_AREA_MESSAGE)
        );
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn just_south_of_service_area_keeps_coordinate() {
        let below = GeoCoordinate::new(NYC_BOUNDS.lat_min - 1e-9, MIDTOWN.lng);
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![photo("A_St", "a")], calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(below), backend.clone(), &calls);

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state,
            SearchState::Failed(SearchError::OutOfServiceArea { coordinate: below })
        );
        assert_eq!(state.coordinate(), Some(below));
        assert!(state.results().is_empty());
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn southern_edge_is_inside_service_area() {
        let edge = GeoCoordinate::new(NYC_BOUNDS.lat_min, MIDTOWN.lng);
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![photo("A_St", "a")], calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(edge), backend, &calls);

        let state = search.run_search(count(5)).await;

        assert_eq!(state.coordinate(), Some(edge));
        assert_eq!(state.results(), [photo("A_St", "a")]);
    }

    #[tokio::test]
    async fn denied_permission_fails_without_position_or_backend() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![photo("A_St", "a")], calls.clone()));
        let search = search(
            PermissionStatus::Denied,
            Ok(MIDTOWN),
            backend.clone(),
            &calls,
        );

        let state = search.run_search(count(5)).await;

        assert_eq!(state, SearchState::Failed(SearchError::PermissionDenied));
        assert_eq!(
            state.error_message().as_deref(),
            Some("Location permission denied")
        );
        assert!(state.coordinate().is_none());
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
        assert_eq!(*calls.lock().unwrap(), ["permission"]);
    }

    #[tokio::test]
    async fn position_error_fails_without_backend() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![], calls.clone()));
        let search = search(
            PermissionStatus::Granted,
            Err(PositionError::Unavailable("location services off".to_string())),
            backend.clone(),
            &calls,
        );

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state,
            SearchState::Failed(SearchError::PositionUnavailable {
                message: "location services off".to_string()
            })
        );
        assert_eq!(
            state.error_message().as_deref(),
            Some("location services off")
        );
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn position_timeout_fails_as_unavailable() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::answering(vec![], calls.clone()));
        let search = NearbySearch::new(
            Arc::new(AlwaysGranted),
            Arc::new(NeverFixes),
            backend.clone(),
        )
        .with_position_options(PositionOptions {
            timeout: Duration::from_secs(5),
            ..PositionOptions::default()
        });

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state.error().map(SearchError::kind),
            Some(SearchErrorKind::PositionUnavailable)
        );
        assert!(state.error_message().unwrap().contains("timed out"));
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failure_is_network_error() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::failing(calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend, &calls);

        let state = search.run_search(count(5)).await;

        assert_eq!(
            state.error().map(SearchError::kind),
            Some(SearchErrorKind::NetworkError)
        );
        assert!(state.error_message().unwrap().starts_with("Failed to fetch photos: "));
        assert!(state.coordinate().is_none());
        assert!(state.results().is_empty());
    }

    #[tokio::test]
    async fn rerun_starts_a_new_generation() {
        let calls = CallLog::default();
        let backend = Arc::new(Backend::failing(calls.clone()));
        let search = search(PermissionStatus::Granted, Ok(MIDTOWN), backend.clone(), &calls);

        let first = search.run_search(count(5)).await;
        assert_eq!(search.current().generation, 1);
        assert_eq!(search.current().state, first);

        let second = search.run_search(count(5)).await;
        assert_eq!(search.current().generation, 2);
        assert_eq!(search.current().state, second);
        assert_eq!(backend.requests.load(Ordering::SeqCst), 2);
    }

    struct GatedBackend {
        requests: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl CameraBackend for GatedBackend {
        async fn nearest_cameras(
            &self,
            _coordinate: GeoCoordinate,
            _num_cams: NonZeroU32,
        ) -> Result<Vec<PhotoResult>, BackendError> {
            if self.requests.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
                return Ok(vec![photo("Stale_St", "stale")]);
            }
            Ok(vec![photo("Fresh_St", "fresh")])
        }
    }

    #[tokio::test]
    async fn superseded_run_does_not_overwrite_newer_state() {
        let backend = Arc::new(GatedBackend {
            requests: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let search = Arc::new(NearbySearch::new(
            Arc::new(AlwaysGranted),
            Arc::new(FixedPosition(MIDTOWN)),
            backend.clone(),
        ));
        let mut rx = search.subscribe();

        let first = tokio::spawn({
            let search = search.clone();
            async move { search.run_search(count(5)).await }
        });
        rx.wait_for(|s| matches!(s.state, SearchState::FetchingResults { .. }))
            .await
            .unwrap();

        let second = search.run_search(count(5)).await;
        assert_eq!(second.results(), [photo("Fresh_St", "fresh")]);

        backend.gate.notify_one();
        let stale = first.await.unwrap();
        assert_eq!(stale.results(), [photo("Stale_St", "stale")]);

        let current = search.current();
        assert_eq!(current.generation, 2);
        assert_eq!(current.state, second);
    }
}
