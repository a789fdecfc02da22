// ── Refresh scheduler ──
//
// Two independent timers: a presentation clock that only publishes the
// current time, and a data tick that re-fetches the camera list and
// re-aggregates. Every data tick spawns its own fetch so a slow backend
// never delays the timers; a tick that finds a fetch in flight is
// coalesced into a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analytics::{CameraView, VenueAnalytics, build_dashboard, compute_venue_analytics};
use crate::backend::CameraBackend;
use crate::error::CoreError;
use crate::store::CameraConfigStore;
use crate::stream::DashboardStream;

// ── Published state ──────────────────────────────────────────────────

/// A non-fatal refresh failure, cleared by the next success.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RefreshError {
    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },
}

/// Everything a dashboard renders, published atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub analytics: VenueAnalytics,
    pub cameras: Vec<CameraView>,
    /// When the analytics were last recomputed; `None` before the first success.
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<RefreshError>,
}

/// Result of one refresh trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { cameras: usize },
    /// Another fetch was already in flight; nothing was done.
    Coalesced,
    Failed(RefreshError),
}

// ── Scheduler ────────────────────────────────────────────────────────

/// Periodic and on-demand refresh of the dashboard.
///
/// Cheaply cloneable; clones share timers and published state.
pub struct RefreshScheduler<B> {
    inner: Arc<SchedulerInner<B>>,
}

impl<B> Clone for RefreshScheduler<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SchedulerInner<B> {
    backend: Arc<B>,
    store: Arc<CameraConfigStore<B>>,
    snapshot: watch::Sender<Arc<DashboardSnapshot>>,
    clock: watch::Sender<DateTime<Utc>>,
    in_flight: AtomicBool,
    data_interval: Duration,
    clock_interval: Duration,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Resets the single-flight flag when a fetch ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: CameraBackend> RefreshScheduler<B> {
    pub fn new(
        backend: Arc<B>,
        store: Arc<CameraConfigStore<B>>,
        data_interval: Duration,
        clock_interval: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DashboardSnapshot::default()));
        let (clock, _) = watch::channel(Utc::now());

        Self {
            inner: Arc::new(SchedulerInner {
                backend,
                store,
                snapshot,
                clock,
                in_flight: AtomicBool::new(false),
                data_interval,
                clock_interval,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> DashboardStream {
        DashboardStream::new(self.inner.snapshot.subscribe())
    }

    /// Presentation clock; ticks even while the backend is unreachable.
    pub fn clock(&self) -> watch::Receiver<DateTime<Utc>> {
        self.inner.clock.subscribe()
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Fetch, aggregate, and publish once.
    ///
    /// Failures are published as `last_error` on top of the previous
    /// analytics and returned as [`RefreshOutcome::Failed`].
    pub async fn fetch_and_aggregate(&self) -> RefreshOutcome {
        match self.try_fetch_and_aggregate().await {
            Ok(outcome) => outcome,
            Err(e) => RefreshOutcome::Failed(RefreshError::RefreshFailed {
                message: e.to_string(),
            }),
        }
    }

    /// Out-of-cycle refresh. The timers keep their phase.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.fetch_and_aggregate().await
    }

    /// Like [`fetch_and_aggregate`](Self::fetch_and_aggregate) but keeps the
    /// typed error for callers that need to tell failures apart.
    pub async fn try_fetch_and_aggregate(&self) -> Result<RefreshOutcome, CoreError> {
        if self.inner.in_flight.swap(true, Ordering::AcqRel) {
            debug!("refresh already in flight; coalescing");
            return Ok(RefreshOutcome::Coalesced);
        }
        let _flight = FlightGuard(&self.inner.in_flight);

        match self.inner.backend.list_cameras().await {
            Ok(cameras) => {
                let analytics = compute_venue_analytics(&cameras);
                let views = build_dashboard(&cameras);
                let count = cameras.len();
                self.inner.store.load_all(cameras);

                self.inner.snapshot.send_replace(Arc::new(DashboardSnapshot {
                    analytics,
                    cameras: views,
                    refreshed_at: Some(Utc::now()),
                    last_error: None,
                }));
                debug!(
                    cameras = count,
                    occupancy = analytics.occupancy,
                    wait_time = analytics.wait_time,
                    "dashboard refreshed"
                );
                Ok(RefreshOutcome::Refreshed { cameras: count })
            }
            Err(e) => {
                warn!(error = %e, "camera refresh failed");
                let error = RefreshError::RefreshFailed {
                    message: e.to_string(),
                };
                self.inner.snapshot.send_modify(|snap| {
                    let mut next = (**snap).clone();
                    next.last_error = Some(error);
                    *snap = Arc::new(next);
                });
                Err(e)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the clock and data timers. A zero interval disables the
    /// matching timer.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return;
        }

        let cancel = self.inner.cancel.clone();
        if !self.inner.clock_interval.is_zero() {
            handles.push(tokio::spawn(clock_task(
                self.inner.clock.clone(),
                self.inner.clock_interval,
                cancel.clone(),
            )));
        }

        if !self.inner.data_interval.is_zero() {
            handles.push(tokio::spawn(data_task(self.clone(), cancel)));
        }

        info!(
            refresh_secs = self.inner.data_interval.as_secs(),
            "refresh scheduler started"
        );
    }

    /// Stop both timers and wait for them to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("refresh scheduler stopped");
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn clock_task(
    clock: watch::Sender<DateTime<Utc>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                clock.send_replace(Utc::now());
            }
        }
    }
}

async fn data_task<B: CameraBackend>(scheduler: RefreshScheduler<B>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(scheduler.inner.data_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    scheduler.fetch_and_aggregate().await;
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::model::{AreaType, TelemetrySnapshot};
    use crate::testing::{FakeBackend, camera};

    fn dining(id: u64, occupancy: f64) -> crate::model::Camera {
        let mut cam = camera(id, AreaType::Dining);
        cam.latest_log = Some(TelemetrySnapshot {
            occupancy_percentage: Some(occupancy),
            ..TelemetrySnapshot::default()
        });
        cam
    }

    fn scheduler(backend: FakeBackend, every: Duration) -> (Arc<FakeBackend>, RefreshScheduler<FakeBackend>) {
        let backend = Arc::new(backend);
        let store = Arc::new(CameraConfigStore::new(backend.clone()));
        let scheduler = RefreshScheduler::new(backend.clone(), store, every, Duration::from_secs(1));
        (backend, scheduler)
    }

    /// Let spawned tasks run to their next await point.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn successful_fetch_publishes_analytics_and_reloads_store() {
        let (_, sched) = scheduler(
            FakeBackend::with_cameras(vec![dining(1, 80.0), camera(2, AreaType::Dining)]),
            Duration::from_secs(10),
        );

        let outcome = sched.fetch_and_aggregate().await;

        assert_eq!(outcome, RefreshOutcome::Refreshed { cameras: 2 });
        let snap = sched.snapshot();
        assert_eq!(snap.analytics.occupancy, 80);
        assert_eq!(snap.cameras.len(), 2);
        assert!(snap.refreshed_at.is_some());
        assert_eq!(snap.last_error, None);
        assert_eq!(sched.inner.store.cameras().len(), 2);
    }

    #[tokio::test]
    async fn failure_keeps_previous_analytics_until_next_success() {
        let (backend, sched) = scheduler(
            FakeBackend::with_cameras(vec![dining(1, 50.0)]),
            Duration::from_secs(10),
        );
        sched.fetch_and_aggregate().await;
        let first = sched.snapshot();

        *backend.fail_list.lock().unwrap() = Some("connection refused".into());
        let outcome = sched.fetch_and_aggregate().await;

        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        let failed = sched.snapshot();
        assert_eq!(failed.analytics, first.analytics);
        assert_eq!(failed.cameras, first.cameras);
        assert_eq!(failed.refreshed_at, first.refreshed_at);
        assert!(matches!(
            failed.last_error,
            Some(RefreshError::RefreshFailed { ref message }) if message.contains("connection refused")
        ));

        *backend.fail_list.lock().unwrap() = None;
        *backend.cameras.lock().unwrap() = vec![dining(1, 70.0)];
        sched.fetch_and_aggregate().await;

        let recovered = sched.snapshot();
        assert_eq!(recovered.last_error, None);
        assert_eq!(recovered.analytics.occupancy, 70);
    }

    #[tokio::test]
    async fn failure_is_published_as_one_change() {
        let (backend, sched) = scheduler(FakeBackend::default(), Duration::from_secs(10));
        let mut stream = sched.subscribe();

        *backend.fail_list.lock().unwrap() = Some("boom".into());
        sched.fetch_and_aggregate().await;

        let snap = stream.changed().await.unwrap();
        assert!(snap.last_error.is_some());
        assert_eq!(stream.current().last_error, snap.last_error);
    }

    #[tokio::test]
    async fn trigger_during_fetch_is_coalesced() {
        let backend = FakeBackend::with_cameras(vec![dining(1, 10.0)]);
        *backend.hold_list.lock().unwrap() = true;
        let (backend, sched) = scheduler(backend, Duration::from_secs(10));

        let pending = tokio::spawn({
            let sched = sched.clone();
            async move { sched.fetch_and_aggregate().await }
        });
        settle().await;
        assert!(sched.is_fetching());

        assert_eq!(sched.refresh_now().await, RefreshOutcome::Coalesced);

        backend.release_list.notify_one();
        assert_eq!(
            pending.await.unwrap(),
            RefreshOutcome::Refreshed { cameras: 1 }
        );
        assert_eq!(backend.list_calls(), 1);
        assert!(!sched.is_fetching());
    }

    #[tokio::test(start_paused = true)]
    async fn data_timer_fires_on_its_period() {
        let (backend, sched) = scheduler(
            FakeBackend::with_cameras(vec![dining(1, 10.0)]),
            Duration::from_secs(10),
        );
        sched.start().await;
        settle().await;
        assert_eq!(backend.list_calls(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 2);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_does_not_stall_timers() {
        let backend = FakeBackend::with_cameras(vec![dining(1, 10.0)]);
        *backend.hold_list.lock().unwrap() = true;
        let (backend, sched) = scheduler(backend, Duration::from_secs(10));
        let mut clock = sched.clock();
        sched.start().await;

        // First data tick starts a fetch that never finishes on its own.
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 1);

        // The clock keeps ticking and later data ticks are coalesced.
        clock.borrow_and_update();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(clock.has_changed().unwrap());

        tokio::time::sleep(Duration::from_secs(8)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 1);
        assert!(sched.is_fetching());

        backend.release_list.notify_one();
        settle().await;
        assert!(!sched.is_fetching());
        assert_eq!(sched.snapshot().analytics.occupancy, 10);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_now_keeps_timer_phase() {
        let (backend, sched) = scheduler(
            FakeBackend::with_cameras(vec![dining(1, 10.0)]),
            Duration::from_secs(10),
        );
        sched.start().await;
        settle().await;

        tokio::time::sleep(Duration::from_secs(4)).await;
        sched.refresh_now().await;
        assert_eq!(backend.list_calls(), 1);

        // The periodic tick still lands at t=10s, not t=14s.
        tokio::time::sleep(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 2);

        sched.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_intervals_disable_timers() {
        let backend = Arc::new(FakeBackend::with_cameras(Vec::new()));
        let store = Arc::new(CameraConfigStore::new(backend.clone()));
        let sched = RefreshScheduler::new(backend.clone(), store, Duration::ZERO, Duration::ZERO);
        let mut clock = sched.clock();
        clock.borrow_and_update();

        sched.start().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;

        assert!(!clock.has_changed().unwrap());
        assert_eq!(backend.list_calls(), 0);
        sched.shutdown().await;
    }

    #[tokio::test]
    async fn stream_yields_current_then_each_publish() {
        use tokio_stream::StreamExt;

        let (backend, sched) = scheduler(
            FakeBackend::with_cameras(vec![dining(1, 40.0)]),
            Duration::from_secs(10),
        );
        sched.fetch_and_aggregate().await;
        let mut updates = sched.subscribe().into_stream();

        let first = updates.next().await.unwrap();
        assert_eq!(first.analytics.occupancy, 40);

        *backend.cameras.lock().unwrap() = vec![dining(1, 90.0)];
        sched.fetch_and_aggregate().await;
        let second = updates.next().await.unwrap();
        assert_eq!(second.analytics.occupancy, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking() {
        let (backend, sched) = scheduler(
            FakeBackend::with_cameras(Vec::new()),
            Duration::from_secs(10),
        );
        sched.start().await;
        sched.shutdown().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(backend.list_calls(), 0);
    }
}
