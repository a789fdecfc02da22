// ── Monitor facade ──
//
// Owns the backend, the camera configuration store, and the refresh
// scheduler for one venue backend. This is the handle the CLI works with.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::backend::{CameraBackend, HttpBackend};
use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::model::{Camera, CameraId};
use crate::refresh::{DashboardSnapshot, RefreshOutcome, RefreshScheduler};
use crate::store::{CameraConfigStore, SaveError};
use crate::stream::DashboardStream;

/// Cheaply cloneable handle to a monitored venue.
///
/// Nothing touches the network until [`start()`](Self::start) or
/// [`refresh_now()`](Self::refresh_now) is called.
pub struct Monitor<B = HttpBackend> {
    inner: Arc<MonitorInner<B>>,
}

impl<B> Clone for Monitor<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MonitorInner<B> {
    config: MonitorConfig,
    backend: Arc<B>,
    store: Arc<CameraConfigStore<B>>,
    scheduler: RefreshScheduler<B>,
}

impl Monitor<HttpBackend> {
    /// Build a monitor talking to the REST backend described by `config`.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::with_backend(backend, config))
    }

    /// One fetch, run `f`, shut down. No timers are spawned.
    pub async fn oneshot<F, Fut, T, E>(config: MonitorConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        Self::new(config)?.run_once(f).await
    }
}

impl<B: CameraBackend> Monitor<B> {
    pub fn with_backend(backend: B, config: MonitorConfig) -> Self {
        let backend = Arc::new(backend);
        let store = Arc::new(CameraConfigStore::new(Arc::clone(&backend)));
        let scheduler = RefreshScheduler::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            config.refresh_interval,
            config.clock_interval,
        );

        Self {
            inner: Arc::new(MonitorInner {
                config,
                backend,
                store,
                scheduler,
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.inner.backend
    }

    pub fn store(&self) -> &Arc<CameraConfigStore<B>> {
        &self.inner.store
    }

    pub fn scheduler(&self) -> &RefreshScheduler<B> {
        &self.inner.scheduler
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Initial fetch, then spawn the clock and refresh timers.
    ///
    /// A failed initial fetch is returned and no timers are started.
    pub async fn start(&self) -> Result<(), CoreError> {
        let outcome = self.inner.scheduler.try_fetch_and_aggregate().await?;
        debug!(?outcome, "initial fetch complete");
        self.inner.scheduler.start().await;
        info!(url = %self.inner.config.api_url, "monitor started");
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.inner.scheduler.shutdown().await;
        info!("monitor stopped");
    }

    /// Single fetch followed by `f`, then shutdown regardless of the result.
    pub async fn run_once<F, Fut, T, E>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        self.inner.scheduler.try_fetch_and_aggregate().await?;
        let result = f(self.clone()).await;
        self.shutdown().await;
        result
    }

    // ── Dashboard ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.inner.scheduler.snapshot()
    }

    pub fn subscribe(&self) -> DashboardStream {
        self.inner.scheduler.subscribe()
    }

    pub fn clock(&self) -> watch::Receiver<DateTime<Utc>> {
        self.inner.scheduler.clock()
    }

    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.scheduler.refresh_now().await
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn cameras(&self) -> Vec<Camera> {
        self.inner.store.cameras()
    }

    pub async fn save(&self, id: CameraId) -> Result<Camera, SaveError> {
        self.inner.store.save(id).await
    }
}
