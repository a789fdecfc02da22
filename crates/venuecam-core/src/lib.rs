//! Domain logic between `venuecam-api` and the CLI.
//!
//! - **[`Monitor`]**: facade owning a backend, the [`CameraConfigStore`],
//!   and the [`RefreshScheduler`]. [`Monitor::oneshot()`] runs a single
//!   fetch for one-off CLI invocations.
//!
//! - **[`analytics`]**: pure aggregation of per-camera telemetry into venue
//!   totals and per-area metric views.
//!
//! - **[`zone`]**: parsing and validation of detection zones against the
//!   geometry each area expects.
//!
//! - **[`CameraConfigStore`]**: committed and staged camera configuration,
//!   with single-flight saves per camera.
//!
//! - **[`CameraBackend`]**: the seam to the venue backend. [`HttpBackend`]
//!   is the REST implementation.

pub mod analytics;
pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod monitor;
pub mod refresh;
pub mod store;
pub mod stream;
pub mod zone;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analytics::{AreaMetrics, CameraView, StatusCounts, VenueAnalytics};
pub use backend::{CameraBackend, CameraUpdate, HttpBackend};
pub use config::{MonitorConfig, TlsVerification};
pub use error::CoreError;
pub use monitor::Monitor;
pub use refresh::{DashboardSnapshot, RefreshError, RefreshOutcome, RefreshScheduler};
pub use store::{CameraConfigStore, RoiDraft, SaveError, StagedEdit};
pub use stream::{DashboardStream, DashboardWatchStream};
pub use zone::ValidationError;

pub use model::{
    AreaProfile, AreaType, Camera, CameraId, CameraStatus, MetricField, Point2D, Reading,
    TelemetrySnapshot, ZoneGeometry, ZoneKind,
};
