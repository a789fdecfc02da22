// ── Aggregation engine ──
//
// Pure functions from a camera list to venue-wide analytics and
// per-camera, area-specific metric views. Absent telemetry never counts
// as zero: it is left out of both numerator and denominator.

use serde::{Deserialize, Serialize};

use crate::model::{
    AreaType, Camera, CameraId, CameraStatus, MetricField, Reading, TelemetrySnapshot,
};

// ── Venue rollup ─────────────────────────────────────────────────────

/// Cameras per reported status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
    pub unknown: usize,
}

/// Venue-wide rollup. Derived on every refresh, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueAnalytics {
    /// Mean occupancy percentage over reporting cameras, rounded.
    pub occupancy: u64,
    /// Summed average wait minutes, rounded.
    pub wait_time: u64,
    /// Summed transactions per hour.
    pub transactions: u64,
    /// Summed tables awaiting cleaning.
    pub tables_to_clean: u64,
    /// Cameras that supplied a telemetry report.
    pub reporting_cameras: usize,
    pub total_cameras: usize,
    pub status_counts: StatusCounts,
}

/// Round a non-negative measure to the nearest whole number.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn round_whole(value: f64) -> u64 {
    // Saturates on overflow; inputs are filtered to finite, non-negative.
    value.max(0.0).round() as u64
}

/// Roll the latest telemetry of every camera up into venue analytics.
///
/// An empty list yields all zeros.
pub fn compute_venue_analytics(cameras: &[Camera]) -> VenueAnalytics {
    let mut occupancy_sum = 0.0_f64;
    let mut occupancy_n = 0.0_f64;
    let mut wait_sum = 0.0_f64;
    let mut analytics = VenueAnalytics {
        total_cameras: cameras.len(),
        ..VenueAnalytics::default()
    };

    for cam in cameras {
        match cam.status {
            CameraStatus::Online => analytics.status_counts.online += 1,
            CameraStatus::Warning => analytics.status_counts.warning += 1,
            CameraStatus::Offline => analytics.status_counts.offline += 1,
            CameraStatus::Unknown => analytics.status_counts.unknown += 1,
        }

        let Some(log) = &cam.latest_log else {
            continue;
        };
        analytics.reporting_cameras += 1;

        if let Some(occ) = log.occupancy_percentage {
            occupancy_sum += occ;
            occupancy_n += 1.0;
        }
        if let Some(wait) = log.average_wait_time_minutes {
            wait_sum += wait;
        }
        if let Some(tx) = log.transactions_per_hour {
            analytics.transactions = analytics.transactions.saturating_add(tx);
        }
        if let Some(tables) = log.tables_to_clean {
            analytics.tables_to_clean = analytics.tables_to_clean.saturating_add(tables);
        }
    }

    if occupancy_n > 0.0 {
        analytics.occupancy = round_whole(occupancy_sum / occupancy_n);
    }
    analytics.wait_time = round_whole(wait_sum);
    analytics
}

// ── Per-camera metrics ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceMetrics {
    pub person_count: Option<u64>,
    pub people_entered: Option<u64>,
    pub people_exited: Option<u64>,
    pub average_wait_time_minutes: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiningMetrics {
    pub person_count: Option<u64>,
    pub occupancy_percentage: Option<f64>,
    pub available_tables: Option<u64>,
    pub tables_to_clean: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashierMetrics {
    pub person_count: Option<u64>,
    pub queue_length: Option<u64>,
    pub average_wait_time_minutes: Option<f64>,
    pub transactions_per_hour: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenMetrics {
    pub person_count: Option<u64>,
    pub staff_active_count: Option<u64>,
    pub staff_total_scheduled: Option<u64>,
    pub active_orders: Option<u64>,
}

/// The telemetry subset that matters for a camera's area.
///
/// `Unknown` means the camera has not reported at all, which is different
/// from reporting zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "area", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaMetrics {
    Entrance(EntranceMetrics),
    Dining(DiningMetrics),
    Cashier(CashierMetrics),
    Kitchen(KitchenMetrics),
    Unknown,
}

impl AreaMetrics {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

fn area_metrics(area: AreaType, log: &TelemetrySnapshot) -> AreaMetrics {
    match area {
        AreaType::Entrance => AreaMetrics::Entrance(EntranceMetrics {
            person_count: log.person_count,
            people_entered: log.people_entered,
            people_exited: log.people_exited,
            average_wait_time_minutes: log.average_wait_time_minutes,
        }),
        AreaType::Dining => AreaMetrics::Dining(DiningMetrics {
            person_count: log.person_count,
            occupancy_percentage: log.occupancy_percentage,
            available_tables: log.available_tables,
            tables_to_clean: log.tables_to_clean,
        }),
        AreaType::Cashier => AreaMetrics::Cashier(CashierMetrics {
            person_count: log.person_count,
            queue_length: log.queue_length,
            average_wait_time_minutes: log.average_wait_time_minutes,
            transactions_per_hour: log.transactions_per_hour,
        }),
        AreaType::Kitchen => AreaMetrics::Kitchen(KitchenMetrics {
            person_count: log.person_count,
            staff_active_count: log.staff_active_count,
            staff_total_scheduled: log.staff_total_scheduled,
            active_orders: log.active_orders,
        }),
    }
}

/// Area-specific metrics for one camera. Depends on nothing but `camera`.
pub fn metrics_for(camera: &Camera) -> AreaMetrics {
    camera
        .latest_log
        .as_ref()
        .map_or(AreaMetrics::Unknown, |log| area_metrics(camera.area_type, log))
}

// ── Dashboard views ──────────────────────────────────────────────────

/// A camera paired with its area metrics, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub camera: Camera,
    pub metrics: AreaMetrics,
}

impl CameraView {
    pub fn id(&self) -> CameraId {
        self.camera.id
    }

    /// `(field, value)` pairs in the area profile's order. Every profile
    /// field is listed; unreported ones carry `None`.
    pub fn readings(&self) -> Vec<(MetricField, Option<Reading>)> {
        self.camera
            .area_type
            .profile()
            .metrics
            .iter()
            .map(|&field| {
                let value = self
                    .camera
                    .latest_log
                    .as_ref()
                    .and_then(|log| log.reading(field));
                (field, value)
            })
            .collect()
    }
}

/// Pair every camera with its metrics, preserving input order.
pub fn build_dashboard(cameras: &[Camera]) -> Vec<CameraView> {
    cameras
        .iter()
        .map(|camera| CameraView {
            metrics: metrics_for(camera),
            camera: camera.clone(),
        })
        .collect()
}
