// ── API-to-domain type conversions ──
//
// Bridges raw `venuecam_api` response types into `venuecam_core::model`
// types. The backend stores ROI settings and detection logs as free-form
// JSON, so everything here is lenient: a malformed field becomes absent
// (and is logged at debug), never a failed refresh.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use venuecam_api::CameraResponse;

use crate::model::{AreaType, Camera, CameraId, CameraStatus, TelemetrySnapshot, ZoneGeometry};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 timestamp. Naive timestamps are taken as UTC.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let s = raw?;
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn parse_status(raw: Option<&str>) -> CameraStatus {
    raw.and_then(|s| s.parse().ok()).unwrap_or(CameraStatus::Unknown)
}

/// Canonical field, falling back to the producer's alias.
fn lookup<'a>(log: &'a Map<String, Value>, field: &str, alias: Option<&str>) -> Option<&'a Value> {
    let present = |key: &str| log.get(key).filter(|v| !v.is_null());
    present(field).or_else(|| alias.and_then(present))
}

/// 2^64, the first float past `u64::MAX`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Non-negative integer, including integral floats such as `3.0`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v < U64_LIMIT)
            .map(|v| v as u64)
    })
}

fn count(log: &Map<String, Value>, field: &str, alias: Option<&str>) -> Option<u64> {
    let value = lookup(log, field, alias)?;
    let parsed = as_count(value);
    if parsed.is_none() {
        debug!(field, %value, "ignoring non-count telemetry value");
    }
    parsed
}

fn measure(log: &Map<String, Value>, field: &str, alias: Option<&str>) -> Option<f64> {
    let value = lookup(log, field, alias)?;
    let parsed = value.as_f64().filter(|v| v.is_finite() && *v >= 0.0);
    if parsed.is_none() {
        debug!(field, %value, "ignoring non-numeric telemetry value");
    }
    parsed
}

// ── Dining tables ──────────────────────────────────────────────────

/// Seats per table when the producer omits `capacity`.
const DEFAULT_TABLE_CAPACITY: u64 = 4;

/// Rollup of a per-table dining report:
/// `{"tables": [{"id", "status", "people_count", "capacity"}]}`.
#[derive(Debug, Default, PartialEq)]
struct TableSummary {
    available: u64,
    dirty: u64,
    seated: u64,
    capacity: u64,
}

impl TableSummary {
    fn from_log(log: &Map<String, Value>) -> Option<Self> {
        let tables = log.get("tables")?.as_array()?;
        let mut summary = Self::default();
        for table in tables {
            let Some(table) = table.as_object() else {
                debug!(%table, "ignoring non-object table entry");
                continue;
            };
            match table.get("status").and_then(Value::as_str) {
                Some("AVAILABLE") => summary.available += 1,
                Some("DIRTY") => summary.dirty += 1,
                Some("OCCUPIED") => {
                    summary.seated += table.get("people_count").and_then(as_count).unwrap_or(0);
                }
                _ => {}
            }
            summary.capacity += table
                .get("capacity")
                .and_then(as_count)
                .unwrap_or(DEFAULT_TABLE_CAPACITY);
        }
        Some(summary)
    }

    /// Seated guests over total seats, capped at 100. `None` without seats.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn occupancy(&self) -> Option<f64> {
        if self.capacity == 0 {
            return None;
        }
        Some((self.seated as f64 / self.capacity as f64 * 100.0).min(100.0))
    }
}

// ── Telemetry ──────────────────────────────────────────────────────

/// Build a snapshot from a `latest_log` payload. `null` means no report.
pub fn snapshot_from_log(raw: &Value) -> Option<TelemetrySnapshot> {
    let log = match raw {
        Value::Null => return None,
        Value::Object(map) => map,
        other => {
            debug!(log = %other, "ignoring non-object detection log");
            return None;
        }
    };

    let tables = TableSummary::from_log(log);

    Some(TelemetrySnapshot {
        person_count: count(log, "person_count", Some("total_customers")),
        people_entered: count(log, "people_entered", Some("people_in")),
        people_exited: count(log, "people_exited", Some("people_out")),
        average_wait_time_minutes: measure(log, "average_wait_time_minutes", Some("wait_time_avg")),
        occupancy_percentage: measure(log, "occupancy_percentage", None)
            .or_else(|| tables.as_ref().and_then(TableSummary::occupancy)),
        available_tables: count(log, "available_tables", None)
            .or_else(|| tables.as_ref().map(|t| t.available)),
        tables_to_clean: count(log, "tables_to_clean", None)
            .or_else(|| tables.as_ref().map(|t| t.dirty)),
        queue_length: count(log, "queue_length", None),
        transactions_per_hour: count(log, "transactions_per_hour", None),
        staff_active_count: count(log, "staff_active_count", None),
        staff_total_scheduled: count(log, "staff_total_scheduled", None),
        active_orders: count(log, "active_orders", None),
    })
}

// ── Zones ──────────────────────────────────────────────────────────

/// Read stored ROI settings. `{}` (the backend default) and anything that
/// does not parse as a zone are treated as "not configured".
pub fn zone_from_value(raw: &Value) -> Option<ZoneGeometry> {
    match raw {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => match serde_json::from_value(other.clone()) {
            Ok(zone) => Some(zone),
            Err(e) => {
                debug!(error = %e, "stored ROI settings are not a recognized zone");
                None
            }
        },
    }
}

// ── Camera ─────────────────────────────────────────────────────────

/// Convert a wire camera. Returns `None` for an area type this build
/// does not know, since such a camera has no zone or metric profile.
pub fn camera_from_response(resp: CameraResponse) -> Option<Camera> {
    let area_type: AreaType = match resp.area_type.parse() {
        Ok(area) => area,
        Err(_) => {
            warn!(
                camera = resp.id,
                area_type = %resp.area_type,
                "skipping camera with unknown area type"
            );
            return None;
        }
    };

    Some(Camera {
        id: CameraId(resp.id),
        name: resp.name,
        area_type,
        status: parse_status(resp.status.as_deref()),
        roi_settings: zone_from_value(&resp.roi_settings),
        latest_log: resp.latest_log.as_ref().and_then(snapshot_from_log),
        rtsp_url: resp.rtsp_url,
        branch_id: resp.branch_id,
        last_heartbeat: parse_datetime(resp.last_heartbeat.as_deref()),
    })
}
