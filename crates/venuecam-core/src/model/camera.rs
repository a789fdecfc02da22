// ── Camera domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::area::AreaType;
use super::geometry::ZoneGeometry;
use super::telemetry::TelemetrySnapshot;

/// Server-assigned camera identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(pub u64);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CameraId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for CameraId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Health as reported by the backend. Read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CameraStatus {
    Online,
    Warning,
    Offline,
    Unknown,
}

/// A camera as the core sees it: identity, area, editable configuration,
/// and the latest telemetry when the backend supplied one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    pub area_type: AreaType,
    pub status: CameraStatus,
    pub rtsp_url: String,
    pub roi_settings: Option<ZoneGeometry>,
    pub latest_log: Option<TelemetrySnapshot>,
    pub branch_id: Option<u64>,
    pub last_heartbeat: Option<DateTime<Utc>>,
}
