// ── Area types and the area profile table ──
//
// One table couples each functional area to the zone geometry it expects
// and the telemetry fields that are meaningful for it. Zone validation,
// zone templates, and per-camera metric views all read from here.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Functional area a camera is assigned to. Fixed at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AreaType {
    Entrance,
    Dining,
    Cashier,
    Kitchen,
}

/// Geometry variant of a detection zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ZoneKind {
    Line,
    Polygon,
    Rectangle,
}

/// A single telemetry field a camera may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricField {
    PersonCount,
    PeopleEntered,
    PeopleExited,
    AverageWaitTimeMinutes,
    OccupancyPercentage,
    AvailableTables,
    TablesToClean,
    QueueLength,
    TransactionsPerHour,
    StaffActiveCount,
    StaffTotalScheduled,
    ActiveOrders,
}

impl MetricField {
    /// Short human label for tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::PersonCount => "People",
            Self::PeopleEntered => "Entered",
            Self::PeopleExited => "Exited",
            Self::AverageWaitTimeMinutes => "Avg wait (min)",
            Self::OccupancyPercentage => "Occupancy %",
            Self::AvailableTables => "Free tables",
            Self::TablesToClean => "To clean",
            Self::QueueLength => "Queue",
            Self::TransactionsPerHour => "Tx/hour",
            Self::StaffActiveCount => "Staff active",
            Self::StaffTotalScheduled => "Staff scheduled",
            Self::ActiveOrders => "Orders",
        }
    }
}

/// What an area expects: its zone geometry and its metric subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaProfile {
    pub area: AreaType,
    pub zone_kind: ZoneKind,
    pub metrics: &'static [MetricField],
}

static ENTRANCE: AreaProfile = AreaProfile {
    area: AreaType::Entrance,
    zone_kind: ZoneKind::Line,
    metrics: &[
        MetricField::PersonCount,
        MetricField::PeopleEntered,
        MetricField::PeopleExited,
        MetricField::AverageWaitTimeMinutes,
    ],
};

static DINING: AreaProfile = AreaProfile {
    area: AreaType::Dining,
    zone_kind: ZoneKind::Polygon,
    metrics: &[
        MetricField::PersonCount,
        MetricField::OccupancyPercentage,
        MetricField::AvailableTables,
        MetricField::TablesToClean,
    ],
};

static CASHIER: AreaProfile = AreaProfile {
    area: AreaType::Cashier,
    zone_kind: ZoneKind::Rectangle,
    metrics: &[
        MetricField::PersonCount,
        MetricField::QueueLength,
        MetricField::AverageWaitTimeMinutes,
        MetricField::TransactionsPerHour,
    ],
};

static KITCHEN: AreaProfile = AreaProfile {
    area: AreaType::Kitchen,
    zone_kind: ZoneKind::Rectangle,
    metrics: &[
        MetricField::PersonCount,
        MetricField::StaffActiveCount,
        MetricField::StaffTotalScheduled,
        MetricField::ActiveOrders,
    ],
};

impl AreaType {
    /// The profile row for this area.
    pub fn profile(self) -> &'static AreaProfile {
        match self {
            Self::Entrance => &ENTRANCE,
            Self::Dining => &DINING,
            Self::Cashier => &CASHIER,
            Self::Kitchen => &KITCHEN,
        }
    }

    pub fn zone_kind(self) -> ZoneKind {
        self.profile().zone_kind
    }
}
