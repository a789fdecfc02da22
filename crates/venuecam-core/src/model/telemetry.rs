// ── Telemetry snapshot ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::area::MetricField;

/// The most recent detection report for one camera.
///
/// Every field is optional and absence is not zero: a camera that never
/// reported `tables_to_clean` must not drag an average down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_count: Option<u64>,

    // entrance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_entered: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_exited: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_wait_time_minutes: Option<f64>,

    // dining
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_tables: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables_to_clean: Option<u64>,

    // cashier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions_per_hour: Option<u64>,

    // kitchen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_active_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_total_scheduled: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_orders: Option<u64>,
}

/// A single reported value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Count(u64),
    Measure(f64),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Measure(v) => write!(f, "{v:.1}"),
        }
    }
}

impl TelemetrySnapshot {
    /// Look up one field by name.
    pub fn reading(&self, field: MetricField) -> Option<Reading> {
        let count = |v: Option<u64>| v.map(Reading::Count);
        let measure = |v: Option<f64>| v.map(Reading::Measure);
        match field {
            MetricField::PersonCount => count(self.person_count),
            MetricField::PeopleEntered => count(self.people_entered),
            MetricField::PeopleExited => count(self.people_exited),
            MetricField::AverageWaitTimeMinutes => measure(self.average_wait_time_minutes),
            MetricField::OccupancyPercentage => measure(self.occupancy_percentage),
            MetricField::AvailableTables => count(self.available_tables),
            MetricField::TablesToClean => count(self.tables_to_clean),
            MetricField::QueueLength => count(self.queue_length),
            MetricField::TransactionsPerHour => count(self.transactions_per_hour),
            MetricField::StaffActiveCount => count(self.staff_active_count),
            MetricField::StaffTotalScheduled => count(self.staff_total_scheduled),
            MetricField::ActiveOrders => count(self.active_orders),
        }
    }
}
