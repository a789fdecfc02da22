// ── Domain model ──
//
// Canonical representations of venue cameras, their detection zones, and
// the telemetry they report. Consumers (CLI, tests) depend on these, never
// on the wire types in `venuecam-api`.

pub mod area;
pub mod camera;
pub mod geometry;
pub mod telemetry;

pub use area::{AreaProfile, AreaType, MetricField, ZoneKind};
pub use camera::{Camera, CameraId, CameraStatus};
pub use geometry::{Point2D, ZoneGeometry};
pub use telemetry::{Reading, TelemetrySnapshot};
