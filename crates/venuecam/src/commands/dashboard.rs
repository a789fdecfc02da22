//! Dashboard command handler and the shared dashboard renderer.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use tabled::Tabled;

use venuecam_core::{CameraView, DashboardSnapshot, Monitor, MonitorConfig, Reading};

use crate::cli::{AreaArg, DashboardArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraMetricsRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Metrics")]
    metrics: String,
}

/// `Label: value` pairs in area-profile order, or a placeholder when the
/// camera has not reported.
pub fn metrics_summary(view: &CameraView) -> String {
    if view.metrics.is_unknown() {
        return "no data".into();
    }
    view.readings()
        .into_iter()
        .map(|(field, value)| {
            let value = value.as_ref().map_or_else(|| "-".into(), Reading::to_string);
            format!("{}: {value}", field.label())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&CameraView> for CameraMetricsRow {
    fn from(v: &CameraView) -> Self {
        Self {
            id: v.camera.id.to_string(),
            name: v.camera.name.clone(),
            area: v.camera.area_type.to_string(),
            status: v.camera.status.to_string(),
            metrics: metrics_summary(v),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

/// Apply an `--area` filter to the camera views. Venue analytics always
/// cover every camera.
pub fn filtered(snapshot: &DashboardSnapshot, area: Option<AreaArg>) -> DashboardSnapshot {
    DashboardSnapshot {
        cameras: snapshot
            .cameras
            .iter()
            .filter(|v| util::area_matches(area, v.camera.area_type))
            .cloned()
            .collect(),
        ..snapshot.clone()
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn summary(snapshot: &DashboardSnapshot, now: DateTime<Utc>, color: bool) -> String {
    let a = &snapshot.analytics;
    let s = &a.status_counts;
    let mut out = String::new();

    let _ = writeln!(out, "Occupancy:       {}%", a.occupancy);
    let _ = writeln!(out, "Wait time:       {} min", a.wait_time);
    let _ = writeln!(out, "Transactions:    {}/h", a.transactions);
    let _ = writeln!(out, "Tables to clean: {}", a.tables_to_clean);
    let _ = writeln!(
        out,
        "Cameras:         {} total, {} reporting ({} online, {} warning, {} offline)",
        a.total_cameras, a.reporting_cameras, s.online, s.warning, s.offline
    );
    let refreshed = snapshot
        .refreshed_at
        .map_or_else(|| "never".into(), local_time);
    let _ = write!(out, "Updated:         {refreshed} (now {})", local_time(now));
    if let Some(ref err) = snapshot.last_error {
        let _ = write!(out, "\n{}", output::error_line(&err.to_string(), color));
    }
    out
}

/// Render a dashboard snapshot in the selected format. `now` feeds the
/// presentation clock line of the table view.
pub fn render(
    snapshot: &DashboardSnapshot,
    now: DateTime<Utc>,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    match global.output {
        OutputFormat::Table => {
            let color = output::should_color(&global.color);
            let rows: Vec<CameraMetricsRow> =
                snapshot.cameras.iter().map(CameraMetricsRow::from).collect();
            let head = summary(snapshot, now, color);
            if rows.is_empty() {
                Ok(head)
            } else {
                Ok(format!("{head}\n\n{}", output::render_table(&rows)))
            }
        }
        OutputFormat::Plain => Ok(snapshot
            .cameras
            .iter()
            .map(|v| format!("{}\t{}", v.camera.id, metrics_summary(v)))
            .collect::<Vec<_>>()
            .join("\n")),
        ref format => output::render_single(format, snapshot, |_| String::new(), |_| String::new()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: MonitorConfig,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let pb = output::spinner(global, "Fetching cameras...");
    let result = Monitor::oneshot(config, |m| async move { Ok::<_, CliError>(m.snapshot()) }).await;
    pb.finish_and_clear();

    let snapshot = filtered(&*result?, args.area);
    let out = render(&snapshot, Utc::now(), global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use venuecam_core::analytics::build_dashboard;
    use venuecam_core::{AreaType, Camera, CameraId, CameraStatus, TelemetrySnapshot};

    fn camera(id: u64, area: AreaType, log: Option<TelemetrySnapshot>) -> Camera {
        Camera {
            id: CameraId(id),
            name: format!("cam-{id}"),
            area_type: area,
            status: CameraStatus::Online,
            rtsp_url: String::new(),
            roi_settings: None,
            latest_log: log,
            branch_id: None,
            last_heartbeat: None,
        }
    }

    #[test]
    fn silent_camera_reads_no_data() {
        let views = build_dashboard(&[camera(1, AreaType::Kitchen, None)]);
        assert_eq!(metrics_summary(&views[0]), "no data");
    }

    #[test]
    fn metrics_follow_profile_order() {
        let log = TelemetrySnapshot {
            occupancy_percentage: Some(62.5),
            tables_to_clean: Some(0),
            ..TelemetrySnapshot::default()
        };
        let views = build_dashboard(&[camera(2, AreaType::Dining, Some(log))]);
        let text = metrics_summary(&views[0]);
        assert!(text.starts_with("People: -"), "{text}");
        assert!(text.contains("Occupancy %: 62.5"), "{text}");
        assert!(text.ends_with("To clean: 0"), "{text}");
    }

    #[test]
    fn area_filter_keeps_venue_totals() {
        let cams = [
            camera(1, AreaType::Dining, None),
            camera(2, AreaType::Kitchen, None),
        ];
        let snapshot = DashboardSnapshot {
            cameras: build_dashboard(&cams),
            ..DashboardSnapshot::default()
        };
        let only = filtered(&snapshot, Some(AreaArg::Kitchen));
        assert_eq!(only.cameras.len(), 1);
        assert_eq!(only.cameras[0].camera.id, CameraId(2));
        assert_eq!(only.analytics, snapshot.analytics);
    }
}
