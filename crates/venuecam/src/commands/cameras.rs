//! Camera command handlers.

use tabled::Tabled;

use venuecam_core::analytics::build_dashboard;
use venuecam_core::{
    Camera, CameraId, CameraView, HttpBackend, Monitor, MonitorConfig, RoiDraft, zone,
};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{dashboard, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Stream")]
    stream: String,
    #[tabled(rename = "Zone")]
    zone: String,
}

impl From<&Camera> for CameraRow {
    fn from(c: &Camera) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            area: c.area_type.to_string(),
            status: c.status.to_string(),
            stream: c.rtsp_url.clone(),
            zone: c
                .roi_settings
                .as_ref()
                .map_or_else(|| "-".into(), venuecam_core::ZoneGeometry::summary),
        }
    }
}

fn detail(v: &CameraView, color: bool) -> String {
    let c = &v.camera;
    let mut lines = vec![
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("Area:      {}", c.area_type),
        format!("Status:    {}", output::status_label(c.status, color)),
        format!(
            "Stream:    {}",
            if c.rtsp_url.is_empty() { "-" } else { c.rtsp_url.as_str() }
        ),
        format!(
            "Heartbeat: {}",
            c.last_heartbeat
                .map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
    ];
    match c.roi_settings {
        Some(ref zone) => {
            lines.push("Zone:".into());
            lines.extend(zone::serialize(zone).lines().map(|l| format!("  {l}")));
        }
        None => lines.push("Zone:      -".into()),
    }
    lines.push(format!("Metrics:   {}", dashboard::metrics_summary(v)));
    lines.join("\n")
}

fn render_camera(view: &CameraView, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_single(
        &global.output,
        view,
        |v| detail(v, color),
        |v| v.camera.id.to_string(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: MonitorConfig,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CamerasCommand::List { area } => {
            let cameras = Monitor::oneshot(config, |m| async move {
                Ok::<_, CliError>(m.cameras())
            })
            .await?;
            let cameras: Vec<Camera> = cameras
                .into_iter()
                .filter(|c| util::area_matches(area, c.area_type))
                .collect();

            let out = output::render_list(
                &global.output,
                &cameras,
                |c| CameraRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CamerasCommand::Show { id, remote } => {
            let id = CameraId(id);
            let view = if remote {
                let camera = HttpBackend::new(&config)?.fetch_camera(id).await?;
                build_dashboard(std::slice::from_ref(&camera))
                    .into_iter()
                    .next()
            } else {
                Monitor::oneshot(config, |m| async move {
                    Ok::<_, CliError>(m.snapshot().cameras.iter().find(|v| v.id() == id).cloned())
                })
                .await?
            };
            let view = view.ok_or_else(|| CliError::camera_not_found(id.to_string()))?;

            let out = render_camera(&view, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CamerasCommand::Set {
            id,
            rtsp_url,
            roi,
            roi_file,
        } => {
            let roi_text = match (roi, roi_file) {
                (Some(text), _) => Some(util::read_input(&text)?),
                (None, Some(path)) => Some(util::read_text_file(&path)?),
                (None, None) => None,
            };
            if rtsp_url.is_none() && roi_text.is_none() {
                return Err(CliError::Validation {
                    field: "set".into(),
                    reason: "nothing to change; pass --rtsp-url, --roi, or --roi-file".into(),
                });
            }

            let id = CameraId(id);
            let pb = output::spinner(global, "Saving camera...");
            let result = Monitor::oneshot(config, |m| async move {
                let store = m.store();
                if store.camera(id).is_none() {
                    return Err(CliError::camera_not_found(id.to_string()));
                }
                if let Some(url) = rtsp_url {
                    store.set_rtsp_url(id, url);
                }
                if let Some(text) = roi_text {
                    match store.stage_roi_text(id, &text) {
                        RoiDraft::Parsed(_) => {}
                        RoiDraft::Invalid(e) => return Err(e.into()),
                        RoiDraft::UnknownCamera => {
                            return Err(CliError::camera_not_found(id.to_string()));
                        }
                    }
                }
                Ok(m.save(id).await?)
            })
            .await;
            pb.finish_and_clear();
            let saved = result?;

            if !global.quiet {
                eprintln!("Camera {} saved", saved.id);
            }
            let view = build_dashboard(std::slice::from_ref(&saved))
                .into_iter()
                .next()
                .ok_or_else(|| CliError::camera_not_found(id.to_string()))?;
            let out = render_camera(&view, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
