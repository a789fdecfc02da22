// ── Backend seam ──
//
// The store and scheduler talk to the venue backend through this trait so
// tests can substitute an in-memory backend. `HttpBackend` is the real one.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use venuecam_api::transport::{TlsMode, TransportConfig};
use venuecam_api::{BearerToken, CameraUpdateRequest, RequestSigner, Unsigned, VenueClient};

use crate::config::{MonitorConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::{Camera, CameraId, ZoneGeometry};

/// Fields pushed by a camera save. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraUpdate {
    pub rtsp_url: Option<String>,
    pub roi_settings: Option<ZoneGeometry>,
}

/// Source of camera data and sink for configuration updates.
pub trait CameraBackend: Send + Sync + 'static {
    /// Every camera, each with its latest telemetry embedded.
    fn list_cameras(&self) -> impl Future<Output = Result<Vec<Camera>, CoreError>> + Send;

    /// Push a configuration change for one camera.
    fn update_camera(
        &self,
        id: CameraId,
        update: &CameraUpdate,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── HTTP backend ─────────────────────────────────────────────────────

/// [`CameraBackend`] over the venue REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: VenueClient,
}

fn build_transport(config: &MonitorConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

impl HttpBackend {
    pub fn new(config: &MonitorConfig) -> Result<Self, CoreError> {
        let signer: Arc<dyn RequestSigner> = match &config.token {
            Some(token) => Arc::new(BearerToken::new(token.clone())),
            None => Arc::new(Unsigned),
        };
        let client = VenueClient::new(config.api_url.as_str(), &build_transport(config), signer)?;
        Ok(Self { client })
    }

    /// Fetch one camera's stored configuration directly.
    pub async fn fetch_camera(&self, id: CameraId) -> Result<Camera, CoreError> {
        let resp = self.client.get_camera(id.0).await?;
        let area = resp.area_type.clone();
        convert::camera_from_response(resp).ok_or_else(|| {
            CoreError::Internal(format!("camera {id} has unsupported area type {area}"))
        })
    }
}

impl CameraBackend for HttpBackend {
    async fn list_cameras(&self) -> Result<Vec<Camera>, CoreError> {
        let raw = self.client.list_dashboard_cameras().await?;
        let total = raw.len();
        let cameras: Vec<Camera> = raw
            .into_iter()
            .filter_map(convert::camera_from_response)
            .collect();
        debug!(total, usable = cameras.len(), "fetched camera list");
        Ok(cameras)
    }

    async fn update_camera(&self, id: CameraId, update: &CameraUpdate) -> Result<(), CoreError> {
        let roi_settings = update
            .roi_settings
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::Internal(format!("cannot encode zone: {e}")))?;
        let body = CameraUpdateRequest {
            rtsp_url: update.rtsp_url.clone(),
            roi_settings,
        };
        self.client.update_camera(id.0, &body).await?;
        Ok(())
    }
}
