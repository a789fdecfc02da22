// Camera endpoints.

use crate::types::{CameraResponse, CameraUpdateRequest};
use crate::{Error, VenueClient};

impl VenueClient {
    /// List every camera with its status and latest detection log.
    ///
    /// `GET /api/v1/dashboard/cameras/`
    pub async fn list_dashboard_cameras(&self) -> Result<Vec<CameraResponse>, Error> {
        self.get("dashboard/cameras/").await
    }

    /// Fetch a single camera's configuration.
    ///
    /// `GET /api/v1/cameras/{id}`
    pub async fn get_camera(&self, id: u64) -> Result<CameraResponse, Error> {
        self.get(&format!("cameras/{id}")).await
    }

    /// Update a camera's stream URL and/or ROI settings.
    ///
    /// `PUT /api/v1/cameras/{id}`
    pub async fn update_camera(
        &self,
        id: u64,
        body: &CameraUpdateRequest,
    ) -> Result<CameraResponse, Error> {
        self.put(&format!("cameras/{id}"), body).await
    }
}
