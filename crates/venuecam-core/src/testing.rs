// In-memory backend and fixtures shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::backend::{CameraBackend, CameraUpdate};
use crate::error::CoreError;
use crate::model::{AreaType, Camera, CameraId, CameraStatus};

pub(crate) fn camera(id: u64, area: AreaType) -> Camera {
    Camera {
        id: CameraId(id),
        name: format!("cam-{id}"),
        area_type: area,
        status: CameraStatus::Online,
        rtsp_url: format!("rtsp://10.0.0.{id}/live"),
        roi_settings: None,
        latest_log: None,
        branch_id: Some(1),
        last_heartbeat: None,
    }
}

/// Backend whose responses are set by the test. When `hold_*` is set the
/// call parks until the matching `Notify` is signalled.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub cameras: Mutex<Vec<Camera>>,
    pub fail_list: Mutex<Option<String>>,
    pub fail_update: Mutex<Option<u16>>,
    pub list_calls: AtomicUsize,
    pub updates: Mutex<Vec<(CameraId, CameraUpdate)>>,
    pub hold_list: Mutex<bool>,
    pub hold_update: Mutex<bool>,
    pub release_list: Notify,
    pub release_update: Notify,
}

impl FakeBackend {
    pub fn with_cameras(cameras: Vec<Camera>) -> Self {
        Self {
            cameras: Mutex::new(cameras),
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

impl CameraBackend for FakeBackend {
    async fn list_cameras(&self) -> Result<Vec<Camera>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let hold = *self.hold_list.lock().unwrap();
        if hold {
            self.release_list.notified().await;
        }
        let failure = self.fail_list.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(CoreError::ConnectionFailed {
                url: "http://fake".into(),
                reason: message,
            });
        }
        Ok(self.cameras.lock().unwrap().clone())
    }

    async fn update_camera(&self, id: CameraId, update: &CameraUpdate) -> Result<(), CoreError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        let hold = *self.hold_update.lock().unwrap();
        if hold {
            self.release_update.notified().await;
        }
        let failure = *self.fail_update.lock().unwrap();
        match failure {
            Some(status) => Err(CoreError::Api {
                message: "rejected".into(),
                status: Some(status),
            }),
            None => Ok(()),
        }
    }
}
