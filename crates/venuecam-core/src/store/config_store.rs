// ── Camera configuration store ──
//
// Holds the authoritative camera list plus operator edits that have not
// been saved yet. Entries live in a DashMap keyed by camera id; no shard
// lock is ever held across an await point. In-flight saves are tracked
// apart from the entries so a reload can never reset them.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{CameraBackend, CameraUpdate};
use crate::model::{Camera, CameraId, ZoneGeometry};
use crate::zone::{self, ValidationError};

// ── Public types ─────────────────────────────────────────────────────

/// Why a save did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Camera {id} is not known")]
    UnknownCamera { id: CameraId },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A save for camera {id} is already in progress")]
    SaveInProgress { id: CameraId },

    #[error("Backend rejected the update: {message}")]
    RemoteUpdateFailed {
        status: Option<u16>,
        message: String,
    },
}

/// Outcome of staging ROI text.
#[derive(Debug, Clone, PartialEq)]
pub enum RoiDraft {
    /// The text parsed and is now the staged zone.
    Parsed(ZoneGeometry),
    /// The text did not parse; staged and committed zones are unchanged.
    Invalid(ValidationError),
    UnknownCamera,
}

/// Edits staged against one camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedEdit {
    pub rtsp_url: Option<String>,
    pub roi_settings: Option<ZoneGeometry>,
}

impl StagedEdit {
    pub fn is_empty(&self) -> bool {
        self.rtsp_url.is_none() && self.roi_settings.is_none()
    }
}

// ── Internal state ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Draft {
    text: String,
    error: Option<ValidationError>,
}

#[derive(Debug)]
struct Entry {
    position: usize,
    committed: Camera,
    staged: StagedEdit,
    draft: Option<Draft>,
}

impl Entry {
    fn new(position: usize, committed: Camera) -> Self {
        Self {
            position,
            committed,
            staged: StagedEdit::default(),
            draft: None,
        }
    }

    fn edited(&self) -> Camera {
        let mut cam = self.committed.clone();
        if let Some(url) = &self.staged.rtsp_url {
            cam.rtsp_url.clone_from(url);
        }
        if let Some(zone) = &self.staged.roi_settings {
            cam.roi_settings = Some(zone.clone());
        }
        cam
    }

    fn is_dirty(&self) -> bool {
        let url_changed = self
            .staged
            .rtsp_url
            .as_ref()
            .is_some_and(|url| *url != self.committed.rtsp_url);
        let zone_changed = self
            .staged
            .roi_settings
            .as_ref()
            .is_some_and(|zone| Some(zone) != self.committed.roi_settings.as_ref());
        let broken_draft = self.draft.as_ref().is_some_and(|d| d.error.is_some());
        url_changed || zone_changed || broken_draft
    }
}

/// What a save sent, so completion only clears edits that still match.
struct Sent {
    rtsp_url: String,
    zone: Option<ZoneGeometry>,
    staged: StagedEdit,
    draft_text: Option<String>,
}

/// Releases the camera's in-flight marker however the save future ends.
struct SavingGuard<'a> {
    in_flight: &'a DashSet<CameraId>,
    id: CameraId,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Editable camera list with dirty tracking and per-camera saves.
pub struct CameraConfigStore<B> {
    backend: Arc<B>,
    entries: DashMap<CameraId, Entry>,
    in_flight: DashSet<CameraId>,
}

impl<B: CameraBackend> CameraConfigStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            entries: DashMap::new(),
            in_flight: DashSet::new(),
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Replace the committed snapshot with `cameras`.
    ///
    /// Staged edits of cameras still present survive; those of cameras
    /// that disappeared are dropped.
    pub fn load_all(&self, cameras: Vec<Camera>) {
        let present: HashSet<CameraId> = cameras.iter().map(|c| c.id).collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| present.contains(id));
        let dropped = before - self.entries.len();

        for (position, camera) in cameras.into_iter().enumerate() {
            self.entries
                .entry(camera.id)
                .and_modify(|entry| {
                    entry.position = position;
                    entry.committed = camera.clone();
                })
                .or_insert_with(|| Entry::new(position, camera));
        }

        debug!(cameras = self.entries.len(), dropped, "camera config reloaded");
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Committed camera by id.
    pub fn camera(&self, id: CameraId) -> Option<Camera> {
        self.entries.get(&id).map(|e| e.committed.clone())
    }

    /// Committed snapshot, in backend order.
    pub fn cameras(&self) -> Vec<Camera> {
        let mut rows: Vec<(usize, Camera)> = self
            .entries
            .iter()
            .map(|e| (e.position, e.committed.clone()))
            .collect();
        rows.sort_by_key(|(position, _)| *position);
        rows.into_iter().map(|(_, cam)| cam).collect()
    }

    /// Committed camera with staged edits applied.
    pub fn edited(&self, id: CameraId) -> Option<Camera> {
        self.entries.get(&id).map(|e| e.edited())
    }

    pub fn staged(&self, id: CameraId) -> Option<StagedEdit> {
        self.entries.get(&id).map(|e| e.staged.clone())
    }

    /// Raw ROI text last staged for `id`, valid or not.
    pub fn roi_draft(&self, id: CameraId) -> Option<String> {
        self.entries
            .get(&id)
            .and_then(|e| e.draft.as_ref().map(|d| d.text.clone()))
    }

    pub fn is_dirty(&self, id: CameraId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.is_dirty())
    }

    pub fn dirty_ids(&self) -> Vec<CameraId> {
        let mut ids: Vec<(usize, CameraId)> = self
            .entries
            .iter()
            .filter(|e| e.is_dirty())
            .map(|e| (e.position, *e.key()))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    pub fn is_saving(&self, id: CameraId) -> bool {
        self.in_flight.contains(&id)
    }

    // ── Staging ──────────────────────────────────────────────────────

    /// Stage a stream URL. Not validated. Returns `false` for an unknown id.
    pub fn set_rtsp_url(&self, id: CameraId, value: impl Into<String>) -> bool {
        match self.entries.get_mut(&id) {
            Some(mut entry) => {
                entry.staged.rtsp_url = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Stage ROI text. The text is kept as the camera's draft either way;
    /// only text that parses replaces the staged zone.
    pub fn stage_roi_text(&self, id: CameraId, text: &str) -> RoiDraft {
        let Some(mut entry) = self.entries.get_mut(&id) else {
            return RoiDraft::UnknownCamera;
        };

        match zone::parse(text) {
            Ok(geometry) => {
                entry.staged.roi_settings = Some(geometry.clone());
                entry.draft = Some(Draft {
                    text: text.to_owned(),
                    error: None,
                });
                RoiDraft::Parsed(geometry)
            }
            Err(err) => {
                debug!(camera = %id, error = %err, "ROI draft does not parse");
                entry.draft = Some(Draft {
                    text: text.to_owned(),
                    error: Some(err.clone()),
                });
                RoiDraft::Invalid(err)
            }
        }
    }

    /// Drop staged edits and the draft for `id`.
    pub fn discard(&self, id: CameraId) -> bool {
        match self.entries.get_mut(&id) {
            Some(mut entry) => {
                entry.staged = StagedEdit::default();
                entry.draft = None;
                true
            }
            None => false,
        }
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Validate and push the edited configuration of `id`.
    ///
    /// The zone sent is the staged one, or the committed one when nothing
    /// is staged; a draft that failed to parse is display state only.
    /// Invalid zones never reach the backend. On success the sent values
    /// become the committed baseline; on failure the staged edit is kept.
    pub async fn save(&self, id: CameraId) -> Result<Camera, SaveError> {
        let sent = self.begin_save(id)?;
        let _guard = SavingGuard {
            in_flight: &self.in_flight,
            id,
        };

        let update = CameraUpdate {
            rtsp_url: Some(sent.rtsp_url.clone()),
            roi_settings: sent.zone.clone(),
        };
        let result = self.backend.update_camera(id, &update).await;

        match result {
            Ok(()) => self.finish_save(id, sent),
            Err(err) => {
                warn!(camera = %id, error = %err, "camera update failed");
                Err(SaveError::RemoteUpdateFailed {
                    status: err.status(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Validate under the entry lock and mark the save in flight.
    fn begin_save(&self, id: CameraId) -> Result<Sent, SaveError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(SaveError::UnknownCamera { id })?;

        if self.in_flight.contains(&id) {
            return Err(SaveError::SaveInProgress { id });
        }

        let edited = entry.edited();
        let zone = edited
            .roi_settings
            .as_ref()
            .map(|candidate| zone::validate(edited.area_type, candidate))
            .transpose()?;

        self.in_flight.insert(id);
        Ok(Sent {
            rtsp_url: edited.rtsp_url,
            zone,
            staged: entry.staged.clone(),
            draft_text: entry.draft.as_ref().map(|d| d.text.clone()),
        })
    }

    /// Commit what was sent and clear only the edits that still match it.
    fn finish_save(&self, id: CameraId, sent: Sent) -> Result<Camera, SaveError> {
        let Some(mut entry) = self.entries.get_mut(&id) else {
            warn!(camera = %id, "camera disappeared while its save was in flight");
            return Err(SaveError::UnknownCamera { id });
        };

        entry.committed.rtsp_url = sent.rtsp_url;
        if sent.zone.is_some() {
            entry.committed.roi_settings = sent.zone;
        }

        if entry.staged.rtsp_url == sent.staged.rtsp_url {
            entry.staged.rtsp_url = None;
        }
        if entry.staged.roi_settings == sent.staged.roi_settings {
            entry.staged.roi_settings = None;
        }
        if entry.draft.as_ref().map(|d| &d.text) == sent.draft_text.as_ref() {
            entry.draft = None;
        }

        info!(camera = %id, "camera configuration saved");
        Ok(entry.committed.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::model::{AreaType, Point2D};
    use crate::testing::{FakeBackend, camera};

    fn store_with(cameras: Vec<Camera>) -> (Arc<FakeBackend>, Arc<CameraConfigStore<FakeBackend>>) {
        let backend = Arc::new(FakeBackend::default());
        let store = Arc::new(CameraConfigStore::new(backend.clone()));
        store.load_all(cameras);
        (backend, store)
    }

    const LINE: &str = r#"{"type": "LINE", "start": [0, 100], "end": [640, 100]}"#;

    async fn wait_for_update(backend: &FakeBackend) {
        while backend.update_calls() == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn load_preserves_backend_order() {
        let (_, store) = store_with(vec![
            camera(9, AreaType::Kitchen),
            camera(2, AreaType::Dining),
            camera(5, AreaType::Entrance),
        ]);
        let ids: Vec<u64> = store.cameras().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn reload_keeps_edits_of_present_cameras_only() {
        let (_, store) = store_with(vec![camera(1, AreaType::Entrance), camera(2, AreaType::Dining)]);
        assert!(store.set_rtsp_url(CameraId(1), "rtsp://new/1"));
        assert!(store.set_rtsp_url(CameraId(2), "rtsp://new/2"));

        store.load_all(vec![camera(1, AreaType::Entrance)]);

        assert!(store.is_dirty(CameraId(1)));
        assert_eq!(store.edited(CameraId(1)).unwrap().rtsp_url, "rtsp://new/1");
        assert!(store.camera(CameraId(2)).is_none());
        assert!(!store.set_rtsp_url(CameraId(2), "rtsp://again"));
    }

    #[test]
    fn invalid_roi_text_leaves_zones_alone() {
        let mut cam = camera(1, AreaType::Entrance);
        cam.roi_settings = Some(zone::template(AreaType::Entrance));
        let (_, store) = store_with(vec![cam.clone()]);

        let draft = store.stage_roi_text(CameraId(1), "{invalid json");

        assert!(matches!(
            draft,
            RoiDraft::Invalid(ValidationError::MalformedGeometry { .. })
        ));
        assert_eq!(store.camera(CameraId(1)).unwrap().roi_settings, cam.roi_settings);
        assert_eq!(store.edited(CameraId(1)).unwrap().roi_settings, cam.roi_settings);
        assert_eq!(store.roi_draft(CameraId(1)).as_deref(), Some("{invalid json"));
        assert!(store.is_dirty(CameraId(1)));
    }

    #[test]
    fn valid_roi_text_is_staged() {
        let (_, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        let draft = store.stage_roi_text(CameraId(1), LINE);
        assert!(matches!(draft, RoiDraft::Parsed(ZoneGeometry::Line { .. })));
        assert!(store.is_dirty(CameraId(1)));
        assert_eq!(store.dirty_ids(), vec![CameraId(1)]);
        assert_eq!(store.stage_roi_text(CameraId(7), LINE), RoiDraft::UnknownCamera);
    }

    #[test]
    fn discard_clears_everything_staged() {
        let (_, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        store.set_rtsp_url(CameraId(1), "rtsp://x");
        store.stage_roi_text(CameraId(1), "nope");
        assert!(store.discard(CameraId(1)));
        assert!(!store.is_dirty(CameraId(1)));
        assert_eq!(store.roi_draft(CameraId(1)), None);
    }

    #[tokio::test]
    async fn wrong_variant_never_reaches_backend() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        store.stage_roi_text(
            CameraId(1),
            r#"{"type": "RECTANGLE", "x": 0, "y": 0, "width": 10, "height": 10}"#,
        );

        let err = store.save(CameraId(1)).await.unwrap_err();

        assert!(matches!(
            err,
            SaveError::Invalid(ValidationError::SchemaMismatch { .. })
        ));
        assert_eq!(backend.update_calls(), 0);
        assert!(!store.is_saving(CameraId(1)));
    }

    #[tokio::test]
    async fn broken_draft_saves_last_parsed_zone() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        store.stage_roi_text(CameraId(1), LINE);
        let draft = store.stage_roi_text(CameraId(1), r#"{"type":"LINE","start":[0,1],"end":[5,"#);
        assert!(matches!(draft, RoiDraft::Invalid(_)));

        let saved = store.save(CameraId(1)).await.unwrap();

        let line = ZoneGeometry::Line {
            start: Point2D::new(0.0, 100.0),
            end: Point2D::new(640.0, 100.0),
        };
        assert_eq!(saved.roi_settings, Some(line.clone()));
        assert_eq!(backend.updates.lock().unwrap()[0].1.roi_settings, Some(line));
        assert_eq!(store.roi_draft(CameraId(1)), None);
        assert!(!store.is_dirty(CameraId(1)));
    }

    #[tokio::test]
    async fn successful_save_commits_and_clears() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        store.set_rtsp_url(CameraId(1), "rtsp://new/1");
        store.stage_roi_text(CameraId(1), LINE);

        let saved = store.save(CameraId(1)).await.unwrap();

        assert_eq!(saved.rtsp_url, "rtsp://new/1");
        assert_eq!(
            saved.roi_settings,
            Some(ZoneGeometry::Line {
                start: Point2D::new(0.0, 100.0),
                end: Point2D::new(640.0, 100.0),
            })
        );
        assert!(!store.is_dirty(CameraId(1)));
        assert_eq!(store.roi_draft(CameraId(1)), None);
        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates[0].1.rtsp_url.as_deref(), Some("rtsp://new/1"));
    }

    #[tokio::test]
    async fn save_without_zone_sends_url_only() {
        let (backend, store) = store_with(vec![camera(4, AreaType::Kitchen)]);
        store.set_rtsp_url(CameraId(4), "rtsp://k/4");
        store.save(CameraId(4)).await.unwrap();
        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates[0].1.roi_settings, None);
    }

    #[tokio::test]
    async fn failed_save_keeps_staged_edit() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        *backend.fail_update.lock().unwrap() = Some(500);
        store.set_rtsp_url(CameraId(1), "rtsp://new/1");

        let err = store.save(CameraId(1)).await.unwrap_err();

        assert!(matches!(
            err,
            SaveError::RemoteUpdateFailed {
                status: Some(500),
                ..
            }
        ));
        assert!(store.is_dirty(CameraId(1)));
        assert_eq!(store.camera(CameraId(1)).unwrap().rtsp_url, "rtsp://10.0.0.1/live");
        assert!(!store.is_saving(CameraId(1)));
    }

    #[tokio::test]
    async fn second_save_while_pending_is_rejected() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        *backend.hold_update.lock().unwrap() = true;
        store.set_rtsp_url(CameraId(1), "rtsp://new/1");

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.save(CameraId(1)).await }
        });
        wait_for_update(&backend).await;

        let second = store.save(CameraId(1)).await;
        assert_eq!(second, Err(SaveError::SaveInProgress { id: CameraId(1) }));

        backend.release_update.notify_one();
        let saved = first.await.unwrap().unwrap();
        assert_eq!(saved.rtsp_url, "rtsp://new/1");
        assert_eq!(backend.update_calls(), 1);
    }

    #[tokio::test]
    async fn saves_on_different_cameras_are_independent() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance), camera(2, AreaType::Kitchen)]);
        *backend.hold_update.lock().unwrap() = true;
        store.set_rtsp_url(CameraId(1), "rtsp://new/1");

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.save(CameraId(1)).await }
        });
        wait_for_update(&backend).await;

        *backend.hold_update.lock().unwrap() = false;
        store.set_rtsp_url(CameraId(2), "rtsp://new/2");
        assert!(store.save(CameraId(2)).await.is_ok());

        backend.release_update.notify_one();
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn edit_staged_during_save_survives_commit() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        *backend.hold_update.lock().unwrap() = true;
        store.set_rtsp_url(CameraId(1), "rtsp://first");

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.save(CameraId(1)).await }
        });
        wait_for_update(&backend).await;

        store.set_rtsp_url(CameraId(1), "rtsp://second");
        // A refresh lands mid-save with the pre-save configuration.
        store.load_all(vec![camera(1, AreaType::Entrance)]);

        backend.release_update.notify_one();
        let committed = pending.await.unwrap().unwrap();

        assert_eq!(committed.rtsp_url, "rtsp://first");
        assert_eq!(store.edited(CameraId(1)).unwrap().rtsp_url, "rtsp://second");
        assert!(store.is_dirty(CameraId(1)));
    }

    #[tokio::test]
    async fn save_for_vanished_camera_is_discarded() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        *backend.hold_update.lock().unwrap() = true;
        store.set_rtsp_url(CameraId(1), "rtsp://first");

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.save(CameraId(1)).await }
        });
        wait_for_update(&backend).await;

        store.load_all(Vec::new());
        backend.release_update.notify_one();

        assert_eq!(
            pending.await.unwrap(),
            Err(SaveError::UnknownCamera { id: CameraId(1) })
        );
    }

    #[tokio::test]
    async fn reappearing_camera_keeps_its_pending_save() {
        let (backend, store) = store_with(vec![camera(1, AreaType::Entrance)]);
        *backend.hold_update.lock().unwrap() = true;
        store.set_rtsp_url(CameraId(1), "rtsp://first");

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.save(CameraId(1)).await }
        });
        wait_for_update(&backend).await;

        store.load_all(Vec::new());
        store.load_all(vec![camera(1, AreaType::Entrance)]);
        store.set_rtsp_url(CameraId(1), "rtsp://second");

        assert!(store.is_saving(CameraId(1)));
        assert_eq!(
            store.save(CameraId(1)).await,
            Err(SaveError::SaveInProgress { id: CameraId(1) })
        );

        backend.release_update.notify_one();
        pending.await.unwrap().unwrap();
        assert!(!store.is_saving(CameraId(1)));
        assert_eq!(backend.update_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_camera_save() {
        let (_, store) = store_with(Vec::new());
        assert_eq!(
            store.save(CameraId(3)).await,
            Err(SaveError::UnknownCamera { id: CameraId(3) })
        );
    }
}
