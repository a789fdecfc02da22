// ── Camera configuration state ──

mod config_store;

pub use config_store::{CameraConfigStore, RoiDraft, SaveError, StagedEdit};
