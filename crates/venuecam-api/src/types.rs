// Wire types for the venue backend REST API.
//
// Field names follow the backend's snake_case JSON. Anything the backend
// stores as free-form JSON (ROI settings, detection logs) stays a
// `serde_json::Value` here; `venuecam-core` gives it a shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A camera as returned by `GET dashboard/cameras/` and `PUT cameras/{id}`.
///
/// The configuration endpoints omit `status` and `latest_log`, so both are
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraResponse {
    pub id: u64,
    #[serde(default)]
    pub branch_id: Option<u64>,
    pub name: String,
    pub area_type: String,
    #[serde(default)]
    pub rtsp_url: String,
    #[serde(default)]
    pub roi_settings: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_heartbeat: Option<String>,
    #[serde(default)]
    pub latest_log: Option<Value>,
}

/// Body of `PUT cameras/{id}`. Omitted fields are left unchanged upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtsp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_settings: Option<Value>,
}

/// Error body shape. `detail` is a string for handled errors and a list of
/// `{loc, msg, type}` items for request validation failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}
