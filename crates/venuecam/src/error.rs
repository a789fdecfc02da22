//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use venuecam_config::ConfigError;
use venuecam_core::{CoreError, SaveError, ValidationError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the venue backend at {url}")]
    #[diagnostic(
        code(venuecam::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(venuecam::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not authorized by the venue backend")]
    #[diagnostic(
        code(venuecam::auth_failed),
        help(
            "Verify the bearer token for this profile.\n\
             Run: venuecam config set-token"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(venuecam::not_found),
        help("Run: venuecam {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(venuecam::conflict), help("Wait for the pending save and retry."))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(venuecam::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(venuecam::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid zone: {0}")]
    #[diagnostic(
        code(venuecam::invalid_zone),
        help("Print a valid starting point with: venuecam zone template --area <AREA>")
    )]
    InvalidZone(#[from] ValidationError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(venuecam::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: venuecam config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No venue backend configured")]
    #[diagnostic(
        code(venuecam::no_config),
        help(
            "Create a profile with: venuecam config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(venuecam::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(code(venuecam::keyring))]
    Keyring(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(venuecam::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(venuecam::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(venuecam::config_write))]
    ConfigWrite(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::InvalidZone(_) | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    pub(crate) fn camera_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "camera".into(),
            identifier: identifier.into(),
            list_command: "cameras list".into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound { message } => CliError::camera_not_found(message),
            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "unknown".into(), |s| s.to_string()),
                message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

impl From<SaveError> for CliError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::UnknownCamera { id } => CliError::camera_not_found(id.to_string()),
            SaveError::Invalid(v) => CliError::InvalidZone(v),
            e @ SaveError::SaveInProgress { .. } => CliError::Conflict {
                message: e.to_string(),
            },
            SaveError::RemoteUpdateFailed { status, message } => match status {
                Some(401) => CliError::AuthFailed { message },
                Some(404) => CliError::camera_not_found(message),
                Some(code) => CliError::ApiError {
                    code: code.to_string(),
                    message,
                },
                None => CliError::ApiError {
                    code: "transport".into(),
                    message,
                },
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Keyring(message) => CliError::Keyring(message),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::ConfigWrite(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use venuecam_core::CameraId;

    #[test]
    fn exit_codes_follow_error_class() {
        let cases = [
            (CliError::from(CoreError::Timeout), exit_code::TIMEOUT),
            (
                CliError::from(CoreError::Unauthorized {
                    message: "bad token".into(),
                }),
                exit_code::AUTH,
            ),
            (
                CliError::from(SaveError::SaveInProgress { id: CameraId(2) }),
                exit_code::CONFLICT,
            ),
            (
                CliError::from(CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                }),
                exit_code::CONNECTION,
            ),
            (
                CliError::from(SaveError::UnknownCamera { id: CameraId(9) }),
                exit_code::NOT_FOUND,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn remote_rejection_maps_by_status() {
        let err = CliError::from(SaveError::RemoteUpdateFailed {
            status: Some(422),
            message: "roi_settings: bad".into(),
        });
        assert!(matches!(err, CliError::ApiError { ref code, .. } if code == "422"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
