// ── Core error types ──
//
// User-facing errors from venuecam-core. Consumers never see reqwest or
// JSON failures directly: `From<venuecam_api::Error>` translates them.
// Zone, save, and refresh failures have their own typed enums next to the
// code that produces them.

use thiserror::Error;

/// Unified error type for backend-facing operations.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to venue backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    #[error("Request to the venue backend timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<venuecam_api::Error> for CoreError {
    fn from(err: venuecam_api::Error) -> Self {
        match err {
            venuecam_api::Error::Unauthorized => CoreError::Unauthorized {
                message: "the backend rejected the access token".into(),
            },
            venuecam_api::Error::InvalidHeader { message } => CoreError::Config {
                message: format!("Invalid credentials header: {message}"),
            },
            venuecam_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            venuecam_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            venuecam_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            venuecam_api::Error::Api { status: 404, detail } => {
                CoreError::NotFound { message: detail }
            }
            venuecam_api::Error::Api { status, detail } => CoreError::Api {
                message: detail,
                status: Some(status),
            },
            venuecam_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
