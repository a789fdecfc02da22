// ── Runtime connection configuration ──
//
// Describes how to reach the venue backend and how often to poll it.
// Never touches disk: the CLI resolves profiles and hands a
// `MonitorConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_CLOCK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed on-premise backends).
    DangerAcceptInvalid,
}

/// Everything a [`Monitor`](crate::Monitor) needs to talk to one backend.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Backend root (e.g. `http://venue.local:8000`).
    pub api_url: Url,
    /// Bearer token; `None` sends unsigned requests.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Data refresh period.
    pub refresh_interval: Duration,
    /// Presentation clock period.
    pub clock_interval: Duration,
}

impl MonitorConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            clock_interval: DEFAULT_CLOCK_INTERVAL,
        }
    }
}
