// venuecam-api: Async Rust client for the venue camera backend REST API

pub mod auth;
pub mod cameras;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{BearerToken, RequestSigner, Unsigned};
pub use client::VenueClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{CameraResponse, CameraUpdateRequest};
