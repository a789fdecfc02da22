// Async HTTP client for the venue backend REST API.
//
// Base path: /api/v1/
// Auth: delegated to an injected `RequestSigner`

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::RequestSigner;
use crate::types::ErrorResponse;
use crate::{Error, TransportConfig};

const API_PREFIX: &str = "/api/v1";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the venue backend.
///
/// Cheap to clone: the HTTP pool and signer are shared.
#[derive(Clone)]
pub struct VenueClient {
    http: reqwest::Client,
    base_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl std::fmt::Debug for VenueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl VenueClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL, transport settings, and signer.
    ///
    /// `base_url` may point at the server root (`https://host`) or already
    /// include the `/api/v1` prefix.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http, signer)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            signer,
        })
    }

    /// Ensure the base URL ends with `/api/v1/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with(API_PREFIX) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{API_PREFIX}/"));
        }

        Ok(url)
    }

    /// The normalized base URL (always ends in `/api/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"cameras/3"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        Self::handle_response(resp).await
    }

    /// Sign and send. Builder failures here come from signer headers.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        self.signer.sign(request).send().await.map_err(|e| {
            if e.is_builder() {
                Error::InvalidHeader {
                    message: e.to_string(),
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();

        let detail = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            detail,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_prefix() {
        let url = VenueClient::normalize_base_url("http://venue.local:8000").unwrap();
        assert_eq!(url.as_str(), "http://venue.local:8000/api/v1/");
    }

    #[test]
    fn base_url_keeps_existing_prefix() {
        let url = VenueClient::normalize_base_url("https://venue.local/api/v1/").unwrap();
        assert_eq!(url.as_str(), "https://venue.local/api/v1/");
    }

    #[test]
    fn base_url_under_reverse_proxy_path() {
        let url = VenueClient::normalize_base_url("https://gw.example/backend/").unwrap();
        assert_eq!(url.as_str(), "https://gw.example/backend/api/v1/");
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(matches!(
            VenueClient::normalize_base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
