use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Capability that attaches credentials to an outgoing request.
///
/// The client never stores session state of its own: whoever builds the
/// [`VenueClient`](crate::VenueClient) decides how requests are signed.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder;
}

/// `Authorization: Bearer <token>` signing.
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: SecretString,
}

impl BearerToken {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl RequestSigner for BearerToken {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.expose_secret())
    }
}

/// Sends requests without credentials (open development backends).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

impl RequestSigner for Unsigned {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}
