//! OAuth2 client-credentials authentication against a POD.

mod token_cache;

pub use token_cache::{Token, TokenCache, DEFAULT_EXPIRES_IN_SECS, EXPIRY_MARGIN_SECS};

/// Client credentials for one POD. Immutable for the life of a session.
#[derive(Clone)]
pub struct Credentials {
    /// POD base URL without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
