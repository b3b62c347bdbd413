//! Bearer token cache with expiry-based renewal.
//!
//! A token is reused until `expires_at`, which is the issue time plus the
//! server's `expires_in` minus a 60 second margin. The cache lock is held
//! across the expiry check and the fetch, so callers sharing one cache never
//! fetch twice for the same expiry.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::Credentials;
use crate::errors::OpsRampError;

/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 7199;

/// Renew this many seconds before the server-side expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.access_token.chars().take(8).collect();
        f.debug_struct("Token")
            .field("access_token", &format!("{}...", prefix))
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    expires_in: Option<i64>,
}

pub struct TokenCache {
    credentials: Credentials,
    http: reqwest::Client,
    state: Mutex<Option<Token>>,
}

impl TokenCache {
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            state: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    /// Return a valid token, fetching a new one only when nothing is cached
    /// or the cached token has passed `expires_at`.
    pub async fn acquire(&self) -> Result<Token, OpsRampError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if token.is_valid_at(Utc::now()) {
                return Ok(token.clone());
            }
            tracing::debug!(
                base_url = %self.credentials.base_url,
                expired_at = %token.expires_at,
                "Cached token expired, renewing"
            );
        }

        let token = self.fetch().await?;
        *state = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token; the next `acquire()` goes to the network.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    /// `Authorization` header value for API calls.
    pub async fn bearer_header(&self) -> Result<String, OpsRampError> {
        let token = self.acquire().await?;
        Ok(format!("Bearer {}", token.access_token))
    }

    async fn fetch(&self) -> Result<Token, OpsRampError> {
        let url = format!("{}/tenancy/auth/oauth/token", self.credentials.base_url);
        tracing::info!(url = %url, client_id = %self.credentials.client_id, "Requesting access token");

        let resp = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                OpsRampError::Authentication(format!("token request to {} failed: {}", url, e))
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            OpsRampError::Authentication(format!("failed to read token response: {}", e))
        })?;

        if !status.is_success() {
            return Err(OpsRampError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            OpsRampError::Authentication(format!("malformed token response: {}", e))
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                OpsRampError::Authentication("token response has no access_token".into())
            })?;
        let token_type = parsed.token_type.ok_or_else(|| {
            OpsRampError::Authentication("token response has no token_type".into())
        })?;
        let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        let issued_at = Utc::now();
        let expires_at = expires_in
            .checked_sub(EXPIRY_MARGIN_SECS)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                OpsRampError::Authentication(format!(
                    "token response has invalid expires_in: {}",
                    expires_in
                ))
            })?;

        let token = Token {
            access_token,
            token_type,
            scope: parsed.scope.unwrap_or_default(),
            expires_in,
            expires_at,
        };

        tracing::info!(expires_at = %token.expires_at, "Access token issued");
        Ok(token)
    }
}
