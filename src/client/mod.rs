//! HTTP client for one POD's OpsRamp API.
//!
//! Every call is bearer-authenticated through the POD's [`TokenCache`] and
//! awaited before the next one starts. No retries: a failed call is reported
//! to the caller as a typed [`OpsRampError`].

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::auth::{Credentials, Token, TokenCache};
use crate::config::PodConfig;
use crate::errors::OpsRampError;

mod clone;
mod customizations;
mod integrations;
mod search;
mod templates;

pub use clone::CloneResponse;
pub use search::{Endpoint, SearchQuery};
pub use templates::{TemplateFamily, CLONE_SCOPES};

/// Error bodies longer than this are cut in messages and logs.
const MAX_ERROR_BODY: usize = 500;

/// Build the shared HTTP client with a uniform request timeout.
pub fn build_http_client(
    timeout: Duration,
    accept_invalid_certs: bool,
) -> Result<reqwest::Client, OpsRampError> {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| OpsRampError::Config(format!("failed to build HTTP client: {}", e)))
}

pub struct OpsRampClient {
    label: String,
    base_url: String,
    tenant_id: String,
    http: reqwest::Client,
    tokens: TokenCache,
}

impl OpsRampClient {
    pub fn new(
        label: impl Into<String>,
        credentials: Credentials,
        tenant_id: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            label: label.into(),
            base_url: credentials.base_url.clone(),
            tenant_id: tenant_id.into(),
            tokens: TokenCache::new(credentials, http.clone()),
            http,
        }
    }

    /// Client for a configured POD. Fails when the POD has no tenant id.
    pub fn for_pod(pod: &PodConfig, http: reqwest::Client) -> Result<Self, OpsRampError> {
        let tenant_id = pod.tenant_id()?.to_string();
        Ok(Self::new(
            format!("POD{}", pod.number),
            pod.credentials.clone(),
            tenant_id,
            http,
        ))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Acquire (or reuse) this POD's bearer token.
    pub async fn authenticate(&self) -> Result<Token, OpsRampError> {
        self.tokens.acquire().await
    }

    /// `{base_url}/api/v2/tenants/{tenant_id}/{suffix}`
    pub(crate) fn tenant_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v2/tenants/{}/{}",
            self.base_url,
            self.tenant_id,
            suffix.trim_start_matches('/')
        )
    }

    /// Authenticated GET returning the decoded JSON body. Any non-2xx status
    /// is an error.
    pub(crate) async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, OpsRampError> {
        let req = self.http.get(url).query(query);
        let (status, body) = self.send(req, url).await?;
        if !status.is_success() {
            return Err(status_error(url, status, &body));
        }
        decode(url, &body)
    }

    /// Attach the bearer header, send, and read the body as text.
    pub(crate) async fn send(
        &self,
        req: RequestBuilder,
        url: &str,
    ) -> Result<(StatusCode, String), OpsRampError> {
        let bearer = self.tokens.bearer_header().await?;

        let resp = req
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                tracing::warn!(pod = %self.label, url = %url, "Request failed: {}", source);
                OpsRampError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| OpsRampError::Transport {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(pod = %self.label, url = %url, status = status.as_u16(), "Response received");
        Ok((status, body))
    }
}

pub(crate) fn status_error(url: &str, status: StatusCode, body: &str) -> OpsRampError {
    OpsRampError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body: truncate(body, MAX_ERROR_BODY),
    }
}

pub(crate) fn decode(url: &str, body: &str) -> Result<Value, OpsRampError> {
    serde_json::from_str(body).map_err(|e| OpsRampError::Decode {
        url: url.to_string(),
        reason: format!("{} (body: {})", e, truncate(body, 200)),
    })
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
