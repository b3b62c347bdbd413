use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::{decode, status_error, OpsRampClient};
use crate::errors::OpsRampError;
use crate::models::CustomizationPayload;

/// Body returned by the clone endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CloneResponse {
    /// Id of the newly created template, when the server reported one.
    pub id: Option<String>,
    pub body: Value,
}

impl OpsRampClient {
    /// Create a template in this tenant from a prepared clone payload.
    /// Only 200 and 201 count as success.
    pub async fn submit_clone(
        &self,
        payload: &CustomizationPayload,
    ) -> Result<CloneResponse, OpsRampError> {
        let url = format!(
            "{}/monitoring/api/v3/tenants/{}/templates/clone",
            self.base_url(),
            self.tenant_id()
        );

        let req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload);
        let (status, body) = self.send(req, &url).await?;

        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            tracing::warn!(pod = %self.label(), status = status.as_u16(), "Clone request rejected");
            return Err(status_error(&url, status, &body));
        }

        let body = decode(&url, &body)?;
        let id = body.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        tracing::info!(
            pod = %self.label(),
            new_template_id = id.as_deref().unwrap_or("N/A"),
            "Template cloned"
        );
        Ok(CloneResponse { id, body })
    }
}
