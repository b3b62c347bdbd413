use serde_json::Value;

use super::OpsRampClient;
use crate::errors::OpsRampError;
use crate::models::CustomizationPayload;

impl OpsRampClient {
    /// Full JSON body of a template, used as the source of a clone.
    pub async fn customizations(
        &self,
        template_id: &str,
    ) -> Result<CustomizationPayload, OpsRampError> {
        let url = self.tenant_url(&format!("templates/{}", template_id));

        match self.get_json(&url, &[]).await? {
            Value::Object(payload) => {
                tracing::info!(
                    pod = %self.label(),
                    template_id = %template_id,
                    fields = payload.len(),
                    "Fetched template customizations"
                );
                Ok(payload)
            }
            other => Err(OpsRampError::Decode {
                url,
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Credentials;
    use crate::client::OpsRampClient;
    use crate::errors::OpsRampError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpsRampClient {
        Mock::given(method("POST"))
            .and(path("/tenancy/auth/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "token_type": "bearer"
            })))
            .mount(server)
            .await;
        OpsRampClient::new(
            "POD1",
            Credentials::new(server.uri(), "k", "s"),
            "t1",
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_customizations_returns_full_body() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/t1/templates/c-1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "c-1",
                "name": "Disk Health",
                "monitors": [{"metric": "disk.used", "critical": 95}]
            })))
            .mount(&server)
            .await;

        let payload = client.customizations("c-1").await.unwrap();
        assert_eq!(payload["id"], "c-1");
        assert_eq!(payload["monitors"][0]["critical"], 95);
    }

    #[tokio::test]
    async fn test_customizations_not_found_is_status_error() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/t1/templates/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such template"))
            .mount(&server)
            .await;

        let err = client.customizations("missing").await.unwrap_err();
        assert!(matches!(err, OpsRampError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_customizations_rejects_non_object_body() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/t1/templates/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .mount(&server)
            .await;

        let err = client.customizations("c-1").await.unwrap_err();
        assert!(matches!(err, OpsRampError::Decode { .. }));
    }
}
