//! Generic search over the OpsRamp `queryString` endpoints.

use std::fmt;

use serde_json::Value;

use super::OpsRampClient;
use crate::errors::OpsRampError;

/// Searchable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/templates` (global and cloned), searched with `includeGatewaySDK=true`.
    Templates,
    /// `/integrations/available/search`.
    Integrations,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Templates => "templates",
            Endpoint::Integrations => "integrations/available/search",
        }
    }

    fn includes_gateway_sdk(self) -> bool {
        matches!(self, Endpoint::Templates)
    }
}

/// Ordered `field:value` terms rendered as `f1:v1+f2:v2`.
///
/// The rendered string is passed to the HTTP layer as the `queryString`
/// parameter as-is; the only encoding applied is the normal query-parameter
/// encoding done on the way out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// Add the term only when `value` is present and not blank.
    pub fn term_opt(self, field: impl Into<String>, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.term(field, v),
            None => self,
        }
    }

    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(|(field, value)| format!("{}:{}", field, value))
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl OpsRampClient {
    /// Run a search and return every raw record in `results`. An empty or
    /// missing `results` array is an empty vector, not an error.
    pub async fn search(
        &self,
        endpoint: Endpoint,
        query: &SearchQuery,
    ) -> Result<Vec<Value>, OpsRampError> {
        let url = self.tenant_url(endpoint.path());
        let query_string = query.render();

        let mut params = vec![("queryString", query_string.as_str())];
        if endpoint.includes_gateway_sdk() {
            params.push(("includeGatewaySDK", "true"));
        }

        tracing::debug!(pod = %self.label(), endpoint = ?endpoint, query = %query_string, "Searching");
        let body = self.get_json(&url, &params).await?;
        results(&url, body)
    }

    /// Run a search where a single entity is expected and keep `results[0]`.
    pub async fn search_first(
        &self,
        endpoint: Endpoint,
        query: &SearchQuery,
    ) -> Result<Option<Value>, OpsRampError> {
        Ok(self.search(endpoint, query).await?.into_iter().next())
    }
}

fn results(url: &str, body: Value) -> Result<Vec<Value>, OpsRampError> {
    let Value::Object(mut map) = body else {
        return Err(OpsRampError::Decode {
            url: url.to_string(),
            reason: "search response is not a JSON object".into(),
        });
    };

    match map.remove("results") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(OpsRampError::Decode {
            url: url.to_string(),
            reason: format!("`results` is not an array: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
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
            "tenant-1",
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_render_joins_terms_with_plus_in_order() {
        let query = SearchQuery::new()
            .term("scope", "GLOBAL")
            .term("name", "Alletra Storage")
            .term_opt("persona", None)
            .term_opt("blank", Some("  "));
        assert_eq!(query.render(), "scope:GLOBAL+name:Alletra Storage");
        assert_eq!(query.terms().len(), 2);
        assert_eq!(query.to_string(), query.render());
    }

    #[test]
    fn test_empty_query_renders_empty() {
        assert_eq!(SearchQuery::new().render(), "");
    }

    #[tokio::test]
    async fn test_search_sends_bearer_and_query_string() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/tenant-1/templates"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("queryString", "scope:GLOBAL+name:Disk Health"))
            .and(query_param("includeGatewaySDK", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "a"}, {"id": "b"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = SearchQuery::new().term("scope", "GLOBAL").term("name", "Disk Health");
        let found = client.search(Endpoint::Templates, &query).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_integration_search_omits_gateway_flag() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/tenant-1/integrations/available/search"))
            .and(query_param("queryString", "category:SDK"))
            .and(query_param_is_missing("includeGatewaySDK"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let query = SearchQuery::new().term("category", "SDK");
        assert!(client.search(Endpoint::Integrations, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_results_are_absence_not_errors() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/tenant-1/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let query = SearchQuery::new().term("name", "nothing");
        assert!(client.search(Endpoint::Templates, &query).await.unwrap().is_empty());
        assert!(client
            .search_first(Endpoint::Templates, &query)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_first_keeps_first_result() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/tenant-1/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "first"}, {"id": "second"}]
            })))
            .mount(&server)
            .await;

        let first = client
            .search_first(Endpoint::Templates, &SearchQuery::new().term("name", "x"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first["id"], "first");
    }

    #[tokio::test]
    async fn test_error_status_is_typed_not_swallowed() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tenants/tenant-1/templates"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client
            .search(Endpoint::Templates, &SearchQuery::new().term("name", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, OpsRampError::Status { status: 500, .. }));
    }

    #[test]
    fn test_results_rejects_non_array() {
        let err = results("u", json!({"results": "nope"})).unwrap_err();
        assert!(matches!(err, OpsRampError::Decode { .. }));
        assert!(results("u", json!({})).unwrap().is_empty());
        assert!(results("u", json!([1, 2])).is_err());
    }
}
