use super::{Endpoint, OpsRampClient, SearchQuery};
use crate::errors::OpsRampError;
use crate::models::IntegrationRecord;

impl OpsRampClient {
    /// SDK integrations, optionally filtered by app name.
    pub async fn integrations(
        &self,
        app_name: Option<&str>,
    ) -> Result<Vec<IntegrationRecord>, OpsRampError> {
        let query = SearchQuery::new()
            .term("category", "SDK")
            .term_opt("name", app_name);

        let records: Vec<IntegrationRecord> = self
            .search(Endpoint::Integrations, &query)
            .await?
            .iter()
            .map(IntegrationRecord::from_search_result)
            .collect();

        if records.is_empty() {
            tracing::warn!(pod = %self.label(), app = ?app_name, "No integrations found");
        }
        Ok(records)
    }
}
