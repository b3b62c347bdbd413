//! Global template and cloned template lookups.

use super::{Endpoint, OpsRampClient, SearchQuery};
use crate::errors::OpsRampError;
use crate::models::template::GLOBAL_SCOPE;
use crate::models::{IntegrationRecord, TemplateRecord};

/// Scopes a clone of a global template can live in.
pub const CLONE_SCOPES: &str = "GLOBAL,SERVICE PROVIDER,CLIENT,PARTNER";

/// A global template together with its clones in one tenant.
#[derive(Debug, Clone)]
pub struct TemplateFamily {
    pub global: TemplateRecord,
    pub clones: Vec<TemplateRecord>,
}

fn clone_query(parent_id: &str) -> SearchQuery {
    SearchQuery::new()
        .term("scope", CLONE_SCOPES)
        .term("parentId", parent_id)
}

impl OpsRampClient {
    /// Global template with exactly this name, if any.
    pub async fn global_template_by_name(
        &self,
        name: &str,
    ) -> Result<Option<TemplateRecord>, OpsRampError> {
        let query = SearchQuery::new()
            .term("scope", GLOBAL_SCOPE)
            .term("name", name);

        let found = self
            .search_first(Endpoint::Templates, &query)
            .await?
            .map(|item| TemplateRecord::from_global_result(&item, ""));

        if found.is_none() {
            tracing::warn!(pod = %self.label(), template = %name, "No global template found");
        }
        Ok(found)
    }

    /// Global templates for every native type of an integration at its
    /// published major version. A native type whose search fails is logged
    /// and skipped.
    pub async fn global_templates_for(&self, integration: &IntegrationRecord) -> Vec<TemplateRecord> {
        let mut templates = Vec::new();
        let total = integration.native_types.len();

        for (idx, native_type) in integration.native_types.iter().enumerate() {
            let query = SearchQuery::new()
                .term("scope", GLOBAL_SCOPE)
                .term("appName", &integration.app_name)
                .term("nativeType", native_type)
                .term("version", &integration.version)
                .term_opt("name", Some(integration.persona.as_str()));

            match self.search(Endpoint::Templates, &query).await {
                Ok(items) => {
                    tracing::info!(
                        pod = %self.label(),
                        native_type = %native_type,
                        found = items.len(),
                        "[{}/{}] global templates",
                        idx + 1,
                        total
                    );
                    templates.extend(
                        items
                            .iter()
                            .map(|item| TemplateRecord::from_global_result(item, &integration.persona)),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        pod = %self.label(),
                        native_type = %native_type,
                        error = %e,
                        "Global template search failed, skipping native type"
                    );
                }
            }
        }

        templates
    }

    /// First clone of a global template in this tenant.
    pub async fn cloned_template_by_parent(
        &self,
        parent_id: &str,
    ) -> Result<Option<TemplateRecord>, OpsRampError> {
        let found = self
            .search_first(Endpoint::Templates, &clone_query(parent_id))
            .await?
            .map(|item| TemplateRecord::from_clone_result(&item, parent_id));

        if found.is_none() {
            tracing::warn!(pod = %self.label(), parent_id = %parent_id, "No cloned template found");
        }
        Ok(found)
    }

    /// Every clone of a global template in this tenant.
    pub async fn cloned_templates_by_parent(
        &self,
        parent_id: &str,
    ) -> Result<Vec<TemplateRecord>, OpsRampError> {
        Ok(self
            .search(Endpoint::Templates, &clone_query(parent_id))
            .await?
            .iter()
            .map(|item| TemplateRecord::from_clone_result(item, parent_id))
            .collect())
    }

    /// Clones for each global template, in input order. A parent whose
    /// search fails is logged and reported with no clones.
    pub async fn cloned_templates_for(&self, globals: &[TemplateRecord]) -> Vec<TemplateFamily> {
        let mut families = Vec::with_capacity(globals.len());

        for global in globals {
            let clones = match self.cloned_templates_by_parent(&global.id).await {
                Ok(clones) => clones,
                Err(e) => {
                    tracing::warn!(
                        pod = %self.label(),
                        parent_id = %global.id,
                        error = %e,
                        "Clone search failed"
                    );
                    Vec::new()
                }
            };
            families.push(TemplateFamily {
                global: global.clone(),
                clones,
            });
        }

        families
    }
}
