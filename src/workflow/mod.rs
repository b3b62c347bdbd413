//! Cross-tenant clone workflow.
//!
//! For each requested template name:
//!   source POD: global template by name -> its clone -> clone's customizations
//!   target POD: global template by the same name -> clone payload -> clone submit
//!
//! Steps run strictly in sequence. A failure only affects the template it
//! happened to; the run always ends with a [`CloneReport`].

mod report;

pub use report::{CloneReport, Outcome, Stage, TemplateOutcome};

use chrono::Utc;
use uuid::Uuid;

use crate::client::OpsRampClient;
use crate::errors::OpsRampError;
use crate::models::{build_clone_payload, CustomizationPayload, TemplateRecord};
use crate::store::output::{ArtifactKind, OutputStore};

/// One template to copy, optionally under a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest {
    pub name: String,
    pub new_name: Option<String>,
}

impl TemplateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_name: None,
        }
    }

    pub fn renamed(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_name: Some(new_name.into()).filter(|n: &String| !n.is_empty()),
        }
    }
}

/// Everything resolved in the source tenant for one template.
#[derive(Debug, Clone)]
pub struct SourceTemplate {
    pub global: TemplateRecord,
    pub clone: TemplateRecord,
    pub payload: CustomizationPayload,
}

pub struct Workflow<'a> {
    source: &'a OpsRampClient,
    target: &'a OpsRampClient,
    output: &'a OutputStore,
}

impl<'a> Workflow<'a> {
    pub fn new(source: &'a OpsRampClient, target: &'a OpsRampClient, output: &'a OutputStore) -> Self {
        Self {
            source,
            target,
            output,
        }
    }

    /// Run the whole batch. Never fails: every request ends up in the report.
    pub async fn run(&self, requests: &[TemplateRequest]) -> CloneReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut outcomes: Vec<Option<Outcome>> = vec![None; requests.len()];

        tracing::info!(run_id = %run_id, templates = requests.len(), "Starting clone run");

        let mut resolved = Vec::new();
        match self.source.authenticate().await {
            Ok(_) => {
                tracing::info!(pod = %self.source.label(), "Source authenticated");
                for (idx, request) in requests.iter().enumerate() {
                    match self.resolve_source(request).await {
                        Ok(source) => resolved.push((idx, source)),
                        Err(failure) => outcomes[idx] = Some(failure),
                    }
                }
            }
            Err(e) => {
                tracing::error!(pod = %self.source.label(), error = %e, "Source authentication failed");
                let failure = Outcome::failed(Stage::SourceAuth, &e);
                outcomes.iter_mut().for_each(|o| *o = Some(failure.clone()));
            }
        }

        if !resolved.is_empty() {
            match self.target.authenticate().await {
                Ok(_) => {
                    tracing::info!(pod = %self.target.label(), "Target authenticated");
                    for (idx, source) in &resolved {
                        outcomes[*idx] = Some(self.clone_into_target(&requests[*idx], source).await);
                    }
                }
                Err(e) => {
                    tracing::error!(pod = %self.target.label(), error = %e, "Target authentication failed");
                    for (idx, _) in &resolved {
                        outcomes[*idx] = Some(Outcome::failed(Stage::TargetAuth, &e));
                    }
                }
            }
        }

        let report = CloneReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes: requests
                .iter()
                .zip(outcomes)
                .map(|(request, outcome)| TemplateOutcome {
                    name: request.name.clone(),
                    new_name: request.new_name.clone(),
                    outcome: outcome.unwrap_or_else(|| {
                        Outcome::failed(Stage::SourceGlobalLookup, "template was not processed")
                    }),
                })
                .collect(),
        };

        tracing::info!(
            run_id = %run_id,
            cloned = report.succeeded(),
            failed = report.failed(),
            "Clone run finished"
        );
        self.save(ArtifactKind::Report, &run_id.to_string(), None, &report).await;
        report
    }

    /// Resolve global template, its clone, and the clone's customizations in
    /// the source tenant.
    pub async fn resolve_source(&self, request: &TemplateRequest) -> Result<SourceTemplate, Outcome> {
        let name = request.name.as_str();
        tracing::info!(template = %name, "Resolving in source tenant");

        let global = match self.source.global_template_by_name(name).await {
            Ok(Some(global)) => global,
            Ok(None) => {
                return Err(Outcome::failed(
                    Stage::SourceGlobalLookup,
                    format!("no global template named '{}'", name),
                ))
            }
            Err(e) => return Err(request_failed(Stage::SourceGlobalLookup, name, e)),
        };

        let clone = match self.source.cloned_template_by_parent(&global.id).await {
            Ok(Some(clone)) => clone,
            Ok(None) => {
                return Err(Outcome::failed(
                    Stage::CloneLookup,
                    format!("global template {} has no clone", global.id),
                ))
            }
            Err(e) => return Err(request_failed(Stage::CloneLookup, name, e)),
        };

        let payload = self
            .source
            .customizations(&clone.id)
            .await
            .map_err(|e| request_failed(Stage::Customizations, name, e))?;

        self.save(ArtifactKind::Customizations, name, Some(&clone.id), &payload)
            .await;

        tracing::info!(
            template = %name,
            global_id = %global.id,
            clone_id = %clone.id,
            "Source template resolved"
        );
        Ok(SourceTemplate {
            global,
            clone,
            payload,
        })
    }

    /// Re-create a resolved source template in the target tenant.
    pub async fn clone_into_target(&self, request: &TemplateRequest, source: &SourceTemplate) -> Outcome {
        let name = request.name.as_str();

        let target_global = match self.target.global_template_by_name(name).await {
            Ok(Some(global)) => global,
            Ok(None) => {
                return Outcome::failed(
                    Stage::TargetGlobalLookup,
                    format!("no global template named '{}' in target", name),
                )
            }
            Err(e) => return request_failed(Stage::TargetGlobalLookup, name, e),
        };

        let payload = build_clone_payload(&source.payload, &target_global.id, request.new_name.as_deref());

        match self.target.submit_clone(&payload).await {
            Ok(response) => {
                let id = response.id.as_deref().unwrap_or(&source.clone.id);
                self.save(ArtifactKind::CloneResponse, name, Some(id), &response.body)
                    .await;
                Outcome::Cloned {
                    source_global_id: source.global.id.clone(),
                    source_clone_id: source.clone.id.clone(),
                    target_global_id: target_global.id,
                    new_template_id: response.id,
                }
            }
            Err(e) => request_failed(Stage::CloneSubmit, name, e),
        }
    }

    /// Artifact writes never change an outcome.
    async fn save<T: serde::Serialize>(
        &self,
        kind: ArtifactKind,
        name: &str,
        id: Option<&str>,
        value: &T,
    ) {
        match self.output.save_json(kind, name, id, value).await {
            Ok(Some(key)) => tracing::info!(key = %key, "Saved artifact"),
            Ok(None) => {}
            Err(e) => tracing::warn!(name = %name, error = %e, "Failed to save artifact"),
        }
    }
}

fn request_failed(stage: Stage, template: &str, e: OpsRampError) -> Outcome {
    tracing::warn!(
        template = %template,
        stage = %stage,
        kind = e.kind(),
        error = %e,
        "Template failed"
    );
    Outcome::failed(stage, e)
}
