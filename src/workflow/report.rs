use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Step of the workflow at which a template failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SourceAuth,
    SourceGlobalLookup,
    CloneLookup,
    Customizations,
    TargetAuth,
    TargetGlobalLookup,
    CloneSubmit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::SourceAuth => "source authentication",
            Stage::SourceGlobalLookup => "source global template lookup",
            Stage::CloneLookup => "cloned template lookup",
            Stage::Customizations => "customization fetch",
            Stage::TargetAuth => "target authentication",
            Stage::TargetGlobalLookup => "target global template lookup",
            Stage::CloneSubmit => "clone submit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Cloned {
        source_global_id: String,
        source_clone_id: String,
        target_global_id: String,
        new_template_id: Option<String>,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
}

impl Outcome {
    pub fn failed(stage: Stage, reason: impl fmt::Display) -> Self {
        Outcome::Failed {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn is_cloned(&self) -> bool {
        matches!(self, Outcome::Cloned { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-template results of one run, in request order.
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TemplateOutcome>,
}

impl CloneReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_cloned()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome_for(&self, name: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.outcome)
    }
}

impl fmt::Display for CloneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(
            f,
            "Clone run {}: {} cloned, {} failed",
            self.run_id,
            self.succeeded(),
            self.failed()
        )?;
        writeln!(f, "{}", "=".repeat(80))?;

        for (idx, item) in self.outcomes.iter().enumerate() {
            match &item.outcome {
                Outcome::Cloned {
                    source_clone_id,
                    new_template_id,
                    ..
                } => writeln!(
                    f,
                    "[{}] OK    {}  {} -> {}",
                    idx + 1,
                    item.name,
                    source_clone_id,
                    new_template_id.as_deref().unwrap_or("N/A")
                )?,
                Outcome::Failed { stage, reason } => writeln!(
                    f,
                    "[{}] FAIL  {}  ({}: {})",
                    idx + 1,
                    item.name,
                    stage,
                    reason
                )?,
            }
        }

        write!(f, "{}", "=".repeat(80))
    }
}
