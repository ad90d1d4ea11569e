use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Dependency stage of a manifest. The derived ordering is the apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Config,
    Workloads,
    IdentityBindings,
    Services,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Workloads => "workloads",
            Stage::IdentityBindings => "identity-bindings",
            Stage::Services => "services",
        };
        f.write_str(name)
    }
}

/// One manifest file and what it creates in the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestStep {
    pub name: String,
    pub file: PathBuf,
    pub stage: Stage,
    /// Object kind as accepted by `kubectl get`, e.g. `Deployment`.
    pub kind: Option<String>,
    /// Object name checked by the verifier.
    pub resource: Option<String>,
    #[serde(default)]
    pub cluster_scoped: bool,
}

impl ManifestStep {
    pub fn new(name: &str, file: impl Into<PathBuf>, stage: Stage) -> Self {
        Self {
            name: name.to_string(),
            file: file.into(),
            stage,
            kind: None,
            resource: None,
            cluster_scoped: false,
        }
    }

    pub fn with_resource(mut self, kind: &str, resource: &str) -> Self {
        self.kind = Some(kind.to_string());
        self.resource = Some(resource.to_string());
        self
    }

    pub fn cluster_scoped(mut self) -> Self {
        self.cluster_scoped = true;
        self
    }

    /// Kind and name when the step declares a resource the verifier can query.
    pub fn target(&self) -> Option<(&str, &str)> {
        match (&self.kind, &self.resource) {
            (Some(kind), Some(resource)) => Some((kind.as_str(), resource.as_str())),
            _ => None,
        }
    }
}

/// The full set of manifests handled by one deployment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSet {
    steps: Vec<ManifestStep>,
}

impl ManifestSet {
    pub fn new(steps: Vec<ManifestStep>) -> Self {
        Self { steps }
    }

    /// Steps sorted by stage. The sort is stable, so declaration order
    /// is kept within a stage.
    pub fn install_order(&self) -> Vec<&ManifestStep> {
        let mut ordered: Vec<&ManifestStep> = self.steps.iter().collect();
        ordered.sort_by_key(|step| step.stage);
        ordered
    }

    pub fn uninstall_order(&self) -> Vec<&ManifestStep> {
        let mut ordered = self.install_order();
        ordered.reverse();
        ordered
    }

    /// Steps that name a resource, in install order.
    pub fn verifiable(&self) -> Vec<&ManifestStep> {
        self.install_order()
            .into_iter()
            .filter(|step| step.target().is_some())
            .collect()
    }

    pub fn steps(&self) -> &[ManifestStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Apply,
    Delete,
    Get,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Apply => "apply",
            Operation::Delete => "delete",
            Operation::Get => "get",
        };
        f.write_str(name)
    }
}

/// What a run does with each manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestAction {
    Apply,
    Delete,
}

impl From<ManifestAction> for Operation {
    fn from(action: ManifestAction) -> Self {
        match action {
            ManifestAction::Apply => Operation::Apply,
            ManifestAction::Delete => Operation::Delete,
        }
    }
}

impl fmt::Display for ManifestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Operation::from(*self).fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Applied,
    Deleted,
    AlreadyAbsent,
    /// Dry run: the command was rendered but not executed.
    Planned,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: String,
    pub operation: Operation,
    pub outcome: StepOutcome,
    pub duration: Duration,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady { reason: String },
    Missing,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceStatus {
    pub step: String,
    pub kind: String,
    pub resource: String,
    pub readiness: Readiness,
}
