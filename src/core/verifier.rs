use crate::core::{ControlPlane, ManifestSet, ManifestStep, Operation, Readiness, ResourceStatus};
use crate::utils::error::{DeployError, Result};
use serde_json::Value;
use std::time::Duration;

/// Result of a verification run, in install order.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub statuses: Vec<ResourceStatus>,
    pub passes: u32,
}

impl VerificationReport {
    pub fn all_ready(&self) -> bool {
        self.statuses.iter().all(|s| s.readiness.is_ready())
    }

    pub fn not_ready(&self) -> Vec<&ResourceStatus> {
        self.statuses
            .iter()
            .filter(|s| !s.readiness.is_ready())
            .collect()
    }

    /// Turns any non-ready resource into an error.
    pub fn into_strict(self) -> Result<Self> {
        if self.all_ready() {
            return Ok(self);
        }
        Err(DeployError::VerificationFailed {
            not_ready: self
                .not_ready()
                .iter()
                .map(|s| format!("{}/{}", s.kind, s.resource))
                .collect(),
        })
    }
}

pub struct Verifier<'a> {
    control_plane: &'a dyn ControlPlane,
    attempts: u32,
    interval: Duration,
}

impl<'a> Verifier<'a> {
    /// A single pass with no waiting.
    pub fn new(control_plane: &'a dyn ControlPlane) -> Self {
        Self {
            control_plane,
            attempts: 1,
            interval: Duration::ZERO,
        }
    }

    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.interval = interval;
        self
    }

    pub async fn verify(&self, manifests: &ManifestSet) -> Result<VerificationReport> {
        let targets = manifests.verifiable();
        let mut statuses: Vec<Option<ResourceStatus>> = vec![None; targets.len()];
        let mut passes = 0;

        while passes < self.attempts {
            if passes > 0 {
                tracing::info!(
                    "⏳ {} resource(s) not ready, checking again in {:?}",
                    statuses.iter().flatten().filter(|s| !s.readiness.is_ready()).count(),
                    self.interval
                );
                tokio::time::sleep(self.interval).await;
            }
            passes += 1;

            for (step, slot) in targets.iter().zip(statuses.iter_mut()) {
                if slot.as_ref().is_some_and(|s| s.readiness.is_ready()) {
                    continue;
                }
                *slot = Some(self.check(step).await?);
            }

            if statuses.iter().flatten().all(|s| s.readiness.is_ready()) {
                break;
            }
        }

        Ok(VerificationReport {
            statuses: statuses.into_iter().flatten().collect(),
            passes,
        })
    }

    async fn check(&self, step: &ManifestStep) -> Result<ResourceStatus> {
        let Some((kind, name)) = step.target() else {
            return Err(DeployError::MissingConfigError {
                field: format!("manifests.steps.{}.resource", step.name),
            });
        };

        let output = self.control_plane.get(kind, name, step.cluster_scoped).await?;

        let readiness = if output.success {
            let object: Value =
                serde_json::from_str(&output.stdout).map_err(|e| DeployError::StatusParseError {
                    resource: format!("{}/{}", kind, name),
                    message: e.to_string(),
                })?;
            readiness_of(kind, &object)
        } else if output.is_not_found() {
            Readiness::Missing
        } else {
            return Err(DeployError::CommandFailed {
                step: step.name.clone(),
                operation: Operation::Get,
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        };

        tracing::debug!("{}/{}: {:?}", kind, name, readiness);

        Ok(ResourceStatus {
            step: step.name.clone(),
            kind: kind.to_string(),
            resource: name.to_string(),
            readiness,
        })
    }
}

/// Readiness of a fetched object. Workload controllers compare ready
/// against desired replicas; anything else is ready once it exists.
///
/// `kind` may carry an API group (`deployments.apps`, `Deployment.apps`).
pub fn readiness_of(kind: &str, object: &Value) -> Readiness {
    let count = |pointer: &str| object.pointer(pointer).and_then(Value::as_u64);
    let bare_kind = kind.split('.').next().unwrap_or(kind);

    let (ready, desired) = match bare_kind.to_ascii_lowercase().as_str() {
        "deployment" | "deployments" | "deploy" | "statefulset" | "statefulsets" | "sts" => (
            count("/status/readyReplicas").unwrap_or(0),
            count("/spec/replicas").unwrap_or(1),
        ),
        "daemonset" | "daemonsets" | "ds" => (
            count("/status/numberReady").unwrap_or(0),
            count("/status/desiredNumberScheduled").unwrap_or(0),
        ),
        _ => return Readiness::Ready,
    };

    if ready >= desired {
        Readiness::Ready
    } else {
        Readiness::NotReady {
            reason: format!("{}/{} replicas ready", ready, desired),
        }
    }
}
