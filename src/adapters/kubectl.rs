//! `kubectl`-backed control plane.

use crate::domain::model::ManifestAction;
use crate::domain::ports::{CommandOutput, ControlPlane};
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Global flags passed to every kubectl invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct KubectlOptions {
    pub binary: String,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

impl Default for KubectlOptions {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            kubeconfig: None,
            context: None,
            namespace: None,
        }
    }
}

pub struct KubectlClient {
    options: KubectlOptions,
}

impl KubectlClient {
    pub fn new(options: KubectlOptions) -> Self {
        Self { options }
    }

    fn global_args(&self, namespaced: bool) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.options.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.clone());
        }
        if let Some(context) = &self.options.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        if namespaced {
            if let Some(namespace) = &self.options.namespace {
                args.push("--namespace".to_string());
                args.push(namespace.clone());
            }
        }
        args
    }

    pub fn manifest_args(&self, action: ManifestAction, manifest: &Path) -> Vec<String> {
        let mut args = self.global_args(true);
        args.push(action.to_string());
        args.push("-f".to_string());
        args.push(manifest.display().to_string());
        if action == ManifestAction::Delete {
            args.push("--ignore-not-found".to_string());
        }
        args
    }

    pub fn get_args(&self, kind: &str, name: &str, cluster_scoped: bool) -> Vec<String> {
        let mut args = self.global_args(!cluster_scoped);
        args.extend(
            ["get", kind, name, "-o", "json"]
                .iter()
                .map(|s| s.to_string()),
        );
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        tracing::debug!("Running: {} {}", self.options.binary, args.join(" "));

        let output = Command::new(&self.options.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| DeployError::CommandSpawnError {
                program: self.options.binary.clone(),
                source,
            })?;

        Ok(output.into())
    }
}

#[async_trait]
impl ControlPlane for KubectlClient {
    async fn apply(&self, manifest: &Path) -> Result<CommandOutput> {
        self.run(self.manifest_args(ManifestAction::Apply, manifest)).await
    }

    async fn delete(&self, manifest: &Path) -> Result<CommandOutput> {
        self.run(self.manifest_args(ManifestAction::Delete, manifest)).await
    }

    async fn get(&self, kind: &str, name: &str, cluster_scoped: bool) -> Result<CommandOutput> {
        self.run(self.get_args(kind, name, cluster_scoped)).await
    }

    fn render(&self, action: ManifestAction, manifest: &Path) -> String {
        let mut parts = vec![self.options.binary.clone()];
        parts.extend(self.manifest_args(action, manifest));
        parts.join(" ")
    }
}
