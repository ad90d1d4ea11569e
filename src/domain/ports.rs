use crate::domain::model::ManifestAction;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Output of one control plane command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: &str) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// Whether a failed command only reported that the object does not exist.
    ///
    /// Only the API server's resource-level replies count: a `NotFound`
    /// status, or a kind with no mapping because its CRD is gone. Client-side
    /// errors such as an unknown context also say "not found" and must stay fatal.
    pub fn is_not_found(&self) -> bool {
        if self.success {
            return false;
        }
        self.stderr.lines().any(|line| {
            let line = line.trim_start();
            line.starts_with("Error from server (NotFound)")
                || line.starts_with("error: resource mapping not found")
        })
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// The external system that owns cluster state.
///
/// `Err` is reserved for failing to run the command at all. A command that
/// ran and exited non-zero comes back as a `CommandOutput` with
/// `success == false` so callers decide what counts as fatal.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Declaratively upsert every object in a manifest file.
    async fn apply(&self, manifest: &Path) -> Result<CommandOutput>;

    /// Delete every object in a manifest file, ignoring absent objects.
    async fn delete(&self, manifest: &Path) -> Result<CommandOutput>;

    /// Fetch one object as JSON.
    async fn get(&self, kind: &str, name: &str, cluster_scoped: bool) -> Result<CommandOutput>;

    /// The command line `apply` or `delete` would run, for dry runs and plans.
    fn render(&self, action: ManifestAction, manifest: &Path) -> String;
}
