#![allow(dead_code)]

use async_trait::async_trait;
use spire_deploy::config::deploy_config::default_steps;
use spire_deploy::core::{CommandOutput, ManifestAction, ManifestSet};
use spire_deploy::{ControlPlane, LocalManifests, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory stand-in for kubectl and the cluster behind it.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    applied: BTreeSet<PathBuf>,
    objects: HashMap<(String, String), serde_json::Value>,
    calls: Vec<String>,
    fail_apply: Option<PathBuf>,
    fail_delete: Option<(PathBuf, String)>,
    delete_error: Option<String>,
    get_error: Option<String>,
    ready_after_gets: HashMap<(String, String), usize>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_apply_of(&self, manifest: &Path) {
        self.state.lock().unwrap().fail_apply = Some(manifest.to_path_buf());
    }

    pub fn fail_delete_of(&self, manifest: &Path, stderr: &str) {
        self.state.lock().unwrap().fail_delete = Some((manifest.to_path_buf(), stderr.to_string()));
    }

    /// Every delete fails with `stderr`, as when kubectl cannot reach the cluster.
    pub fn fail_deletes(&self, stderr: &str) {
        self.state.lock().unwrap().delete_error = Some(stderr.to_string());
    }

    pub fn fail_gets(&self, stderr: &str) {
        self.state.lock().unwrap().get_error = Some(stderr.to_string());
    }

    pub fn put_object(&self, kind: &str, name: &str, object: serde_json::Value) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert((kind.to_string(), name.to_string()), object);
    }

    /// The object becomes ready once it has been fetched `gets` times.
    pub fn ready_after(&self, kind: &str, name: &str, gets: usize) {
        self.state
            .lock()
            .unwrap()
            .ready_after_gets
            .insert((kind.to_string(), name.to_string()), gets);
    }

    pub fn applied(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().applied.iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl ControlPlane for FakeCluster {
    async fn apply(&self, manifest: &Path) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("apply {}", file_name(manifest)));

        if state.fail_apply.as_deref() == Some(manifest) {
            return Ok(CommandOutput::failed(
                1,
                "error: error validating \"manifest\": unknown field \"spec.bogus\"",
            ));
        }

        let created = state.applied.insert(manifest.to_path_buf());
        let verb = if created { "created" } else { "unchanged" };
        Ok(CommandOutput::ok(&format!("{} {}\n", file_name(manifest), verb)))
    }

    async fn delete(&self, manifest: &Path) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {}", file_name(manifest)));

        if let Some(stderr) = &state.delete_error {
            return Ok(CommandOutput::failed(1, stderr));
        }

        if let Some((path, stderr)) = &state.fail_delete {
            if path == manifest {
                return Ok(CommandOutput::failed(1, stderr));
            }
        }

        if state.applied.remove(manifest) {
            Ok(CommandOutput::ok(&format!("{} deleted\n", file_name(manifest))))
        } else {
            // kubectl delete --ignore-not-found prints nothing for absent objects
            Ok(CommandOutput::ok(""))
        }
    }

    async fn get(&self, kind: &str, name: &str, _cluster_scoped: bool) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get {}/{}", kind, name));

        if let Some(stderr) = &state.get_error {
            return Ok(CommandOutput::failed(1, stderr));
        }

        let key = (kind.to_string(), name.to_string());
        if let Some(remaining) = state.ready_after_gets.get_mut(&key) {
            if *remaining > 1 {
                *remaining -= 1;
                return Ok(CommandOutput::ok(
                    &serde_json::json!({"spec": {"replicas": 1}, "status": {}}).to_string(),
                ));
            }
        }

        match state.objects.get(&key) {
            Some(object) => Ok(CommandOutput::ok(&object.to_string())),
            None => Ok(CommandOutput::failed(
                1,
                &format!(
                    "Error from server (NotFound): {}s \"{}\" not found",
                    kind.to_lowercase(),
                    name
                ),
            )),
        }
    }

    fn render(&self, action: ManifestAction, manifest: &Path) -> String {
        format!("fake {} {}", action, file_name(manifest))
    }
}

/// Writes the default manifest files into a temp dir and resolves them.
pub fn default_manifests() -> (TempDir, ManifestSet) {
    let dir = tempfile::tempdir().unwrap();
    for step in default_steps() {
        std::fs::write(dir.path().join(&step.file), "apiVersion: v1\n").unwrap();
    }
    let set = LocalManifests::new(dir.path()).resolve(default_steps());
    (dir, set)
}

/// Registers every default resource as present and ready.
pub fn populate_ready_objects(cluster: &FakeCluster, set: &ManifestSet) {
    for step in set.verifiable() {
        let (kind, name) = step.target().unwrap();
        let object = if kind == "Deployment" {
            serde_json::json!({"spec": {"replicas": 1}, "status": {"readyReplicas": 1}})
        } else {
            serde_json::json!({"metadata": {"name": name}})
        };
        cluster.put_object(kind, name, object);
    }
}
