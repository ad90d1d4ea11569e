use crate::domain::model::{ManifestSet, ManifestStep};
use crate::utils::error::{DeployError, Result};
use std::path::PathBuf;

/// Manifest files on local disk, resolved against a base directory.
#[derive(Debug, Clone)]
pub struct LocalManifests {
    base_path: PathBuf,
}

impl LocalManifests {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Relative step files are joined onto the base directory; absolute ones are kept.
    pub fn resolve(&self, steps: Vec<ManifestStep>) -> ManifestSet {
        let steps = steps
            .into_iter()
            .map(|mut step| {
                if step.file.is_relative() {
                    step.file = self.base_path.join(&step.file);
                }
                step
            })
            .collect();
        ManifestSet::new(steps)
    }

    /// Fails on the first manifest missing from disk, before anything is sent to the cluster.
    pub fn ensure_present(set: &ManifestSet) -> Result<()> {
        for step in set.install_order() {
            if !step.file.is_file() {
                return Err(DeployError::ManifestNotFound {
                    path: step.file.clone(),
                });
            }
        }
        tracing::debug!("All {} manifest files present", set.len());
        Ok(())
    }
}
