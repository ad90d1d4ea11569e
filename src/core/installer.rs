use crate::core::sequence::StepSequence;
use crate::core::{ControlPlane, ManifestAction, ManifestSet, StepResult};
use crate::utils::error::Result;

/// Applies every manifest in stage order. The first failed apply aborts the
/// run; steps already applied stay in the cluster.
pub struct Installer<'a> {
    control_plane: &'a dyn ControlPlane,
    manifests: &'a ManifestSet,
}

impl<'a> Installer<'a> {
    pub fn new(control_plane: &'a dyn ControlPlane, manifests: &'a ManifestSet) -> Self {
        Self {
            control_plane,
            manifests,
        }
    }

    pub async fn run(&self, execution_id: &str, dry_run: bool) -> Result<Vec<StepResult>> {
        let steps = self.manifests.install_order();
        StepSequence::new(self.control_plane, ManifestAction::Apply, execution_id.to_string())
            .with_dry_run(dry_run)
            .execute_all(&steps)
            .await
    }
}
