use crate::core::sequence::StepSequence;
use crate::core::{ControlPlane, ManifestAction, ManifestSet, StepResult};
use crate::utils::error::Result;

/// Deletes every manifest in reverse stage order. Absent resources are not
/// an error, so running it twice is safe.
pub struct Uninstaller<'a> {
    control_plane: &'a dyn ControlPlane,
    manifests: &'a ManifestSet,
}

impl<'a> Uninstaller<'a> {
    pub fn new(control_plane: &'a dyn ControlPlane, manifests: &'a ManifestSet) -> Self {
        Self {
            control_plane,
            manifests,
        }
    }

    pub async fn run(&self, execution_id: &str, dry_run: bool) -> Result<Vec<StepResult>> {
        let steps = self.manifests.uninstall_order();
        StepSequence::new(self.control_plane, ManifestAction::Delete, execution_id.to_string())
            .with_dry_run(dry_run)
            .execute_all(&steps)
            .await
    }
}
