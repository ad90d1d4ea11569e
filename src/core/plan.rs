use crate::core::{ControlPlane, ManifestAction, ManifestSet, Stage};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub position: usize,
    pub name: String,
    pub stage: Stage,
    pub command: String,
}

/// The install or uninstall order with the command each step would run.
pub fn build_plan(
    control_plane: &dyn ControlPlane,
    manifests: &ManifestSet,
    action: ManifestAction,
) -> Vec<PlannedStep> {
    let steps = match action {
        ManifestAction::Apply => manifests.install_order(),
        ManifestAction::Delete => manifests.uninstall_order(),
    };

    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| PlannedStep {
            position: index + 1,
            name: step.name.clone(),
            stage: step.stage,
            command: control_plane.render(action, &step.file),
        })
        .collect()
}
