use crate::core::{ControlPlane, ManifestAction, ManifestStep, StepOutcome, StepResult};
use crate::utils::error::{DeployError, Result};
use std::time::{Duration, Instant};

/// Runs one manifest operation over an ordered list of steps, stopping at
/// the first failure.
pub struct StepSequence<'a> {
    control_plane: &'a dyn ControlPlane,
    action: ManifestAction,
    execution_id: String,
    dry_run: bool,
}

impl<'a> StepSequence<'a> {
    pub fn new(
        control_plane: &'a dyn ControlPlane,
        action: ManifestAction,
        execution_id: String,
    ) -> Self {
        Self {
            control_plane,
            action,
            execution_id,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn execute_all(&self, steps: &[&ManifestStep]) -> Result<Vec<StepResult>> {
        let mut results = Vec::with_capacity(steps.len());

        tracing::info!(
            execution_id = %self.execution_id,
            "🎬 Starting {} of {} manifests{}",
            self.action,
            steps.len(),
            if self.dry_run { " (dry run)" } else { "" }
        );

        for (index, step) in steps.iter().enumerate() {
            let position = index + 1;
            let result = self.execute_step(step).await.inspect_err(|e| {
                tracing::error!("❌ Step {}/{} '{}' failed: {}", position, steps.len(), step.name, e)
            })?;

            tracing::info!(
                "✅ {}/{} {} ({:?}, {:?})",
                position,
                steps.len(),
                result.step,
                result.outcome,
                result.duration
            );
            results.push(result);
        }

        Ok(results)
    }

    async fn execute_step(&self, step: &ManifestStep) -> Result<StepResult> {
        if self.dry_run {
            return Ok(StepResult {
                step: step.name.clone(),
                operation: self.action.into(),
                outcome: StepOutcome::Planned,
                duration: Duration::ZERO,
                output: self.control_plane.render(self.action, &step.file),
            });
        }

        let start_time = Instant::now();
        let output = match self.action {
            ManifestAction::Apply => self.control_plane.apply(&step.file).await?,
            ManifestAction::Delete => self.control_plane.delete(&step.file).await?,
        };
        let duration = start_time.elapsed();
        tracing::debug!("{} {}: {}", self.action, step.name, output.stdout.trim());

        let outcome = match (self.action, output.success) {
            (ManifestAction::Apply, true) => StepOutcome::Applied,
            (ManifestAction::Delete, true) if output.stdout.trim().is_empty() => {
                StepOutcome::AlreadyAbsent
            }
            (ManifestAction::Delete, true) => StepOutcome::Deleted,
            (ManifestAction::Delete, false) if output.is_not_found() => {
                tracing::warn!("⏭️ {} already absent: {}", step.name, output.stderr.trim());
                StepOutcome::AlreadyAbsent
            }
            _ => {
                return Err(DeployError::CommandFailed {
                    step: step.name.clone(),
                    operation: self.action.into(),
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                })
            }
        };

        Ok(StepResult {
            step: step.name.clone(),
            operation: self.action.into(),
            outcome,
            duration,
            output: output.stdout,
        })
    }
}
