use crate::core::{Operation, StepOutcome, StepResult};
use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub execution_id: String,
    pub timestamp: String,
    pub deployment: String,
    pub operation: Operation,
    pub dry_run: bool,
    pub steps: Vec<StepRecord>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_steps: usize,
    pub total_duration_ms: u64,
    pub executed_steps: Vec<String>,
}

impl RunReport {
    pub fn new(
        execution_id: &str,
        deployment: &str,
        operation: Operation,
        dry_run: bool,
        results: &[StepResult],
    ) -> Self {
        let steps: Vec<StepRecord> = results
            .iter()
            .map(|r| StepRecord {
                name: r.step.clone(),
                outcome: r.outcome,
                duration_ms: r.duration.as_millis() as u64,
            })
            .collect();

        let summary = RunSummary {
            total_steps: steps.len(),
            total_duration_ms: steps.iter().map(|s| s.duration_ms).sum(),
            executed_steps: steps.iter().map(|s| s.name.clone()).collect(),
        };

        Self {
            execution_id: execution_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            deployment: deployment.to_string(),
            operation,
            dry_run,
            steps,
            summary,
        }
    }

    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path.as_ref(), json).await?;
        tracing::info!("📊 Run report written to: {}", path.as_ref().display());
        Ok(())
    }
}

/// `deploy_YYYYmmdd_HHMMSS` in UTC.
pub fn generate_execution_id() -> String {
    format!("deploy_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}
