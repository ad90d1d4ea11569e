pub mod installer;
pub mod plan;
pub mod report;
pub mod sequence;
pub mod uninstaller;
pub mod verifier;

pub use crate::domain::model::{
    ManifestAction, ManifestSet, ManifestStep, Operation, Readiness, ResourceStatus, Stage,
    StepOutcome, StepResult,
};
pub use crate::domain::ports::{CommandOutput, ControlPlane};
pub use crate::utils::error::Result;
