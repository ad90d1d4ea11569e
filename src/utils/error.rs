use crate::domain::model::Operation;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Manifest file not found: {}", .path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to run '{program}': {source}")]
    CommandSpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{operation} failed for step '{step}' ({}): {}",
        exit_status(.exit_code),
        .stderr.trim()
    )]
    CommandFailed {
        step: String,
        operation: Operation,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Could not read status of {resource}: {message}")]
    StatusParseError { resource: String, message: String },

    #[error("{} resource(s) not ready: {}", .not_ready.len(), .not_ready.join(", "))]
    VerificationFailed { not_ready: Vec<String> },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Manifest,
    ControlPlane,
    Verification,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeployError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::ConfigValidationError { .. }
            | DeployError::InvalidConfigValueError { .. }
            | DeployError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DeployError::ManifestNotFound { .. } => ErrorCategory::Manifest,
            DeployError::CommandSpawnError { .. } | DeployError::CommandFailed { .. } => {
                ErrorCategory::ControlPlane
            }
            DeployError::StatusParseError { .. } | DeployError::VerificationFailed { .. } => {
                ErrorCategory::Verification
            }
            DeployError::IoError(_) | DeployError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeployError::VerificationFailed { .. } => ErrorSeverity::Medium,
            DeployError::IoError(_) | DeployError::CommandSpawnError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code. A failed external command passes its own code through.
    pub fn exit_code(&self) -> i32 {
        if let DeployError::CommandFailed {
            exit_code: Some(code),
            ..
        } = self
        {
            if *code != 0 {
                return *code;
            }
        }

        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DeployError::ConfigValidationError { field, .. }
            | DeployError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the config file or on the command line", field)
            }
            DeployError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            DeployError::ManifestNotFound { .. } => {
                "Check --manifest-dir or the [manifests] section of the config file".to_string()
            }
            DeployError::CommandSpawnError { program, .. } => format!(
                "Make sure '{}' is installed and on PATH, or pass --kubectl <path>",
                program
            ),
            DeployError::CommandFailed { operation, .. } => match operation {
                Operation::Apply => {
                    "Fix the failing manifest and run install again; applied steps are kept"
                        .to_string()
                }
                Operation::Delete => {
                    "Resolve the error and run uninstall again; it is safe to repeat".to_string()
                }
                Operation::Get => "Check cluster connectivity with 'kubectl get nodes'".to_string(),
            },
            DeployError::StatusParseError { .. } => {
                "Check that the configured kind is correct for the resource".to_string()
            }
            DeployError::VerificationFailed { .. } => {
                "Wait for the workloads to start or raise --wait-attempts".to_string()
            }
            DeployError::IoError(_) | DeployError::SerializationError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DeployError::CommandFailed {
                step, operation, ..
            } => format!("kubectl {} failed at step '{}'", operation, step),
            DeployError::CommandSpawnError { program, .. } => {
                format!("Could not start '{}'", program)
            }
            DeployError::VerificationFailed { not_ready } => {
                format!("Not ready: {}", not_ready.join(", "))
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
