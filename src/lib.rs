pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{KubectlClient, KubectlOptions};
pub use config::deploy_config::{DeployConfig, DeploySettings};
pub use config::manifests::LocalManifests;
pub use crate::core::{
    installer::Installer, uninstaller::Uninstaller, verifier::Verifier, ControlPlane, ManifestSet,
    ManifestStep, Stage,
};
pub use utils::error::{DeployError, Result};
