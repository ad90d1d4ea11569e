use crate::adapters::KubectlOptions;
use crate::config::manifests::LocalManifests;
use crate::domain::model::{ManifestSet, ManifestStep, Stage};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_MANIFEST_DIR: &str = "./k8s";
pub const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub deployment: DeploymentInfo,
    pub kubectl: Option<KubectlConfig>,
    #[serde(default)]
    pub manifests: ManifestsConfig,
    pub verify: Option<VerifyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl Default for DeploymentInfo {
    fn default() -> Self {
        Self {
            name: "spire-demo".to_string(),
            description: None,
            version: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubectlConfig {
    pub binary: Option<String>,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestsConfig {
    pub directory: Option<String>,
    pub steps: Option<Vec<ManifestStep>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyConfig {
    pub wait_attempts: Option<u32>,
    pub wait_interval_seconds: Option<u64>,
    pub strict: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub name: String,
    pub kubectl: KubectlOptions,
    pub manifest_dir: String,
    pub manifests: ManifestSet,
    pub verify: VerifySettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifySettings {
    pub attempts: u32,
    pub interval: Duration,
    pub strict: bool,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            attempts: 1,
            interval: Duration::from_secs(5),
            strict: false,
        }
    }
}

/// The SPIRE demo manifests, in dependency order.
pub fn default_steps() -> Vec<ManifestStep> {
    vec![
        ManifestStep::new("demo-config", "configmap.yaml", Stage::Config)
            .with_resource("ConfigMap", "spire-demo-config"),
        ManifestStep::new("frontend-workload", "frontend-deployment.yaml", Stage::Workloads)
            .with_resource("Deployment", "frontend"),
        ManifestStep::new("backend-workload", "backend-deployment.yaml", Stage::Workloads)
            .with_resource("Deployment", "backend"),
        ManifestStep::new("trust-domain-entry", "registration-entry.yaml", Stage::IdentityBindings)
            .with_resource("ClusterFederatedTrustDomain", "spire-demo-trust-domain")
            .cluster_scoped(),
        ManifestStep::new("workload-identity", "cluster-spiffe-id.yaml", Stage::IdentityBindings)
            .with_resource("ClusterSPIFFEID", "spire-demo-workloads")
            .cluster_scoped(),
        ManifestStep::new("frontend-service", "frontend-service.yaml", Stage::Services)
            .with_resource("Service", "frontend"),
        ManifestStep::new("backend-service", "backend-service.yaml", Stage::Services)
            .with_resource("Service", "backend"),
    ]
}

impl DeployConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${KUBE_CONTEXT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn manifest_directory(&self) -> &str {
        self.manifests
            .directory
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_DIR)
    }

    pub fn steps(&self) -> Vec<ManifestStep> {
        self.manifests.steps.clone().unwrap_or_else(default_steps)
    }

    pub fn kubectl_options(&self) -> KubectlOptions {
        let defaults = KubectlOptions::default();
        match &self.kubectl {
            Some(kubectl) => KubectlOptions {
                binary: kubectl.binary.clone().unwrap_or(defaults.binary),
                kubeconfig: kubectl.kubeconfig.clone(),
                context: kubectl.context.clone(),
                namespace: kubectl.namespace.clone(),
            },
            None => defaults,
        }
    }

    pub fn verify_settings(&self) -> VerifySettings {
        let defaults = VerifySettings::default();
        match &self.verify {
            Some(verify) => VerifySettings {
                attempts: verify.wait_attempts.unwrap_or(defaults.attempts),
                interval: verify
                    .wait_interval_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.interval),
                strict: verify.strict.unwrap_or(defaults.strict),
            },
            None => defaults,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("deployment.name", &self.deployment.name)?;
        validation::validate_path("manifests.directory", self.manifest_directory())?;

        if let Some(kubectl) = &self.kubectl {
            if let Some(binary) = &kubectl.binary {
                validation::validate_path("kubectl.binary", binary)?;
            }
            if let Some(kubeconfig) = &kubectl.kubeconfig {
                validation::validate_path("kubectl.kubeconfig", kubeconfig)?;
            }
            if let Some(context) = &kubectl.context {
                validation::validate_non_empty_string("kubectl.context", context)?;
            }
            if let Some(namespace) = &kubectl.namespace {
                validation::validate_namespace("kubectl.namespace", namespace)?;
            }
        }

        let steps = self.steps();
        if steps.is_empty() {
            return Err(DeployError::MissingConfigError {
                field: "manifests.steps".to_string(),
            });
        }
        validation::validate_unique("manifests.steps.name", steps.iter().map(|s| s.name.as_str()))?;

        for step in &steps {
            validation::validate_non_empty_string("manifests.steps.name", &step.name)?;
            let file = step.file.to_string_lossy();
            validation::validate_path(&format!("manifests.steps.{}.file", step.name), &file)?;
            validation::validate_file_extensions(
                &format!("manifests.steps.{}.file", step.name),
                &[&*file],
                &MANIFEST_EXTENSIONS,
            )?;

            match (&step.kind, &step.resource) {
                (Some(kind), Some(resource)) => {
                    let field = format!("manifests.steps.{}", step.name);
                    validation::validate_non_empty_string(&format!("{}.kind", field), kind)?;
                    validation::validate_object_name(&format!("{}.resource", field), resource)?;
                }
                (None, None) => {}
                _ => {
                    return Err(DeployError::ConfigValidationError {
                        field: format!("manifests.steps.{}", step.name),
                        message: "'kind' and 'resource' must be set together".to_string(),
                    });
                }
            }
        }

        if let Some(verify) = &self.verify {
            if let Some(attempts) = verify.wait_attempts {
                validation::validate_range("verify.wait_attempts", attempts, 1, 1000)?;
            }
            if let Some(interval) = verify.wait_interval_seconds {
                validation::validate_range("verify.wait_interval_seconds", interval, 0, 3600)?;
            }
        }

        Ok(())
    }

    /// Validates and resolves manifest paths against the manifest directory.
    pub fn into_settings(self) -> Result<DeploySettings> {
        self.validate_config()?;

        let manifest_dir = self.manifest_directory().to_string();
        let manifests = LocalManifests::new(&manifest_dir).resolve(self.steps());

        Ok(DeploySettings {
            name: self.deployment.name.clone(),
            kubectl: self.kubectl_options(),
            manifest_dir,
            manifests,
            verify: self.verify_settings(),
        })
    }
}

impl Validate for DeployConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DeployConfig::from_toml_str("").unwrap();

        assert_eq!(config.deployment.name, "spire-demo");
        assert_eq!(config.manifest_directory(), DEFAULT_MANIFEST_DIR);
        assert_eq!(config.steps().len(), 7);
        assert_eq!(config.kubectl_options(), KubectlOptions::default());
        assert_eq!(config.verify_settings(), VerifySettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[deployment]
name = "spire-demo"
description = "SPIRE demo workloads"
version = "1.0.0"

[kubectl]
binary = "/usr/local/bin/kubectl"
context = "kind-spire"
namespace = "spire-demo"

[manifests]
directory = "./deploy"

[[manifests.steps]]
name = "config"
file = "configmap.yaml"
stage = "config"
kind = "ConfigMap"
resource = "spire-demo-config"

[[manifests.steps]]
name = "identity"
file = "cluster-spiffe-id.yaml"
stage = "identity-bindings"
kind = "ClusterSPIFFEID"
resource = "demo"
cluster_scoped = true

[verify]
wait_attempts = 10
wait_interval_seconds = 3
strict = true
"#;

        let config = DeployConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let steps = config.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].stage, Stage::IdentityBindings);
        assert!(steps[1].cluster_scoped);
        assert!(!steps[0].cluster_scoped);

        let kubectl = config.kubectl_options();
        assert_eq!(kubectl.binary, "/usr/local/bin/kubectl");
        assert_eq!(kubectl.context.as_deref(), Some("kind-spire"));

        let verify = config.verify_settings();
        assert_eq!(verify.attempts, 10);
        assert_eq!(verify.interval, Duration::from_secs(3));
        assert!(verify.strict);

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.manifest_dir, "./deploy");
        assert_eq!(
            settings.manifests.steps()[0].file,
            Path::new("./deploy").join("configmap.yaml")
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SPIRE_DEPLOY_TEST_CONTEXT", "kind-test");

        let toml_content = r#"
[kubectl]
context = "${SPIRE_DEPLOY_TEST_CONTEXT}"
kubeconfig = "${SPIRE_DEPLOY_TEST_UNSET_VAR}"
"#;

        let config = DeployConfig::from_toml_str(toml_content).unwrap();
        let kubectl = config.kubectl.unwrap();
        assert_eq!(kubectl.context.as_deref(), Some("kind-test"));
        assert_eq!(kubectl.kubeconfig.as_deref(), Some("${SPIRE_DEPLOY_TEST_UNSET_VAR}"));

        std::env::remove_var("SPIRE_DEPLOY_TEST_CONTEXT");
    }

    #[test]
    fn test_rejects_unknown_stage() {
        let toml_content = r#"
[[manifests.steps]]
name = "config"
file = "configmap.yaml"
stage = "bootstrap"
"#;
        assert!(DeployConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let duplicate = r#"
[[manifests.steps]]
name = "config"
file = "a.yaml"
stage = "config"

[[manifests.steps]]
name = "config"
file = "b.yaml"
stage = "services"
"#;
        let config = DeployConfig::from_toml_str(duplicate).unwrap();
        assert!(config.validate().is_err());

        let bad_extension = r#"
[[manifests.steps]]
name = "config"
file = "configmap.txt"
stage = "config"
"#;
        let config = DeployConfig::from_toml_str(bad_extension).unwrap();
        assert!(config.validate().is_err());

        let half_target = r#"
[[manifests.steps]]
name = "config"
file = "configmap.yaml"
stage = "config"
kind = "ConfigMap"
"#;
        let config = DeployConfig::from_toml_str(half_target).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DeployError::ConfigValidationError { .. })
        ));

        let bad_namespace = r#"
[kubectl]
namespace = "Spire_Demo"
"#;
        let config = DeployConfig::from_toml_str(bad_namespace).unwrap();
        assert!(config.validate().is_err());

        let zero_attempts = r#"
[verify]
wait_attempts = 0
"#;
        let config = DeployConfig::from_toml_str(zero_attempts).unwrap();
        assert!(config.validate().is_err());

        let no_steps = r#"
[manifests]
steps = []
"#;
        let config = DeployConfig::from_toml_str(no_steps).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DeployError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[deployment]\nname = \"file-test\"\n")
            .unwrap();

        let config = DeployConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.deployment.name, "file-test");
    }
}
