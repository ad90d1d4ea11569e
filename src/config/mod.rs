pub mod deploy_config;
pub mod manifests;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, PlanArgs, RunArgs, VerifyArgs};

#[cfg(feature = "cli")]
mod cli {
    use super::deploy_config::{DeployConfig, DeploySettings, KubectlConfig};
    use crate::utils::error::Result;
    use clap::{Args, Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "spire-deploy")]
    #[command(about = "Install, verify and tear down the SPIFFE/SPIRE demo manifests")]
    #[command(version)]
    pub struct CliConfig {
        /// Path to a TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        /// Directory containing the manifest files
        #[arg(long, global = true)]
        pub manifest_dir: Option<String>,

        /// kubectl binary to invoke
        #[arg(long, global = true)]
        pub kubectl: Option<String>,

        #[arg(long, global = true)]
        pub context: Option<String>,

        #[arg(long, global = true)]
        pub kubeconfig: Option<String>,

        #[arg(short, long, global = true)]
        pub namespace: Option<String>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        /// Emit logs as JSON lines
        #[arg(long, global = true)]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Apply all manifests in dependency order
        Install(RunArgs),
        /// Check readiness of the deployed resources
        Verify(VerifyArgs),
        /// Delete all manifests in reverse order
        Uninstall(RunArgs),
        /// Show the resolved order and commands without running them
        Plan(PlanArgs),
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct RunArgs {
        /// Print the kubectl commands instead of running them
        #[arg(long)]
        pub dry_run: bool,

        /// Write a JSON run report to this file
        #[arg(long)]
        pub report: Option<String>,

        /// Execution ID for this run
        #[arg(long)]
        pub execution_id: Option<String>,
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct VerifyArgs {
        /// Exit non-zero when any resource is not ready
        #[arg(long)]
        pub strict: bool,

        /// Number of polling passes before giving up
        #[arg(long)]
        pub wait_attempts: Option<u32>,

        /// Seconds between polling passes
        #[arg(long)]
        pub wait_interval: Option<u64>,
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct PlanArgs {
        /// Show the uninstall order instead
        #[arg(long)]
        pub reverse: bool,
    }

    impl CliConfig {
        /// Loads the config file (if any), applies command line overrides and validates.
        pub fn load_settings(&self) -> Result<DeploySettings> {
            let mut config = match &self.config {
                Some(path) => {
                    tracing::info!("📁 Loading configuration from: {}", path);
                    DeployConfig::from_file(path)?
                }
                None => DeployConfig::default(),
            };

            self.apply_overrides(&mut config);
            config.into_settings()
        }

        fn apply_overrides(&self, config: &mut DeployConfig) {
            if let Some(dir) = &self.manifest_dir {
                config.manifests.directory = Some(dir.clone());
            }

            let kubectl = config.kubectl.get_or_insert_with(KubectlConfig::default);
            if let Some(binary) = &self.kubectl {
                kubectl.binary = Some(binary.clone());
            }
            if let Some(context) = &self.context {
                kubectl.context = Some(context.clone());
            }
            if let Some(kubeconfig) = &self.kubeconfig {
                kubectl.kubeconfig = Some(kubeconfig.clone());
            }
            if let Some(namespace) = &self.namespace {
                kubectl.namespace = Some(namespace.clone());
            }

            if let Command::Verify(args) = &self.command {
                let verify = config.verify.get_or_insert_with(Default::default);
                if args.strict {
                    verify.strict = Some(true);
                }
                if let Some(attempts) = args.wait_attempts {
                    verify.wait_attempts = Some(attempts);
                }
                if let Some(interval) = args.wait_interval {
                    verify.wait_interval_seconds = Some(interval);
                }
            }
        }
    }

}
