use clap::Parser;
use spire_deploy::config::{Command, PlanArgs, RunArgs};
use spire_deploy::core::plan::build_plan;
use spire_deploy::core::report::{generate_execution_id, RunReport};
use spire_deploy::core::verifier::VerificationReport;
use spire_deploy::core::{ManifestAction, Readiness, StepOutcome, StepResult};
use spire_deploy::utils::error::Result;
use spire_deploy::utils::logger;
use spire_deploy::{
    CliConfig, DeploySettings, Installer, KubectlClient, LocalManifests, Uninstaller, Verifier,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting spire-deploy");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig) -> Result<()> {
    let settings = cli.load_settings()?;
    tracing::info!(
        "✅ Configuration resolved: {} manifests from {}",
        settings.manifests.len(),
        settings.manifest_dir
    );

    let kubectl = KubectlClient::new(settings.kubectl.clone());

    match &cli.command {
        Command::Install(args) => {
            LocalManifests::ensure_present(&settings.manifests)?;
            let execution_id = execution_id(args);
            let results = Installer::new(&kubectl, &settings.manifests)
                .run(&execution_id, args.dry_run)
                .await?;
            finish_run(&settings, args, &execution_id, ManifestAction::Apply, &results).await
        }
        Command::Uninstall(args) => {
            LocalManifests::ensure_present(&settings.manifests)?;
            let execution_id = execution_id(args);
            let results = Uninstaller::new(&kubectl, &settings.manifests)
                .run(&execution_id, args.dry_run)
                .await?;
            finish_run(&settings, args, &execution_id, ManifestAction::Delete, &results).await
        }
        Command::Verify(_) => {
            let verify = settings.verify;
            let report = Verifier::new(&kubectl)
                .with_polling(verify.attempts, verify.interval)
                .verify(&settings.manifests)
                .await?;
            display_status(&report);
            if verify.strict {
                report.into_strict()?;
            }
            Ok(())
        }
        Command::Plan(args) => {
            display_plan(&kubectl, &settings, args);
            Ok(())
        }
    }
}

fn execution_id(args: &RunArgs) -> String {
    args.execution_id
        .clone()
        .unwrap_or_else(generate_execution_id)
}

async fn finish_run(
    settings: &DeploySettings,
    args: &RunArgs,
    execution_id: &str,
    action: ManifestAction,
    results: &[StepResult],
) -> Result<()> {
    display_results(results, execution_id, action);

    if let Some(path) = &args.report {
        RunReport::new(execution_id, &settings.name, action.into(), args.dry_run, results)
            .write_to(path)
            .await?;
        println!("📊 Report written to: {}", path);
    }

    Ok(())
}

fn display_results(results: &[StepResult], execution_id: &str, action: ManifestAction) {
    let verb = match action {
        ManifestAction::Apply => "Install",
        ManifestAction::Delete => "Uninstall",
    };

    println!("📝 {} steps ({}):", verb, execution_id);
    for (index, result) in results.iter().enumerate() {
        let position = index + 1;
        match result.outcome {
            StepOutcome::Planned => println!("  {}. {}: {}", position, result.step, result.output),
            StepOutcome::Applied => {
                println!("  {}. ✅ {} applied in {:?}", position, result.step, result.duration)
            }
            StepOutcome::Deleted => {
                println!("  {}. 🗑️ {} deleted in {:?}", position, result.step, result.duration)
            }
            StepOutcome::AlreadyAbsent => {
                println!("  {}. ⏭️ {} already absent", position, result.step)
            }
        }
    }

    let total: std::time::Duration = results.iter().map(|r| r.duration).sum();
    println!("✅ {} completed: {} steps in {:?}", verb, results.len(), total);
}

fn display_status(report: &VerificationReport) {
    println!("🔍 Resource status:");
    for status in &report.statuses {
        let state = match &status.readiness {
            Readiness::Ready => "✅ ready".to_string(),
            Readiness::NotReady { reason } => format!("⏳ not ready ({})", reason),
            Readiness::Missing => "❌ missing".to_string(),
        };
        println!("  {:<20} {}/{} {}", status.step, status.kind, status.resource, state);
    }

    let not_ready = report.not_ready().len();
    if not_ready == 0 {
        println!("✅ All {} resources ready", report.statuses.len());
    } else {
        println!(
            "⚠️ {} of {} resources not ready after {} check(s)",
            not_ready,
            report.statuses.len(),
            report.passes
        );
    }
}

fn display_plan(kubectl: &KubectlClient, settings: &DeploySettings, args: &PlanArgs) {
    let (action, verb) = if args.reverse {
        (ManifestAction::Delete, "Uninstall")
    } else {
        (ManifestAction::Apply, "Install")
    };

    println!("📋 {} plan for '{}':", verb, settings.name);
    for planned in build_plan(kubectl, &settings.manifests, action) {
        println!("  {}. [{}] {}", planned.position, planned.stage, planned.name);
        println!("     {}", planned.command);
    }
}
