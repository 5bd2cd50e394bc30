//! `run` command implementation.

use std::sync::Arc;
use std::time::Duration;

use config_loader::CredentialsLoader;
use contracts::{Credentials, HumanReviewer, PipelineResult, RenderedCrew};
use crew_factory::{AutoApprove, CrewFactory, MockOrchestrator};
use tracing::{info, warn};

use super::source::{load_blueprint, overrides};
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::pipeline::{CrewRunner, RunnerConfig, StdinReviewer};

/// Execute the `run` command
pub async fn run_crew(args: &RunArgs) -> Result<()> {
    let (source, blueprint) = load_blueprint(&args.source)?;
    let overrides = overrides(&args.set);

    info!(
        source = %source,
        crew = %blueprint.name,
        workers = blueprint.workers.len(),
        tasks = blueprint.tasks.len(),
        overrides = overrides.len(),
        "Crew loaded"
    );

    // Dry run - assemble only, the orchestrator is never contacted
    if args.dry_run {
        let crew = CrewFactory::new(MockOrchestrator::new())
            .with_output_dir(&args.output_dir)
            .assemble(&blueprint, &overrides)
            .map_err(contracts::ContractError::from)?;
        info!("Dry run mode - crew is valid, exiting");
        print_crew_summary(&crew);
        return Ok(());
    }

    let reviewer: Arc<dyn HumanReviewer> = if args.interactive {
        Arc::new(StdinReviewer)
    } else {
        Arc::new(AutoApprove)
    };

    let runner = CrewRunner::new(RunnerConfig {
        blueprint,
        overrides,
        output_dir: args.output_dir.clone(),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    let (outcome, stats) = if args.mock {
        let orchestrator = MockOrchestrator::new().with_reviewer(reviewer);
        runner.run(orchestrator).await
    } else {
        let credentials = load_credentials(args)?;
        run_backend(&runner, credentials, reviewer).await?
    };

    let result = outcome?;
    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Other(anyhow::Error::new(e)))?;
        println!("{}", json);
    } else {
        print_result(&result);
        stats.print_summary();
    }

    Ok(())
}

fn load_credentials(args: &RunArgs) -> Result<Credentials> {
    if args.env_file.exists() {
        info!(env_file = %args.env_file.display(), "Reading secrets file");
        Ok(CredentialsLoader::load(&args.env_file)?)
    } else {
        warn!(
            env_file = %args.env_file.display(),
            "Secrets file not found, using process environment only"
        );
        Ok(CredentialsLoader::from_env())
    }
}

#[cfg(feature = "openai")]
async fn run_backend(
    runner: &CrewRunner,
    credentials: Credentials,
    reviewer: Arc<dyn HumanReviewer>,
) -> Result<(Result<PipelineResult>, crate::pipeline::RunStats)> {
    let orchestrator = crew_factory::OpenAiOrchestrator::new(credentials).with_reviewer(reviewer);
    Ok(runner.run(orchestrator).await)
}

#[cfg(not(feature = "openai"))]
async fn run_backend(
    _runner: &CrewRunner,
    _credentials: Credentials,
    _reviewer: Arc<dyn HumanReviewer>,
) -> Result<(Result<PipelineResult>, crate::pipeline::RunStats)> {
    Err(CliError::backend_unavailable(
        "built without the `openai` feature, pass --mock to use the mock orchestrator",
    ))
}

fn print_result(result: &PipelineResult) {
    println!("{}", result.final_output);

    if !result.files.is_empty() {
        eprintln!("\nFiles written:");
        for file in &result.files {
            eprintln!("  - {}", file.display());
        }
    }
}

/// Print the assembled crew for dry-run mode
fn print_crew_summary(crew: &RenderedCrew) {
    println!("\n=== Crew Summary ===\n");
    println!("Crew: {}", crew.name);
    println!(
        "Settings: verbose={}, memory={}",
        crew.settings.verbose, crew.settings.memory
    );

    println!("\nWorkers ({}):", crew.workers.len());
    for worker in &crew.workers {
        println!("  - {} ({})", worker.id, worker.role);
    }

    println!("\nStages ({}):", crew.plan.stage_count());
    for (stage, tasks) in crew.plan.stages().iter().enumerate() {
        println!("  {}: {}", stage, tasks.join(", "));
    }

    if !crew.tools.is_empty() {
        println!("\nCustom tools:");
        for name in crew.tools.keys() {
            println!("  - {}", name);
        }
    }

    if let Some(task) = crew.final_task() {
        println!("\nFinal task: {}", task.id);
        println!("  {}", task.description.lines().next().unwrap_or_default());
    }

    println!();
}
