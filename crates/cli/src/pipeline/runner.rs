//! Crew runner - one kickoff with timeout, metrics and run statistics.

use std::path::PathBuf;
use std::time::Duration;

use contracts::{ContractError, CrewBlueprint, Orchestrator, PipelineResult, RunParameters};
use crew_factory::CrewFactory;
use observability::{record_run_failed, record_run_finished, record_run_started};
use tracing::{info, warn};

use super::RunStats;
use crate::error::{CliError, Result};

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// The crew to run
    pub blueprint: CrewBlueprint,

    /// Caller overrides merged over the declared defaults
    pub overrides: RunParameters,

    /// Base directory for task output files
    pub output_dir: PathBuf,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Runs a single crew against an orchestrator
pub struct CrewRunner {
    config: RunnerConfig,
}

impl CrewRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the crew to completion
    ///
    /// Statistics are returned for failed runs too, so the caller can print
    /// them before reporting the error.
    pub async fn run<O: Orchestrator>(&self, orchestrator: O) -> (Result<PipelineResult>, RunStats) {
        let crew = self.config.blueprint.name.clone();
        let mut stats = RunStats::new(&crew, orchestrator.name());

        if let Some(port) = self.config.metrics_port {
            if let Err(e) = observability::init_metrics_only(port) {
                return (Err(CliError::Other(e)), stats);
            }
        }

        let factory = CrewFactory::new(orchestrator).with_output_dir(&self.config.output_dir);

        info!(
            crew = %crew,
            orchestrator = factory.orchestrator().name(),
            tasks = self.config.blueprint.tasks.len(),
            output_dir = %self.config.output_dir.display(),
            "Starting crew run"
        );

        record_run_started(&crew);
        let outcome = self.kickoff(&factory).await;

        match &outcome {
            Ok(result) => {
                record_run_finished(result);
                stats.record_success(result);
                info!(
                    crew = %crew,
                    final_task = %result.final_task_id,
                    files = result.files.len(),
                    duration_ms = result.duration().num_milliseconds(),
                    "Crew run completed"
                );
            }
            Err(e) => {
                record_run_failed(&crew, e.kind());
                stats.record_failure(e.kind());
                warn!(crew = %crew, error = %e, "Crew run failed");
            }
        }

        (outcome, stats)
    }

    async fn kickoff<O: Orchestrator>(&self, factory: &CrewFactory<O>) -> Result<PipelineResult> {
        let run = factory.kickoff(&self.config.blueprint, &self.config.overrides);

        let outcome = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| CliError::Timeout {
                    seconds: limit.as_secs(),
                })?,
            None => run.await,
        };

        outcome.map_err(|e| CliError::Contract(ContractError::from(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_factory::{MockConfig, MockOrchestrator};
    use scenarios::Scenario;

    fn config(dir: &std::path::Path, overrides: RunParameters) -> RunnerConfig {
        RunnerConfig {
            blueprint: Scenario::EventPlanning.blueprint().unwrap(),
            overrides,
            output_dir: dir.to_path_buf(),
            timeout: Some(Duration::from_secs(10)),
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_run_writes_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CrewRunner::new(config(dir.path(), RunParameters::new()));

        let (outcome, stats) = runner.run(MockOrchestrator::new()).await;
        let result = outcome.unwrap();

        assert_eq!(result.final_task_id, "marketing");
        assert!(dir.path().join("venue_details.json").exists());
        assert!(dir.path().join("marketing_report.md").exists());
        assert_eq!(stats.aggregate.summary().runs, 1);
        assert_eq!(stats.aggregate.summary().files_written, 2);
    }

    #[tokio::test]
    async fn test_failure_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CrewRunner::new(config(dir.path(), RunParameters::new()));
        let mock = MockOrchestrator::with_config(MockConfig {
            fail_tasks: vec!["logistics".into()],
            ..Default::default()
        });

        let (outcome, stats) = runner.run(mock).await;
        let err = outcome.unwrap_err();

        assert_eq!(err.kind(), contracts::ErrorKind::ExternalExecution);
        assert_eq!(stats.aggregate.summary().failures, 1);
    }

    #[tokio::test]
    async fn test_unknown_override_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = RunParameters::new().with("city", "Berlin");
        let runner = CrewRunner::new(config(dir.path(), overrides));

        let (outcome, _) = runner.run(MockOrchestrator::new()).await;
        assert_eq!(outcome.unwrap_err().kind(), contracts::ErrorKind::Configuration);
    }
}
