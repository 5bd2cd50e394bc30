//! # Scenarios
//!
//! The four bundled crews. Each module exposes the same shape:
//!
//! - `build_workers()` - hand-authored worker list
//! - `build_tasks(&workers)` - task list, checked against the workers
//! - `parameters()` - declared parameters and their defaults
//! - `blueprint()` - everything above as one `CrewBlueprint`
//!
//! `run_<scenario>` entry functions merge caller overrides with the defaults
//! and kick the crew off once.
//!
//! ## Example
//!
//! ```ignore
//! use crew_factory::MockOrchestrator;
//!
//! let result = scenarios::run_article(MockOrchestrator::new(), [("topic", "Rust")]).await?;
//! println!("{}", result.final_output);
//! ```

pub mod article;
pub mod customer_outreach;
pub mod customer_support;
pub mod event_planning;

use std::fmt;
use std::str::FromStr;

use config_loader::ConfigLoader;
use contracts::{
    ContractError, CrewBlueprint, CrewSettings, Orchestrator, ParameterSpec, PipelineResult,
    RunParameters, TaskSpec, WorkerSpec,
};
use crew_factory::CrewFactory;
use serde::Serialize;
use tracing::{info, instrument};

/// Bundled scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Article,
    CustomerSupport,
    CustomerOutreach,
    EventPlanning,
}

impl Scenario {
    pub fn all() -> [Scenario; 4] {
        [
            Scenario::Article,
            Scenario::CustomerSupport,
            Scenario::CustomerOutreach,
            Scenario::EventPlanning,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Article => article::NAME,
            Scenario::CustomerSupport => customer_support::NAME,
            Scenario::CustomerOutreach => customer_outreach::NAME,
            Scenario::EventPlanning => event_planning::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Scenario> {
        Self::all().into_iter().find(|s| s.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::Article => "Research, plan, write and edit a blog article",
            Scenario::CustomerSupport => "Answer a customer inquiry with a QA review pass",
            Scenario::CustomerOutreach => "Profile a lead and draft a personalized outreach",
            Scenario::EventPlanning => "Book a venue, arrange logistics and market an event",
        }
    }

    pub fn parameters(self) -> Vec<ParameterSpec> {
        match self {
            Scenario::Article => article::parameters(),
            Scenario::CustomerSupport => customer_support::parameters(),
            Scenario::CustomerOutreach => customer_outreach::parameters(),
            Scenario::EventPlanning => event_planning::parameters(),
        }
    }

    /// Full blueprint
    ///
    /// # Errors
    /// Only if the bundled task list is inconsistent with its workers
    pub fn blueprint(self) -> Result<CrewBlueprint, ContractError> {
        match self {
            Scenario::Article => article::blueprint(),
            Scenario::CustomerSupport => customer_support::blueprint(),
            Scenario::CustomerOutreach => customer_outreach::blueprint(),
            Scenario::EventPlanning => event_planning::blueprint(),
        }
    }

    /// Run with a fresh factory around `orchestrator`
    pub async fn run<O: Orchestrator>(
        self,
        orchestrator: O,
        overrides: &RunParameters,
    ) -> Result<PipelineResult, ContractError> {
        self.run_with(&CrewFactory::new(orchestrator), overrides)
            .await
    }

    /// Run with a caller-configured factory (tools, output directory)
    #[instrument(
        name = "scenario_run",
        skip(self, factory, overrides),
        fields(scenario = self.name(), orchestrator = factory.orchestrator().name())
    )]
    pub async fn run_with<O: Orchestrator>(
        self,
        factory: &CrewFactory<O>,
        overrides: &RunParameters,
    ) -> Result<PipelineResult, ContractError> {
        let blueprint = self.blueprint()?;
        let result = factory.kickoff(&blueprint, overrides).await?;
        info!(
            final_task = %result.final_task_id,
            tasks = result.task_outputs.len(),
            files = result.files.len(),
            "scenario completed"
        );
        Ok(result)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::from_name(s).ok_or_else(|| {
            let known: Vec<_> = Scenario::all().iter().map(|s| s.name()).collect();
            ContractError::config_validation(
                "scenario",
                format!("unknown scenario '{}', expected one of: {}", s, known.join(", ")),
            )
        })
    }
}

/// Validate a hand-authored task list against its workers and parameters
///
/// Builds a throwaway blueprint so the same checks apply as for loaded
/// configuration files.
pub(crate) fn check_tasks(
    name: &str,
    workers: &[WorkerSpec],
    tasks: &[TaskSpec],
    parameters: &[ParameterSpec],
) -> Result<(), ContractError> {
    let blueprint = CrewBlueprint::new(name, workers.to_vec(), tasks.to_vec())
        .with_parameters(parameters.to_vec());
    ConfigLoader::validate(&blueprint)
}

pub(crate) fn assemble_blueprint(
    name: &str,
    settings: CrewSettings,
    parameters: Vec<ParameterSpec>,
    workers: Vec<WorkerSpec>,
    build_tasks: fn(&[WorkerSpec]) -> Result<Vec<TaskSpec>, ContractError>,
) -> Result<CrewBlueprint, ContractError> {
    let tasks = build_tasks(&workers)?;
    Ok(CrewBlueprint::new(name, workers, tasks)
        .with_settings(settings)
        .with_parameters(parameters))
}

fn overrides<I, K, V>(overrides: I) -> RunParameters
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    overrides.into_iter().collect()
}

/// Research and write an article on `topic`
pub async fn run_article<O, I, K, V>(
    orchestrator: O,
    params: I,
) -> Result<PipelineResult, ContractError>
where
    O: Orchestrator,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    Scenario::Article
        .run(orchestrator, &overrides(params))
        .await
}

/// Answer `inquiry` from `person` at `customer`
pub async fn run_customer_support<O, I, K, V>(
    orchestrator: O,
    params: I,
) -> Result<PipelineResult, ContractError>
where
    O: Orchestrator,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    Scenario::CustomerSupport
        .run(orchestrator, &overrides(params))
        .await
}

/// Profile `lead_name` and draft an outreach to `key_decision_maker`
pub async fn run_customer_outreach<O, I, K, V>(
    orchestrator: O,
    params: I,
) -> Result<PipelineResult, ContractError>
where
    O: Orchestrator,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    Scenario::CustomerOutreach
        .run(orchestrator, &overrides(params))
        .await
}

/// Plan `event_topic` in `event_city`
pub async fn run_event_planning<O, I, K, V>(
    orchestrator: O,
    params: I,
) -> Result<PipelineResult, ContractError>
where
    O: Orchestrator,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    Scenario::EventPlanning
        .run(orchestrator, &overrides(params))
        .await
}
