//! Shared plumbing for the scenario demos.
//!
//! Arguments: `--mock` selects the mock orchestrator, every `key=value`
//! overrides a scenario parameter.

use std::process::ExitCode;

use contracts::{ContractError, CrewOutput, Orchestrator, PipelineResult, RenderedCrew};
use crew_factory::MockOrchestrator;

/// Orchestrator picked from the command line and enabled features
pub enum DemoOrchestrator {
    Mock(MockOrchestrator),
    #[cfg(feature = "openai")]
    OpenAi(crew_factory::OpenAiOrchestrator),
}

impl Orchestrator for DemoOrchestrator {
    fn name(&self) -> &str {
        match self {
            Self::Mock(o) => o.name(),
            #[cfg(feature = "openai")]
            Self::OpenAi(o) => o.name(),
        }
    }

    fn preflight(&self, crew: &RenderedCrew) -> Result<(), ContractError> {
        match self {
            Self::Mock(o) => o.preflight(crew),
            #[cfg(feature = "openai")]
            Self::OpenAi(o) => o.preflight(crew),
        }
    }

    async fn kickoff(&self, crew: &RenderedCrew) -> Result<CrewOutput, ContractError> {
        match self {
            Self::Mock(o) => o.kickoff(crew).await,
            #[cfg(feature = "openai")]
            Self::OpenAi(o) => o.kickoff(crew).await,
        }
    }
}

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();
}

fn mock_requested() -> bool {
    std::env::args().skip(1).any(|arg| arg == "--mock")
}

/// `key=value` arguments as parameter overrides
pub fn overrides() -> Vec<(String, String)> {
    std::env::args()
        .skip(1)
        .filter_map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(feature = "openai")]
pub fn orchestrator() -> Result<DemoOrchestrator, ContractError> {
    if mock_requested() {
        tracing::info!("Using mock orchestrator");
        return Ok(DemoOrchestrator::Mock(MockOrchestrator::new()));
    }

    let env_file = std::path::Path::new(".env");
    let credentials = if env_file.exists() {
        config_loader::CredentialsLoader::load(env_file)?
    } else {
        config_loader::CredentialsLoader::from_env()
    };
    tracing::info!(model = %credentials.model, "Using OpenAI-compatible orchestrator");
    Ok(DemoOrchestrator::OpenAi(
        crew_factory::OpenAiOrchestrator::new(credentials),
    ))
}

#[cfg(not(feature = "openai"))]
pub fn orchestrator() -> Result<DemoOrchestrator, ContractError> {
    if !mock_requested() {
        tracing::warn!("Built without the `openai` feature, falling back to the mock orchestrator");
    }
    Ok(DemoOrchestrator::Mock(MockOrchestrator::new()))
}

/// Print the final output on stdout and map errors to exit codes
pub fn report(outcome: Result<PipelineResult, ContractError>) -> ExitCode {
    match outcome {
        Ok(result) => {
            println!("{}", result.final_output);
            for file in &result.files {
                tracing::info!(path = %file.display(), "Output file written");
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_configuration() => {
            eprintln!("Configuration error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
