//! # Crew Factory
//!
//! Crew assembly and kickoff module.
//!
//! Responsibilities:
//! - Render a `CrewBlueprint` with run parameters into a `RenderedCrew`
//! - Resolve custom tools against the `ToolRegistry`
//! - Submit the crew to an `Orchestrator` exactly once
//! - Verify task outputs against their declared contracts
//! - Provide Mock and OpenAI-compatible orchestrators
//!
//! ## Feature Flags
//!
//! - `openai`: Enable the chat-completions orchestrator (requires reqwest)

pub mod artifacts;
pub mod error;
pub mod factory;
pub mod mock_orchestrator;
pub mod preflight;
pub mod review;

#[cfg(feature = "openai")]
pub mod openai_orchestrator;

pub use contracts::{CrewBlueprint, Orchestrator, PipelineResult, RenderedCrew, RunParameters};
pub use error::{CrewFactoryError, Result};
pub use factory::CrewFactory;
pub use mock_orchestrator::{ExecutionRecord, MockConfig, MockOrchestrator};
pub use review::{AutoApprove, ScriptedReviewer};

#[cfg(feature = "openai")]
pub use openai_orchestrator::OpenAiOrchestrator;
