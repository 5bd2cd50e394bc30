//! Orchestrator trait - Crew Factory execution interface
//!
//! The orchestrator is the external engine that actually runs a crew. All
//! prompt construction, model calls and tool execution happen behind it.

use crate::{ContractError, CrewOutput, RenderedCrew};

/// Crew execution trait
///
/// `kickoff` is called at most once per pipeline run.
#[trait_variant::make(Orchestrator: Send)]
pub trait LocalOrchestrator {
    /// Orchestrator name (used for logging/metrics and error messages)
    fn name(&self) -> &str;

    /// Checks that need no external call (credentials, tool availability)
    ///
    /// # Errors
    /// Returns a configuration-family error
    fn preflight(&self, crew: &RenderedCrew) -> Result<(), ContractError>;

    /// Run every task of the crew and return their outputs
    ///
    /// # Errors
    /// Returns the orchestrator failure, message unmodified
    async fn kickoff(&self, crew: &RenderedCrew) -> Result<CrewOutput, ContractError>;
}

impl<T: Orchestrator + Sync> Orchestrator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn preflight(&self, crew: &RenderedCrew) -> Result<(), ContractError> {
        (**self).preflight(crew)
    }

    async fn kickoff(&self, crew: &RenderedCrew) -> Result<CrewOutput, ContractError> {
        (**self).kickoff(crew).await
    }
}

/// Outcome of a human review step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Revise { feedback: String },
}

/// Human-in-the-loop reviewer for tasks that require approval
pub trait HumanReviewer: Send + Sync {
    fn review(&self, task_id: &str, output: &str) -> Result<ReviewDecision, ContractError>;
}

/// Reviewer that accepts every result unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl HumanReviewer for AutoApprove {
    fn review(&self, _task_id: &str, _output: &str) -> Result<ReviewDecision, ContractError> {
        Ok(ReviewDecision::Approve)
    }
}
