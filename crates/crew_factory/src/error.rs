//! Crew Factory error types

use contracts::{ContractError, ErrorKind};
use thiserror::Error;

/// Crew Factory specific error
#[derive(Debug, Error)]
pub enum CrewFactoryError {
    /// Custom tool referenced by a task is not registered
    #[error("task '{task_id}' references unknown tool '{tool}'")]
    UnknownTool { task_id: String, tool: String },

    /// Orchestrator returned no result for a declared task
    #[error("orchestrator returned no output for task '{task_id}'")]
    MissingOutput { task_id: String },

    /// Orchestrator returned more than one result for a task, or one for an undeclared task
    #[error("orchestrator returned unexpected output for task '{task_id}': {message}")]
    UnexpectedOutput { task_id: String, message: String },

    /// Declared output file absent after the run
    #[error("task '{task_id}' declared output file '{path}' but it was not written")]
    MissingOutputFile { task_id: String, path: String },

    /// Declared output file exists but does not hold the task's result
    #[error("task '{task_id}' output file '{path}' does not contain the task's result")]
    StaleOutputFile { task_id: String, path: String },

    /// HTTP transport failure
    #[cfg(feature = "openai")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl CrewFactoryError {
    pub fn missing_output(task_id: impl Into<String>) -> Self {
        Self::MissingOutput {
            task_id: task_id.into(),
        }
    }

    pub fn missing_output_file(task_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingOutputFile {
            task_id: task_id.into(),
            path: path.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool { .. } => ErrorKind::Configuration,
            Self::MissingOutput { .. }
            | Self::UnexpectedOutput { .. }
            | Self::MissingOutputFile { .. }
            | Self::StaleOutputFile { .. } => ErrorKind::ExternalExecution,
            #[cfg(feature = "openai")]
            Self::Http(_) => ErrorKind::ExternalExecution,
            Self::Contract(e) => e.kind(),
        }
    }
}

impl From<CrewFactoryError> for ContractError {
    fn from(err: CrewFactoryError) -> Self {
        match err {
            CrewFactoryError::Contract(e) => e,
            CrewFactoryError::UnknownTool { ref task_id, .. } => {
                ContractError::config_validation(format!("tasks[id={task_id}].tools"), err.to_string())
            }
            CrewFactoryError::MissingOutput { .. }
            | CrewFactoryError::UnexpectedOutput { .. }
            | CrewFactoryError::MissingOutputFile { .. }
            | CrewFactoryError::StaleOutputFile { .. } => {
                ContractError::external("crew_factory", err.to_string())
            }
            #[cfg(feature = "openai")]
            CrewFactoryError::Http(e) => ContractError::external("openai", e.to_string()),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CrewFactoryError>;
