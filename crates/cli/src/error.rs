//! Error types for CLI operations.

use std::process::ExitCode;

use contracts::{ContractError, ErrorKind};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Crew definition, parameter, credential or pipeline error
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The selected backend is not compiled into this binary
    #[error("Backend unavailable: {message}")]
    BackendUnavailable { message: String },

    /// The run exceeded `--timeout`
    #[error("Crew run timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Contract(e) => e.kind(),
            Self::BackendUnavailable { .. } => ErrorKind::Configuration,
            Self::Timeout { .. } => ErrorKind::ExternalExecution,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// 2 for configuration errors, 1 for everything else
    pub fn exit_code(&self) -> ExitCode {
        match self.kind() {
            ErrorKind::Configuration => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
