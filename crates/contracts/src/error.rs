//! Layered error definitions
//!
//! Categorized by source: configuration / credentials / orchestrator / output contract / tool

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error (bad reference, ordering, placeholder)
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Required credential absent from environment and secrets file
    #[error("missing credential: {name} is not set in the environment or secrets file")]
    MissingCredential { name: String },

    // ===== Orchestrator Errors =====
    /// Failure surfaced by the external orchestrator, message kept verbatim
    #[error("orchestrator '{orchestrator}' failed: {message}")]
    ExternalExecution {
        orchestrator: String,
        message: String,
    },

    // ===== Output Contract Errors =====
    /// Task result does not satisfy its declared structured schema
    #[error("output contract violated by task '{task_id}': {message}")]
    OutputContractViolation { task_id: String, message: String },

    // ===== Tool Errors =====
    /// Custom tool invocation failed
    #[error("tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Coarse error classification used for exit codes and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    ExternalExecution,
    OutputContract,
    Io,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::ExternalExecution => "external_execution",
            ErrorKind::OutputContract => "output_contract",
            ErrorKind::Io => "io",
            ErrorKind::Other => "other",
        }
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create missing credential error
    pub fn missing_credential(name: impl Into<String>) -> Self {
        Self::MissingCredential { name: name.into() }
    }

    /// Create external execution error
    pub fn external(orchestrator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalExecution {
            orchestrator: orchestrator.into(),
            message: message.into(),
        }
    }

    /// Create output contract violation
    pub fn output_contract(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutputContractViolation {
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    /// Create tool error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::MissingCredential { .. } => ErrorKind::Configuration,
            Self::ExternalExecution { .. } | Self::Tool { .. } => ErrorKind::ExternalExecution,
            Self::OutputContractViolation { .. } => ErrorKind::OutputContract,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// True for errors detected before any external call is made
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
