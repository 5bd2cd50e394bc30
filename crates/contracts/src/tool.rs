//! Tool references and the custom tool trait

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::ContractError;

/// Reference to a capability a worker may invoke while performing a task
///
/// Built-in kinds are executed by the orchestrator; `Custom` names a tool
/// registered in the toolkit registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolRef {
    /// Web search (requires the search API key)
    Search,

    /// Scrape a website; fixed to one page when `url` is set
    ScrapeWebsite {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Read a file; fixed to one file when `path` is set
    FileRead {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },

    /// List a directory
    DirectoryRead { directory: PathBuf },

    /// Tool resolved by name from the registry
    Custom { name: String },
}

impl ToolRef {
    pub fn scrape(url: impl Into<String>) -> Self {
        Self::ScrapeWebsite {
            url: Some(url.into()),
        }
    }

    pub fn scrape_any() -> Self {
        Self::ScrapeWebsite { url: None }
    }

    pub fn file_read() -> Self {
        Self::FileRead { path: None }
    }

    pub fn directory(directory: impl Into<PathBuf>) -> Self {
        Self::DirectoryRead {
            directory: directory.into(),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom { name: name.into() }
    }

    /// Function name exposed to the model
    pub fn name(&self) -> &str {
        match self {
            ToolRef::Search => "search",
            ToolRef::ScrapeWebsite { .. } => "scrape_website",
            ToolRef::FileRead { .. } => "file_read",
            ToolRef::DirectoryRead { .. } => "directory_read",
            ToolRef::Custom { name } => name,
        }
    }

    pub fn custom_name(&self) -> Option<&str> {
        match self {
            ToolRef::Custom { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.custom_name().is_none()
    }

    /// Human-readable summary for built-in tools
    pub fn describe(&self) -> String {
        match self {
            ToolRef::Search => "Search the internet for up-to-date information.".to_string(),
            ToolRef::ScrapeWebsite { url: Some(url) } => format!("Read the content of {url}."),
            ToolRef::ScrapeWebsite { url: None } => "Read the content of a website.".to_string(),
            ToolRef::FileRead { path: Some(path) } => {
                format!("Read the content of {}.", path.display())
            }
            ToolRef::FileRead { path: None } => "Read the content of a file.".to_string(),
            ToolRef::DirectoryRead { directory } => {
                format!("List the files in {}.", directory.display())
            }
            ToolRef::Custom { name } => format!("Custom tool '{name}'."),
        }
    }
}

/// Custom tool callable by the orchestrator
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Description shown to the model when the tool is offered
    fn description(&self) -> &str;

    fn run(&self, input: &str) -> Result<String, ContractError>;
}

/// Shared handle to a registered tool
pub type ToolHandle = Arc<dyn Tool>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(ToolRef::Search.name(), "search");
        assert_eq!(ToolRef::scrape("https://example.com").name(), "scrape_website");
        assert_eq!(ToolRef::directory("./instructions").name(), "directory_read");
        assert_eq!(ToolRef::custom("sentiment_analysis").name(), "sentiment_analysis");
        assert!(ToolRef::custom("x").custom_name().is_some());
        assert!(ToolRef::file_read().is_builtin());
    }

    #[test]
    fn test_tagged_json_shape() {
        let json = serde_json::to_value(ToolRef::scrape("https://docs.example.com")).unwrap();
        assert_eq!(json["kind"], "scrape_website");
        assert_eq!(json["url"], "https://docs.example.com");

        let parsed: ToolRef = serde_json::from_str(r#"{"kind":"scrape_website"}"#).unwrap();
        assert_eq!(parsed, ToolRef::scrape_any());
    }
}
