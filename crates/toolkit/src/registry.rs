//! Tool registry

use std::collections::BTreeMap;
use std::sync::Arc;

use contracts::{ContractError, Tool, ToolHandle, ToolRef};
use tracing::debug;

use crate::SentimentAnalysisTool;

/// Named custom tools, populated at construction time
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolHandle>,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled tools
    pub fn with_defaults() -> Self {
        Self::new().with(SentimentAnalysisTool::new())
    }

    /// Builder-style register
    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Register a tool under its own name, replacing any previous entry
    pub fn register(&mut self, tool: ToolHandle) {
        let name = tool.name().to_string();
        debug!(tool = %name, "tool registered");
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<ToolHandle> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve a tool reference
    ///
    /// Built-in kinds resolve to `None` (the orchestrator owns them). An
    /// unregistered custom name is a configuration error.
    pub fn resolve(&self, tool: &ToolRef) -> Result<Option<ToolHandle>, ContractError> {
        let Some(name) = tool.custom_name() else {
            return Ok(None);
        };
        self.get(name).map(Some).ok_or_else(|| {
            ContractError::config_validation(
                format!("tools.{name}"),
                format!(
                    "custom tool is not registered (available: {})",
                    self.names().join(", ")
                ),
            )
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SENTIMENT_TOOL_NAME;

    struct Echo;

    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Repeats its input."
        }
        fn run(&self, input: &str) -> Result<String, ContractError> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn test_defaults_include_sentiment() {
        let registry = ToolRegistry::with_defaults();
        assert_eq!(registry.names(), vec![SENTIMENT_TOOL_NAME]);
        let tool = registry.get(SENTIMENT_TOOL_NAME).unwrap();
        assert_eq!(tool.run("great work").unwrap(), "positive");
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ToolRegistry::new().with(Echo);
        let resolved = registry.resolve(&ToolRef::custom("echo")).unwrap().unwrap();
        assert_eq!(resolved.run("hi").unwrap(), "hi");
        assert!(registry.resolve(&ToolRef::Search).unwrap().is_none());
    }

    #[test]
    fn test_unknown_custom_tool() {
        let err = ToolRegistry::with_defaults()
            .resolve(&ToolRef::custom("translator"))
            .err().unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("translator"));
    }
}
