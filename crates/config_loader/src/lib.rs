//! # Config Loader
//!
//! Crew blueprint loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON crew blueprints
//! - Validate the worker/task graph and its templates
//! - Extract and substitute `{placeholder}` parameters
//! - Load credentials from the environment and a secrets file
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("crews/article.toml")).unwrap();
//! println!("Crew: {} ({} tasks)", blueprint.name, blueprint.tasks.len());
//! ```

mod credentials;
mod parser;
pub mod template;
mod validator;

pub use contracts::CrewBlueprint;
pub use credentials::CredentialsLoader;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load blueprints from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint from file path
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<CrewBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a blueprint from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CrewBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        Self::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Validate an in-memory blueprint (first error wins)
    pub fn validate(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize a blueprint to TOML string
    pub fn to_toml(blueprint: &CrewBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a blueprint to JSON string
    pub fn to_json(blueprint: &CrewBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        std::fs::read_to_string(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
name = "article"

[settings]
verbose = true

[[parameters]]
name = "topic"
default = "Artificial Intelligence"

[[workers]]
id = "planner"
role = "Content Planner"
goal = "Plan engaging and factually accurate content on {topic}"
backstory = "You're working on planning a blog article about the topic: {topic}."

[[workers]]
id = "writer"
role = "Content Writer"
goal = "Write insightful and factually accurate opinion piece about the topic: {topic}"
backstory = "You're working on a writing a new opinion piece about the topic: {topic}."

[[tasks]]
id = "plan"
worker = "planner"
description = "Prioritize the latest trends on {topic}."
expected_output = "A comprehensive content plan document."

[[tasks]]
id = "write"
worker = "writer"
description = "Use the content plan to craft a blog post on {topic}."
expected_output = "A well-written blog post in markdown format."
context = ["plan"]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.name, "article");
        assert!(bp.settings.verbose);
        assert_eq!(bp.tasks[1].context, vec!["plan".to_string()]);
    }

    #[test]
    fn test_toml_survives_reserialization() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.tasks, bp2.tasks);
        assert_eq!(bp.workers, bp2.workers);
    }

    #[test]
    fn test_json_export_loads() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.parameters, bp2.parameters);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = MINIMAL_TOML.replace(r#"context = ["plan"]"#, r#"context = ["edit"]"#);
        let err = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("tasks[id=write].context"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.toml");
        std::fs::write(&path, MINIMAL_TOML).unwrap();
        assert!(ConfigLoader::load_from_path(&path).is_ok());

        let yaml = dir.path().join("article.yaml");
        std::fs::write(&yaml, "name: x").unwrap();
        let err = ConfigLoader::load_from_path(&yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
