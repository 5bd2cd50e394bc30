//! Blueprint parsing
//!
//! TOML is the primary format; JSON is accepted for generated configs.

use contracts::{ContractError, CrewBlueprint};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<CrewBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<CrewBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<CrewBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OutputFormat, ToolRef};

    #[test]
    fn test_parse_toml_with_tools_and_schema() {
        let content = r#"
name = "events"

[[parameters]]
name = "event_city"
default = "San Francisco"

[[workers]]
id = "venue_coordinator"
role = "Venue Coordinator"
goal = "Find a venue in {event_city}"
backstory = "You know venues."
tools = [{ kind = "search" }, { kind = "scrape_website" }]

[[tasks]]
id = "venue"
worker = "venue_coordinator"
description = "Find a venue in {event_city}."
expected_output = "Venue details"
output_file = "venue_details.json"
human_input = true

[tasks.output_format]
kind = "structured"

[tasks.output_format.schema]
name = "VenueDetails"
fields = [
    { name = "name", kind = "string" },
    { name = "capacity", kind = "integer" },
]
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.workers[0].tools.len(), 2);
        assert_eq!(bp.workers[0].tools[1], ToolRef::scrape_any());
        let task = &bp.tasks[0];
        assert!(task.human_input);
        match &task.output_format {
            OutputFormat::Structured { schema } => {
                assert_eq!(schema.name, "VenueDetails");
                assert!(schema.fields.iter().all(|f| f.required));
            }
            OutputFormat::Text => panic!("expected structured output"),
        }
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "name": "tiny",
            "workers": [{ "id": "w", "role": "R", "goal": "G", "backstory": "B" }],
            "tasks": [{
                "id": "t",
                "worker": "w",
                "description": "D",
                "expected_output": "E",
                "tools": [{ "kind": "custom", "name": "sentiment_analysis" }]
            }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.tasks[0].tools[0].custom_name(), Some("sentiment_analysis"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_tool_kind_rejected() {
        let content = r#"
name = "x"
[[workers]]
id = "w"
role = "R"
goal = "G"
backstory = "B"
tools = [{ kind = "teleport" }]
[[tasks]]
id = "t"
worker = "w"
description = "D"
expected_output = "E"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
