//! Task outputs and structured output contracts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::ContractError;

/// Declared result format of a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Structured { schema: OutputSchema },
}

impl OutputFormat {
    pub fn schema(&self) -> Option<&OutputSchema> {
        match self {
            OutputFormat::Text => None,
            OutputFormat::Structured { schema } => Some(schema),
        }
    }
}

/// Record schema a structured task result must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// JSON Schema document passed to the model as a response format
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    serde_json::json!({ "type": field.kind.as_str() }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect();

        serde_json::json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Parse a raw task result and check it against the schema
    ///
    /// Accepts a bare JSON object or one wrapped in a Markdown code fence.
    pub fn parse(&self, task_id: &str, raw: &str) -> Result<Value, ContractError> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body).map_err(|e| {
            ContractError::output_contract(
                task_id,
                format!("result for schema '{}' is not valid JSON: {e}", self.name),
            )
        })?;
        self.check(task_id, &value)?;
        Ok(value)
    }

    pub fn check(&self, task_id: &str, value: &Value) -> Result<(), ContractError> {
        let object = value.as_object().ok_or_else(|| {
            ContractError::output_contract(
                task_id,
                format!("result for schema '{}' is not a JSON object", self.name),
            )
        })?;

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ContractError::output_contract(
                        task_id,
                        format!("missing required field '{}'", field.name),
                    ));
                }
                Some(value) if !value.is_null() && !field.kind.matches(value) => {
                    return Err(ContractError::output_contract(
                        task_id,
                        format!(
                            "field '{}' expected {}, got {}",
                            field.name,
                            field.kind.as_str(),
                            value
                        ),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the optional language tag on the opening line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Result of a single task as reported by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub worker_id: String,
    pub raw: String,
    /// Parsed record, present for structured tasks after verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

impl TaskOutput {
    pub fn new(
        task_id: impl Into<String>,
        worker_id: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            raw: raw.into(),
            structured: None,
            files: Vec::new(),
        }
    }
}

/// Everything one kickoff returned, in task declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    pub fn get(&self, task_id: &str) -> Option<&TaskOutput> {
        self.tasks.iter().find(|output| output.task_id == task_id)
    }
}

/// Final product of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub crew: String,
    pub final_task_id: String,
    /// Raw result of the last declared task
    pub final_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    pub task_outputs: Vec<TaskOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn output_of(&self, task_id: &str) -> Option<&TaskOutput> {
        self.task_outputs.iter().find(|o| o.task_id == task_id)
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.final_output)
    }
}
