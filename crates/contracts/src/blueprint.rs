//! CrewBlueprint - Config Loader output
//!
//! Describes a complete crew: settings, declared run parameters, workers and tasks.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::{OutputFormat, OutputSchema, PlanEntry, RunParameters, ToolRef};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete crew blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Crew name (used for logging and metrics labels)
    pub name: String,

    /// Crew-wide settings passed through to the orchestrator
    #[serde(default)]
    pub settings: CrewSettings,

    /// Placeholders the templates may reference, with optional defaults
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,

    /// Workers in declaration order
    pub workers: Vec<WorkerSpec>,

    /// Tasks in declaration order
    pub tasks: Vec<TaskSpec>,
}

/// Crew-wide settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSettings {
    /// Verbose orchestrator logging
    #[serde(default)]
    pub verbose: bool,

    /// Cross-task memory; opaque to this crate
    #[serde(default)]
    pub memory: bool,
}

/// Declared template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterSpec {
    /// Parameter without a default; callers must supply it
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            description: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl ToString) -> Self {
        Self {
            name: name.into(),
            default: Some(default.to_string()),
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Role-playing worker specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WorkerSpec {
    /// Unique short key, referenced by tasks
    #[validate(length(min = 1, message = "worker id cannot be empty"))]
    pub id: String,

    /// Role name shown to the model (e.g., "Content Planner")
    #[validate(length(min = 1, message = "role cannot be empty"))]
    pub role: String,

    /// Objective, templated
    #[validate(length(min = 1, message = "goal cannot be empty"))]
    pub goal: String,

    /// Persona, templated
    #[validate(length(min = 1, message = "backstory cannot be empty"))]
    pub backstory: String,

    #[serde(default)]
    pub allow_delegation: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub memory: bool,

    /// Worker-level tool set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolRef>,
}

impl WorkerSpec {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
            memory: false,
            tools: Vec::new(),
        }
    }

    pub fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolRef>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }
}

/// Unit of instructed work assigned to exactly one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskSpec {
    /// Unique short key, referenced by dependent tasks
    #[validate(length(min = 1, message = "task id cannot be empty"))]
    pub id: String,

    /// Instructions, templated
    #[validate(length(min = 1, message = "description cannot be empty"))]
    pub description: String,

    /// Expected-output description, templated
    #[validate(length(min = 1, message = "expected_output cannot be empty"))]
    pub expected_output: String,

    /// Assigned worker id
    #[validate(length(min = 1, message = "worker reference cannot be empty"))]
    pub worker: String,

    /// Tasks whose outputs this task receives as context; must be declared earlier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// Task-level tools; when non-empty they replace the worker's tool set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolRef>,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// File the orchestrator writes the task result to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,

    /// Human approval required before the result is final
    #[serde(default)]
    pub human_input: bool,

    /// May run concurrently with siblings that do not depend on it
    #[serde(default)]
    pub async_execution: bool,
}

impl TaskSpec {
    pub fn new(
        id: impl Into<String>,
        worker: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            worker: worker.into(),
            context: Vec::new(),
            tools: Vec::new(),
            output_format: OutputFormat::Text,
            output_file: None,
            human_input: false,
            async_execution: false,
        }
    }

    pub fn depends_on<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = tasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolRef>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }

    pub fn structured(mut self, schema: OutputSchema) -> Self {
        self.output_format = OutputFormat::Structured { schema };
        self
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn human_input(mut self, required: bool) -> Self {
        self.human_input = required;
        self
    }

    pub fn async_execution(mut self, enabled: bool) -> Self {
        self.async_execution = enabled;
        self
    }

    /// Tools available while running this task
    pub fn effective_tools<'a>(&'a self, worker: &'a WorkerSpec) -> &'a [ToolRef] {
        if self.tools.is_empty() {
            &worker.tools
        } else {
            &self.tools
        }
    }

    pub fn plan_entry(&self) -> PlanEntry<'_> {
        PlanEntry {
            id: &self.id,
            context: &self.context,
            async_execution: self.async_execution,
        }
    }
}

impl CrewBlueprint {
    pub fn new(name: impl Into<String>, workers: Vec<WorkerSpec>, tasks: Vec<TaskSpec>) -> Self {
        Self {
            version: ConfigVersion::V1,
            name: name.into(),
            settings: CrewSettings::default(),
            parameters: Vec::new(),
            workers,
            tasks,
        }
    }

    pub fn with_settings(mut self, settings: CrewSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn worker(&self, id: &str) -> Option<&WorkerSpec> {
        self.workers.iter().find(|worker| worker.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Position of a task in declaration order
    pub fn task_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn final_task(&self) -> Option<&TaskSpec> {
        self.tasks.last()
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Defaults of every declared parameter that has one
    pub fn default_parameters(&self) -> RunParameters {
        self.parameters
            .iter()
            .filter_map(|param| {
                param
                    .default
                    .as_ref()
                    .map(|value| (param.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Tools in effect for every task, paired with the task id
    pub fn effective_tools(&self) -> impl Iterator<Item = (&str, &ToolRef)> {
        self.tasks.iter().flat_map(move |task| {
            let tools: &[ToolRef] = match self.worker(&task.worker) {
                Some(worker) => task.effective_tools(worker),
                None => &task.tools,
            };
            tools.iter().map(move |tool| (task.id.as_str(), tool))
        })
    }

    pub fn uses_search(&self) -> bool {
        self.effective_tools()
            .any(|(_, tool)| matches!(tool, ToolRef::Search))
    }
}
