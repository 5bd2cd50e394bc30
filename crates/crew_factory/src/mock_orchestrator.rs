//! Mock orchestrator
//!
//! Deterministic offline implementation for tests, demos and `--mock` runs.
//! Follows the execution plan stage by stage, feeds dependency outputs into
//! each task, invokes custom tools, honours human review and writes declared
//! output files. Failures can be injected per task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{
    ContractError, Credentials, CrewOutput, FieldKind, HumanReviewer, Orchestrator, OutputFormat,
    OutputSchema, RenderedCrew, RenderedTask, ReviewDecision, TaskOutput,
};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::artifacts::write_artifact;
use crate::preflight::check_credentials;
use crate::review::AutoApprove;

const ORCHESTRATOR_NAME: &str = "mock";

/// Mock orchestrator configuration (failure injection and canned results)
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Task ids whose execution fails
    pub fail_tasks: Vec<String>,
    /// Message carried by injected failures
    pub failure_message: Option<String>,
    /// Task id -> raw output returned instead of the generated text
    pub canned_outputs: HashMap<String, String>,
    /// Task ids left out of the returned CrewOutput
    pub omit_tasks: Vec<String>,
    /// Do not write declared output files
    pub skip_output_files: bool,
    /// Enforce the same credential checks as a real backend
    pub require_credentials: Option<Credentials>,
}

/// One executed task, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub task_id: String,
    pub stage: usize,
}

/// Mock orchestrator
pub struct MockOrchestrator {
    config: MockConfig,
    reviewer: Arc<dyn HumanReviewer>,
    kickoff_count: AtomicUsize,
    executed: Mutex<Vec<ExecutionRecord>>,
}

impl MockOrchestrator {
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            reviewer: Arc::new(AutoApprove),
            kickoff_count: AtomicUsize::new(0),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn HumanReviewer>) -> Self {
        self.reviewer = reviewer;
        self
    }

    /// Number of kickoff calls received
    pub fn kickoff_count(&self) -> usize {
        self.kickoff_count.load(Ordering::SeqCst)
    }

    /// Tasks executed so far, in execution order
    pub fn executed(&self) -> Vec<ExecutionRecord> {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, task_id: &str, stage: usize) {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ExecutionRecord {
                task_id: task_id.to_string(),
                stage,
            });
    }

    fn run_task(
        &self,
        crew: &RenderedCrew,
        task: &RenderedTask,
        completed: &HashMap<String, TaskOutput>,
    ) -> Result<TaskOutput, ContractError> {
        if self.config.fail_tasks.contains(&task.id) {
            let message = self
                .config
                .failure_message
                .clone()
                .unwrap_or_else(|| "injected failure".to_string());
            return Err(ContractError::external(
                ORCHESTRATOR_NAME,
                format!("task '{}' failed: {message}", task.id),
            ));
        }

        let mut raw = match self.config.canned_outputs.get(&task.id) {
            Some(canned) => canned.clone(),
            None => self.generate(crew, task, completed)?,
        };

        if task.human_input {
            if let ReviewDecision::Revise { feedback } = self.reviewer.review(&task.id, &raw)? {
                debug!(task_id = %task.id, "revising after human feedback");
                raw = match task.output_format {
                    // structured results stay parseable; feedback is logged only
                    OutputFormat::Structured { .. } => raw,
                    OutputFormat::Text => format!("{raw}\n\nRevised per feedback: {feedback}"),
                };
            }
        }

        let mut output = TaskOutput::new(&task.id, &task.worker_id, raw);
        if let (Some(path), false) = (&task.output_file, self.config.skip_output_files) {
            let written = write_artifact(&crew.output_dir, path, &output.raw)?;
            output.files.push(written);
        }
        Ok(output)
    }

    fn generate(
        &self,
        crew: &RenderedCrew,
        task: &RenderedTask,
        completed: &HashMap<String, TaskOutput>,
    ) -> Result<String, ContractError> {
        if let OutputFormat::Structured { schema } = &task.output_format {
            return Ok(sample_record(schema, task).to_string());
        }

        let role = crew
            .worker(&task.worker_id)
            .map(|w| w.role.as_str())
            .unwrap_or(task.worker_id.as_str());

        let mut text = format!(
            "[{role}] {}\n\nExpected output: {}",
            task.description.trim(),
            task.expected_output.trim()
        );

        for dep in &task.context {
            if let Some(prior) = completed.get(dep) {
                let first_line = prior.raw.lines().next().unwrap_or_default();
                text.push_str(&format!("\n\nBuilt on '{dep}': {first_line}"));
            }
        }

        for tool in task.tools.iter().filter_map(|t| t.custom_name()) {
            let handle = crew.tool(tool).ok_or_else(|| {
                ContractError::tool(tool, "tool was not resolved for this crew")
            })?;
            let result = handle.run(&text)?;
            text.push_str(&format!("\n\nTool {tool}: {result}"));
        }

        Ok(text)
    }
}

impl Default for MockOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator for MockOrchestrator {
    fn name(&self) -> &str {
        ORCHESTRATOR_NAME
    }

    fn preflight(&self, crew: &RenderedCrew) -> Result<(), ContractError> {
        match &self.config.require_credentials {
            Some(credentials) => check_credentials(credentials, crew),
            None => Ok(()),
        }
    }

    #[instrument(
        name = "mock_orchestrator_kickoff",
        skip(self, crew),
        fields(crew = %crew.name, tasks = crew.tasks.len(), stages = crew.plan.stage_count())
    )]
    async fn kickoff(&self, crew: &RenderedCrew) -> Result<CrewOutput, ContractError> {
        self.kickoff_count.fetch_add(1, Ordering::SeqCst);
        let mut completed: HashMap<String, TaskOutput> = HashMap::new();

        for (stage, task_ids) in crew.plan.stages().into_iter().enumerate() {
            for task_id in task_ids {
                let task = crew.task(&task_id).ok_or_else(|| {
                    ContractError::external(
                        ORCHESTRATOR_NAME,
                        format!("plan references unknown task '{task_id}'"),
                    )
                })?;
                self.record(&task.id, stage);
                let output = self.run_task(crew, task, &completed)?;
                info!(task_id = %task.id, stage, bytes = output.raw.len(), "task completed");
                completed.insert(task_id, output);
            }
        }

        let tasks = crew
            .tasks
            .iter()
            .filter(|t| !self.config.omit_tasks.contains(&t.id))
            .filter_map(|t| completed.remove(&t.id))
            .collect();
        Ok(CrewOutput { tasks })
    }
}

/// Deterministic record satisfying `schema`
fn sample_record(schema: &OutputSchema, task: &RenderedTask) -> Value {
    let mut record = Map::new();
    for field in &schema.fields {
        let value = match field.kind {
            FieldKind::String => Value::String(format!("{} {}", task.id, field.name)),
            FieldKind::Integer => Value::from(1),
            FieldKind::Number => Value::from(1.0),
            FieldKind::Boolean => Value::Bool(true),
        };
        record.insert(field.name.clone(), value);
    }
    Value::Object(record)
}
