//! CrewFactory core implementation
//!
//! Renders a CrewBlueprint into a RenderedCrew, submits it to the
//! orchestrator once and verifies what comes back.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use config_loader::{template, ConfigLoader};
use contracts::{
    ContractError, CrewBlueprint, CrewOutput, ExecutionPlan, Orchestrator, OutputFormat, PipelineResult,
    RenderedCrew, RenderedTask, RenderedWorker, RunParameters, TaskOutput, ToolHandle,
};
use toolkit::ToolRegistry;
use tracing::{debug, info, instrument, warn};

use crate::error::{CrewFactoryError, Result};

/// Crew Factory
///
/// Owns the orchestrator and the custom tool registry. Every `kickoff` builds
/// a fresh RenderedCrew; nothing is shared between runs.
pub struct CrewFactory<O: Orchestrator> {
    orchestrator: O,
    tools: ToolRegistry,
    output_dir: PathBuf,
}

impl<O: Orchestrator> CrewFactory<O> {
    /// Factory with the bundled tools and output files under the working directory
    pub fn new(orchestrator: O) -> Self {
        Self {
            orchestrator,
            tools: ToolRegistry::with_defaults(),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Directory relative `output_file` paths are written under
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Validate, render and plan a crew without contacting the orchestrator
    ///
    /// # Errors
    /// Configuration errors only: invalid graph, unknown or missing
    /// parameters, unregistered custom tools.
    #[instrument(
        name = "crew_factory_assemble",
        skip(self, blueprint, overrides),
        fields(crew = %blueprint.name, overrides = overrides.len())
    )]
    pub fn assemble(
        &self,
        blueprint: &CrewBlueprint,
        overrides: &RunParameters,
    ) -> Result<RenderedCrew> {
        ConfigLoader::validate(blueprint)?;
        let params = template::resolve_parameters(&blueprint.parameters, overrides)?;

        let used = template::blueprint_placeholders(blueprint);
        for name in params.names().filter(|name| !used.contains(*name)) {
            debug!(parameter = %name, "parameter not referenced by any template");
        }

        let workers = blueprint
            .workers
            .iter()
            .map(|worker| -> Result<RenderedWorker> {
                let location = format!("workers[id={}]", worker.id);
                Ok(RenderedWorker {
                    id: worker.id.clone(),
                    role: worker.role.clone(),
                    goal: template::render(&worker.goal, &params, &format!("{location}.goal"))?,
                    backstory: template::render(
                        &worker.backstory,
                        &params,
                        &format!("{location}.backstory"),
                    )?,
                    allow_delegation: worker.allow_delegation,
                    verbose: worker.verbose || blueprint.settings.verbose,
                    memory: worker.memory || blueprint.settings.memory,
                    tools: worker.tools.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tasks = Vec::with_capacity(blueprint.tasks.len());
        let mut tools: BTreeMap<String, ToolHandle> = BTreeMap::new();
        for task in &blueprint.tasks {
            let worker = blueprint.worker(&task.worker).ok_or_else(|| {
                ContractError::config_validation(
                    format!("tasks[id={}].worker", task.id),
                    format!("worker '{}' is not declared", task.worker),
                )
            })?;
            let effective = task.effective_tools(worker).to_vec();

            for tool in &effective {
                match self.tools.resolve(tool) {
                    Ok(Some(handle)) => {
                        tools.insert(tool.name().to_string(), handle);
                    }
                    Ok(None) => {}
                    Err(_) => {
                        return Err(CrewFactoryError::UnknownTool {
                            task_id: task.id.clone(),
                            tool: tool.name().to_string(),
                        });
                    }
                }
            }

            let location = format!("tasks[id={}]", task.id);
            tasks.push(RenderedTask {
                id: task.id.clone(),
                worker_id: task.worker.clone(),
                description: template::render(
                    &task.description,
                    &params,
                    &format!("{location}.description"),
                )?,
                expected_output: template::render(
                    &task.expected_output,
                    &params,
                    &format!("{location}.expected_output"),
                )?,
                context: task.context.clone(),
                tools: effective,
                output_format: task.output_format.clone(),
                output_file: task.output_file.clone(),
                human_input: task.human_input,
                async_execution: task.async_execution,
            });
        }

        let plan = ExecutionPlan::build(tasks.iter().map(RenderedTask::plan_entry))?;
        info!(
            workers = workers.len(),
            tasks = tasks.len(),
            stages = plan.stage_count(),
            custom_tools = tools.len(),
            "crew assembled"
        );

        Ok(RenderedCrew {
            name: blueprint.name.clone(),
            settings: blueprint.settings,
            workers,
            tasks,
            tools,
            plan,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Assemble the crew, run it once and verify the outputs
    ///
    /// # Errors
    /// - configuration errors, raised before any external call
    /// - the orchestrator's own error, unmodified
    /// - output contract violations and missing outputs
    #[instrument(
        name = "crew_factory_kickoff",
        skip(self, blueprint, overrides),
        fields(crew = %blueprint.name, orchestrator = %self.orchestrator.name())
    )]
    pub async fn kickoff(
        &self,
        blueprint: &CrewBlueprint,
        overrides: &RunParameters,
    ) -> Result<PipelineResult> {
        let crew = self.assemble(blueprint, overrides)?;
        self.orchestrator.preflight(&crew)?;

        let started_at = Utc::now();
        let output = self.orchestrator.kickoff(&crew).await.inspect_err(|e| {
            warn!(error = %e, "orchestrator kickoff failed");
        })?;
        let task_outputs = self.verify(&crew, output)?;
        let finished_at = Utc::now();

        metrics::counter!("crew_tasks_completed_total", "crew" => crew.name.clone())
            .increment(task_outputs.len() as u64);

        let final_output = task_outputs
            .last()
            .ok_or_else(|| CrewFactoryError::missing_output(&crew.name))?;
        let result = PipelineResult {
            crew: crew.name.clone(),
            final_task_id: final_output.task_id.clone(),
            final_output: final_output.raw.clone(),
            structured: final_output.structured.clone(),
            files: task_outputs.iter().flat_map(|o| o.files.clone()).collect(),
            task_outputs,
            started_at,
            finished_at,
        };

        info!(
            final_task = %result.final_task_id,
            files = result.files.len(),
            duration_ms = result.duration().num_milliseconds(),
            "crew kickoff completed"
        );
        Ok(result)
    }

    /// Check the orchestrator's outputs against the crew's declarations
    ///
    /// Returns the outputs in task declaration order.
    #[instrument(name = "crew_factory_verify", skip(self, crew, output))]
    fn verify(&self, crew: &RenderedCrew, output: CrewOutput) -> Result<Vec<TaskOutput>> {
        let mut by_task: HashMap<String, TaskOutput> = HashMap::new();
        for task_output in output.tasks {
            if crew.task(&task_output.task_id).is_none() {
                return Err(CrewFactoryError::UnexpectedOutput {
                    task_id: task_output.task_id,
                    message: "task is not part of this crew".to_string(),
                });
            }
            let task_id = task_output.task_id.clone();
            if by_task.insert(task_id.clone(), task_output).is_some() {
                return Err(CrewFactoryError::UnexpectedOutput {
                    task_id,
                    message: "more than one output returned".to_string(),
                });
            }
        }

        let mut verified = Vec::with_capacity(crew.tasks.len());
        for task in &crew.tasks {
            let mut task_output = by_task
                .remove(&task.id)
                .ok_or_else(|| CrewFactoryError::missing_output(&task.id))?;

            if let OutputFormat::Structured { schema } = &task.output_format {
                let value = schema.parse(&task.id, &task_output.raw).inspect_err(|e| {
                    metrics::counter!(
                        "crew_output_contract_violations_total",
                        "task_id" => task.id.clone()
                    )
                    .increment(1);
                    warn!(task_id = %task.id, error = %e, "structured output rejected");
                })?;
                task_output.structured = Some(value);
            }

            if let Some(path) = &task.output_file {
                let resolved = crew.resolve_output_path(path);
                if !resolved.is_file() {
                    return Err(CrewFactoryError::missing_output_file(
                        &task.id,
                        resolved.display().to_string(),
                    ));
                }
                let written = fs::read_to_string(&resolved).map_err(ContractError::from)?;
                if written != task_output.raw {
                    warn!(
                        task_id = %task.id,
                        path = %resolved.display(),
                        "output file does not hold the task result"
                    );
                    return Err(CrewFactoryError::StaleOutputFile {
                        task_id: task.id.clone(),
                        path: resolved.display().to_string(),
                    });
                }
                if !task_output.files.contains(&resolved) {
                    task_output.files.push(resolved);
                }
            }

            verified.push(task_output);
        }
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_orchestrator::{MockConfig, MockOrchestrator};
    use contracts::{
        FieldKind, FieldSpec, OutputSchema, ParameterSpec, TaskSpec, ToolRef,
        WorkerSpec,
    };

    fn create_test_blueprint() -> CrewBlueprint {
        CrewBlueprint::new(
            "article",
            vec![
                WorkerSpec::new("planner", "Content Planner", "Plan {topic}", "You plan {topic}."),
                WorkerSpec::new("writer", "Content Writer", "Write {topic}", "You write."),
            ],
            vec![
                TaskSpec::new("plan", "planner", "Outline {topic}", "An outline"),
                TaskSpec::new("write", "writer", "Write about {topic}", "A post")
                    .depends_on(["plan"]),
            ],
        )
        .with_parameters(vec![ParameterSpec::with_default("topic", "Artificial Intelligence")])
    }

    #[test]
    fn test_assemble_renders_templates() {
        let factory = CrewFactory::new(MockOrchestrator::new());
        let crew = factory
            .assemble(&create_test_blueprint(), &RunParameters::new().with("topic", "Rust"))
            .unwrap();
        assert_eq!(crew.workers[0].backstory, "You plan Rust.");
        assert_eq!(crew.tasks[1].description, "Write about Rust");
        assert_eq!(crew.plan.stage_of("write"), Some(1));
    }

    #[test]
    fn test_assemble_unknown_custom_tool() {
        let mut bp = create_test_blueprint();
        bp.tasks[1].tools = vec![ToolRef::custom("translator")];
        let factory = CrewFactory::new(MockOrchestrator::new());
        let err = factory.assemble(&bp, &RunParameters::new()).unwrap_err();
        assert!(matches!(err, CrewFactoryError::UnknownTool { ref tool, .. } if tool == "translator"));
        assert!(ContractError::from(err).is_configuration());
    }

    #[tokio::test]
    async fn test_kickoff_success() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CrewFactory::new(MockOrchestrator::new()).with_output_dir(dir.path());
        let result = factory
            .kickoff(&create_test_blueprint(), &RunParameters::new())
            .await
            .unwrap();

        assert_eq!(result.final_task_id, "write");
        assert!(result.final_output.contains("Artificial Intelligence"));
        assert_eq!(result.task_outputs.len(), 2);
        assert!(result.finished_at >= result.started_at);
        assert_eq!(factory.orchestrator().kickoff_count(), 1);
    }

    #[tokio::test]
    async fn test_configuration_error_before_kickoff() {
        let mut bp = create_test_blueprint();
        bp.tasks[0].context = vec!["write".into()];
        let factory = CrewFactory::new(MockOrchestrator::new());

        let err = factory.kickoff(&bp, &RunParameters::new()).await.unwrap_err();
        assert!(err.kind() == contracts::ErrorKind::Configuration);
        assert_eq!(factory.orchestrator().kickoff_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_output_detected() {
        let orch = MockOrchestrator::with_config(MockConfig {
            omit_tasks: vec!["plan".into()],
            ..Default::default()
        });
        let factory = CrewFactory::new(orch);
        let err = factory
            .kickoff(&create_test_blueprint(), &RunParameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CrewFactoryError::MissingOutput { ref task_id } if task_id == "plan"));
    }

    #[tokio::test]
    async fn test_structured_contract_violation() {
        let mut bp = create_test_blueprint();
        bp.tasks[1] = bp.tasks[1].clone().structured(OutputSchema::new(
            "VenueDetails",
            vec![
                FieldSpec::new("name", FieldKind::String),
                FieldSpec::new("address", FieldKind::String),
                FieldSpec::new("capacity", FieldKind::Integer),
            ],
        ));
        let orch = MockOrchestrator::with_config(MockConfig {
            canned_outputs: HashMap::from([(
                "write".to_string(),
                r#"{"name":"Hall","address":"1 Main St"}"#.to_string(),
            )]),
            ..Default::default()
        });
        let factory = CrewFactory::new(orch);
        let err: ContractError = factory
            .kickoff(&bp, &RunParameters::new())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, ContractError::OutputContractViolation { .. }));
        assert!(err.to_string().contains("capacity"));
    }

    #[tokio::test]
    async fn test_missing_output_file_detected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bp = create_test_blueprint();
        bp.tasks[1] = bp.tasks[1].clone().output_file("post.md");
        let orch = MockOrchestrator::with_config(MockConfig {
            skip_output_files: true,
            ..Default::default()
        });
        let factory = CrewFactory::new(orch).with_output_dir(dir.path());
        let err = factory.kickoff(&bp, &RunParameters::new()).await.unwrap_err();
        assert!(matches!(err, CrewFactoryError::MissingOutputFile { .. }));
        assert_eq!(err.kind(), contracts::ErrorKind::ExternalExecution);
    }

    #[tokio::test]
    async fn test_leftover_output_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("post.md"), "STALE FROM LAST RUN").unwrap();
        let mut bp = create_test_blueprint();
        bp.tasks[1] = bp.tasks[1].clone().output_file("post.md");
        let orch = MockOrchestrator::with_config(MockConfig {
            skip_output_files: true,
            ..Default::default()
        });
        let factory = CrewFactory::new(orch).with_output_dir(dir.path());
        let err = factory.kickoff(&bp, &RunParameters::new()).await.unwrap_err();
        assert!(matches!(err, CrewFactoryError::StaleOutputFile { ref task_id, .. } if task_id == "write"));
        assert_eq!(err.kind(), contracts::ErrorKind::ExternalExecution);
    }

    #[tokio::test]
    async fn test_output_file_overwritten_each_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("post.md"), "STALE FROM LAST RUN").unwrap();
        let mut bp = create_test_blueprint();
        bp.tasks[1] = bp.tasks[1].clone().output_file("post.md");
        let factory = CrewFactory::new(MockOrchestrator::new()).with_output_dir(dir.path());
        let result = factory.kickoff(&bp, &RunParameters::new()).await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("post.md")).unwrap();
        assert_eq!(written, result.final_output);
    }

    #[test]
    fn test_assemble_rejects_formed_placeholder() {
        let mut bp = create_test_blueprint();
        bp.tasks[0].description = "Emit {{topic}} literally".into();
        let factory = CrewFactory::new(MockOrchestrator::new());
        let err = factory.assemble(&bp, &RunParameters::new()).unwrap_err();
        assert!(ContractError::from(err).is_configuration());
    }

    #[tokio::test]
    async fn test_orchestrator_error_unchanged() {
        let orch = MockOrchestrator::with_config(MockConfig {
            fail_tasks: vec!["write".into()],
            failure_message: Some("HTTP 401: invalid api key".into()),
            ..Default::default()
        });
        let factory = CrewFactory::new(orch);
        let err: ContractError = factory
            .kickoff(&create_test_blueprint(), &RunParameters::new())
            .await
            .unwrap_err()
            .into();
        assert_eq!(
            err.to_string(),
            "orchestrator 'mock' failed: task 'write' failed: HTTP 401: invalid api key"
        );
    }
}
