//! OpenAI-compatible orchestrator
//!
//! Runs each task as a chat-completions conversation. Tasks that share a
//! stage run concurrently on a `JoinSet`. Custom tools are offered as
//! functions; built-in tools are listed in the prompt but not executed here.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{
    ContractError, Credentials, CrewOutput, HumanReviewer, Orchestrator, OutputFormat,
    RenderedCrew, RenderedTask, RenderedWorker, ReviewDecision, TaskOutput, ToolHandle,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::artifacts::write_artifact;
use crate::error::{CrewFactoryError, Result};
use crate::preflight::check_credentials;
use crate::review::AutoApprove;

const ORCHESTRATOR_NAME: &str = "openai";
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Everything one task conversation needs, owned so it can move into a spawned task
#[derive(Clone)]
struct TaskJob {
    client: reqwest::Client,
    credentials: Credentials,
    worker: RenderedWorker,
    task: RenderedTask,
    context: Vec<(String, String)>,
    tools: Vec<ToolHandle>,
    max_tool_rounds: usize,
}

/// Chat-completions orchestrator
pub struct OpenAiOrchestrator {
    client: reqwest::Client,
    credentials: Credentials,
    reviewer: Arc<dyn HumanReviewer>,
    max_tool_rounds: usize,
}

impl OpenAiOrchestrator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            reviewer: Arc::new(AutoApprove),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn HumanReviewer>) -> Self {
        self.reviewer = reviewer;
        self
    }

    fn job(
        &self,
        crew: &RenderedCrew,
        task: &RenderedTask,
        completed: &HashMap<String, TaskOutput>,
    ) -> Result<TaskJob> {
        let worker = crew.worker(&task.worker_id).cloned().ok_or_else(|| {
            ContractError::external(
                ORCHESTRATOR_NAME,
                format!("task '{}' has no worker '{}'", task.id, task.worker_id),
            )
        })?;

        let context = task
            .context
            .iter()
            .filter_map(|dep| completed.get(dep).map(|o| (dep.clone(), o.raw.clone())))
            .collect();

        let mut tools = Vec::new();
        for tool in &task.tools {
            match tool.custom_name() {
                Some(name) => {
                    let handle = crew.tool(name).cloned().ok_or_else(|| {
                        CrewFactoryError::UnknownTool {
                            task_id: task.id.clone(),
                            tool: name.to_string(),
                        }
                    })?;
                    tools.push(handle);
                }
                None => warn!(
                    task_id = %task.id,
                    tool = tool.name(),
                    "built-in tool is not executed by this backend"
                ),
            }
        }

        Ok(TaskJob {
            client: self.client.clone(),
            credentials: self.credentials.clone(),
            worker,
            task: task.clone(),
            context,
            tools,
            max_tool_rounds: self.max_tool_rounds,
        })
    }
}

impl Orchestrator for OpenAiOrchestrator {
    fn name(&self) -> &str {
        ORCHESTRATOR_NAME
    }

    fn preflight(&self, crew: &RenderedCrew) -> std::result::Result<(), ContractError> {
        check_credentials(&self.credentials, crew)
    }

    #[instrument(
        name = "openai_orchestrator_kickoff",
        skip(self, crew),
        fields(crew = %crew.name, model = %self.credentials.model, stages = crew.plan.stage_count())
    )]
    async fn kickoff(&self, crew: &RenderedCrew) -> std::result::Result<CrewOutput, ContractError> {
        let mut completed: HashMap<String, TaskOutput> = HashMap::new();

        for (stage, task_ids) in crew.plan.stages().into_iter().enumerate() {
            let mut set = JoinSet::new();
            for task_id in &task_ids {
                let task = crew.task(task_id).ok_or_else(|| {
                    ContractError::external(
                        ORCHESTRATOR_NAME,
                        format!("plan references unknown task '{task_id}'"),
                    )
                })?;
                let job = self.job(crew, task, &completed)?;
                set.spawn(async move {
                    let raw = job.run(None).await;
                    (job, raw)
                });
            }

            let mut finished: HashMap<String, (TaskJob, String)> = HashMap::new();
            while let Some(joined) = set.join_next().await {
                let (job, raw) = joined.map_err(|e| {
                    ContractError::external(ORCHESTRATOR_NAME, format!("task aborted: {e}"))
                })?;
                let raw = raw?;
                debug!(task_id = %job.task.id, stage, "task conversation finished");
                finished.insert(job.task.id.clone(), (job, raw));
            }

            // review and file writes follow declaration order within the stage
            for task_id in task_ids {
                let Some((job, mut raw)) = finished.remove(&task_id) else {
                    continue;
                };
                if job.task.human_input {
                    if let ReviewDecision::Revise { feedback } =
                        self.reviewer.review(&task_id, &raw)?
                    {
                        info!(task_id = %task_id, "revising after human feedback");
                        raw = job.run(Some((&raw, &feedback))).await?;
                    }
                }

                let mut output = TaskOutput::new(&task_id, &job.task.worker_id, raw);
                if let Some(path) = &job.task.output_file {
                    output.files.push(write_artifact(&crew.output_dir, path, &output.raw)?);
                }
                info!(task_id = %task_id, stage, bytes = output.raw.len(), "task completed");
                completed.insert(task_id, output);
            }
        }

        let tasks = crew
            .tasks
            .iter()
            .filter_map(|t| completed.remove(&t.id))
            .collect();
        Ok(CrewOutput { tasks })
    }
}

impl TaskJob {
    /// Run the conversation; `revision` carries the previous draft and reviewer feedback
    async fn run(&self, revision: Option<(&str, &str)>) -> std::result::Result<String, ContractError> {
        self.converse(revision).await.map_err(ContractError::from)
    }

    async fn converse(&self, revision: Option<(&str, &str)>) -> Result<String> {
        let mut messages = vec![
            ChatMessage::new("system", self.system_prompt()),
            ChatMessage::new("user", self.task_prompt()),
        ];
        if let Some((draft, feedback)) = revision {
            messages.push(ChatMessage::new("assistant", draft));
            messages.push(ChatMessage::new(
                "user",
                format!("A human reviewer asked for changes: {feedback}\nReturn the complete revised answer."),
            ));
        }

        for round in 0..self.max_tool_rounds {
            let reply = self.complete(&messages).await?;
            let Some(calls) = reply.tool_calls.clone().filter(|calls| !calls.is_empty()) else {
                return Ok(reply.content.unwrap_or_default());
            };

            debug!(task_id = %self.task.id, round, calls = calls.len(), "tool calls requested");
            messages.push(reply);
            for call in calls {
                let result = self.call_tool(&call)?;
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        Err(ContractError::external(
            ORCHESTRATOR_NAME,
            format!(
                "task '{}' exceeded {} tool-call rounds",
                self.task.id, self.max_tool_rounds
            ),
        )
        .into())
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        let api_key = self.credentials.require_inference_key()?;
        let url = format!("{}/chat/completions", self.credentials.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.credentials.model,
            messages,
            tools: self.tool_definitions(),
            response_format: self
                .task
                .output_format
                .schema()
                .map(|_| json!({ "type": "json_object" })),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContractError::external(ORCHESTRATOR_NAME, format!("HTTP {status}: {body}")).into());
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                ContractError::external(ORCHESTRATOR_NAME, "response contained no choices").into()
            })
    }

    fn call_tool(&self, call: &ToolCall) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == call.function.name)
            .ok_or_else(|| {
                ContractError::external(
                    ORCHESTRATOR_NAME,
                    format!("model requested unknown tool '{}'", call.function.name),
                )
            })?;

        let input = serde_json::from_str::<Value>(&call.function.arguments)
            .ok()
            .and_then(|args| args.get("input").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| call.function.arguments.clone());

        Ok(tool.run(&input)?)
    }

    fn tool_definitions(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": {
                            "type": "object",
                            "properties": { "input": { "type": "string" } },
                            "required": ["input"],
                        },
                    },
                })
            })
            .collect()
    }

    fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.worker.role, self.worker.backstory, self.worker.goal
        );
        let builtin: Vec<String> = self
            .task
            .tools
            .iter()
            .filter(|t| t.is_builtin())
            .map(|t| format!("- {}: {}", t.name(), t.describe()))
            .collect();
        if !builtin.is_empty() {
            prompt.push_str("\nReference material you may rely on:\n");
            prompt.push_str(&builtin.join("\n"));
        }
        prompt
    }

    fn task_prompt(&self) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}",
            self.task.description.trim(),
            self.task.expected_output.trim()
        );
        for (dep, text) in &self.context {
            prompt.push_str(&format!("\n\nContext from task '{dep}':\n{text}"));
        }
        if let OutputFormat::Structured { schema } = &self.task.output_format {
            prompt.push_str(&format!(
                "\n\nRespond with a single JSON object matching this schema:\n{}",
                schema.to_json_schema()
            ));
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CrewSettings, ExecutionPlan, ToolRef};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn crew_with_tools(tools: Vec<ToolRef>) -> RenderedCrew {
        let task = RenderedTask {
            id: "profile".into(),
            worker_id: "sales".into(),
            description: "Profile DeepLearningAI".into(),
            expected_output: "A profile".into(),
            context: Vec::new(),
            tools,
            output_format: OutputFormat::Text,
            output_file: None,
            human_input: false,
            async_execution: false,
        };
        let plan = ExecutionPlan::build([task.plan_entry()]).unwrap();
        RenderedCrew {
            name: "outreach".into(),
            settings: CrewSettings::default(),
            workers: Vec::new(),
            tasks: vec![task],
            tools: BTreeMap::new(),
            plan,
            output_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_preflight_requires_inference_key() {
        let orch = OpenAiOrchestrator::new(Credentials::default());
        let err = orch.preflight(&crew_with_tools(Vec::new())).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_preflight_requires_search_key_when_searching() {
        let credentials = Credentials {
            inference_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let orch = OpenAiOrchestrator::new(credentials);
        assert!(orch.preflight(&crew_with_tools(Vec::new())).is_ok());
        let err = orch.preflight(&crew_with_tools(vec![ToolRef::Search])).unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[test]
    fn test_tool_call_message_shape() {
        let raw = r#"{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"sentiment_analysis","arguments":"{\"input\":\"great\"}"}}]}"#;
        let message: ChatMessage = serde_json::from_str(raw).unwrap();
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "sentiment_analysis");
        assert_eq!(calls[0].kind, "function");
    }
}
