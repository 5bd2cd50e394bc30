//! RenderedCrew - Crew Factory output
//!
//! A blueprint with every placeholder substituted, custom tools resolved and
//! the execution stages computed.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use crate::{ContractError, CrewSettings, OutputFormat, ToolHandle, ToolRef};

/// Worker with its goal and backstory rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedWorker {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub verbose: bool,
    pub memory: bool,
    pub tools: Vec<ToolRef>,
}

/// Task with its text rendered and the effective tool set applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTask {
    pub id: String,
    pub worker_id: String,
    pub description: String,
    pub expected_output: String,
    pub context: Vec<String>,
    /// Task tools when declared, otherwise the worker's
    pub tools: Vec<ToolRef>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub human_input: bool,
    pub async_execution: bool,
}

impl RenderedTask {
    pub fn plan_entry(&self) -> PlanEntry<'_> {
        PlanEntry {
            id: &self.id,
            context: &self.context,
            async_execution: self.async_execution,
        }
    }
}

/// Fully assembled crew, ready for kickoff
#[derive(Clone)]
pub struct RenderedCrew {
    pub name: String,
    pub settings: CrewSettings,
    pub workers: Vec<RenderedWorker>,
    pub tasks: Vec<RenderedTask>,
    /// Custom tool name -> implementation
    pub tools: BTreeMap<String, ToolHandle>,
    pub plan: ExecutionPlan,
    /// Directory relative output files are written under
    pub output_dir: PathBuf,
}

impl RenderedCrew {
    pub fn worker(&self, id: &str) -> Option<&RenderedWorker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&RenderedTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn final_task(&self) -> Option<&RenderedTask> {
        self.tasks.last()
    }

    pub fn tool(&self, name: &str) -> Option<&ToolHandle> {
        self.tools.get(name)
    }

    pub fn uses_search(&self) -> bool {
        self.tasks
            .iter()
            .any(|t| t.tools.iter().any(|tool| matches!(tool, ToolRef::Search)))
    }

    /// Where a task's output file lands
    pub fn resolve_output_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }
}

impl fmt::Debug for RenderedCrew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedCrew")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("workers", &self.workers)
            .field("tasks", &self.tasks)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("plan", &self.plan)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

/// Planning view of one task
#[derive(Debug, Clone, Copy)]
pub struct PlanEntry<'a> {
    pub id: &'a str,
    pub context: &'a [String],
    pub async_execution: bool,
}

/// Stage assignment for every task
///
/// Sequential tasks run one after another in declaration order and after
/// their dependencies. An async task starts as soon as its dependencies have
/// finished, so it can share a stage with its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// (task id, stage) in declaration order
    assignments: Vec<(String, usize)>,
}

impl ExecutionPlan {
    pub fn build<'a, I>(tasks: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = PlanEntry<'a>>,
    {
        let mut stage_of: HashMap<&str, usize> = HashMap::new();
        let mut assignments = Vec::new();
        let mut last_sequential: Option<usize> = None;

        for entry in tasks {
            let mut stage = 0;
            for dep in entry.context {
                let dep_stage = stage_of.get(dep.as_str()).ok_or_else(|| {
                    ContractError::config_validation(
                        format!("tasks[id={}].context", entry.id),
                        format!("dependency '{dep}' must be declared before this task"),
                    )
                })?;
                stage = stage.max(dep_stage + 1);
            }
            if !entry.async_execution {
                if let Some(prev) = last_sequential {
                    stage = stage.max(prev + 1);
                }
                last_sequential = Some(stage);
            }
            stage_of.insert(entry.id, stage);
            assignments.push((entry.id.to_string(), stage));
        }

        Ok(Self { assignments })
    }

    pub fn stage_of(&self, task_id: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|(id, _)| id == task_id)
            .map(|(_, stage)| *stage)
    }

    pub fn stage_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|(_, stage)| stage + 1)
            .max()
            .unwrap_or(0)
    }

    /// Task ids grouped by stage, declaration order within a stage
    pub fn stages(&self) -> Vec<Vec<String>> {
        let mut stages = vec![Vec::new(); self.stage_count()];
        for (id, stage) in &self.assignments {
            stages[*stage].push(id.clone());
        }
        stages
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(id, _)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<'a>(id: &'a str, context: &'a [String], async_execution: bool) -> PlanEntry<'a> {
        PlanEntry {
            id,
            context,
            async_execution,
        }
    }

    #[test]
    fn test_sequential_chain() {
        let none: Vec<String> = vec![];
        let plan = ExecutionPlan::build([
            entry("plan", &none, false),
            entry("write", &none, false),
            entry("edit", &none, false),
        ])
        .unwrap();
        assert_eq!(plan.stage_count(), 3);
        assert_eq!(plan.stage_of("edit"), Some(2));
    }

    #[test]
    fn test_async_siblings_share_stage() {
        let none: Vec<String> = vec![];
        let venue = vec!["venue".to_string()];
        let plan = ExecutionPlan::build([
            entry("venue", &none, false),
            entry("logistics", &none, true),
            entry("marketing", &venue, true),
        ])
        .unwrap();
        assert_eq!(plan.stage_of("venue"), Some(0));
        assert_eq!(plan.stage_of("logistics"), Some(0));
        assert_eq!(plan.stage_of("marketing"), Some(1));
        assert_eq!(
            plan.stages(),
            vec![
                vec!["venue".to_string(), "logistics".to_string()],
                vec!["marketing".to_string()]
            ]
        );
    }

    #[test]
    fn test_forward_reference_rejected() {
        let later = vec!["later".to_string()];
        let none: Vec<String> = vec![];
        let err = ExecutionPlan::build([entry("first", &later, false), entry("later", &none, false)])
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("later"));
    }
}
