//! `info` command implementation.

use anyhow::Context;
use config_loader::template;
use contracts::{CrewBlueprint, ExecutionPlan, OutputFormat, TaskSpec};
use serde::Serialize;
use tracing::info;

use super::source::load_blueprint;
use crate::cli::InfoArgs;
use crate::error::Result;

/// Crew info for JSON output
#[derive(Serialize)]
struct CrewInfo {
    name: String,
    source: String,
    verbose: bool,
    memory: bool,
    workers: Vec<WorkerInfo>,
    tasks: Vec<TaskInfo>,
    stages: Vec<Vec<String>>,
    parameters: Vec<ParameterInfo>,
    placeholders: Vec<String>,
}

#[derive(Serialize)]
struct WorkerInfo {
    id: String,
    role: String,
    allow_delegation: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<String>,
}

#[derive(Serialize)]
struct TaskInfo {
    id: String,
    worker: String,
    stage: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    async_execution: bool,
    human_input: bool,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<String>,
}

#[derive(Serialize)]
struct ParameterInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (source, blueprint) = load_blueprint(&args.source)?;
    info!(source = %source, "Loading crew info");

    config_loader::ConfigLoader::validate(&blueprint)?;
    let plan = ExecutionPlan::build(blueprint.tasks.iter().map(TaskSpec::plan_entry))?;
    let info = build_crew_info(&blueprint, &plan, source);

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize crew info")?;
        println!("{}", json);
    } else {
        print_crew_info(&info);
    }

    Ok(())
}

fn output_label(format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => "text".to_string(),
        OutputFormat::Structured { schema } => format!("json ({})", schema.name),
    }
}

fn build_crew_info(blueprint: &CrewBlueprint, plan: &ExecutionPlan, source: String) -> CrewInfo {
    let workers = blueprint
        .workers
        .iter()
        .map(|w| WorkerInfo {
            id: w.id.clone(),
            role: w.role.clone(),
            allow_delegation: w.allow_delegation,
            tools: w.tools.iter().map(|t| t.name().to_string()).collect(),
        })
        .collect();

    let tasks = blueprint
        .tasks
        .iter()
        .map(|t| {
            let tools = match blueprint.worker(&t.worker) {
                Some(worker) => t.effective_tools(worker),
                None => &t.tools,
            };
            TaskInfo {
                id: t.id.clone(),
                worker: t.worker.clone(),
                stage: plan.stage_of(&t.id).unwrap_or_default(),
                depends_on: t.context.clone(),
                async_execution: t.async_execution,
                human_input: t.human_input,
                output: output_label(&t.output_format),
                output_file: t.output_file.as_ref().map(|p| p.display().to_string()),
                tools: tools.iter().map(|tool| tool.name().to_string()).collect(),
            }
        })
        .collect();

    let parameters = blueprint
        .parameters
        .iter()
        .map(|p| ParameterInfo {
            name: p.name.clone(),
            default: p.default.clone(),
            description: p.description.clone(),
        })
        .collect();

    CrewInfo {
        name: blueprint.name.clone(),
        source,
        verbose: blueprint.settings.verbose,
        memory: blueprint.settings.memory,
        workers,
        tasks,
        stages: plan.stages(),
        parameters,
        placeholders: template::blueprint_placeholders(blueprint).into_iter().collect(),
    }
}

fn print_crew_info(info: &CrewInfo) {
    println!("=== Crew: {} ===", info.name);
    println!("Source: {}", info.source);
    println!("Settings: verbose={}, memory={}", info.verbose, info.memory);

    println!("\nWorkers ({})", info.workers.len());
    for (i, worker) in info.workers.iter().enumerate() {
        let prefix = if i == info.workers.len() - 1 { "└─" } else { "├─" };
        let delegation = if worker.allow_delegation { ", delegates" } else { "" };
        println!("   {} {} ({}{})", prefix, worker.id, worker.role, delegation);
    }

    println!("\nTasks ({})", info.tasks.len());
    for (i, task) in info.tasks.iter().enumerate() {
        let is_last = i == info.tasks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child = if is_last { "   " } else { "│  " };

        let mut flags = Vec::new();
        if task.async_execution {
            flags.push("async");
        }
        if task.human_input {
            flags.push("human input");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!("   {} {} -> {} (stage {}){}", prefix, task.id, task.worker, task.stage, flags);
        if !task.depends_on.is_empty() {
            println!("   {}  depends on: {}", child, task.depends_on.join(", "));
        }
        println!("   {}  output: {}", child, task.output);
        if let Some(ref file) = task.output_file {
            println!("   {}  file: {}", child, file);
        }
        if !task.tools.is_empty() {
            println!("   {}  tools: {}", child, task.tools.join(", "));
        }
    }

    println!("\nStages");
    for (stage, ids) in info.stages.iter().enumerate() {
        println!("   {}: {}", stage, ids.join(", "));
    }

    if !info.parameters.is_empty() {
        println!("\nParameters");
        for param in &info.parameters {
            match &param.default {
                Some(default) => println!("   {} = {:?}", param.name, default),
                None => println!("   {} (required)", param.name),
            }
        }
    }

    if !info.placeholders.is_empty() {
        println!("\nPlaceholders: {}", info.placeholders.join(", "));
    }

    println!();
}
