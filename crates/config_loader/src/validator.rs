//! Blueprint validation
//!
//! Rules:
//! - ids and text fields are non-empty
//! - worker ids and task ids are unique
//! - every task references an existing worker
//! - dependencies point strictly earlier, never to the task itself, never twice
//! - structured schemas have unique, non-empty field names
//! - output files and custom tool names are non-empty
//! - every template placeholder is a declared parameter

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{ContractError, CrewBlueprint, OutputFormat, ToolRef};

use crate::template;

/// Validate a CrewBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_worker_ids(blueprint)?;
    validate_task_ids(blueprint)?;
    validate_worker_references(blueprint)?;
    validate_dependencies(blueprint)?;
    validate_outputs(blueprint)?;
    validate_tools(blueprint)?;
    validate_parameters(blueprint)?;
    Ok(())
}

fn validate_fields(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    if blueprint.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "name",
            "crew name cannot be empty",
        ));
    }
    if blueprint.tasks.is_empty() {
        return Err(ContractError::config_validation(
            "tasks",
            "a crew needs at least one task",
        ));
    }
    for (idx, worker) in blueprint.workers.iter().enumerate() {
        worker.validate().map_err(|e| {
            ContractError::config_validation(format!("workers[{idx}]"), e.to_string())
        })?;
    }
    for (idx, task) in blueprint.tasks.iter().enumerate() {
        task.validate().map_err(|e| {
            ContractError::config_validation(format!("tasks[{idx}]"), e.to_string())
        })?;
    }
    Ok(())
}

fn validate_worker_ids(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for worker in &blueprint.workers {
        if !seen.insert(&worker.id) {
            return Err(ContractError::config_validation(
                format!("workers[id={}]", worker.id),
                "duplicate worker id",
            ));
        }
    }
    Ok(())
}

fn validate_task_ids(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for task in &blueprint.tasks {
        if !seen.insert(&task.id) {
            return Err(ContractError::config_validation(
                format!("tasks[id={}]", task.id),
                "duplicate task id",
            ));
        }
    }
    Ok(())
}

fn validate_worker_references(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    for task in &blueprint.tasks {
        if blueprint.worker(&task.worker).is_none() {
            return Err(ContractError::config_validation(
                format!("tasks[id={}].worker", task.id),
                format!("worker '{}' is not declared", task.worker),
            ));
        }
    }
    Ok(())
}

fn validate_dependencies(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    for (idx, task) in blueprint.tasks.iter().enumerate() {
        let field = format!("tasks[id={}].context", task.id);
        let mut seen = HashSet::new();
        for dep in &task.context {
            if dep == &task.id {
                return Err(ContractError::config_validation(
                    field,
                    "task cannot depend on itself",
                ));
            }
            if !seen.insert(dep) {
                return Err(ContractError::config_validation(
                    field,
                    format!("dependency '{dep}' listed more than once"),
                ));
            }
            match blueprint.task_index(dep) {
                None => {
                    return Err(ContractError::config_validation(
                        field,
                        format!("dependency '{dep}' is not a declared task"),
                    ));
                }
                Some(dep_idx) if dep_idx > idx => {
                    return Err(ContractError::config_validation(
                        field,
                        format!("dependency '{dep}' must be declared before this task"),
                    ));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

fn validate_outputs(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    for task in &blueprint.tasks {
        if let Some(path) = &task.output_file {
            if path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    format!("tasks[id={}].output_file", task.id),
                    "output file path cannot be empty",
                ));
            }
        }

        let OutputFormat::Structured { schema } = &task.output_format else {
            continue;
        };
        let field = format!("tasks[id={}].output_format.schema", task.id);
        if schema.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "schema name cannot be empty",
            ));
        }
        if schema.fields.is_empty() {
            return Err(ContractError::config_validation(
                field,
                format!("schema '{}' declares no fields", schema.name),
            ));
        }
        let mut seen = HashSet::new();
        for spec in &schema.fields {
            if spec.name.trim().is_empty() {
                return Err(ContractError::config_validation(
                    field,
                    "schema field name cannot be empty",
                ));
            }
            if !seen.insert(&spec.name) {
                return Err(ContractError::config_validation(
                    field,
                    format!("duplicate schema field '{}'", spec.name),
                ));
            }
        }
    }
    Ok(())
}

fn validate_tools(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    let worker_tools = blueprint
        .workers
        .iter()
        .flat_map(|w| w.tools.iter().map(move |t| (format!("workers[id={}].tools", w.id), t)));
    let task_tools = blueprint
        .tasks
        .iter()
        .flat_map(|t| t.tools.iter().map(move |tool| (format!("tasks[id={}].tools", t.id), tool)));

    for (field, tool) in worker_tools.chain(task_tools) {
        match tool {
            ToolRef::Custom { name } if name.trim().is_empty() => {
                return Err(ContractError::config_validation(
                    field,
                    "custom tool name cannot be empty",
                ));
            }
            ToolRef::DirectoryRead { directory } if directory.as_os_str().is_empty() => {
                return Err(ContractError::config_validation(
                    field,
                    "directory_read needs a directory",
                ));
            }
            ToolRef::ScrapeWebsite { url: Some(url) } if url.trim().is_empty() => {
                return Err(ContractError::config_validation(
                    field,
                    "scrape_website url cannot be empty",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_parameters(blueprint: &CrewBlueprint) -> Result<(), ContractError> {
    let mut declared = HashSet::new();
    for param in &blueprint.parameters {
        if !template::is_identifier(&param.name) {
            return Err(ContractError::config_validation(
                format!("parameters.{}", param.name),
                "parameter name must be an identifier ([A-Za-z_][A-Za-z0-9_]*)",
            ));
        }
        if !declared.insert(param.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("parameters.{}", param.name),
                "duplicate parameter",
            ));
        }
    }

    for (location, text) in template::template_fields(blueprint) {
        if let Some(name) = template::placeholders(text)
            .into_iter()
            .find(|name| !declared.contains(name.as_str()))
        {
            return Err(ContractError::config_validation(
                location,
                format!("placeholder '{{{name}}}' is not a declared parameter"),
            ));
        }
    }
    Ok(())
}
