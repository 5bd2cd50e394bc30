//! `validate` command implementation.

use anyhow::Context;
use config_loader::template;
use contracts::{ContractError, CrewBlueprint, RenderedCrew, RunParameters};
use crew_factory::{CrewFactory, MockOrchestrator};
use serde::Serialize;
use tracing::info;

use super::source::{load_blueprint, overrides};
use crate::cli::ValidateArgs;
use crate::error::Result;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<CrewSummary>,
}

#[derive(Serialize)]
struct CrewSummary {
    name: String,
    worker_count: usize,
    task_count: usize,
    stage_count: usize,
    parameters: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let (source, blueprint) = load_blueprint(&args.source)?;
    info!(source = %source, "Validating crew");

    let params = overrides(&args.set);
    let assembled = assemble(&blueprint, &params);

    let result = match &assembled {
        Ok(crew) => {
            let warnings = collect_warnings(&blueprint, &params);
            ValidationResult {
                valid: true,
                source,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(CrewSummary {
                    name: crew.name.clone(),
                    worker_count: crew.workers.len(),
                    task_count: crew.tasks.len(),
                    stage_count: crew.plan.stage_count(),
                    parameters: blueprint.parameters.iter().map(|p| p.name.clone()).collect(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            source,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    assembled.map(|_| ()).map_err(Into::into)
}

fn assemble(blueprint: &CrewBlueprint, params: &RunParameters) -> std::result::Result<RenderedCrew, ContractError> {
    CrewFactory::new(MockOrchestrator::new())
        .assemble(blueprint, params)
        .map_err(ContractError::from)
}

/// Collect non-fatal issues
fn collect_warnings(blueprint: &CrewBlueprint, params: &RunParameters) -> Vec<String> {
    let mut warnings = Vec::new();

    let used = template::blueprint_placeholders(blueprint);
    for param in &blueprint.parameters {
        if !used.contains(&param.name) {
            warnings.push(format!(
                "Parameter '{}' is not referenced by any worker or task",
                param.name
            ));
        }
    }

    for (name, value) in params.iter() {
        if value.trim().is_empty() {
            warnings.push(format!("Parameter '{}' is set to an empty value", name));
        }
    }

    for task in blueprint.tasks.iter().filter(|t| t.human_input) {
        warnings.push(format!(
            "Task '{}' requires human input - run with --interactive to review it",
            task.id
        ));
    }

    if blueprint.uses_search() {
        warnings.push(format!(
            "Crew uses web search - {} must be set for non-mock runs",
            contracts::SEARCH_API_KEY_ENV
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Crew is valid: {}", result.source);

        if let Some(ref summary) = result.summary {
            println!("\n  Name: {}", summary.name);
            println!("  Workers: {}", summary.worker_count);
            println!("  Tasks: {}", summary.task_count);
            println!("  Stages: {}", summary.stage_count);
            if !summary.parameters.is_empty() {
                println!("  Parameters: {}", summary.parameters.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Crew is invalid: {}", result.source);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenarios::Scenario;

    #[test]
    fn test_event_planning_warnings() {
        let blueprint = Scenario::EventPlanning.blueprint().unwrap();
        let warnings = collect_warnings(&blueprint, &RunParameters::new());

        assert!(warnings.iter().any(|w| w.contains("'budget'")));
        assert!(warnings.iter().any(|w| w.contains("Task 'venue'")));
        assert!(warnings.iter().any(|w| w.contains("SERPER_API_KEY")));
    }

    #[test]
    fn test_assemble_rejects_unknown_override() {
        let blueprint = Scenario::Article.blueprint().unwrap();
        let err = assemble(&blueprint, &RunParameters::new().with("tone", "dry")).unwrap_err();
        assert!(err.is_configuration());
    }
}
