//! Placeholder extraction and substitution
//!
//! A placeholder is `{identifier}` where identifier matches
//! `[A-Za-z_][A-Za-z0-9_]*`. Any other use of braces is literal text, so JSON
//! snippets inside task descriptions pass through untouched.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use contracts::{ContractError, CrewBlueprint, ParameterSpec, RunParameters};
use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Placeholder names referenced by `text`
pub fn placeholders(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Substitute every placeholder in `text`
///
/// `location` names the template field in error messages. Substituted values
/// that join surrounding braces into a new placeholder are rejected.
pub fn render(text: &str, params: &RunParameters, location: &str) -> Result<String, ContractError> {
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = params.get(name.as_str()).ok_or_else(|| {
            ContractError::config_validation(
                location,
                format!("no value supplied for placeholder '{{{}}}'", name.as_str()),
            )
        })?;
        rendered.push_str(&text[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }
    rendered.push_str(&text[last..]);

    if let Some(left) = placeholders(&rendered).into_iter().next() {
        return Err(ContractError::config_validation(
            location,
            format!("substitution produced placeholder '{{{left}}}'"),
        ));
    }
    Ok(rendered)
}

/// Every templated field of a blueprint, paired with its location
pub fn template_fields(blueprint: &CrewBlueprint) -> Vec<(String, &str)> {
    let mut fields = Vec::new();
    for worker in &blueprint.workers {
        fields.push((format!("workers[id={}].goal", worker.id), worker.goal.as_str()));
        fields.push((
            format!("workers[id={}].backstory", worker.id),
            worker.backstory.as_str(),
        ));
    }
    for task in &blueprint.tasks {
        fields.push((
            format!("tasks[id={}].description", task.id),
            task.description.as_str(),
        ));
        fields.push((
            format!("tasks[id={}].expected_output", task.id),
            task.expected_output.as_str(),
        ));
    }
    fields
}

/// Placeholder names used anywhere in the blueprint's templates
pub fn blueprint_placeholders(blueprint: &CrewBlueprint) -> BTreeSet<String> {
    template_fields(blueprint)
        .into_iter()
        .flat_map(|(_, text)| placeholders(text))
        .collect()
}

/// Merge declared defaults with caller overrides
///
/// Fails on override keys that are not declared, on declared parameters left
/// without a value, and on values that contain a placeholder themselves.
pub fn resolve_parameters(
    declared: &[ParameterSpec],
    overrides: &RunParameters,
) -> Result<RunParameters, ContractError> {
    if let Some(unknown) = overrides
        .names()
        .find(|name| !declared.iter().any(|param| param.name == *name))
    {
        let known: Vec<&str> = declared.iter().map(|p| p.name.as_str()).collect();
        return Err(ContractError::config_validation(
            format!("parameters.{unknown}"),
            format!("unknown parameter, expected one of: {}", known.join(", ")),
        ));
    }

    let mut resolved = RunParameters::new();
    for param in declared {
        let value = overrides
            .get(&param.name)
            .or(param.default.as_deref())
            .ok_or_else(|| {
                ContractError::config_validation(
                    format!("parameters.{}", param.name),
                    "no value supplied and no default declared",
                )
            })?;
        if contains_placeholder(value) {
            return Err(ContractError::config_validation(
                format!("parameters.{}", param.name),
                format!("value must not contain a placeholder: {value:?}"),
            ));
        }
        resolved.insert(param.name.clone(), value);
    }
    Ok(resolved)
}
