//! Crew definition loading shared by all commands.

use config_loader::ConfigLoader;
use contracts::{ContractError, CrewBlueprint, RunParameters};
use scenarios::Scenario;
use tracing::info;

use crate::cli::SourceArgs;
use crate::error::Result;

/// Load the crew named by `--scenario` or `--config`
///
/// Returns a label for output alongside the blueprint.
pub fn load_blueprint(source: &SourceArgs) -> Result<(String, CrewBlueprint)> {
    if let Some(path) = &source.config {
        info!(config = %path.display(), "Loading crew configuration");
        if !path.exists() {
            return Err(ContractError::config_parse(format!(
                "Configuration file not found: {}",
                path.display()
            ))
            .into());
        }
        let blueprint = ConfigLoader::load_from_path(path)?;
        return Ok((path.display().to_string(), blueprint));
    }

    let name = source.scenario.as_deref().unwrap_or_default();
    let scenario: Scenario = name.parse()?;
    info!(scenario = %scenario, "Loading bundled scenario");
    Ok((format!("scenario:{scenario}"), scenario.blueprint()?))
}

pub fn overrides(set: &[(String, String)]) -> RunParameters {
    set.iter().map(|(k, v)| (k.clone(), v)).collect()
}
