//! `list` command implementation.

use anyhow::Context;
use contracts::ParameterSpec;
use scenarios::Scenario;
use serde::Serialize;

use crate::cli::ListArgs;
use crate::error::Result;

#[derive(Serialize)]
struct ScenarioInfo {
    name: &'static str,
    description: &'static str,
    parameters: Vec<ParameterSpec>,
}

/// Execute the `list` command
pub fn run_list(args: &ListArgs) -> Result<()> {
    let scenarios: Vec<ScenarioInfo> = Scenario::all()
        .into_iter()
        .map(|scenario| ScenarioInfo {
            name: scenario.name(),
            description: scenario.description(),
            parameters: scenario.parameters(),
        })
        .collect();

    if args.json {
        let json =
            serde_json::to_string_pretty(&scenarios).context("Failed to serialize scenarios")?;
        println!("{}", json);
        return Ok(());
    }

    for scenario in &scenarios {
        println!("{:<20} {}", scenario.name, scenario.description);
        for param in &scenario.parameters {
            match &param.default {
                Some(default) => println!("{:<20}   --set {}={:?}", "", param.name, default),
                None => println!("{:<20}   --set {}=<required>", "", param.name),
            }
        }
        println!();
    }
    Ok(())
}
