//! # Crew Lessons CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Bundled scenarios and configuration files as crew sources
//! - Validation and plan inspection without running
//! - A single kickoff per run, with optional timeout and metrics endpoint

mod cli;
mod commands;
mod error;
mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_crew, run_info, run_list, run_validate};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Crew Lessons CLI starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_crew(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::List(args) => run_list(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), "Command failed");
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    observability::init_with_config(ObservabilityConfig::for_command(
        cli.log_format.into(),
        cli.quiet,
        cli.verbose,
    ))
}
