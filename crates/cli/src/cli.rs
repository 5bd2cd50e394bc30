//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Crew Lessons - run role-playing agent crews from scenarios or config files
#[derive(Parser, Debug)]
#[command(
    name = "crew-lessons",
    author,
    version,
    about = "Configure and run role-playing agent crews",
    long_about = "Builds a crew of workers and tasks from a bundled scenario or a \n\
                  TOML/JSON configuration file, substitutes run parameters and \n\
                  submits the crew to an orchestrator once."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CREW_LESSONS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CREW_LESSONS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a crew and print the final output
    Run(RunArgs),

    /// Validate a crew and its parameters without running it
    Validate(ValidateArgs),

    /// Display workers, tasks and the execution plan
    Info(InfoArgs),

    /// List the bundled scenarios
    List(ListArgs),
}

/// Where the crew definition comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Bundled scenario (see `list`)
    #[arg(short, long)]
    pub scenario: Option<String>,

    /// Path to a crew configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Parameter override, repeatable (e.g. --set topic="Rust")
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Use the built-in mock orchestrator (no network, no credentials)
    #[arg(long)]
    pub mock: bool,

    /// Secrets file read for API keys (process environment wins)
    #[arg(long, default_value = ".env", env = "CREW_LESSONS_ENV_FILE")]
    pub env_file: PathBuf,

    /// Directory task output files are written to
    #[arg(long, default_value = ".", env = "CREW_LESSONS_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Assemble the crew and print the plan without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Ask on the terminal before accepting tasks that require human input
    #[arg(long)]
    pub interactive: bool,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "CREW_LESSONS_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CREW_LESSONS_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Parameter override to validate along with the crew
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("topic=Rust async").unwrap(),
            ("topic".to_string(), "Rust async".to_string())
        );
        assert_eq!(
            parse_key_val("inquiry=a=b").unwrap(),
            ("inquiry".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("topic").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_run_requires_one_source() {
        assert!(Cli::try_parse_from(["crew-lessons", "run", "--mock"]).is_err());
        assert!(Cli::try_parse_from([
            "crew-lessons",
            "run",
            "--scenario",
            "article",
            "--config",
            "crew.toml"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "crew-lessons",
            "run",
            "--scenario",
            "article",
            "--set",
            "topic=Rust",
            "--mock",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.source.scenario.as_deref(), Some("article"));
                assert_eq!(args.set, vec![("topic".to_string(), "Rust".to_string())]);
                assert!(args.mock);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
