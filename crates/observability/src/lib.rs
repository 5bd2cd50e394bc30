//! # Observability
//!
//! Tracing initialisation and crew run metrics.
//!
//! ## Features
//!
//! - Tracing initialisation (JSON/Pretty/Compact formats, `RUST_LOG` aware)
//! - Optional Prometheus exporter
//! - Per-run metric recording and in-memory aggregation
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init_with_config, metrics, ObservabilityConfig};
//!
//! init_with_config(ObservabilityConfig::default())?;
//!
//! let result = factory.kickoff(&blueprint, &params).await?;
//! metrics::record_run_finished(&result);
//! ```

pub mod metrics;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

pub use crate::metrics::{
    record_run_failed, record_run_finished, record_run_started, CrewRunStats, RunningStats,
    StatsSummary, SummaryReport,
};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Filter used when `RUST_LOG` is unset
    pub default_log_level: String,
    /// Emit a line with the elapsed time whenever a span closes
    pub span_timings: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            span_timings: false,
        }
    }
}

impl ObservabilityConfig {
    /// Configuration for one command invocation
    ///
    /// `verbosity` counts `-v` flags; two or more also turn on span timings
    /// so assemble, kickoff and verify durations show up in the log.
    pub fn for_command(log_format: LogFormat, quiet: bool, verbosity: u8) -> Self {
        let default_log_level = match (quiet, verbosity) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            log_format,
            metrics_port: None,
            default_log_level: default_log_level.to_string(),
            span_timings: !quiet && verbosity >= 2,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_timings {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON
    #[default]
    Json,
    /// Human-readable multi-line
    Pretty,
    /// Single line
    Compact,
}

/// Initialise tracing for this process
///
/// Logs go to stderr so stdout stays reserved for crew results. Colour is
/// used only when stderr is a terminal. JSON lines carry no thread fields:
/// concurrent tasks are told apart by their `task_id` span fields.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));
    let ansi = std::io::stderr().is_terminal();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(config.span_events())
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_span_events(config.span_events())
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .with_span_events(config.span_events())
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        span_timings = config.span_timings,
        "Logging to stderr"
    );

    Ok(())
}

/// Install only the Prometheus recorder (tracing set up elsewhere)
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_config_levels() {
        let quiet = ObservabilityConfig::for_command(LogFormat::Pretty, true, 3);
        assert_eq!(quiet.default_log_level, "warn");
        assert!(!quiet.span_timings);

        let plain = ObservabilityConfig::for_command(LogFormat::Pretty, false, 0);
        assert_eq!(plain.default_log_level, "info");
        assert_eq!(plain.span_events(), FmtSpan::NONE);

        let debug = ObservabilityConfig::for_command(LogFormat::Json, false, 1);
        assert_eq!(debug.default_log_level, "debug");
        assert!(!debug.span_timings);

        let trace = ObservabilityConfig::for_command(LogFormat::Compact, false, 2);
        assert_eq!(trace.default_log_level, "trace");
        assert_eq!(trace.span_events(), FmtSpan::CLOSE);
    }

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.default_log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.span_timings);
    }
}
