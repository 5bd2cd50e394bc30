//! Crew run metrics
//!
//! Records run outcomes through the `metrics` facade and aggregates them in
//! memory for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::{ErrorKind, PipelineResult};
use metrics::{counter, gauge, histogram};

/// Record that a run is about to start
pub fn record_run_started(crew: &str) {
    gauge!("crew_runs_in_flight", "crew" => crew.to_string()).increment(1.0);
}

/// Record a successful run
pub fn record_run_finished(result: &PipelineResult) {
    let crew = result.crew.clone();
    gauge!("crew_runs_in_flight", "crew" => crew.clone()).decrement(1.0);
    counter!("crew_runs_total", "crew" => crew.clone(), "status" => "success").increment(1);
    histogram!("crew_run_duration_ms", "crew" => crew.clone())
        .record(result.duration().num_milliseconds() as f64);

    for output in &result.task_outputs {
        histogram!(
            "crew_task_output_bytes",
            "crew" => crew.clone(),
            "task_id" => output.task_id.clone()
        )
        .record(output.raw.len() as f64);
    }
    counter!("crew_output_files_total", "crew" => crew).increment(result.files.len() as u64);
}

/// Record a failed run, labelled with the error class
pub fn record_run_failed(crew: &str, kind: ErrorKind) {
    gauge!("crew_runs_in_flight", "crew" => crew.to_string()).decrement(1.0);
    counter!(
        "crew_runs_total",
        "crew" => crew.to_string(),
        "status" => "failure"
    )
    .increment(1);
    counter!(
        "crew_run_failures_total",
        "crew" => crew.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Crew run aggregator
///
/// Aggregates in memory for summary output.
#[derive(Debug, Clone, Default)]
pub struct CrewRunStats {
    pub runs: u64,
    pub failures: u64,
    /// Failures per error class
    pub failure_kinds: BTreeMap<&'static str, u64>,
    pub tasks_completed: u64,
    pub files_written: u64,
    pub duration_ms: RunningStats,
    /// Output length per task id
    pub output_bytes: BTreeMap<String, RunningStats>,
}

impl CrewRunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, result: &PipelineResult) {
        self.runs += 1;
        self.tasks_completed += result.task_outputs.len() as u64;
        self.files_written += result.files.len() as u64;
        self.duration_ms
            .push(result.duration().num_milliseconds() as f64);
        for output in &result.task_outputs {
            self.output_bytes
                .entry(output.task_id.clone())
                .or_default()
                .push(output.raw.len() as f64);
        }
    }

    pub fn record_failure(&mut self, kind: ErrorKind) {
        self.runs += 1;
        self.failures += 1;
        *self.failure_kinds.entry(kind.as_str()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> SummaryReport {
        SummaryReport {
            runs: self.runs,
            failures: self.failures,
            failure_kinds: self.failure_kinds.clone(),
            tasks_completed: self.tasks_completed,
            files_written: self.files_written,
            success_rate: if self.runs > 0 {
                (self.runs - self.failures) as f64 / self.runs as f64 * 100.0
            } else {
                0.0
            },
            duration_ms: StatsSummary::from(&self.duration_ms),
            output_bytes: self
                .output_bytes
                .iter()
                .map(|(task, stats)| (task.clone(), StatsSummary::from(stats)))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated run summary
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    pub runs: u64,
    pub failures: u64,
    pub failure_kinds: BTreeMap<&'static str, u64>,
    pub tasks_completed: u64,
    pub files_written: u64,
    pub success_rate: f64,
    pub duration_ms: StatsSummary,
    pub output_bytes: BTreeMap<String, StatsSummary>,
}

impl std::fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Crew Run Summary ===")?;
        writeln!(
            f,
            "Runs: {} ({} failed, {:.1}% success)",
            self.runs, self.failures, self.success_rate
        )?;
        writeln!(f, "Tasks completed: {}", self.tasks_completed)?;
        writeln!(f, "Files written: {}", self.files_written)?;
        writeln!(f, "Duration (ms): {}", self.duration_ms)?;

        if !self.failure_kinds.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in &self.failure_kinds {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }
        if !self.output_bytes.is_empty() {
            writeln!(f, "Output size per task (bytes):")?;
            for (task, stats) in &self.output_bytes {
                writeln!(f, "  {}: {}", task, stats)?;
            }
        }
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
