//! Crew run statistics.

use contracts::{ErrorKind, PipelineResult};
use observability::CrewRunStats;

/// Statistics from one CLI invocation
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Crew name
    pub crew: String,

    /// Orchestrator the crew was submitted to
    pub orchestrator: String,

    /// Aggregated run metrics
    pub aggregate: CrewRunStats,
}

impl RunStats {
    pub fn new(crew: impl Into<String>, orchestrator: impl Into<String>) -> Self {
        Self {
            crew: crew.into(),
            orchestrator: orchestrator.into(),
            aggregate: CrewRunStats::new(),
        }
    }

    pub fn record_success(&mut self, result: &PipelineResult) {
        self.aggregate.record_success(result);
    }

    pub fn record_failure(&mut self, kind: ErrorKind) {
        self.aggregate.record_failure(kind);
    }

    /// Print the summary to stderr; stdout carries the crew result
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Crew: {} (orchestrator: {})", self.crew, self.orchestrator);
        eprint!("{}", self.aggregate.summary());
        eprintln!();
    }
}
