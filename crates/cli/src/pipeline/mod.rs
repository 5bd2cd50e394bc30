//! Crew run orchestration module.

mod review;
mod runner;
mod stats;

pub use review::StdinReviewer;
pub use runner::{CrewRunner, RunnerConfig};
pub use stats::RunStats;
