//! # Contracts
//!
//! Shared interface contracts: crew blueprints, rendered crews, outputs and
//! the orchestrator trait. Business crates depend on this crate only, never
//! on each other in reverse.
//!
//! ## Data flow
//! `CrewBlueprint` + `RunParameters` -> `RenderedCrew` -> `CrewOutput` -> `PipelineResult`

mod blueprint;
mod error;
mod orchestrator;
mod output;
mod params;
mod runtime;
mod tool;

pub use blueprint::*;
pub use error::*;
pub use orchestrator::*;
pub use output::*;
pub use params::*;
pub use runtime::*;
pub use tool::{Tool, ToolHandle, ToolRef};
