//! Event planning crew: venue, logistics and marketing for an event.
//!
//! Usage: `cargo run --bin event_planning -- [--mock] [key=value ...]`

mod common;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let orchestrator = match common::orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => return common::report(Err(e)),
    };

    common::report(scenarios::run_event_planning(orchestrator, common::overrides()).await)
}
