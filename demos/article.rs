//! Article writing crew: research, plan, write and edit a piece on a topic.
//!
//! Usage: `cargo run --bin article -- [--mock] [key=value ...]`

mod common;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let orchestrator = match common::orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => return common::report(Err(e)),
    };

    common::report(scenarios::run_article(orchestrator, common::overrides()).await)
}
