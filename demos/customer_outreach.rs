//! Customer outreach crew: profile a lead and draft personalized outreach.
//!
//! Usage: `cargo run --bin customer_outreach -- [--mock] [key=value ...]`

mod common;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let orchestrator = match common::orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => return common::report(Err(e)),
    };

    common::report(scenarios::run_customer_outreach(orchestrator, common::overrides()).await)
}
