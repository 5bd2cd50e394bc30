//! Customer support crew: answer an inquiry and review the answer.
//!
//! Usage: `cargo run --bin customer_support -- [--mock] [key=value ...]`

mod common;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let orchestrator = match common::orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => return common::report(Err(e)),
    };

    common::report(scenarios::run_customer_support(orchestrator, common::overrides()).await)
}
