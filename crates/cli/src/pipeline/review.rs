//! Terminal reviewer for tasks that require human input.

use std::io::{self, BufRead, Write};

use contracts::{ContractError, HumanReviewer, ReviewDecision};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Shows each result on stderr and reads the decision from stdin
///
/// An empty line approves; anything else is sent back as feedback.
/// Orchestrators call reviewers from inside `kickoff`, so the stdin read
/// blocks. On a multi-thread runtime it runs under `block_in_place` and the
/// other workers keep driving concurrent tasks.
#[derive(Debug, Default)]
pub struct StdinReviewer;

impl HumanReviewer for StdinReviewer {
    fn review(&self, task_id: &str, output: &str) -> Result<ReviewDecision, ContractError> {
        blocking(|| prompt(task_id, output))
    }
}

/// Run `f` without stalling a multi-thread runtime worker
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn prompt(task_id: &str, output: &str) -> Result<ReviewDecision, ContractError> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "\n--- Review requested for task '{task_id}' ---")?;
    writeln!(stderr, "{output}")?;
    write!(stderr, "Press Enter to approve, or type feedback for a revision: ")?;
    stderr.flush()?;
    drop(stderr);

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(decision_from(&line))
}

fn decision_from(line: &str) -> ReviewDecision {
    let feedback = line.trim();
    if feedback.is_empty() {
        ReviewDecision::Approve
    } else {
        ReviewDecision::Revise {
            feedback: feedback.to_string(),
        }
    }
}
