//! Human review implementations

use std::collections::VecDeque;
use std::sync::Mutex;

use contracts::{ContractError, HumanReviewer, ReviewDecision};

pub use contracts::AutoApprove;

/// Reviewer replaying a fixed list of decisions
///
/// Once the script runs out every further result is approved.
#[derive(Debug, Default)]
pub struct ScriptedReviewer {
    decisions: Mutex<VecDeque<ReviewDecision>>,
    reviewed: Mutex<Vec<String>>,
}

impl ScriptedReviewer {
    pub fn new(decisions: impl IntoIterator<Item = ReviewDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            reviewed: Mutex::new(Vec::new()),
        }
    }

    /// Task ids reviewed so far, in order
    pub fn reviewed(&self) -> Vec<String> {
        self.reviewed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl HumanReviewer for ScriptedReviewer {
    fn review(&self, task_id: &str, _output: &str) -> Result<ReviewDecision, ContractError> {
        self.reviewed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(task_id.to_string());
        let next = self
            .decisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        Ok(next.unwrap_or(ReviewDecision::Approve))
    }
}
