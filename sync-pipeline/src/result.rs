//! Terminal summary of a run.

use callsync_core::LifecycleState;
use callsync_types::{RunId, SyncOutcome};

/// What a run produced. Delivered exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// The run this result belongs to.
    pub run_id: RunId,
    /// State the run ended in (`Complete` once delivered).
    pub final_state: LifecycleState,
    /// Number of new entries found by the diff (0 if it never ran).
    pub new_entry_count: usize,
    /// Message of the unrecovered failure, if any.
    pub error_message: Option<String>,
    /// Message of a recovered delivery failure, if any.
    pub delivery_error: Option<String>,
    /// What reconciliation did, if it ran.
    pub sync_outcome: Option<SyncOutcome>,
    /// Every state the run entered, in order.
    pub transitions: Vec<LifecycleState>,
}

impl RunResult {
    /// Check if the run finished without an unrecovered failure.
    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }

    /// One-line summary for the user: the error or the entry count, never both.
    pub fn summary(&self) -> String {
        match &self.error_message {
            Some(error) => format!("Error: {}", error),
            None => format!("Sync Complete! New Entries: {}", self.new_entry_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(error_message: Option<&str>) -> RunResult {
        RunResult {
            run_id: RunId::new(),
            final_state: LifecycleState::Complete,
            new_entry_count: 3,
            error_message: error_message.map(str::to_string),
            delivery_error: None,
            sync_outcome: None,
            transitions: vec![],
        }
    }

    #[test]
    fn success_summary_shows_count() {
        let r = result(None);
        assert!(r.is_success());
        assert_eq!(r.summary(), "Sync Complete! New Entries: 3");
    }

    #[test]
    fn error_summary_hides_count() {
        let r = result(Some("i/o failure: disk gone"));
        assert!(!r.is_success());
        assert_eq!(r.summary(), "Error: i/o failure: disk gone");
    }
}
