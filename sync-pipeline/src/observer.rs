//! Observing a run from the invoking context.

use callsync_core::LifecycleState;

use crate::result::RunResult;

/// Something that happened during a run, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// The run entered a state.
    Entered(LifecycleState),
    /// The run finished; always the last event.
    Completed(RunResult),
}

/// Receives a run's progress.
///
/// Called on whichever context drives the [`crate::RunHandle`], never on
/// the background task.
pub trait LifecycleObserver {
    /// Called once per state entered, in order, starting with `Init`.
    fn on_transition(&mut self, state: LifecycleState);

    /// Called exactly once, after `Complete` was entered.
    fn on_complete(&mut self, result: &RunResult);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {
    fn on_transition(&mut self, _state: LifecycleState) {}

    fn on_complete(&mut self, _result: &RunResult) {}
}

/// Observer that keeps everything it sees (useful in tests and UIs).
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    /// States in the order they were entered.
    pub states: Vec<LifecycleState>,
    /// Results received (one per run).
    pub results: Vec<RunResult>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently entered state.
    pub fn current(&self) -> Option<LifecycleState> {
        self.states.last().copied()
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_transition(&mut self, state: LifecycleState) {
        self.states.push(state);
    }

    fn on_complete(&mut self, result: &RunResult) {
        self.results.push(result.clone());
    }
}
