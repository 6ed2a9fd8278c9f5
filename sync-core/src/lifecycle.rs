//! Run lifecycle state machine for callsync.
//!
//! This module provides a pure, side-effect-free state machine for one
//! pipeline run. The state machine takes events as input and produces a new
//! state plus a list of actions to execute.
//!
//! The actual work (spawning the worker, capturing snapshots, delivering,
//! reconciling) is performed by sync-pipeline, not by this module.
//!
//! ```text
//! Init → ThreadSwitch → FileRotation → DiffDetection
//! DiffDetection → Upload      (new entries, remote target)
//! DiffDetection → NoChange    (no new entries)
//! DiffDetection → UiUpdate    (new entries, no remote target)
//! DiffDetection → SyncFiles   (new entries, no remote target, reconcile anyway)
//! Upload → SyncFiles → UiUpdate
//! NoChange → UiUpdate
//! UiUpdate → Complete
//! any → Error → Complete
//! ```

use std::fmt;

/// Lifecycle of one run - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Run created, nothing scheduled yet.
    Init,
    /// Handing the run off to a background task.
    ThreadSwitch,
    /// Capturing a fresh snapshot and rotating the previous one.
    FileRotation,
    /// Comparing the fresh snapshot with the prior one.
    DiffDetection,
    /// Delivering new entries to the remote target.
    Upload,
    /// Reconciling the primary and mirror copies.
    SyncFiles,
    /// The diff was empty; nothing to deliver.
    NoChange,
    /// Back on the invoking context, rendering the summary.
    UiUpdate,
    /// An unrecovered failure ended the pipeline early.
    Error,
    /// Terminal state; the result has been delivered.
    Complete,
}

impl LifecycleState {
    /// Create a new state machine in the Init state.
    pub fn new() -> Self {
        Self::Init
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (sync-pipeline)
    /// is responsible for executing the returned actions in order.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            (Self::Init, Event::FetchRequested) => (Self::ThreadSwitch, vec![Action::SpawnWorker]),

            (Self::ThreadSwitch, Event::WorkerStarted) => {
                (Self::FileRotation, vec![Action::CaptureSnapshot])
            }

            (Self::FileRotation, Event::SnapshotCaptured) => {
                (Self::DiffDetection, vec![Action::ComputeDiff])
            }

            // Branching on the diff
            (Self::DiffDetection, Event::DiffComputed { new_entries: 0, .. }) => {
                (Self::NoChange, vec![Action::HandBack])
            }
            (
                Self::DiffDetection,
                Event::DiffComputed {
                    remote_configured: true,
                    ..
                },
            ) => (Self::Upload, vec![Action::Deliver]),
            (
                Self::DiffDetection,
                Event::DiffComputed {
                    reconcile_without_remote: true,
                    ..
                },
            ) => (Self::SyncFiles, vec![Action::Reconcile]),
            (Self::DiffDetection, Event::DiffComputed { .. }) => {
                (Self::DiffDetection, vec![Action::HandBack])
            }

            // Delivery failures are recovered by the caller, so any
            // completed delivery moves on to reconciliation.
            (Self::Upload, Event::Delivered) => (Self::SyncFiles, vec![Action::Reconcile]),
            (Self::SyncFiles, Event::Reconciled) => (Self::SyncFiles, vec![Action::HandBack]),

            // Back on the invoking context
            (Self::DiffDetection | Self::NoChange | Self::SyncFiles, Event::HandedBack) => {
                (Self::UiUpdate, vec![Action::RenderSummary])
            }
            (Self::UiUpdate, Event::SummaryRendered) => (Self::Complete, vec![Action::Finish]),
            (Self::Error, Event::HandedBack) => (Self::Complete, vec![Action::Finish]),

            // Unrecovered failure from any live state
            (state, Event::Failed { error }) if state.is_live() => (
                Self::Error,
                vec![Action::RecordError { error }, Action::HandBack],
            ),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Check if this state runs on the background task.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Self::FileRotation | Self::DiffDetection | Self::Upload | Self::SyncFiles | Self::NoChange
        )
    }

    /// Check if a failure can still move the run into [`LifecycleState::Error`].
    fn is_live(&self) -> bool {
        !matches!(self, Self::Error | Self::Complete)
    }

    /// Check whether `next` directly follows this state on some valid path.
    pub fn can_transition_to(self, next: Self) -> bool {
        use LifecycleState::*;

        if next == Error {
            return self.is_live();
        }

        matches!(
            (self, next),
            (Init, ThreadSwitch)
                | (ThreadSwitch, FileRotation)
                | (FileRotation, DiffDetection)
                | (DiffDetection, Upload | NoChange | UiUpdate | SyncFiles)
                | (Upload, SyncFiles)
                | (SyncFiles, UiUpdate)
                | (NoChange, UiUpdate)
                | (UiUpdate, Complete)
                | (Error, Complete)
        )
    }

    /// Check that a sequence of observed states is one complete run.
    ///
    /// The path must start at `Init`, end at `Complete`, and take only valid
    /// steps. Since the graph has no cycles, no state can repeat.
    pub fn is_valid_path(path: &[Self]) -> bool {
        path.first() == Some(&Self::Init)
            && path.last() == Some(&Self::Complete)
            && path.windows(2).all(|w| w[0].can_transition_to(w[1]))
    }

    /// Stable name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::ThreadSwitch => "ThreadSwitch",
            Self::FileRotation => "FileRotation",
            Self::DiffDetection => "DiffDetection",
            Self::Upload => "Upload",
            Self::SyncFiles => "SyncFiles",
            Self::NoChange => "NoChange",
            Self::UiUpdate => "UiUpdate",
            Self::Error => "Error",
            Self::Complete => "Complete",
        }
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that can occur during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Caller asked for a run.
    FetchRequested,
    /// The background task began executing.
    WorkerStarted,
    /// A fresh snapshot was captured and persisted.
    SnapshotCaptured,
    /// The diff between prior and fresh snapshots is known.
    DiffComputed {
        /// Number of new entries found.
        new_entries: usize,
        /// Whether a remote target is configured.
        remote_configured: bool,
        /// Whether to reconcile copies even without a remote target.
        reconcile_without_remote: bool,
    },
    /// Delivery finished, successfully or with a recovered failure.
    Delivered,
    /// The two copies were reconciled.
    Reconciled,
    /// The worker's report arrived on the invoking context.
    HandedBack,
    /// The summary was rendered for the observer.
    SummaryRendered,
    /// An unrecovered failure occurred.
    Failed {
        /// Error message describing the failure.
        error: String,
    },
}

/// Actions to be executed by sync-pipeline.
///
/// These are instructions, not side effects. The pipeline interprets
/// these and performs the actual work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Schedule the background task.
    SpawnWorker,
    /// Capture a fresh snapshot (rotating the previous one).
    CaptureSnapshot,
    /// Load the prior snapshot and compare.
    ComputeDiff,
    /// Send the diff to the remote target.
    Deliver,
    /// Reconcile the primary and mirror copies.
    Reconcile,
    /// Post the run's report back to the invoking context.
    HandBack,
    /// Build the summary shown to the user.
    RenderSummary,
    /// Remember the failure for the run result.
    RecordError {
        /// Error message describing the failure.
        error: String,
    },
    /// Deliver the run result.
    Finish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    fn diff(new_entries: usize, remote_configured: bool) -> Event {
        Event::DiffComputed {
            new_entries,
            remote_configured,
            reconcile_without_remote: false,
        }
    }

    /// Feed events through the machine, recording every state change.
    fn drive(events: Vec<Event>) -> Vec<LifecycleState> {
        let mut state = LifecycleState::new();
        let mut path = vec![state];
        for event in events {
            let (next, _) = state.on_event(event);
            if next != state {
                path.push(next);
            }
            state = next;
        }
        path
    }

    #[test]
    fn starts_in_init() {
        assert_eq!(LifecycleState::new(), Init);
    }

    #[test]
    fn fetch_request_spawns_worker() {
        let (state, actions) = Init.on_event(Event::FetchRequested);
        assert_eq!(state, ThreadSwitch);
        assert_eq!(actions, vec![Action::SpawnWorker]);
    }

    #[test]
    fn worker_start_captures_snapshot() {
        let (state, actions) = ThreadSwitch.on_event(Event::WorkerStarted);
        assert_eq!(state, FileRotation);
        assert_eq!(actions, vec![Action::CaptureSnapshot]);
    }

    #[test]
    fn capture_moves_to_diff_detection() {
        let (state, actions) = FileRotation.on_event(Event::SnapshotCaptured);
        assert_eq!(state, DiffDetection);
        assert_eq!(actions, vec![Action::ComputeDiff]);
    }

    #[test]
    fn empty_diff_goes_to_no_change() {
        let (state, actions) = DiffDetection.on_event(diff(0, true));
        assert_eq!(state, NoChange);
        assert_eq!(actions, vec![Action::HandBack]);
    }

    #[test]
    fn new_entries_with_remote_go_to_upload() {
        let (state, actions) = DiffDetection.on_event(diff(3, true));
        assert_eq!(state, Upload);
        assert_eq!(actions, vec![Action::Deliver]);
    }

    #[test]
    fn new_entries_without_remote_hand_back_directly() {
        let (state, actions) = DiffDetection.on_event(diff(3, false));
        assert_eq!(state, DiffDetection);
        assert_eq!(actions, vec![Action::HandBack]);
    }

    #[test]
    fn reconcile_without_remote_goes_to_sync_files() {
        let (state, actions) = DiffDetection.on_event(Event::DiffComputed {
            new_entries: 1,
            remote_configured: false,
            reconcile_without_remote: true,
        });
        assert_eq!(state, SyncFiles);
        assert_eq!(actions, vec![Action::Reconcile]);
    }

    #[test]
    fn remote_takes_precedence_over_reconcile_flag() {
        let (state, _) = DiffDetection.on_event(Event::DiffComputed {
            new_entries: 1,
            remote_configured: true,
            reconcile_without_remote: true,
        });
        assert_eq!(state, Upload);
    }

    #[test]
    fn delivery_moves_to_sync_files() {
        let (state, actions) = Upload.on_event(Event::Delivered);
        assert_eq!(state, SyncFiles);
        assert_eq!(actions, vec![Action::Reconcile]);
    }

    #[test]
    fn failure_records_error_and_hands_back() {
        let (state, actions) = FileRotation.on_event(Event::Failed {
            error: "disk full".into(),
        });
        assert_eq!(state, Error);
        assert_eq!(
            actions,
            vec![
                Action::RecordError {
                    error: "disk full".into()
                },
                Action::HandBack
            ]
        );
    }

    #[test]
    fn error_hands_back_to_complete() {
        let (state, actions) = Error.on_event(Event::HandedBack);
        assert_eq!(state, Complete);
        assert_eq!(actions, vec![Action::Finish]);
    }

    #[test]
    fn second_failure_is_ignored() {
        let (state, actions) = Error.on_event(Event::Failed {
            error: "again".into(),
        });
        assert_eq!(state, Error);
        assert!(actions.is_empty());
    }

    #[test]
    fn complete_ignores_everything() {
        for event in [
            Event::FetchRequested,
            Event::HandedBack,
            Event::Failed { error: "x".into() },
        ] {
            let (state, actions) = Complete.on_event(event);
            assert_eq!(state, Complete);
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn invalid_event_keeps_state() {
        let (state, actions) = Init.on_event(Event::Delivered);
        assert_eq!(state, Init);
        assert!(actions.is_empty());
    }

    #[test]
    fn full_upload_path() {
        let path = drive(vec![
            Event::FetchRequested,
            Event::WorkerStarted,
            Event::SnapshotCaptured,
            diff(2, true),
            Event::Delivered,
            Event::Reconciled,
            Event::HandedBack,
            Event::SummaryRendered,
        ]);
        assert_eq!(
            path,
            vec![
                Init,
                ThreadSwitch,
                FileRotation,
                DiffDetection,
                Upload,
                SyncFiles,
                UiUpdate,
                Complete
            ]
        );
        assert!(LifecycleState::is_valid_path(&path));
    }

    #[test]
    fn no_change_path() {
        let path = drive(vec![
            Event::FetchRequested,
            Event::WorkerStarted,
            Event::SnapshotCaptured,
            diff(0, false),
            Event::HandedBack,
            Event::SummaryRendered,
        ]);
        assert_eq!(&path[3..], &[DiffDetection, NoChange, UiUpdate, Complete]);
        assert!(LifecycleState::is_valid_path(&path));
    }

    #[test]
    fn no_remote_path_skips_upload_and_sync() {
        let path = drive(vec![
            Event::FetchRequested,
            Event::WorkerStarted,
            Event::SnapshotCaptured,
            diff(4, false),
            Event::HandedBack,
            Event::SummaryRendered,
        ]);
        assert!(!path.contains(&Upload));
        assert!(!path.contains(&SyncFiles));
        assert_eq!(&path[3..], &[DiffDetection, UiUpdate, Complete]);
    }

    #[test]
    fn capture_failure_path() {
        let path = drive(vec![
            Event::FetchRequested,
            Event::WorkerStarted,
            Event::Failed {
                error: "io".into(),
            },
            Event::HandedBack,
        ]);
        assert_eq!(path, vec![Init, ThreadSwitch, FileRotation, Error, Complete]);
        assert!(LifecycleState::is_valid_path(&path));
    }

    #[test]
    fn valid_path_requires_endpoints() {
        assert!(!LifecycleState::is_valid_path(&[]));
        assert!(!LifecycleState::is_valid_path(&[Init, ThreadSwitch]));
        assert!(!LifecycleState::is_valid_path(&[ThreadSwitch, FileRotation, Error, Complete]));
    }

    #[test]
    fn valid_path_rejects_skipped_and_repeated_states() {
        assert!(!LifecycleState::is_valid_path(&[Init, FileRotation, Error, Complete]));
        assert!(!LifecycleState::is_valid_path(&[
            Init,
            ThreadSwitch,
            FileRotation,
            DiffDetection,
            Upload,
            UiUpdate,
            Complete
        ]));
        assert!(!LifecycleState::is_valid_path(&[Init, Error, Error, Complete]));
    }

    #[test]
    fn background_states() {
        assert!(!Init.is_background());
        assert!(!ThreadSwitch.is_background());
        assert!(FileRotation.is_background());
        assert!(SyncFiles.is_background());
        assert!(NoChange.is_background());
        assert!(!UiUpdate.is_background());
        assert!(!Complete.is_background());
    }

    #[test]
    fn display_uses_variant_names() {
        assert_eq!(DiffDetection.to_string(), "DiffDetection");
        assert_eq!(UiUpdate.to_string(), "UiUpdate");
    }
}
