//! The sync lifecycle: single entry point and run handles.
//!
//! [`SyncLifecycle::perform_fetch`] schedules one run and returns right
//! away. The blocking stages run on a spawned task (see `worker`), which
//! reports each state it enters over a channel. The [`RunHandle`] turns
//! those reports into [`RunEvent`]s on whatever context polls it, and runs
//! the `UiUpdate` and `Complete` states there.

use std::collections::VecDeque;
use std::sync::Arc;

use callsync_core::{Action, Event, LifecycleState};
use callsync_types::RunId;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::notifier::Notifier;
use crate::observer::{LifecycleObserver, NoopObserver, RunEvent};
use crate::reconcile::Reconciler;
use crate::result::RunResult;
use crate::store::SnapshotStore;
use crate::worker::{Collaborators, Link, Worker, WorkerMessage, WorkerReport};

/// Orchestrates call-log sync runs.
///
/// At most one run is in flight at a time. The collaborators are shared
/// by every run this lifecycle starts.
pub struct SyncLifecycle<S, N, R> {
    deps: Arc<Collaborators<S, N, R>>,
    config: LifecycleConfig,
    guard: Arc<Semaphore>,
}

impl<S, N, R> SyncLifecycle<S, N, R>
where
    S: SnapshotStore + 'static,
    N: Notifier + 'static,
    R: Reconciler + 'static,
{
    /// Create a lifecycle over the given collaborators.
    pub fn new(store: S, notifier: N, reconciler: R, config: LifecycleConfig) -> Self {
        Self {
            deps: Arc::new(Collaborators {
                store,
                notifier,
                reconciler,
            }),
            config,
            guard: Arc::new(Semaphore::new(1)),
        }
    }

    /// Start a run.
    ///
    /// Returns as soon as the background stages are scheduled. Must be
    /// called from within a Tokio runtime. Fails with
    /// [`LifecycleError::AlreadyRunning`] while a previous run has not
    /// reached `Complete`.
    pub fn perform_fetch(&self) -> Result<RunHandle, LifecycleError> {
        let permit = Arc::clone(&self.guard).try_acquire_owned().map_err(|_| {
            warn!("fetch rejected: a sync run is already in progress");
            LifecycleError::AlreadyRunning
        })?;
        let permit = Arc::new(permit);

        let run_id = RunId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let mut handle = RunHandle::new(run_id, rx, cancel.clone(), Arc::clone(&permit));

        info!(run_id = %run_id, "starting sync run");
        let actions = handle.apply(Event::FetchRequested);
        if actions.contains(&Action::SpawnWorker) {
            let worker = Worker::new(
                Arc::clone(&self.deps),
                self.config.clone(),
                cancel,
                Link::new(tx, permit),
                handle.state,
            );
            tokio::spawn(worker.run().instrument(info_span!("run", run_id = %run_id)));
        }

        Ok(handle)
    }

    /// Check if a run is in flight.
    pub fn is_running(&self) -> bool {
        self.guard.available_permits() == 0
    }

    /// Get the lifecycle configuration.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Get the snapshot store.
    pub fn store(&self) -> &S {
        &self.deps.store
    }

    /// Get the notifier.
    pub fn notifier(&self) -> &N {
        &self.deps.notifier
    }

    /// Get the reconciler.
    pub fn reconciler(&self) -> &R {
        &self.deps.reconciler
    }
}

/// The invoking context's view of one run.
///
/// Poll it with [`next_event`](Self::next_event), or hand it an observer
/// with [`drive`](Self::drive). Dropping the handle abandons observation;
/// the background stages still finish and the run stays exclusive until
/// they do.
pub struct RunHandle {
    run_id: RunId,
    state: LifecycleState,
    rx: mpsc::UnboundedReceiver<WorkerMessage>,
    pending: VecDeque<RunEvent>,
    transitions: Vec<LifecycleState>,
    cancel: CancellationToken,
    permit: Option<Arc<OwnedSemaphorePermit>>,
    result: Option<RunResult>,
}

impl RunHandle {
    fn new(
        run_id: RunId,
        rx: mpsc::UnboundedReceiver<WorkerMessage>,
        cancel: CancellationToken,
        permit: Arc<OwnedSemaphorePermit>,
    ) -> Self {
        let initial = LifecycleState::Init;
        Self {
            run_id,
            state: initial,
            rx,
            pending: VecDeque::from([RunEvent::Entered(initial)]),
            transitions: vec![initial],
            cancel,
            permit: Some(permit),
            result: None,
        }
    }

    /// The run's identifier.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The latest state this handle knows about.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Check if the run has reached `Complete`.
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// The run's result, once it has reached `Complete`.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    /// Ask the run to stop before its next stage.
    ///
    /// A stage already in progress finishes; the run then goes to `Error`
    /// with the message "run cancelled".
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the next thing that happens in the run.
    ///
    /// Yields `Entered(Init)` first and `Completed` last, then `None`.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.is_finished() {
                return None;
            }
            self.receive().await;
        }
    }

    /// Feed every remaining event to `observer` and return the result.
    ///
    /// Events already taken through [`next_event`](Self::next_event) are
    /// not replayed. If `Completed` was among them, `observer` sees no
    /// result and the stored one is returned.
    pub async fn drive<O>(mut self, observer: &mut O) -> RunResult
    where
        O: LifecycleObserver + ?Sized,
    {
        loop {
            match self.pending.pop_front() {
                Some(RunEvent::Entered(state)) => observer.on_transition(state),
                Some(RunEvent::Completed(result)) => {
                    observer.on_complete(&result);
                    return result;
                }
                None => match self.result.take() {
                    Some(result) => return result,
                    None => self.receive().await,
                },
            }
        }
    }

    /// Wait for the run to complete.
    pub async fn wait(self) -> RunResult {
        self.drive(&mut NoopObserver).await
    }

    async fn receive(&mut self) {
        match self.rx.recv().await {
            Some(WorkerMessage::Transition(state)) => self.record(state),
            Some(WorkerMessage::HandBack(report)) => self.settle(report),
            None => self.settle(WorkerReport::lost(self.state)),
        }
    }

    fn record(&mut self, state: LifecycleState) {
        self.state = state;
        self.transitions.push(state);
        self.pending.push_back(RunEvent::Entered(state));
    }

    fn apply(&mut self, event: Event) -> Vec<Action> {
        let (next, actions) = self.state.on_event(event);
        if next != self.state {
            info!(run_id = %self.run_id, from = %self.state, to = %next, "transition");
            self.record(next);
        }
        actions
    }

    /// Finish the run on this context from the worker's report.
    fn settle(&mut self, report: WorkerReport) {
        self.state = report.state;
        let mut error = report.error;

        // A report carrying an error from a live state means the worker
        // never got to record it (it was lost).
        let first = match &error {
            Some(message) if self.state != LifecycleState::Error => Event::Failed {
                error: message.clone(),
            },
            _ => Event::HandedBack,
        };
        let mut actions: VecDeque<Action> = self.apply(first).into();
        if actions.is_empty() {
            actions = self
                .apply(Event::Failed {
                    error: format!("run stalled in {}", self.state),
                })
                .into();
        }

        while let Some(action) = actions.pop_front() {
            match action {
                Action::RecordError { error: message } => error = Some(message),
                Action::HandBack => actions.extend(self.apply(Event::HandedBack)),
                Action::RenderSummary => actions.extend(self.apply(Event::SummaryRendered)),
                Action::Finish => {
                    let result = RunResult {
                        run_id: self.run_id,
                        final_state: self.state,
                        new_entry_count: report.new_entry_count,
                        error_message: error.take(),
                        delivery_error: report.delivery_error.clone(),
                        sync_outcome: report.sync_outcome,
                        transitions: self.transitions.clone(),
                    };
                    info!(run_id = %self.run_id, summary = %result.summary(), "run complete");
                    self.result = Some(result.clone());
                    self.pending.push_back(RunEvent::Completed(result));
                    self.permit = None;
                }
                other => debug!(action = ?other, "ignoring worker action on the invoking context"),
            }
        }
    }
}
