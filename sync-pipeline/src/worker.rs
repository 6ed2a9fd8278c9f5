//! Background half of a run.
//!
//! The worker owns the stages that touch the store, the notifier and the
//! reconciler. It drives the lifecycle from `ThreadSwitch` until the
//! machine asks for `HandBack`, reporting every state it enters over the
//! run's channel. `UiUpdate` and `Complete` belong to the handle.

use std::collections::VecDeque;
use std::sync::Arc;

use callsync_core::{compare, Action, Event, LifecycleState};
use callsync_types::{DiffResult, Snapshot, SyncOutcome};
use tokio::sync::{mpsc, OwnedSemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::LifecycleConfig;
use crate::error::PipelineError;
use crate::notifier::Notifier;
use crate::reconcile::Reconciler;
use crate::store::SnapshotStore;

/// The collaborators a run needs, shared between runs.
pub(crate) struct Collaborators<S, N, R> {
    pub(crate) store: S,
    pub(crate) notifier: N,
    pub(crate) reconciler: R,
}

/// Messages from the worker to its [`crate::RunHandle`].
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// The worker entered a state.
    Transition(LifecycleState),
    /// The worker is done; always the last message.
    HandBack(WorkerReport),
}

/// What the worker learned, handed back to the invoking context.
#[derive(Debug, Default)]
pub(crate) struct WorkerReport {
    pub(crate) state: LifecycleState,
    pub(crate) new_entry_count: usize,
    pub(crate) error: Option<String>,
    pub(crate) delivery_error: Option<String>,
    pub(crate) sync_outcome: Option<SyncOutcome>,
}

impl WorkerReport {
    /// Report standing in for a worker that vanished while in `state`.
    pub(crate) fn lost(state: LifecycleState) -> Self {
        Self {
            state,
            error: Some(PipelineError::WorkerLost.to_string()),
            ..Self::default()
        }
    }
}

/// The worker's side of the run channel, with its share of the run guard.
///
/// The share is released before the channel closes, whether the worker
/// hands back or unwinds. A handle that sees the channel close can then
/// finish the run without the worker still holding the guard.
pub(crate) struct Link {
    permit: Option<Arc<OwnedSemaphorePermit>>,
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl Link {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<WorkerMessage>,
        permit: Arc<OwnedSemaphorePermit>,
    ) -> Self {
        Self {
            permit: Some(permit),
            tx,
        }
    }

    /// Report a transition. The handle may already be gone; the run still
    /// finishes.
    fn transition(&self, state: LifecycleState) {
        let _ = self.tx.send(WorkerMessage::Transition(state));
    }

    /// Release the guard share, then send the final report.
    fn hand_back(&mut self, report: WorkerReport) {
        self.permit = None;
        if self.tx.send(WorkerMessage::HandBack(report)).is_err() {
            debug!("run handle dropped before hand-back");
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        // Runs before the fields drop, so the sender outlives the permit.
        self.permit = None;
    }
}

pub(crate) struct Worker<S, N, R> {
    deps: Arc<Collaborators<S, N, R>>,
    config: LifecycleConfig,
    cancel: CancellationToken,
    link: Link,
    state: LifecycleState,
    fresh: Option<Snapshot>,
    diff: Option<DiffResult>,
    error: Option<String>,
    delivery_error: Option<String>,
    sync_outcome: Option<SyncOutcome>,
}

impl<S, N, R> Worker<S, N, R>
where
    S: SnapshotStore,
    N: Notifier,
    R: Reconciler,
{
    pub(crate) fn new(
        deps: Arc<Collaborators<S, N, R>>,
        config: LifecycleConfig,
        cancel: CancellationToken,
        link: Link,
        state: LifecycleState,
    ) -> Self {
        Self {
            deps,
            config,
            cancel,
            link,
            state,
            fresh: None,
            diff: None,
            error: None,
            delivery_error: None,
            sync_outcome: None,
        }
    }

    /// Run the background stages to completion.
    pub(crate) async fn run(mut self) {
        let mut pending: VecDeque<Action> = self.apply(Event::WorkerStarted).into();

        while let Some(action) = pending.pop_front() {
            if is_stage(&action) && self.cancel.is_cancelled() {
                info!(state = %self.state, "run cancelled");
                pending = self
                    .apply(Event::Failed {
                        error: PipelineError::Cancelled.to_string(),
                    })
                    .into();
                continue;
            }

            let event = match action {
                Action::CaptureSnapshot => self.capture().await,
                Action::ComputeDiff => self.compute_diff().await,
                Action::Deliver => self.deliver().await,
                Action::Reconcile => self.reconcile().await,
                Action::RecordError { error } => {
                    self.error = Some(error);
                    continue;
                }
                Action::HandBack => {
                    self.hand_back();
                    return;
                }
                other => {
                    warn!(action = ?other, "action does not belong on the worker");
                    continue;
                }
            };
            pending.extend(self.apply(event));
        }

        // The machine stopped asking for work without handing back. The
        // handle turns this into an error.
        error!(state = %self.state, "lifecycle stalled on the worker");
        self.hand_back();
    }

    fn apply(&mut self, event: Event) -> Vec<Action> {
        let (next, actions) = self.state.on_event(event);
        if next != self.state {
            info!(from = %self.state, to = %next, "transition");
            self.link.transition(next);
            self.state = next;
        }
        actions
    }

    fn fail(&self, err: PipelineError) -> Event {
        error!(state = %self.state, error = %err, "stage failed");
        Event::Failed {
            error: err.to_string(),
        }
    }

    async fn capture(&mut self) -> Event {
        match self.deps.store.capture_snapshot().await {
            Ok(snapshot) => {
                debug!(records = snapshot.len(), "captured snapshot");
                self.fresh = Some(snapshot);
                Event::SnapshotCaptured
            }
            Err(e) => self.fail(e.into()),
        }
    }

    async fn compute_diff(&mut self) -> Event {
        let fresh = self.fresh.take().unwrap_or_default();
        let prior = match self.deps.store.prior_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail(e.into()),
        };

        if let Err(e) = prior.validate().and_then(|_| fresh.validate()) {
            return self.fail(e.into());
        }

        let diff = compare(&prior, &fresh);
        info!(
            prior = prior.len(),
            fresh = fresh.len(),
            new_entries = diff.len(),
            "diff computed"
        );

        let event = Event::DiffComputed {
            new_entries: diff.len(),
            remote_configured: self.config.has_remote_target(),
            reconcile_without_remote: self.config.reconcile_without_remote,
        };
        self.diff = Some(diff);
        event
    }

    async fn deliver(&mut self) -> Event {
        if let Some(diff) = &self.diff {
            match self.deps.notifier.deliver(diff).await {
                Ok(()) => info!(entries = diff.len(), "delivered new entries"),
                Err(e) => {
                    let err = PipelineError::from(e);
                    warn!(error = %err, "delivery failed, continuing");
                    self.delivery_error = Some(err.to_string());
                }
            }
        }
        Event::Delivered
    }

    async fn reconcile(&mut self) -> Event {
        let result = self
            .deps
            .reconciler
            .sync_if_different(&self.config.primary, &self.config.mirror)
            .await;

        match result {
            Ok(outcome) => {
                info!(outcome = %outcome, "reconciled copies");
                self.sync_outcome = Some(outcome);
                Event::Reconciled
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// The handle keeps the run exclusive until it reaches Complete.
    fn hand_back(mut self) {
        let report = WorkerReport {
            state: self.state,
            new_entry_count: self.diff.as_ref().map_or(0, DiffResult::len),
            error: self.error.take(),
            delivery_error: self.delivery_error.take(),
            sync_outcome: self.sync_outcome.take(),
        };
        self.link.hand_back(report);
    }
}

fn is_stage(action: &Action) -> bool {
    matches!(
        action,
        Action::CaptureSnapshot | Action::ComputeDiff | Action::Deliver | Action::Reconcile
    )
}
