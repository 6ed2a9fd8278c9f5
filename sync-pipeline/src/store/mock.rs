//! In-memory snapshot store for testing.
//!
//! Allows queueing snapshots for upcoming captures, forcing failures, and
//! holding a capture open to keep a run in flight.

use super::{SnapshotStore, StoreError};
use async_trait::async_trait;
use callsync_types::Snapshot;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-memory snapshot store for testing.
///
/// Each capture rotates the current snapshot into the prior slot and takes
/// the next queued snapshot (or recaptures the current one if the queue is
/// empty). Clones share state.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    current: Snapshot,
    prior: Snapshot,
    queued: VecDeque<Snapshot>,
    captures: usize,
    fail_next_capture: Option<String>,
    fail_next_prior: Option<String>,
    gate: Option<Arc<Notify>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current reference point, as if a previous run captured it.
    pub fn seed(&self, snapshot: Snapshot) {
        let mut inner = self.inner.lock().unwrap();
        inner.current = snapshot;
    }

    /// Queue a snapshot to be returned by the next `capture_snapshot()` call.
    pub fn queue_capture(&self, snapshot: Snapshot) {
        let mut inner = self.inner.lock().unwrap();
        inner.queued.push_back(snapshot);
    }

    /// Cause the next capture_snapshot() to fail with the given error.
    pub fn fail_next_capture(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_capture = Some(error.to_string());
    }

    /// Cause the next prior_snapshot() to fail with the given error.
    pub fn fail_next_prior(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_prior = Some(error.to_string());
    }

    /// Make the next capture wait until the returned handle is notified.
    ///
    /// `notify_one()` stores a permit, so releasing before the capture
    /// starts is fine.
    pub fn hold_capture(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let mut inner = self.inner.lock().unwrap();
        inner.gate = Some(Arc::clone(&gate));
        gate
    }

    /// Number of successful captures.
    pub fn capture_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.captures
    }

    /// The current reference point.
    pub fn current(&self) -> Snapshot {
        let inner = self.inner.lock().unwrap();
        inner.current.clone()
    }

    /// Clear all state (snapshots, queue, forced failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MemoryStoreInner::default();
    }
}

impl Clone for MemorySnapshotStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn capture_snapshot(&self) -> Result<Snapshot, StoreError> {
        let gate = self.inner.lock().unwrap().gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_capture.take() {
            return Err(StoreError::Io(error));
        }

        let fresh = match inner.queued.pop_front() {
            Some(snapshot) => snapshot,
            None => inner.current.clone(),
        };
        inner.prior = std::mem::replace(&mut inner.current, fresh.clone());
        inner.captures += 1;
        Ok(fresh)
    }

    async fn prior_snapshot(&self) -> Result<Snapshot, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_prior.take() {
            return Err(StoreError::Io(error));
        }

        Ok(inner.prior.clone())
    }
}
