//! In-memory reconciler for testing.
//!
//! Holds copy contents in a map and applies the same planning rules as the
//! file-backed reconciler.

use super::{ReconcileError, Reconciler};
use async_trait::async_trait;
use callsync_core::{plan, PlanError, SyncPlan};
use callsync_types::{CopyLocation, SyncDirection, SyncOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory reconciler for testing.
///
/// Copies are byte buffers keyed by location. The base (what both copies
/// held after the last sync) is tracked per mirror. Clones share state.
#[derive(Debug, Default)]
pub struct MemoryReconciler {
    inner: Arc<Mutex<MemoryReconcilerInner>>,
}

#[derive(Debug, Default)]
struct MemoryReconcilerInner {
    copies: HashMap<CopyLocation, Vec<u8>>,
    bases: HashMap<CopyLocation, Vec<u8>>,
    calls: usize,
    fail_next_sync: Option<String>,
}

impl MemoryReconciler {
    /// Create a reconciler with no copies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contents of a copy.
    pub fn put(&self, location: &CopyLocation, contents: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.copies.insert(location.clone(), contents.to_vec());
    }

    /// Get the contents of a copy.
    pub fn get(&self, location: &CopyLocation) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.copies.get(location).cloned()
    }

    /// Number of sync_if_different() calls.
    pub fn calls(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.calls
    }

    /// Cause the next sync_if_different() to fail with an I/O error.
    pub fn fail_next_sync(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_sync = Some(error.to_string());
    }
}

impl Clone for MemoryReconciler {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Reconciler for MemoryReconciler {
    async fn sync_if_different(
        &self,
        primary: &CopyLocation,
        mirror: &CopyLocation,
    ) -> Result<SyncOutcome, ReconcileError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        if let Some(error) = inner.fail_next_sync.take() {
            return Err(ReconcileError::Io(error));
        }

        let decision = plan(
            inner.copies.get(primary),
            inner.copies.get(mirror),
            inner.bases.get(mirror),
        );

        let (source, target, direction) = match decision {
            Ok(SyncPlan::Skip) => {
                if let Some(agreed) = inner.copies.get(primary).cloned() {
                    inner.bases.insert(mirror.clone(), agreed);
                }
                return Ok(SyncOutcome::Skipped);
            }
            Ok(SyncPlan::CopyPrimaryToMirror) => (primary, mirror, SyncDirection::PrimaryToMirror),
            Ok(SyncPlan::CopyMirrorToPrimary) => (mirror, primary, SyncDirection::MirrorToPrimary),
            Err(PlanError::Diverged) => {
                return Err(ReconcileError::Conflict {
                    primary: primary.clone(),
                    mirror: mirror.clone(),
                })
            }
        };

        let contents = inner.copies.get(source).cloned().unwrap_or_default();
        inner.copies.insert(target.clone(), contents.clone());
        inner.bases.insert(mirror.clone(), contents);

        Ok(SyncOutcome::Synced(direction))
    }
}
