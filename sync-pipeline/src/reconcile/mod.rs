//! Reconciliation of two snapshot copies.
//!
//! After new entries are delivered the pipeline keeps a primary copy and
//! a mirror of the persisted snapshot in line. Which side wins is decided
//! by [`callsync_core::plan`]; implementations only fingerprint, copy and
//! remember what both sides agreed on.

mod mock;

pub use mock::MemoryReconciler;

use async_trait::async_trait;
use callsync_types::{CopyLocation, SyncOutcome};
use thiserror::Error;

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Both copies changed independently; no side is authoritative.
    #[error("sync conflict: {primary} and {mirror} both changed since the last sync")]
    Conflict {
        /// The primary copy.
        primary: CopyLocation,
        /// The mirror copy.
        mirror: CopyLocation,
    },

    /// Reading or writing a copy failed.
    #[error("sync i/o failed: {0}")]
    Io(String),
}

/// Keeps two copies of the snapshot store identical.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Compare the copies and, if they differ, overwrite the one that is
    /// behind with the authoritative one.
    ///
    /// Idempotent: a second call with no change in between returns
    /// [`SyncOutcome::Skipped`].
    async fn sync_if_different(
        &self,
        primary: &CopyLocation,
        mirror: &CopyLocation,
    ) -> Result<SyncOutcome, ReconcileError>;
}
