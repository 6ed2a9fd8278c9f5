//! Snapshot store abstraction.
//!
//! The pipeline never touches the call-log file directly. It asks a
//! [`SnapshotStore`] to capture a fresh snapshot (rotating the previous
//! one aside) and to hand back the snapshot that capture displaced.
//!
//! # Contract
//!
//! - `capture_snapshot()` is the only mutating operation. The pipeline
//!   calls it at most once per run, during `FileRotation`.
//! - `prior_snapshot()` returns the snapshot displaced by the most recent
//!   capture, or an empty snapshot if there is none.

mod mock;

pub use mock::MemorySnapshotStore;

use async_trait::async_trait;
use callsync_types::Snapshot;
use thiserror::Error;

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying storage failed.
    #[error("snapshot i/o failed: {0}")]
    Io(String),

    /// Stored data could not be decoded.
    #[error("snapshot data is corrupt: {0}")]
    Corrupt(String),
}

/// Persists and retrieves snapshots of tracked call records.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Capture the current records and persist them as the new reference
    /// point, rotating the previous reference point into the prior slot.
    async fn capture_snapshot(&self) -> Result<Snapshot, StoreError>;

    /// The snapshot displaced by the most recent capture.
    ///
    /// Empty if no previous capture exists.
    async fn prior_snapshot(&self) -> Result<Snapshot, StoreError>;
}
