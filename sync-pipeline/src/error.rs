//! Error types for the pipeline.
//!
//! [`PipelineError`] is the taxonomy of stage failures. Its message is what
//! ends up in `RunResult::error_message`. Only delivery failures are
//! recovered; everything else aborts the rest of the run.

use callsync_types::SnapshotError;
use thiserror::Error;

use crate::notifier::DeliveryError;
use crate::reconcile::ReconcileError;
use crate::store::StoreError;

/// Stage failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The snapshot store could not capture or read a snapshot.
    #[error("i/o failure: {0}")]
    Io(#[from] StoreError),

    /// A snapshot broke the unique-key invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    /// The notifier could not transmit (recovered locally).
    #[error("delivery failure: {0}")]
    Delivery(#[from] DeliveryError),

    /// The reconciler could not bring the copies in line.
    #[error("{0}")]
    Sync(#[from] ReconcileError),

    /// The run was cancelled between stages.
    #[error("run cancelled")]
    Cancelled,

    /// The background task ended without handing its report back.
    #[error("worker exited without reporting")]
    WorkerLost,
}

/// Errors from starting a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Another run has not reached `Complete` yet.
    #[error("a sync run is already in progress")]
    AlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsync_types::RecordKey;

    #[test]
    fn io_failure_message() {
        let err = PipelineError::from(StoreError::Io("permission denied".into()));
        assert_eq!(err.to_string(), "i/o failure: snapshot i/o failed: permission denied");
    }

    #[test]
    fn invalid_snapshot_message() {
        let err = PipelineError::from(SnapshotError::DuplicateKey {
            key: RecordKey::new("4"),
        });
        assert_eq!(err.to_string(), "invalid snapshot: duplicate record key: 4");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineError>();
        assert_send_sync::<LifecycleError>();
    }
}
