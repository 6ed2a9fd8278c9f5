//! Error types for callsync snapshots.

use thiserror::Error;

use crate::RecordKey;

/// Errors raised when a snapshot violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Two records in the same snapshot share a key.
    #[error("duplicate record key: {key}")]
    DuplicateKey {
        /// The first key found more than once.
        key: RecordKey,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SnapshotError::DuplicateKey {
            key: RecordKey::new("call-7"),
        };
        assert_eq!(err.to_string(), "duplicate record key: call-7");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SnapshotError>();
    }
}
