//! Remote delivery abstraction.
//!
//! A [`Notifier`] transmits the new entries of a diff to a remote target
//! (a chat webhook, an HTTP endpoint). The pipeline only calls it when a
//! remote target is configured and the diff is non-empty.
//!
//! Delivery failures never abort a run: the pipeline logs them, records
//! them on the result and moves on to reconciliation.

mod mock;

pub use mock::MockNotifier;

use async_trait::async_trait;
use callsync_types::DiffResult;
use thiserror::Error;

/// Delivery errors.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The remote target answered with a non-success status.
    #[error("remote rejected delivery with status {status}")]
    Rejected {
        /// HTTP (or equivalent) status code.
        status: u16,
    },

    /// The request could not be sent or timed out.
    #[error("delivery transport failed: {0}")]
    Transport(String),

    /// No remote target is configured.
    #[error("no remote target configured")]
    NotConfigured,
}

/// Delivers a diff to a remote system.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Transmit the diff's new entries.
    async fn deliver(&self, diff: &DiffResult) -> Result<(), DeliveryError>;
}

/// An optional notifier, for setups where the remote target is optional.
///
/// `None` refuses every delivery. Pair it with a config whose remote
/// target flag is off so the pipeline never asks.
#[async_trait]
impl<N: Notifier> Notifier for Option<N> {
    async fn deliver(&self, diff: &DiffResult) -> Result<(), DeliveryError> {
        match self {
            Some(notifier) => notifier.deliver(diff).await,
            None => Err(DeliveryError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsync_types::CallRecord;

    fn diff() -> DiffResult {
        DiffResult::new(vec![CallRecord::new("1", "+15550100")])
    }

    #[tokio::test]
    async fn missing_notifier_refuses_delivery() {
        let notifier: Option<MockNotifier> = None;

        let result = notifier.deliver(&diff()).await;

        assert!(matches!(result, Err(DeliveryError::NotConfigured)));
    }

    #[tokio::test]
    async fn present_notifier_delivers() {
        let notifier = Some(MockNotifier::new());

        notifier.deliver(&diff()).await.unwrap();

        let delivered = notifier.as_ref().map(MockNotifier::delivered).unwrap();
        assert_eq!(delivered, vec![diff()]);
    }
}
