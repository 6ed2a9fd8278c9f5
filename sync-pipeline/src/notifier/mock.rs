//! Mock notifier for testing.
//!
//! Captures delivered diffs for verification and allows forcing failures.

use super::{DeliveryError, Notifier};
use async_trait::async_trait;
use callsync_types::DiffResult;
use std::sync::{Arc, Mutex};

/// Mock notifier for testing.
///
/// Records every diff it is asked to deliver, including failed attempts.
#[derive(Debug, Default)]
pub struct MockNotifier {
    inner: Arc<Mutex<MockNotifierInner>>,
}

#[derive(Debug, Default)]
struct MockNotifierInner {
    delivered: Vec<DiffResult>,
    attempts: usize,
    fail_next_deliver: Option<DeliveryError>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all diffs that were delivered successfully.
    pub fn delivered(&self) -> Vec<DiffResult> {
        let inner = self.inner.lock().unwrap();
        inner.delivered.clone()
    }

    /// Number of deliver() calls, successful or not.
    pub fn attempts(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.attempts
    }

    /// Cause the next deliver() to fail with a transport error.
    pub fn fail_next_deliver(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_deliver = Some(DeliveryError::Transport(error.to_string()));
    }

    /// Cause the next deliver() to be rejected with the given status.
    pub fn reject_next_deliver(&self, status: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_deliver = Some(DeliveryError::Rejected { status });
    }
}

impl Clone for MockNotifier {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, diff: &DiffResult) -> Result<(), DeliveryError> {
        let mut inner = self.inner.lock().unwrap();
        inner.attempts += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_deliver.take() {
            return Err(error);
        }

        inner.delivered.push(diff.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsync_types::CallRecord;

    fn diff(ids: &[&str]) -> DiffResult {
        DiffResult::new(ids.iter().map(|id| CallRecord::new(*id, "+1")).collect())
    }

    #[tokio::test]
    async fn records_delivered_diffs() {
        let notifier = MockNotifier::new();

        notifier.deliver(&diff(&["1"])).await.unwrap();
        notifier.deliver(&diff(&["2", "3"])).await.unwrap();

        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[1].len(), 2);
    }

    #[tokio::test]
    async fn forced_failure_is_one_shot() {
        let notifier = MockNotifier::new();
        notifier.fail_next_deliver("connection reset");

        let result = notifier.deliver(&diff(&["1"])).await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));

        notifier.deliver(&diff(&["1"])).await.unwrap();
        assert_eq!(notifier.attempts(), 2);
        assert_eq!(notifier.delivered().len(), 1);
    }

    #[tokio::test]
    async fn rejection_carries_status() {
        let notifier = MockNotifier::new();
        notifier.reject_next_deliver(429);

        let err = notifier.deliver(&diff(&["1"])).await.unwrap_err();
        assert_eq!(err.to_string(), "remote rejected delivery with status 429");
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let notifier1 = MockNotifier::new();
        let notifier2 = notifier1.clone();

        notifier2.deliver(&diff(&["1"])).await.unwrap();
        assert_eq!(notifier1.delivered().len(), 1);
    }
}
