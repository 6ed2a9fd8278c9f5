//! Configuration consumed by the lifecycle.

use callsync_types::CopyLocation;

/// Configuration for [`crate::SyncLifecycle`].
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Whether new entries should be delivered through the notifier.
    pub has_remote_target: bool,
    /// Reconcile copies after a non-empty diff even without a remote target.
    pub reconcile_without_remote: bool,
    /// The primary copy of the persisted snapshot.
    pub primary: CopyLocation,
    /// The mirror kept in line with the primary.
    pub mirror: CopyLocation,
}

impl LifecycleConfig {
    /// Create a configuration with no remote target.
    pub fn new(primary: &str, mirror: &str) -> Self {
        Self {
            has_remote_target: false,
            reconcile_without_remote: false,
            primary: CopyLocation::new(primary),
            mirror: CopyLocation::new(mirror),
        }
    }

    /// Enable or disable delivery to the remote target.
    pub fn with_remote_target(mut self, enabled: bool) -> Self {
        self.has_remote_target = enabled;
        self
    }

    /// Reconcile after new entries even when nothing is delivered.
    pub fn with_reconcile_without_remote(mut self, enabled: bool) -> Self {
        self.reconcile_without_remote = enabled;
        self
    }

    /// Whether diff upload should be attempted.
    pub fn has_remote_target(&self) -> bool {
        self.has_remote_target
    }
}
