//! Reconciliation outcomes.

use std::fmt;

/// Which way content flowed during a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// The primary copy was written over the mirror.
    PrimaryToMirror,
    /// The mirror was written over the primary copy.
    MirrorToPrimary,
}

/// Result of reconciling two snapshot copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The copies already matched; nothing was written.
    Skipped,
    /// The copies differed and one was brought up to date.
    Synced(SyncDirection),
}

impl SyncOutcome {
    /// Check if anything was written.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced(_))
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped"),
            Self::Synced(SyncDirection::PrimaryToMirror) => f.write_str("synced primary -> mirror"),
            Self::Synced(SyncDirection::MirrorToPrimary) => f.write_str("synced mirror -> primary"),
        }
    }
}
