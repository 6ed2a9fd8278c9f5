//! Reconciliation decision for two copies of the snapshot store.
//!
//! Works on content fingerprints (digests, or the content itself) so the
//! same rules apply to on-disk mirrors and in-memory test doubles. The
//! base is the fingerprint both copies agreed on at the last sync.

use callsync_types::SyncDirection;
use thiserror::Error;

/// What a reconciler should do with its two copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPlan {
    /// The copies already match.
    Skip,
    /// Overwrite the mirror with the primary.
    CopyPrimaryToMirror,
    /// Overwrite the primary with the mirror.
    CopyMirrorToPrimary,
}

impl SyncPlan {
    /// Direction of the copy, if any.
    pub fn direction(&self) -> Option<SyncDirection> {
        match self {
            Self::Skip => None,
            Self::CopyPrimaryToMirror => Some(SyncDirection::PrimaryToMirror),
            Self::CopyMirrorToPrimary => Some(SyncDirection::MirrorToPrimary),
        }
    }
}

/// Reconciliation cannot pick an authoritative copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Both copies changed independently since the last sync.
    #[error("both copies changed since the last sync")]
    Diverged,
}

/// Decide how to bring `primary` and `mirror` back in line.
///
/// `None` means the copy does not exist. A missing copy is never treated
/// as authoritative. Without a base, the primary wins.
pub fn plan<T: PartialEq>(
    primary: Option<&T>,
    mirror: Option<&T>,
    base: Option<&T>,
) -> Result<SyncPlan, PlanError> {
    let (primary, mirror) = match (primary, mirror) {
        (None, None) => return Ok(SyncPlan::Skip),
        (Some(_), None) => return Ok(SyncPlan::CopyPrimaryToMirror),
        (None, Some(_)) => return Ok(SyncPlan::CopyMirrorToPrimary),
        (Some(p), Some(m)) => (p, m),
    };

    if primary == mirror {
        return Ok(SyncPlan::Skip);
    }

    let Some(base) = base else {
        return Ok(SyncPlan::CopyPrimaryToMirror);
    };

    match (primary != base, mirror != base) {
        (true, false) => Ok(SyncPlan::CopyPrimaryToMirror),
        (false, true) => Ok(SyncPlan::CopyMirrorToPrimary),
        (true, true) => Err(PlanError::Diverged),
        // Both equal the base but not each other: impossible for a real
        // equality, so there is nothing sensible to copy.
        (false, false) => Ok(SyncPlan::Skip),
    }
}
