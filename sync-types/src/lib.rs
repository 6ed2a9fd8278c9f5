//! # sync-types
//!
//! Data model for the callsync call-log synchronization pipeline.
//!
//! This crate provides the foundational types used across all callsync crates:
//! - [`RecordKey`], [`RunId`], [`CopyLocation`] - Identity types
//! - [`CallRecord`], [`CallKind`] - One call-log entry
//! - [`Snapshot`], [`DiffResult`] - Captured state and what changed
//! - [`SyncOutcome`] - Result of reconciling two snapshot copies
//! - [`SnapshotError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod outcome;
mod record;
mod snapshot;

pub use error::SnapshotError;
pub use ids::{CopyLocation, RecordKey, RunId};
pub use outcome::{SyncDirection, SyncOutcome};
pub use record::{CallKind, CallRecord};
pub use snapshot::{DiffResult, Snapshot};
