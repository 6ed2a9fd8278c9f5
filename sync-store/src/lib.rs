//! # sync-store
//!
//! Filesystem collaborators for callsync.
//!
//! - [`FileSnapshotStore`] captures the exported call log and keeps the
//!   current and prior snapshots in a data directory
//! - [`MirrorReconciler`] keeps a mirror copy of the current snapshot in
//!   line with it, in either direction
//!
//! All writes go through write-then-rename, so a crash never leaves a
//! half-written snapshot behind.
//!
//! ## Example
//!
//! ```rust,ignore
//! use callsync_store::{DataLayout, FileSnapshotStore, MirrorReconciler};
//!
//! let layout = DataLayout::new("callsync-data");
//! let store = FileSnapshotStore::new("call_log.json", layout);
//! let reconciler = MirrorReconciler::new();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod atomic;
mod layout;
mod mirror;
mod snapshot;

pub use layout::{DataLayout, CURRENT_FILE, PRIOR_FILE};
pub use mirror::MirrorReconciler;
pub use snapshot::FileSnapshotStore;
