//! # sync-pipeline
//!
//! Staged call-log synchronization with an observable lifecycle.
//!
//! A run captures a fresh snapshot of the call log (rotating the previous
//! one), diffs it against the prior snapshot, delivers new entries to a
//! remote target and reconciles a mirror copy. Every state the run enters
//! is reported to the caller, ending with exactly one [`RunResult`].
//!
//! ## Features
//!
//! - **Pure State Machine**: transitions come from `callsync-core`
//! - **Background Stages**: I/O runs on a spawned task, never the caller
//! - **Single Run**: overlapping fetches fail fast
//! - **Pluggable Collaborators**: store, notifier and reconciler are traits
//!   with in-memory doubles
//!
//! ## Example
//!
//! ```ignore
//! use callsync_pipeline::{LifecycleConfig, RecordingObserver, SyncLifecycle};
//!
//! let lifecycle = SyncLifecycle::new(store, notifier, reconciler, config);
//! let mut observer = RecordingObserver::new();
//!
//! let result = lifecycle.perform_fetch()?.drive(&mut observer).await;
//! println!("{}", result.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notifier;
pub mod observer;
pub mod reconcile;
pub mod result;
pub mod store;
mod worker;

pub use callsync_core::LifecycleState;
pub use config::LifecycleConfig;
pub use error::{LifecycleError, PipelineError};
pub use lifecycle::{RunHandle, SyncLifecycle};
pub use notifier::{DeliveryError, MockNotifier, Notifier};
pub use observer::{LifecycleObserver, NoopObserver, RecordingObserver, RunEvent};
pub use reconcile::{MemoryReconciler, ReconcileError, Reconciler};
pub use result::RunResult;
pub use store::{MemorySnapshotStore, SnapshotStore, StoreError};
