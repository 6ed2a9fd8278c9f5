//! # sync-core
//!
//! Pure logic for callsync (no I/O, instant tests).
//!
//! This crate implements the lifecycle state machine, the snapshot diff
//! and the reconciliation decision without any disk or network I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (capturing snapshots, webhook delivery, file copies) is
//! performed by `sync-pipeline` and its collaborators, which interpret the
//! actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod lifecycle;
pub mod reconcile;

pub use diff::compare;
pub use lifecycle::{Action, Event, LifecycleState};
pub use reconcile::{plan, PlanError, SyncPlan};
