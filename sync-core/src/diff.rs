//! Snapshot comparison.
//!
//! A diff only tracks additions: a record is new when its key is absent
//! from the old snapshot. Changed or removed records do not count.

use std::collections::HashSet;

use callsync_types::{DiffResult, Snapshot};

/// Compute the records of `new` whose keys are not present in `old`.
///
/// Pure and total. The result preserves the order of `new`. Both snapshots
/// are expected to have unique keys; callers check this with
/// [`Snapshot::validate`] beforehand. If `new` repeats a key anyway, every
/// occurrence that is missing from `old` is reported.
pub fn compare(old: &Snapshot, new: &Snapshot) -> DiffResult {
    let known: HashSet<&str> = old.records().iter().map(|r| r.id.as_str()).collect();

    let new_entries = new
        .records()
        .iter()
        .filter(|record| !known.contains(record.id.as_str()))
        .cloned()
        .collect();

    DiffResult::new(new_entries)
}
