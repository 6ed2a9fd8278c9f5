//! Snapshots and diffs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{CallRecord, RecordKey, SnapshotError};

/// An ordered sequence of call records captured at one point in time.
///
/// Keys must be unique; call [`Snapshot::validate`] before relying on it.
/// Serializes as a plain JSON array of records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<CallRecord>,
}

impl Snapshot {
    /// Create a snapshot from records, preserving their order.
    pub fn new(records: Vec<CallRecord>) -> Self {
        Self { records }
    }

    /// A snapshot with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The records in capture order.
    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over record keys in capture order.
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.records.iter().map(CallRecord::key)
    }

    /// Check whether a record with the given key is present.
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.records.iter().any(|r| r.id == key.as_str())
    }

    /// Check that every key appears at most once.
    ///
    /// Reports the first repeated key in capture order.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(record.id.as_str()) {
                return Err(SnapshotError::DuplicateKey { key: record.key() });
            }
        }
        Ok(())
    }

    /// Consume the snapshot, returning its records.
    pub fn into_records(self) -> Vec<CallRecord> {
        self.records
    }
}

impl From<Vec<CallRecord>> for Snapshot {
    fn from(records: Vec<CallRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<CallRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = CallRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// What changed between two snapshots.
///
/// Immutable once produced. Only additions are tracked: a diff with no
/// new entries means no change was detected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    new_entries: Vec<CallRecord>,
}

impl DiffResult {
    /// Create a diff from the records that are new, in snapshot order.
    pub fn new(new_entries: Vec<CallRecord>) -> Self {
        Self { new_entries }
    }

    /// Records present in the new snapshot but not the old one.
    pub fn new_entries(&self) -> &[CallRecord] {
        &self.new_entries
    }

    /// Number of new records.
    pub fn len(&self) -> usize {
        self.new_entries.len()
    }

    /// Check if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.new_entries.is_empty()
    }

    /// Check if any change was detected.
    pub fn has_changes(&self) -> bool {
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ids: &[&str]) -> Snapshot {
        ids.iter().map(|id| CallRecord::new(*id, "+15550100")).collect()
    }

    #[test]
    fn empty_snapshot_is_valid() {
        assert!(Snapshot::empty().validate().is_ok());
    }

    #[test]
    fn unique_keys_are_valid() {
        assert!(snapshot(&["1", "2", "3"]).validate().is_ok());
    }

    #[test]
    fn duplicate_key_is_reported() {
        let result = snapshot(&["1", "2", "1", "2"]).validate();
        assert_eq!(
            result,
            Err(SnapshotError::DuplicateKey {
                key: RecordKey::new("1")
            })
        );
    }

    #[test]
    fn keys_preserve_order() {
        let keys: Vec<_> = snapshot(&["b", "a", "c"]).keys().collect();
        assert_eq!(
            keys,
            vec![RecordKey::new("b"), RecordKey::new("a"), RecordKey::new("c")]
        );
    }

    #[test]
    fn contains_key_checks_ids() {
        let snap = snapshot(&["1", "2"]);
        assert!(snap.contains_key(&RecordKey::new("2")));
        assert!(!snap.contains_key(&RecordKey::new("3")));
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_string(&snapshot(&["1"])).unwrap();
        assert!(json.starts_with('['), "got {}", json);
    }

    #[test]
    fn diff_has_changes_iff_entries() {
        assert!(!DiffResult::default().has_changes());
        let diff = DiffResult::new(vec![CallRecord::new("1", "2")]);
        assert!(diff.has_changes());
        assert_eq!(diff.len(), 1);
    }
}
