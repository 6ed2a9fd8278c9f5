//! Where the persisted snapshots live.

use std::path::{Path, PathBuf};

/// File name of the current snapshot.
pub const CURRENT_FILE: &str = "calls.json";

/// File name of the snapshot displaced by the last capture.
pub const PRIOR_FILE: &str = "calls.prev.json";

/// Paths inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    data_dir: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the current snapshot (the primary copy).
    pub fn current_path(&self) -> PathBuf {
        self.data_dir.join(CURRENT_FILE)
    }

    /// Path of the prior snapshot.
    pub fn prior_path(&self) -> PathBuf {
        self.data_dir.join(PRIOR_FILE)
    }
}
