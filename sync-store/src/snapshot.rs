//! File-backed snapshot store.
//!
//! The call log is read from a JSON array of records exported by the
//! device. Each capture rotates `calls.json` to `calls.prev.json` and
//! writes the fresh snapshot as the new `calls.json`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use callsync_pipeline::{SnapshotStore, StoreError};
use callsync_types::Snapshot;
use tokio::fs;
use tracing::debug;

use crate::atomic::{read_if_exists, write_atomic};
use crate::layout::DataLayout;

/// Snapshot store over the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    source: PathBuf,
    layout: DataLayout,
}

impl FileSnapshotStore {
    /// Create a store reading the call log from `source`.
    pub fn new(source: impl Into<PathBuf>, layout: DataLayout) -> Self {
        Self {
            source: source.into(),
            layout,
        }
    }

    /// The exported call log.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Where the snapshots live.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// The snapshot written by the last capture (empty before the first).
    pub async fn current_snapshot(&self) -> Result<Snapshot, StoreError> {
        load_or_empty(&self.layout.current_path()).await
    }

    async fn read_source(&self) -> Result<Snapshot, StoreError> {
        let bytes = fs::read(&self.source)
            .await
            .map_err(|e| io_error("reading", &self.source, e))?;
        parse(&self.source, &bytes)
    }

    async fn rotate(&self) -> Result<(), StoreError> {
        let current = self.layout.current_path();
        let prior = self.layout.prior_path();

        match fs::rename(&current, &prior).await {
            Ok(()) => {
                debug!(from = %current.display(), to = %prior.display(), "rotated snapshot");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // An earlier capture may have rotated and then failed to
                // write; its prior is still the last good reference.
                debug!(prior = %prior.display(), "no current snapshot to rotate, keeping prior");
                Ok(())
            }
            Err(e) => Err(io_error("rotating", &current, e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn capture_snapshot(&self) -> Result<Snapshot, StoreError> {
        let fresh = self.read_source().await?;

        let data_dir = self.layout.data_dir();
        fs::create_dir_all(data_dir)
            .await
            .map_err(|e| io_error("creating", data_dir, e))?;
        self.rotate().await?;

        let current = self.layout.current_path();
        let bytes = serde_json::to_vec_pretty(&fresh)
            .map_err(|e| StoreError::Corrupt(format!("encoding snapshot: {}", e)))?;
        write_atomic(&current, &bytes)
            .await
            .map_err(|e| io_error("writing", &current, e))?;

        debug!(records = fresh.len(), path = %current.display(), "wrote snapshot");
        Ok(fresh)
    }

    async fn prior_snapshot(&self) -> Result<Snapshot, StoreError> {
        load_or_empty(&self.layout.prior_path()).await
    }
}

async fn load_or_empty(path: &Path) -> Result<Snapshot, StoreError> {
    match read_if_exists(path).await {
        Ok(Some(bytes)) => parse(path, &bytes),
        Ok(None) => Ok(Snapshot::empty()),
        Err(e) => Err(io_error("reading", path, e)),
    }
}

fn parse(path: &Path, bytes: &[u8]) -> Result<Snapshot, StoreError> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
}

fn io_error(action: &str, path: &Path, e: io::Error) -> StoreError {
    StoreError::Io(format!("{} {}: {}", action, path.display(), e))
}
