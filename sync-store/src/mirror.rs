//! File-backed reconciler for the primary snapshot and its mirror.
//!
//! Copies are compared by SHA-256 digest. After every sync the agreed
//! digest is stored next to the mirror in `<mirror>.base`, which lets a
//! later sync tell which side changed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use callsync_core::{plan, PlanError, SyncPlan};
use callsync_pipeline::{ReconcileError, Reconciler};
use callsync_types::{CopyLocation, SyncDirection, SyncOutcome};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::atomic::{read_if_exists, write_atomic};

/// Reconciler over two files on the local filesystem.
///
/// Locations are read as paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorReconciler;

impl MirrorReconciler {
    /// Create a reconciler.
    pub fn new() -> Self {
        Self
    }

    /// Path of the base marker kept for `mirror`.
    pub fn base_path(mirror: &Path) -> PathBuf {
        let mut name = mirror
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(OsString::new);
        name.push(".base");
        mirror.with_file_name(name)
    }
}

#[async_trait]
impl Reconciler for MirrorReconciler {
    async fn sync_if_different(
        &self,
        primary: &CopyLocation,
        mirror: &CopyLocation,
    ) -> Result<SyncOutcome, ReconcileError> {
        let primary_path = Path::new(primary.as_str());
        let mirror_path = Path::new(mirror.as_str());
        let base_path = Self::base_path(mirror_path);

        let primary_bytes = read(primary_path).await?;
        let mirror_bytes = read(mirror_path).await?;
        let base = read(&base_path)
            .await?
            .map(|b| String::from_utf8_lossy(&b).trim().to_string());

        let primary_digest = primary_bytes.as_deref().map(digest);
        let mirror_digest = mirror_bytes.as_deref().map(digest);
        debug!(
            primary = ?primary_digest,
            mirror = ?mirror_digest,
            base = ?base,
            "comparing copies"
        );

        let decision = plan(
            primary_digest.as_ref(),
            mirror_digest.as_ref(),
            base.as_ref(),
        );

        let (target, contents, agreed, direction) = match decision {
            Ok(SyncPlan::Skip) => {
                if let Some(agreed) = primary_digest.filter(|d| base.as_ref() != Some(d)) {
                    write(&base_path, agreed.as_bytes()).await?;
                }
                return Ok(SyncOutcome::Skipped);
            }
            Ok(SyncPlan::CopyPrimaryToMirror) => (
                mirror_path,
                primary_bytes,
                primary_digest,
                SyncDirection::PrimaryToMirror,
            ),
            Ok(SyncPlan::CopyMirrorToPrimary) => (
                primary_path,
                mirror_bytes,
                mirror_digest,
                SyncDirection::MirrorToPrimary,
            ),
            Err(PlanError::Diverged) => {
                return Err(ReconcileError::Conflict {
                    primary: primary.clone(),
                    mirror: mirror.clone(),
                })
            }
        };

        write(target, &contents.unwrap_or_default()).await?;
        if let Some(agreed) = agreed {
            write(&base_path, agreed.as_bytes()).await?;
        }

        debug!(?direction, target = %target.display(), "copied snapshot");
        Ok(SyncOutcome::Synced(direction))
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

async fn read(path: &Path) -> Result<Option<Vec<u8>>, ReconcileError> {
    read_if_exists(path)
        .await
        .map_err(|e| ReconcileError::Io(format!("reading {}: {}", path.display(), e)))
}

async fn write(path: &Path, contents: &[u8]) -> Result<(), ReconcileError> {
    write_atomic(path, contents)
        .await
        .map_err(|e| ReconcileError::Io(format!("writing {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    struct Copies {
        _dir: TempDir,
        primary: CopyLocation,
        mirror: CopyLocation,
        primary_path: PathBuf,
        mirror_path: PathBuf,
    }

    fn setup() -> Copies {
        let dir = tempfile::tempdir().unwrap();
        let primary_path = dir.path().join("data/calls.json");
        let mirror_path = dir.path().join("mirror/calls.json");
        Copies {
            primary: CopyLocation::new(primary_path.to_string_lossy()),
            mirror: CopyLocation::new(mirror_path.to_string_lossy()),
            primary_path,
            mirror_path,
            _dir: dir,
        }
    }

    async fn put(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(path, contents).await.unwrap();
    }

    #[tokio::test]
    async fn both_missing_skips() {
        let c = setup();

        let outcome = MirrorReconciler::new()
            .sync_if_different(&c.primary, &c.mirror)
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(!c.mirror_path.exists());
    }

    #[tokio::test]
    async fn missing_mirror_is_created_with_base() {
        let c = setup();
        put(&c.primary_path, "[1]").await;

        let outcome = MirrorReconciler::new()
            .sync_if_different(&c.primary, &c.mirror)
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(SyncDirection::PrimaryToMirror));
        assert_eq!(fs::read_to_string(&c.mirror_path).await.unwrap(), "[1]");
        let base = fs::read_to_string(MirrorReconciler::base_path(&c.mirror_path))
            .await
            .unwrap();
        assert_eq!(base, digest(b"[1]"));
    }

    #[tokio::test]
    async fn second_sync_is_a_no_op() {
        let c = setup();
        put(&c.primary_path, "[1]").await;
        let reconciler = MirrorReconciler::new();

        reconciler.sync_if_different(&c.primary, &c.mirror).await.unwrap();
        let outcome = reconciler.sync_if_different(&c.primary, &c.mirror).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
    }

    #[tokio::test]
    async fn mirror_change_flows_back() {
        let c = setup();
        put(&c.primary_path, "[1]").await;
        let reconciler = MirrorReconciler::new();
        reconciler.sync_if_different(&c.primary, &c.mirror).await.unwrap();

        put(&c.mirror_path, "[1,2]").await;
        let outcome = reconciler.sync_if_different(&c.primary, &c.mirror).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(SyncDirection::MirrorToPrimary));
        assert_eq!(fs::read_to_string(&c.primary_path).await.unwrap(), "[1,2]");
    }

    #[tokio::test]
    async fn no_base_primary_wins() {
        let c = setup();
        put(&c.primary_path, "[1]").await;
        put(&c.mirror_path, "[9]").await;

        let outcome = MirrorReconciler::new()
            .sync_if_different(&c.primary, &c.mirror)
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(SyncDirection::PrimaryToMirror));
        assert_eq!(fs::read_to_string(&c.mirror_path).await.unwrap(), "[1]");
    }

    #[tokio::test]
    async fn both_changed_is_a_conflict() {
        let c = setup();
        put(&c.primary_path, "[1]").await;
        let reconciler = MirrorReconciler::new();
        reconciler.sync_if_different(&c.primary, &c.mirror).await.unwrap();

        put(&c.primary_path, "[1,2]").await;
        put(&c.mirror_path, "[1,3]").await;
        let result = reconciler.sync_if_different(&c.primary, &c.mirror).await;

        assert!(matches!(result, Err(ReconcileError::Conflict { .. })));
        // Neither side is touched.
        assert_eq!(fs::read_to_string(&c.primary_path).await.unwrap(), "[1,2]");
        assert_eq!(fs::read_to_string(&c.mirror_path).await.unwrap(), "[1,3]");
    }

    #[test]
    fn base_marker_sits_next_to_mirror() {
        assert_eq!(
            MirrorReconciler::base_path(Path::new("/m/calls.json")),
            Path::new("/m/calls.json.base")
        );
    }
}
