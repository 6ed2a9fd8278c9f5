//! Show where callsync keeps its data and what is there.

use anyhow::Result;
use callsync_pipeline::{SnapshotStore, StoreError};
use callsync_store::{FileSnapshotStore, MirrorReconciler};
use callsync_types::Snapshot;
use std::path::Path;

use crate::config::AppConfig;

/// Run the status command.
pub async fn run(config: &AppConfig) -> Result<()> {
    let layout = config.layout();
    let store = FileSnapshotStore::new(&config.store.source, layout.clone());

    println!("=== callsync status ===");
    println!();

    println!("Store:");
    println!(
        "  Source:  {} ({})",
        config.store.source.display(),
        presence(&config.store.source)
    );
    println!(
        "  Current: {} ({})",
        layout.current_path().display(),
        describe(store.current_snapshot().await)
    );
    println!(
        "  Prior:   {} ({})",
        layout.prior_path().display(),
        describe(store.prior_snapshot().await)
    );
    println!();

    let base = MirrorReconciler::base_path(&config.mirror.path);
    println!("Mirror:");
    println!(
        "  Path:    {} ({})",
        config.mirror.path.display(),
        presence(&config.mirror.path)
    );
    println!("  Base:    {} ({})", base.display(), presence(&base));
    println!();

    println!("Webhook:");
    match config.webhook_url() {
        Some(url) => println!("  {} (timeout {}s)", url, config.webhook.timeout_secs),
        None => println!("  NOT CONFIGURED (new entries are not delivered)"),
    }
    println!();

    println!("Pipeline:");
    println!(
        "  Reconcile without webhook: {}",
        config.pipeline.reconcile_without_remote
    );

    Ok(())
}

fn presence(path: &Path) -> &'static str {
    if path.exists() {
        "present"
    } else {
        "missing"
    }
}

fn describe(snapshot: Result<Snapshot, StoreError>) -> String {
    match snapshot {
        Ok(s) if s.is_empty() => "empty".to_string(),
        Ok(s) if s.len() == 1 => "1 record".to_string(),
        Ok(s) => format!("{} records", s.len()),
        Err(e) => format!("unreadable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsync_types::CallRecord;
    use tempfile::tempdir;

    #[tokio::test]
    async fn status_with_nothing_on_disk() {
        let dir = tempdir().unwrap();
        let config = AppConfig::default().resolve(dir.path());

        assert!(run(&config).await.is_ok());
    }

    #[test]
    fn describe_counts_records() {
        let one: Snapshot = vec![CallRecord::new("1", "+1")].into();
        let two: Snapshot = vec![CallRecord::new("1", "+1"), CallRecord::new("2", "+1")].into();

        assert_eq!(describe(Ok(Snapshot::empty())), "empty");
        assert_eq!(describe(Ok(one)), "1 record");
        assert_eq!(describe(Ok(two)), "2 records");
        assert_eq!(
            describe(Err(StoreError::Corrupt("bad".into()))),
            "unreadable: snapshot data is corrupt: bad"
        );
    }
}
