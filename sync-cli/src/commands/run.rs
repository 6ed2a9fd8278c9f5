//! Execute one pipeline run.

use anyhow::{Context, Result};
use callsync_pipeline::{LifecycleObserver, LifecycleState, RunResult, SyncLifecycle};
use callsync_store::{FileSnapshotStore, MirrorReconciler};
use std::process::ExitCode;

use crate::config::AppConfig;
use crate::webhook::WebhookNotifier;

/// Prints each state as the run enters it.
#[derive(Debug, Default)]
struct ConsoleObserver {
    step: usize,
}

impl LifecycleObserver for ConsoleObserver {
    fn on_transition(&mut self, state: LifecycleState) {
        self.step += 1;
        println!("  [{}] {}", self.step, state);
    }

    fn on_complete(&mut self, _result: &RunResult) {}
}

/// Run the run command.
pub async fn run(config: &AppConfig) -> Result<ExitCode> {
    let result = execute(config).await?;

    if let Some(warning) = &result.delivery_error {
        println!("Warning: {}", warning);
    }
    if let Some(outcome) = result.sync_outcome {
        println!("Mirror: {}", outcome);
    }
    println!("{}", result.summary());

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Build the collaborators from `config` and drive one run to completion.
pub async fn execute(config: &AppConfig) -> Result<RunResult> {
    let store = FileSnapshotStore::new(&config.store.source, config.layout());
    let lifecycle = SyncLifecycle::new(
        store,
        webhook_notifier(config)?,
        MirrorReconciler::new(),
        config.lifecycle_config(),
    );

    let handle = lifecycle.perform_fetch()?;
    println!("Sync run {}", handle.run_id());

    let mut observer = ConsoleObserver::default();
    Ok(handle.drive(&mut observer).await)
}

/// The webhook notifier, if a webhook URL is configured.
fn webhook_notifier(config: &AppConfig) -> Result<Option<WebhookNotifier>> {
    config
        .webhook_url()
        .map(|url| WebhookNotifier::new(url, config.webhook.timeout()))
        .transpose()
        .context("Failed to build webhook client")
}
