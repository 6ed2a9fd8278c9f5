//! Webhook notifier.
//!
//! Posts new call-log entries as chat-style JSON messages
//! (`{"content": "..."}`). Long diffs are split so no message exceeds
//! [`MAX_MESSAGE_LEN`] characters.

use std::time::Duration;

use async_trait::async_trait;
use callsync_pipeline::{DeliveryError, Notifier};
use callsync_types::{CallRecord, DiffResult};
use serde::Serialize;
use tracing::debug;

/// Maximum characters per message.
pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Delivers diffs to an HTTP webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, diff: &DiffResult) -> Result<(), DeliveryError> {
        let messages = format_messages(diff);

        for (i, content) in messages.iter().enumerate() {
            let response = self
                .client
                .post(&self.url)
                .json(&WebhookMessage { content })
                .send()
                .await
                .map_err(|e| DeliveryError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                });
            }
            debug!(part = i + 1, parts = messages.len(), %status, "webhook accepted message");
        }

        Ok(())
    }
}

/// Render a diff as webhook messages, one line per call.
///
/// Returns no messages for an empty diff.
pub fn format_messages(diff: &DiffResult) -> Vec<String> {
    if diff.is_empty() {
        return Vec::new();
    }

    let header = match diff.len() {
        1 => "1 new call".to_string(),
        n => format!("{} new calls", n),
    };

    let mut messages = Vec::new();
    let mut current = header;
    for record in diff.new_entries() {
        let line = truncate(&format_record(record), MAX_MESSAGE_LEN);
        if current.chars().count() + 1 + line.chars().count() > MAX_MESSAGE_LEN {
            messages.push(std::mem::take(&mut current));
            current = line;
        } else {
            current.push('\n');
            current.push_str(&line);
        }
    }
    messages.push(current);
    messages
}

fn format_record(record: &CallRecord) -> String {
    let who = match &record.name {
        Some(name) => format!("{} ({})", name, record.number),
        None => record.number.clone(),
    };
    format!(
        "- {} {} at {} ({}s)",
        record.kind, who, record.timestamp, record.duration_secs
    )
}

fn truncate(line: &str, max: usize) -> String {
    line.chars().take(max).collect()
}
