//! Configuration loading for callsync.
//!
//! Configuration is loaded from a TOML file (default: `callsync.toml`).
//! Every section is optional. Relative paths are resolved against the
//! directory holding the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use callsync_pipeline::LifecycleConfig;
use callsync_store::DataLayout;
use serde::Deserialize;

/// Written by `callsync init`.
pub const DEFAULT_CONFIG: &str = r#"# callsync configuration

[store]
# Exported call-log records (JSON array)
source = "call_log.json"
# Holds calls.json and calls.prev.json
data_dir = "callsync-data"

[mirror]
path = "callsync-mirror/calls.json"

[webhook]
# Leave empty to skip delivery
url = ""
timeout_secs = 10

[pipeline]
# Sync the mirror after new entries even when no webhook is set
reconcile_without_remote = false

[logging]
# Overridden by RUST_LOG
filter = "info"
"#;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Snapshot storage.
    #[serde(default)]
    pub store: StoreConfig,
    /// Mirror copy.
    #[serde(default)]
    pub mirror: MirrorConfig,
    /// Remote delivery.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    /// Exported call log (default: call_log.json).
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Directory holding the snapshots (default: callsync-data).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Mirror configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MirrorConfig {
    /// Mirror of the current snapshot (default: callsync-mirror/calls.json).
    #[serde(default = "default_mirror_path")]
    pub path: PathBuf,
}

/// Webhook configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving new entries. Empty disables delivery.
    #[serde(default)]
    pub url: String,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Reconcile after new entries even without a webhook (default: false).
    #[serde(default)]
    pub reconcile_without_remote: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive (default: info).
    #[serde(default = "default_filter")]
    pub filter: String,
}

// Default value functions
fn default_source() -> PathBuf {
    PathBuf::from("call_log.json")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("callsync-data")
}

fn default_mirror_path() -> PathBuf {
    PathBuf::from("callsync-mirror/calls.json")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            path: default_mirror_path(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl WebhookConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// webhook URL is not an http(s) URL.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve(base))
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.webhook.url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidWebhook(url.to_string()));
        }
        Ok(())
    }

    /// Resolve relative paths against `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        for path in [
            &mut self.store.source,
            &mut self.store.data_dir,
            &mut self.mirror.path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// The webhook URL, if delivery is enabled.
    pub fn webhook_url(&self) -> Option<&str> {
        let url = self.webhook.url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Snapshot paths.
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.store.data_dir)
    }

    /// What the lifecycle needs from this configuration.
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let primary = self.layout().current_path();
        LifecycleConfig::new(&primary.to_string_lossy(), &self.mirror.path.to_string_lossy())
            .with_remote_target(self.webhook_url().is_some())
            .with_reconcile_without_remote(self.pipeline.reconcile_without_remote)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Webhook URL is neither http nor https.
    #[error("webhook url must start with http:// or https://, got {0:?}")]
    InvalidWebhook(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.store.source, PathBuf::from("call_log.json"));
        assert_eq!(config.webhook.timeout(), Duration::from_secs(10));
        assert_eq!(config.webhook_url(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn template_matches_defaults() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[store]
source = "/exports/calls.json"
data_dir = "/var/lib/callsync"

[mirror]
path = "/backup/calls.json"

[webhook]
url = "https://hooks.example.com/abc"
timeout_secs = 3

[pipeline]
reconcile_without_remote = true

[logging]
filter = "callsync=debug"
"#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.store.data_dir, PathBuf::from("/var/lib/callsync"));
        assert_eq!(config.webhook_url(), Some("https://hooks.example.com/abc"));
        assert_eq!(config.webhook.timeout_secs, 3);
        assert!(config.pipeline.reconcile_without_remote);
        assert_eq!(config.logging.filter, "callsync=debug");
    }

    #[test]
    fn config_missing_sections_use_defaults() {
        let config: AppConfig = toml::from_str("[webhook]\nurl = \"http://localhost\"\n").unwrap();
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.webhook.timeout_secs, 10);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn webhook_must_be_http() {
        let mut config = AppConfig::default();
        config.webhook.url = "ftp://example.com".into();

        assert!(matches!(config.validate(), Err(ConfigError::InvalidWebhook(_))));
    }

    #[test]
    fn blank_webhook_is_disabled() {
        let mut config = AppConfig::default();
        config.webhook.url = "   ".into();

        assert!(config.validate().is_ok());
        assert_eq!(config.webhook_url(), None);
        assert!(!config.lifecycle_config().has_remote_target());
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("callsync.toml");
        std::fs::write(&path, "[mirror]\npath = \"/abs/calls.json\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.store.source, dir.path().join("call_log.json"));
        assert_eq!(config.store.data_dir, dir.path().join("callsync-data"));
        assert_eq!(config.mirror.path, PathBuf::from("/abs/calls.json"));
    }

    #[test]
    fn lifecycle_config_points_primary_at_current_snapshot() {
        let mut config = AppConfig::default().resolve(Path::new("/srv"));
        config.webhook.url = "https://hooks.example.com".into();

        let lifecycle = config.lifecycle_config();

        assert!(lifecycle.has_remote_target());
        assert_eq!(lifecycle.primary.as_str(), "/srv/callsync-data/calls.json");
        assert_eq!(lifecycle.mirror.as_str(), "/srv/callsync-mirror/calls.json");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let result = AppConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("callsync.toml");
        std::fs::write(&path, "[store\n").unwrap();

        let result = AppConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
