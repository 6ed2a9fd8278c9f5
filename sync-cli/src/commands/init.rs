//! Write a default configuration file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::DEFAULT_CONFIG;

/// Run the init command.
pub async fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create config directory")?;
    }
    tokio::fs::write(config_path, DEFAULT_CONFIG)
        .await
        .context("Failed to write config file")?;

    println!("Config written to {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Export the call log to the [store] source path");
    println!("  2. Optionally set [webhook] url");
    println!("  3. Run a sync: callsync run");

    Ok(())
}
