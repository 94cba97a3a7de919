// src/commands/init.rs

//! Init command - create the working directories

use anyhow::{Context, Result};
use hearth::config::Config;
use hearth::registry::Registry;
use std::fs;
use tracing::info;

/// Create every configured directory and an empty registry log
pub fn cmd_init(config: &Config) -> Result<()> {
    for dir in config.directories() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        info!("Created {}", dir.display());
    }

    Registry::new(&config.registry_dir)
        .init()
        .context("Failed to initialize install registry")?;

    println!("Initialized hearth directories");
    Ok(())
}
