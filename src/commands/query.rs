// src/commands/query.rs

//! Query commands - list recipes and registered packages

use anyhow::{Context, Result};
use hearth::config::Config;
use hearth::recipe::discover;
use hearth::registry::Registry;

/// Print every recipe as `tree/name/name-version`
pub fn cmd_list_recipes(config: &Config) -> Result<()> {
    let recipes = discover(&config.recipe_root).with_context(|| {
        format!("Failed to scan recipes in {}", config.recipe_root.display())
    })?;

    if recipes.is_empty() {
        eprintln!("No recipes found in {}", config.recipe_root.display());
    }
    for recipe in recipes {
        println!("{}", recipe);
    }
    Ok(())
}

/// Print registered packages, or the full registration history
pub fn cmd_list_installed(config: &Config, history: bool) -> Result<()> {
    let registry = Registry::new(&config.registry_dir);
    let records = if history {
        registry.history()
    } else {
        registry.installed()
    }
    .context("Failed to read install registry")?;

    for record in records {
        println!("{}", record);
    }
    Ok(())
}
