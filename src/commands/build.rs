// src/commands/build.rs

//! Build commands - cook one recipe or rebuild the whole tree

use anyhow::{Context, Result};
use hearth::config::Config;
use hearth::recipe::{resolve, CookFailure, CookResult, Kitchen, RECIPE_FILE};
use std::path::PathBuf;
use tracing::info;

/// Build one recipe and print the artifact path
///
/// `target` is either a recipe directory or a name understood by
/// [`resolve`].
pub fn cmd_build(config: Config, target: &str) -> Result<()> {
    let direct = PathBuf::from(target);
    let recipe_dir = if direct.join(RECIPE_FILE).is_file() {
        direct
    } else {
        resolve(&config.recipe_root, target)
            .with_context(|| format!("Failed to find recipe '{}'", target))?
            .dir
    };

    info!("Building from {}", recipe_dir.display());
    let kitchen = Kitchen::new(config);
    let result = kitchen.cook(&recipe_dir).map_err(report)?;

    summarize(&result);
    println!("{}", result.artifact.display());
    Ok(())
}

/// Rebuild every recipe, printing each artifact path
pub fn cmd_rebuild_all(config: Config) -> Result<()> {
    let kitchen = Kitchen::new(config);
    let results = kitchen.cook_all().map_err(report)?;

    for result in &results {
        summarize(result);
        println!("{}", result.artifact.display());
    }
    eprintln!("[COMPLETE] Rebuilt {} package(s)", results.len());
    Ok(())
}

fn summarize(result: &CookResult) {
    for warning in &result.warnings {
        eprintln!("[WARN] {}", warning);
    }
    eprintln!(
        "[COMPLETE] Cooked {}-{} (log: {})",
        result.name,
        result.version,
        result.log.display()
    );
}

fn report(failure: CookFailure) -> anyhow::Error {
    eprintln!("[FAILED] {} stage", failure.stage);
    anyhow::Error::new(failure)
}
