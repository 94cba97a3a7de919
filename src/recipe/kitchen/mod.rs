// src/recipe/kitchen/mod.rs

//! Kitchen: the build pipeline for recipes
//!
//! Cooking a recipe walks a fixed sequence of stages:
//! - Fetch and verify the source archive
//! - Extract it into a per-build workspace and apply patches
//! - Run prepare, build and install (recipe hooks or defaults)
//! - Package the staging root and record it in the install registry
//! - Optionally commit the recipe and artifact trees
//!
//! The first failing stage ends the build. Sync stages are advisory and
//! never fail it.

mod archive;
mod cook;
mod log;
mod source;
mod stage;
mod strategy;
mod workspace;

pub use archive::{apply_patch, apply_patches, extract_archive, ArchiveKind};
pub use cook::Cook;
pub use log::BuildLog;
pub use source::{fetch_source, verify_checksum, Downloader, Verification};
pub use stage::{CookFailure, CookResult, Stage};
pub use strategy::{BuildStrategy, HookStage, PrivilegeMode, Step, StepContext};
pub use workspace::{detect_source_root, Workspace};

use crate::config::Config;
use crate::error::Error;
use crate::recipe::format::Recipe;
use crate::recipe::parser::load_recipe;
use crate::recipe::tree::discover;
use std::path::Path;
use tracing::{error, info};

/// The Kitchen: where recipes are cooked
#[derive(Debug, Clone)]
pub struct Kitchen {
    config: Config,
}

impl Kitchen {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the recipe in `recipe_dir` and cook it
    pub fn cook(&self, recipe_dir: &Path) -> Result<CookResult, CookFailure> {
        let recipe = load_recipe(recipe_dir)
            .map_err(|e| CookFailure::new(Stage::LoadRecipe, e, Vec::new()))?;
        self.cook_recipe(&recipe)
    }

    /// Cook an already loaded recipe
    pub fn cook_recipe(&self, recipe: &Recipe) -> Result<CookResult, CookFailure> {
        info!("Cooking {} version {}", recipe.name, recipe.version);

        let mut cook = Cook::new(&self.config, recipe)
            .map_err(|e| CookFailure::new(Stage::LoadRecipe, e, Vec::new()))?;
        let mut completed = vec![Stage::LoadRecipe];

        for stage in Stage::ALL.into_iter().skip(1) {
            info!("[{}] {}", recipe.id(), stage);
            if let Err(e) = cook.run(stage) {
                if stage.is_advisory() {
                    cook.warn(format!("{} stage failed: {}", stage, e));
                    completed.push(stage);
                    continue;
                }
                error!("{} failed at {} stage: {}", recipe.id(), stage, e);
                cook.record_failure(stage, &e);
                return Err(CookFailure::new(stage, e, completed));
            }
            completed.push(stage);
        }

        let (artifact, warnings, log) = cook.finish();
        let artifact = artifact.ok_or_else(|| {
            CookFailure::new(
                Stage::Package,
                Error::PackagingError("no artifact was produced".to_string()),
                completed.clone(),
            )
        })?;

        info!("Cooked {} -> {}", recipe.id(), artifact.display());
        Ok(CookResult {
            name: recipe.name.clone(),
            version: recipe.version.clone(),
            artifact,
            log,
            completed,
            warnings,
        })
    }

    /// Rebuild every recipe under the recipe root, in order
    ///
    /// Stops at the first failure; builds that already succeeded keep their
    /// artifacts and registry records.
    pub fn cook_all(&self) -> Result<Vec<CookResult>, CookFailure> {
        let recipes = discover(&self.config.recipe_root)
            .map_err(|e| CookFailure::new(Stage::LoadRecipe, e, Vec::new()))?;

        let mut results = Vec::with_capacity(recipes.len());
        for (index, recipe) in recipes.iter().enumerate() {
            info!("Cooking {}/{}: {}", index + 1, recipes.len(), recipe);
            results.push(self.cook(&recipe.dir)?);
        }

        Ok(results)
    }
}
