// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::format::{Recipe, RecipeFile, RECIPE_FILE};
use std::path::Path;
use tracing::{debug, warn};

/// Parse a recipe from TOML text
///
/// `dir` is the directory the recipe belongs to; patches are resolved
/// relative to it.
pub fn parse_recipe(content: &str, dir: &Path) -> Result<Recipe> {
    let file: RecipeFile = toml::from_str(content)
        .map_err(|e| Error::InvalidRecipe(format!("{}: {}", dir.display(), e)))?;

    let recipe = Recipe::from_file(file, dir);
    validate_recipe(&recipe)?;
    Ok(recipe)
}

/// Load the recipe stored in a recipe directory
pub fn load_recipe(dir: &Path) -> Result<Recipe> {
    let path = dir.join(RECIPE_FILE);
    debug!("Loading recipe {}", path.display());

    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidRecipe(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_recipe(&content, dir)
}

/// Validate a recipe for completeness
///
/// Name and version are mandatory. A missing source URL or checksum is
/// tolerated here and reported by the stages that need them.
pub fn validate_recipe(recipe: &Recipe) -> Result<()> {
    if recipe.name.is_empty() {
        return Err(Error::InvalidRecipe(format!(
            "{}: NAME cannot be empty",
            recipe.dir.display()
        )));
    }
    if recipe.version.is_empty() {
        return Err(Error::InvalidRecipe(format!(
            "{}: VERSION cannot be empty",
            recipe.dir.display()
        )));
    }
    // Both end up in file names and in whitespace-separated registry records
    for (key, value) in [("NAME", &recipe.name), ("VERSION", &recipe.version)] {
        if value
            .chars()
            .any(|c| c == '/' || c.is_whitespace() || c.is_control())
        {
            return Err(Error::InvalidRecipe(format!(
                "{}: {} '{}' must not contain '/', whitespace or control characters",
                recipe.dir.display(),
                key,
                value.escape_default()
            )));
        }
    }

    for patch in &recipe.patches {
        if Path::new(patch).is_absolute() || patch.split('/').any(|c| c == "..") {
            return Err(Error::InvalidRecipe(format!(
                "patch '{}' must be relative to the patch directory",
                patch
            )));
        }
    }

    if recipe.source_url.is_empty() {
        warn!("{}: no SOURCE_URL declared", recipe.id());
    }

    Ok(())
}
