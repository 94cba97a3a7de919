// src/recipe/tree.rs

//! Recipe tree discovery
//!
//! Recipes live at `<root>/<tree>/<name>/<name-version>/recipe.toml`. The
//! tree level groups recipes (`base`, `extra`, ...) and carries no meaning
//! for the build itself.

use crate::error::{Error, Result};
use crate::recipe::format::RECIPE_FILE;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Location of one recipe within the recipe root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecipeRef {
    pub tree: String,
    pub name: String,
    /// The `<name-version>` directory name
    pub release: String,
    /// Absolute recipe directory
    pub dir: PathBuf,
}

impl fmt::Display for RecipeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tree, self.name, self.release)
    }
}

/// Find every recipe under `root`, sorted by tree, name and release
///
/// A missing root yields an empty list.
pub fn discover(root: &Path) -> Result<Vec<RecipeRef>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).min_depth(4).max_depth(4).sort_by_file_name() {
        let entry = entry?;
        if entry.file_name() != RECIPE_FILE || !entry.file_type().is_file() {
            continue;
        }

        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let components: Vec<String> = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if let [tree, name, release] = components.as_slice() {
            found.push(RecipeRef {
                tree: tree.clone(),
                name: name.clone(),
                release: release.clone(),
                dir: dir.to_path_buf(),
            });
        }
    }

    Ok(found)
}

/// Resolve a build target to a recipe directory
///
/// Accepts `tree/name/name-version`, `name-version`, or a bare `name` when
/// only one version of it exists.
pub fn resolve(root: &Path, target: &str) -> Result<RecipeRef> {
    let target = target.trim_matches('/');

    if target.matches('/').count() == 2 {
        let dir = root.join(target);
        if !dir.join(RECIPE_FILE).is_file() {
            return Err(Error::NotFound(format!("no recipe at {}", dir.display())));
        }
        let mut parts = target.split('/').map(str::to_string);
        return Ok(RecipeRef {
            tree: parts.next().unwrap_or_default(),
            name: parts.next().unwrap_or_default(),
            release: parts.next().unwrap_or_default(),
            dir,
        });
    }

    let all = discover(root)?;

    if let Some(exact) = all.iter().find(|r| r.release == target) {
        return Ok(exact.clone());
    }

    let by_name: Vec<&RecipeRef> = all.iter().filter(|r| r.name == target).collect();
    match by_name.as_slice() {
        [] => Err(Error::NotFound(format!("no recipe matches '{}'", target))),
        [single] => Ok((*single).clone()),
        several => Err(Error::InvalidRecipe(format!(
            "'{}' is ambiguous, candidates: {}",
            target,
            several
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
