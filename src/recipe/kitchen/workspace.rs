// src/recipe/kitchen/workspace.rs

//! Per-build extraction and staging directories

use crate::config::{Config, SourceRootPolicy};
use crate::error::Result;
use crate::recipe::format::Recipe;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories owned by one build of one (name, version)
///
/// Paths are derived deterministically so a rebuild reuses the same
/// locations. Nothing is removed between builds unless the configuration
/// asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Where the source archive is unpacked
    pub extract_root: PathBuf,
    /// The would-be installed tree, as if rooted at `/`
    pub staging_root: PathBuf,
}

impl Workspace {
    /// Derive the workspace for a recipe
    ///
    /// The staging root always has the recipe id as its last component, so
    /// it can never be the live `/`.
    pub fn for_recipe(config: &Config, recipe: &Recipe) -> Self {
        let id = recipe.id();
        Self {
            extract_root: config.build_root.join(&id),
            staging_root: config.staging_root.join(&id),
        }
    }

    /// Create both directories, optionally wiping previous contents first
    pub fn prepare(&self, clean: bool) -> Result<()> {
        if clean {
            for dir in [&self.extract_root, &self.staging_root] {
                if dir.exists() {
                    debug!("Cleaning {}", dir.display());
                    fs::remove_dir_all(dir)?;
                }
            }
        }

        fs::create_dir_all(&self.extract_root)?;
        fs::create_dir_all(&self.staging_root)?;
        Ok(())
    }

    /// Pick the effective source root after extraction
    pub fn source_root(&self, policy: SourceRootPolicy) -> Result<PathBuf> {
        detect_source_root(&self.extract_root, policy)
    }
}

/// Choose the effective source root inside an extraction root
///
/// Entries are considered in name order so the choice does not depend on
/// directory enumeration order.
pub fn detect_source_root(extract_root: &Path, policy: SourceRootPolicy) -> Result<PathBuf> {
    let mut entries: Vec<(PathBuf, bool)> = fs::read_dir(extract_root)?
        .filter_map(|e| e.ok())
        .map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (e.path(), is_dir)
        })
        .collect();
    entries.sort();

    let chosen = match policy {
        SourceRootPolicy::FirstEntry => entries
            .into_iter()
            .find(|(_, is_dir)| *is_dir)
            .map(|(path, _)| path),
        SourceRootPolicy::SingleDirectory => match entries.as_slice() {
            [(path, true)] => Some(path.clone()),
            _ => None,
        },
    };

    let root = chosen.unwrap_or_else(|| extract_root.to_path_buf());
    debug!("Source root: {}", root.display());
    Ok(root)
}
