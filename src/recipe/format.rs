// src/recipe/format.rs

//! Recipe file format definitions
//!
//! A recipe is a flat TOML file whose keys mirror the classic shell-recipe
//! variables. All keys are optional at the parsing layer; validation happens
//! when the file is turned into a [`Recipe`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of a recipe inside its directory
pub const RECIPE_FILE: &str = "recipe.toml";

/// Directory holding a recipe's patches, relative to the recipe directory
pub const PATCH_DIR: &str = "patches";

/// Raw recipe file contents, before validation
///
/// Every field resets to empty when absent, and unknown keys are rejected
/// so a typo in a hook name never silently falls back to the default stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RecipeFile {
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub source_sha256: String,
    pub md5: String,
    /// Whitespace-separated arguments for `./configure`
    pub configure: String,
    /// Whitespace-separated flags for the build tool
    pub makeflags: String,
    /// Whitespace-separated patch names, applied in order
    pub patches: String,
    /// Shell body replacing the (empty) default prepare stage
    pub prepare: Option<String>,
    /// Shell body replacing the default configure + make
    pub build: Option<String>,
    /// Shell body replacing the default `make install`
    pub install: Option<String>,
}

/// Optional recipe-supplied stage procedures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hooks {
    pub prepare: Option<String>,
    pub build: Option<String>,
    pub install: Option<String>,
}

/// A validated, immutable recipe
///
/// Identified by (name, version). Constructed only through the loader, and
/// passed by reference to every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub source_sha256: Option<String>,
    pub md5: Option<String>,
    pub configure: Vec<String>,
    pub makeflags: Vec<String>,
    pub patches: Vec<String>,
    pub hooks: Hooks,
    /// Directory the recipe was loaded from
    pub dir: PathBuf,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

impl Recipe {
    pub(crate) fn from_file(file: RecipeFile, dir: &Path) -> Self {
        Self {
            name: file.name.trim().to_string(),
            version: file.version.trim().to_string(),
            source_url: file.source_url.trim().to_string(),
            source_sha256: non_empty(file.source_sha256),
            md5: non_empty(file.md5),
            configure: words(&file.configure),
            makeflags: words(&file.makeflags),
            patches: words(&file.patches),
            hooks: Hooks {
                prepare: file.prepare,
                build: file.build,
                install: file.install,
            },
            dir: dir.to_path_buf(),
        }
    }

    /// `<name>-<version>`, the identity used for workspaces, logs and artifacts
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Substitute `%(name)s` and `%(version)s` in a string
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("%(name)s", &self.name)
            .replace("%(version)s", &self.version)
    }

    /// Source URL with variables substituted
    pub fn archive_url(&self) -> String {
        self.substitute(&self.source_url)
    }

    /// Archive file name taken from the last URL segment
    pub fn archive_filename(&self) -> String {
        let url = self.archive_url();
        let path = url.split(['?', '#']).next().unwrap_or("");
        match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}.tar.gz", self.id()),
        }
    }

    /// Directory holding this recipe's patches
    pub fn patch_dir(&self) -> PathBuf {
        self.dir.join(PATCH_DIR)
    }
}
