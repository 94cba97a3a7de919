// src/recipe/mod.rs

//! Recipe system for building packages from source
//!
//! Recipes define how to build a package from source, including:
//! - The source archive and its checksum
//! - Patches to apply, in order
//! - Build flags, or shell hooks replacing the default procedure
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The build description (`recipe.toml`)
//! - **Cook**: Build a package from a recipe
//! - **Kitchen**: The pipeline that runs every build stage
//!
//! # Layout
//!
//! Recipes live in named trees under the recipe root:
//!
//! ```text
//! <recipe_root>/<tree>/<name>/<name>-<version>/recipe.toml
//! <recipe_root>/<tree>/<name>/<name>-<version>/patches/*.patch
//! ```
//!
//! # Example Recipe
//!
//! ```toml
//! NAME = "hello"
//! VERSION = "2.12"
//! SOURCE_URL = "https://ftp.gnu.org/gnu/hello/hello-%(version)s.tar.gz"
//! SOURCE_SHA256 = "cf04af86dc085268c5f4470fbae49b18afbc221b78096aab842d934a76bad0ab"
//! CONFIGURE = "--prefix=/usr --disable-nls"
//! MAKEFLAGS = "-j4"
//! PATCHES = "0001-fix-tests.patch"
//! ```

mod format;
pub mod kitchen;
pub mod parser;
pub mod tree;

pub use format::{Hooks, Recipe, RecipeFile, PATCH_DIR, RECIPE_FILE};
pub use kitchen::{CookFailure, CookResult, Kitchen, Stage};
pub use parser::{load_recipe, parse_recipe, validate_recipe};
pub use tree::{discover, resolve, RecipeRef};
