// src/cli.rs
//! CLI definitions for hearth
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(version)]
#[command(about = "Source-based package builder", long_about = None)]
pub struct Cli {
    /// Configuration file (default: /etc/hearth/hearth.toml, then the user config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configured directories and an empty install registry
    Init,

    /// List every recipe under the recipe root
    ListRecipes,

    /// List registered packages (latest version of each)
    ListInstalled {
        /// Show every registration instead of the current state
        #[arg(long)]
        history: bool,
    },

    /// Build a package from its recipe
    Build {
        /// Recipe as tree/name/name-version, name-version, name, or a recipe directory
        target: String,
    },

    /// Unpack a built artifact into a root directory
    InstallPkg {
        /// Path to the artifact
        archive: PathBuf,

        /// Install root directory
        #[arg(short, long, default_value = "/")]
        root: PathBuf,
    },

    /// Rebuild every recipe in order, stopping at the first failure
    RebuildAll,
}
