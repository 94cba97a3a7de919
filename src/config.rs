// src/config.rs

//! Configuration for the build orchestrator
//!
//! Every directory root, tool binary name and policy knob can be overridden
//! from a TOML file. Unset keys keep their defaults, so a config file only
//! needs to list what differs from a stock system:
//!
//! ```toml
//! recipe_root = "/srv/recipes"
//! compressor = "gzip"
//!
//! [tools]
//! make = "gmake"
//!
//! [sync]
//! auto_commit = true
//! message_prefix = "[autobuild]"
//! ```

use crate::compression::CompressionFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// System-wide configuration file location
pub const SYSTEM_CONFIG_PATH: &str = "/etc/hearth/hearth.toml";

/// How the effective source root is chosen among extracted entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceRootPolicy {
    /// First top-level entry in name order, else the extraction root
    #[default]
    FirstEntry,
    /// Only a lone top-level directory qualifies, else the extraction root
    SingleDirectory,
}

/// External tool binary names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub curl: String,
    pub wget: String,
    pub tar: String,
    pub unzip: String,
    pub patch: String,
    pub make: String,
    pub fakeroot: String,
    pub git: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            curl: "curl".to_string(),
            wget: "wget".to_string(),
            tar: "tar".to_string(),
            unzip: "unzip".to_string(),
            patch: "patch".to_string(),
            make: "make".to_string(),
            fakeroot: "fakeroot".to_string(),
            git: "git".to_string(),
        }
    }
}

/// Version-control auto-commit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Commit recipe and artifact trees after a successful build
    pub auto_commit: bool,
    /// Prefix for generated commit messages
    pub message_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_commit: false,
            message_prefix: "[hearth]".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root holding `<tree>/<name>/<name-version>/recipe.toml`
    pub recipe_root: PathBuf,
    /// Downloaded source archives
    pub source_cache: PathBuf,
    /// Per-build extraction roots
    pub build_root: PathBuf,
    /// Per-build staging roots
    pub staging_root: PathBuf,
    /// Shared artifact output directory
    pub artifact_dir: PathBuf,
    /// Per-package build logs
    pub log_dir: PathBuf,
    /// Install registry (log plus manifests)
    pub registry_dir: PathBuf,
    /// Artifact compressor: "xz" or "gzip"
    pub compressor: String,
    pub source_root_policy: SourceRootPolicy,
    /// Remove extraction and staging roots before each build
    pub clean_workspace: bool,
    /// Drive spinners on the terminal while external tools run
    pub interactive: bool,
    pub tools: ToolConfig,
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recipe_root: PathBuf::from("/var/lib/hearth/recipes"),
            source_cache: PathBuf::from("/var/cache/hearth/sources"),
            build_root: PathBuf::from("/var/tmp/hearth/build"),
            staging_root: PathBuf::from("/var/tmp/hearth/staging"),
            artifact_dir: PathBuf::from("/var/cache/hearth/packages"),
            log_dir: PathBuf::from("/var/log/hearth"),
            registry_dir: PathBuf::from("/var/lib/hearth/installed"),
            compressor: "xz".to_string(),
            source_root_policy: SourceRootPolicy::default(),
            clean_workspace: false,
            interactive: true,
            tools: ToolConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load configuration, searching the standard locations
    ///
    /// An explicit path must exist. Without one, the system file is tried,
    /// then the user's config directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("hearth/hearth.toml"));
        }

        for path in candidates {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Configuration with every root placed under one base directory
    ///
    /// Used for unprivileged trial runs and tests.
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            recipe_root: base.join("recipes"),
            source_cache: base.join("sources"),
            build_root: base.join("build"),
            staging_root: base.join("staging"),
            artifact_dir: base.join("packages"),
            log_dir: base.join("logs"),
            registry_dir: base.join("installed"),
            ..Self::default()
        }
    }

    /// Resolve the configured compressor
    ///
    /// Unrecognized values fall back to gzip.
    pub fn compression(&self) -> CompressionFormat {
        match CompressionFormat::from_name(&self.compressor) {
            Some(format @ (CompressionFormat::Xz | CompressionFormat::Gzip)) => format,
            _ => {
                warn!(
                    "Unknown compressor '{}', falling back to gzip",
                    self.compressor
                );
                CompressionFormat::Gzip
            }
        }
    }

    /// Every directory `init` should create
    pub fn directories(&self) -> [&Path; 7] {
        [
            &self.recipe_root,
            &self.source_cache,
            &self.build_root,
            &self.staging_root,
            &self.artifact_dir,
            &self.log_dir,
            &self.registry_dir,
        ]
    }
}
