// src/recipe/kitchen/stage.rs

//! Pipeline stages and build outcomes

use crate::error::Error;
use std::fmt;
use std::path::PathBuf;

/// States of the build pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    LoadRecipe,
    Fetch,
    VerifyChecksum,
    Extract,
    ApplyPatches,
    Prepare,
    Build,
    Install,
    Package,
    Register,
    SyncRecipes,
    SyncArtifacts,
}

impl Stage {
    /// Every stage in the order the pipeline runs them
    pub const ALL: [Stage; 12] = [
        Stage::LoadRecipe,
        Stage::Fetch,
        Stage::VerifyChecksum,
        Stage::Extract,
        Stage::ApplyPatches,
        Stage::Prepare,
        Stage::Build,
        Stage::Install,
        Stage::Package,
        Stage::Register,
        Stage::SyncRecipes,
        Stage::SyncArtifacts,
    ];

    /// Advisory stages never fail the pipeline
    pub fn is_advisory(&self) -> bool {
        matches!(self, Stage::SyncRecipes | Stage::SyncArtifacts)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::LoadRecipe => "load-recipe",
            Stage::Fetch => "fetch",
            Stage::VerifyChecksum => "verify-checksum",
            Stage::Extract => "extract",
            Stage::ApplyPatches => "apply-patches",
            Stage::Prepare => "prepare",
            Stage::Build => "build",
            Stage::Install => "install",
            Stage::Package => "package",
            Stage::Register => "register",
            Stage::SyncRecipes => "sync-recipes",
            Stage::SyncArtifacts => "sync-artifacts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful build
#[derive(Debug)]
pub struct CookResult {
    pub name: String,
    pub version: String,
    /// The produced artifact
    pub artifact: PathBuf,
    /// Per-package build log
    pub log: PathBuf,
    /// Stages that ran, in order
    pub completed: Vec<Stage>,
    /// Soft failures: unverified sources, sync errors, missing emulation
    pub warnings: Vec<String>,
}

/// A build that stopped at `stage`
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {error}")]
pub struct CookFailure {
    pub stage: Stage,
    #[source]
    pub error: Error,
    /// Stages that completed before the failure
    pub completed: Vec<Stage>,
}

impl CookFailure {
    pub fn new(stage: Stage, error: Error, completed: Vec<Stage>) -> Self {
        Self {
            stage,
            error,
            completed,
        }
    }
}
