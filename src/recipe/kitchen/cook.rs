// src/recipe/kitchen/cook.rs

//! A single build in progress
//!
//! A [`Cook`] owns everything one pipeline run touches: the recipe, its
//! workspace, the per-package log and the facts established by earlier
//! stages. The [`Kitchen`](super::Kitchen) drives it one [`Stage`] at a time.

use super::archive::{apply_patches, extract_archive};
use super::log::BuildLog;
use super::source::{fetch_source, verify_checksum, Verification};
use super::stage::Stage;
use super::strategy::{BuildStrategy, HookStage, PrivilegeMode, StepContext};
use super::workspace::Workspace;
use crate::artifact::{create_artifact, Ownership};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::registry::Registry;
use crate::sync::{commit_tree, SyncOutcome};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// State of one build of one recipe
pub struct Cook<'a> {
    config: &'a Config,
    recipe: &'a Recipe,
    workspace: Workspace,
    log: BuildLog,
    /// Cached source archive
    archive: PathBuf,
    /// Effective source root, known after extraction
    source_root: Option<PathBuf>,
    privilege: Option<PrivilegeMode>,
    artifact: Option<PathBuf>,
    warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    /// Start a build: derive the workspace and open a fresh log
    pub fn new(config: &'a Config, recipe: &'a Recipe) -> Result<Self> {
        let log_path = config.log_dir.join(format!("{}.log", recipe.id()));
        let mut log = BuildLog::create(&log_path, config.interactive).map_err(|e| {
            Error::IoError(format!("cannot open build log {}: {}", log_path.display(), e))
        })?;
        log.line(&format!("Building {} from {}", recipe.id(), recipe.dir.display()));

        Ok(Self {
            config,
            recipe,
            workspace: Workspace::for_recipe(config, recipe),
            log,
            archive: config.source_cache.join(recipe.archive_filename()),
            source_root: None,
            privilege: None,
            artifact: None,
            warnings: Vec::new(),
        })
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run one stage
    pub fn run(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::LoadRecipe => Ok(()),
            Stage::Fetch => self.fetch(),
            Stage::VerifyChecksum => self.verify(),
            Stage::Extract => self.extract(),
            Stage::ApplyPatches => self.patch(),
            Stage::Prepare => self.execute(HookStage::Prepare),
            Stage::Build => self.execute(HookStage::Build),
            Stage::Install => self.execute(HookStage::Install),
            Stage::Package => self.package(),
            Stage::Register => self.register(),
            Stage::SyncRecipes => {
                let config = self.config;
                self.sync("recipes", &config.recipe_root)
            }
            Stage::SyncArtifacts => {
                let config = self.config;
                self.sync("artifacts", &config.artifact_dir)
            }
        }
    }

    /// Record a failure in the build log
    pub fn record_failure(&mut self, stage: Stage, error: &Error) {
        self.log.line(&format!("!!! {} failed: {}", stage, error));
    }

    /// Consume the cook, yielding the artifact and accumulated warnings
    pub fn finish(self) -> (Option<PathBuf>, Vec<String>, PathBuf) {
        (self.artifact, self.warnings, self.log.path().to_path_buf())
    }

    /// Record a warning in the tracing output, the build log and the result
    pub fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.log.line(&format!("warning: {}", message));
        self.warnings.push(message);
    }

    fn fetch(&mut self) -> Result<()> {
        let url = self.recipe.archive_url();
        fetch_source(&url, &self.archive, &self.config.tools, &mut self.log)
    }

    fn verify(&mut self) -> Result<()> {
        let verification = verify_checksum(
            &self.archive,
            self.recipe.source_sha256.as_deref(),
            self.recipe.md5.as_deref(),
        )?;

        match verification {
            Verification::Verified(algorithm) => {
                self.log.line(&format!("{} checksum verified", algorithm));
            }
            Verification::Unverified => {
                self.warn(format!("{}: no checksum declared, source unverified", self.recipe.id()));
            }
        }
        Ok(())
    }

    fn extract(&mut self) -> Result<()> {
        self.workspace
            .prepare(self.config.clean_workspace)
            .map_err(|e| Error::ExtractionError(format!("cannot prepare workspace: {}", e)))?;

        extract_archive(
            &self.archive,
            &self.workspace.extract_root,
            &self.config.tools,
            &mut self.log,
        )?;

        let root = self
            .workspace
            .source_root(self.config.source_root_policy)
            .map_err(|e| Error::ExtractionError(format!("cannot locate source root: {}", e)))?;
        self.log.line(&format!("Source root: {}", root.display()));
        self.source_root = Some(root);
        Ok(())
    }

    fn source_root(&self) -> Result<&Path> {
        self.source_root
            .as_deref()
            .ok_or_else(|| Error::IoError("source root used before extraction".to_string()))
    }

    fn patch(&mut self) -> Result<()> {
        if self.recipe.patches.is_empty() {
            debug!("No patches for {}", self.recipe.id());
            return Ok(());
        }

        let source_root = self.source_root()?.to_path_buf();
        let applied = apply_patches(self.recipe, &source_root, &self.config.tools, &mut self.log)?;
        info!("Applied {} patch(es)", applied);
        Ok(())
    }

    /// Run the prepare, build or install stage
    fn execute(&mut self, stage: HookStage) -> Result<()> {
        let source_root = self.source_root()?.to_path_buf();

        // Only the install stage runs under privilege emulation
        let privilege = if stage == HookStage::Install {
            Some(self.privilege_mode())
        } else {
            None
        };

        let ctx = StepContext {
            recipe: self.recipe,
            source_root: &source_root,
            staging_root: &self.workspace.staging_root,
            tools: &self.config.tools,
        };

        let strategy = BuildStrategy::resolve(self.recipe, stage);
        let steps = ctx.steps(stage, strategy);
        if steps.is_empty() {
            debug!("Nothing to do for {} stage", stage.as_str());
            return Ok(());
        }

        if let BuildStrategy::RecipeHook(_) = strategy {
            info!("Running recipe {} hook", stage.as_str());
        }

        for step in &steps {
            let mut cmd = ctx.command(step, privilege.as_ref());
            let status = self.log.run(&step.phase, &mut cmd);

            let code = match status {
                Ok(status) if status.success() => continue,
                Ok(status) => status.code(),
                Err(e) => {
                    self.log.line(&format!("could not start {}: {}", step.phase, e));
                    None
                }
            };

            let log = self.log.path().to_path_buf();
            return Err(match stage {
                HookStage::Install => Error::InstallError { code, log },
                _ => Error::BuildError {
                    phase: step.phase.clone(),
                    code,
                    log,
                },
            });
        }

        Ok(())
    }

    fn privilege_mode(&mut self) -> PrivilegeMode {
        if let Some(mode) = &self.privilege {
            return mode.clone();
        }

        let mode = PrivilegeMode::detect(&self.config.tools);
        match &mode {
            PrivilegeMode::Native => debug!("Installing as root"),
            PrivilegeMode::Emulated(tool) => {
                info!("Installing under {}", tool.display());
            }
            PrivilegeMode::Unprivileged => self.warn(format!(
                "{}: install ran without privilege emulation ({} not found)",
                self.recipe.id(),
                self.config.tools.fakeroot
            )),
        }
        self.privilege = Some(mode.clone());
        mode
    }

    fn package(&mut self) -> Result<()> {
        // Ownership faked during install is gone once the install process exits
        let ownership = match self.privilege {
            Some(PrivilegeMode::Native) | None => Ownership::Preserve,
            Some(_) => Ownership::Root,
        };

        let artifact = create_artifact(
            &self.workspace.staging_root,
            &self.config.artifact_dir,
            &self.recipe.name,
            &self.recipe.version,
            self.config.compression(),
            ownership,
        )?;
        self.log.line(&format!("Artifact: {}", artifact.display()));
        self.artifact = Some(artifact);
        Ok(())
    }

    fn register(&mut self) -> Result<()> {
        let record = Registry::new(&self.config.registry_dir).register(
            &self.recipe.name,
            &self.recipe.version,
            &self.workspace.staging_root,
        )?;
        self.log.line(&format!("Registered: {}", record));
        Ok(())
    }

    /// Commit a tree to version control when auto-commit is enabled
    fn sync(&mut self, what: &str, dir: &Path) -> Result<()> {
        let sync = &self.config.sync;
        if !sync.auto_commit {
            debug!("Sync of {} disabled", what);
            return Ok(());
        }

        let message = format!("{} {}", sync.message_prefix, self.recipe.id());
        match commit_tree(&self.config.tools.git, dir, &message)? {
            SyncOutcome::Committed => self.log.line(&format!("Committed {}", what)),
            SyncOutcome::NothingToCommit => debug!("No {} changes to commit", what),
            SyncOutcome::NotARepository => debug!("{} is not under version control", dir.display()),
        }
        Ok(())
    }
}
