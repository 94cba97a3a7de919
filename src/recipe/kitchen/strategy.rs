// src/recipe/kitchen/strategy.rs

//! Build strategy resolution and privilege emulation
//!
//! Each of the prepare, build and install stages either runs the recipe's
//! hook or a default procedure. The choice is made once per stage by
//! [`BuildStrategy::resolve`] and turned into a list of [`Step`]s, which the
//! cook then runs in order inside the source root.

use crate::config::ToolConfig;
use crate::recipe::format::Recipe;
use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Stages whose behaviour a recipe may override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Prepare,
    Build,
    Install,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Build => "build",
            Self::Install => "install",
        }
    }
}

/// How a stage is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy<'r> {
    /// The recipe supplied a shell body for this stage
    RecipeHook(&'r str),
    /// Use the built-in procedure
    Default,
}

impl<'r> BuildStrategy<'r> {
    /// Resolve the strategy for one stage of a recipe
    pub fn resolve(recipe: &'r Recipe, stage: HookStage) -> Self {
        let hook = match stage {
            HookStage::Prepare => recipe.hooks.prepare.as_deref(),
            HookStage::Build => recipe.hooks.build.as_deref(),
            HookStage::Install => recipe.hooks.install.as_deref(),
        };
        hook.map_or(Self::Default, Self::RecipeHook)
    }
}

/// One external process to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Label used in logs and errors
    pub phase: String,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Step {
    pub fn new(phase: &str, program: impl Into<OsString>) -> Self {
        Self {
            phase: phase.to_string(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// A recipe hook body run by `sh -c`
    pub fn shell(phase: &str, body: &str) -> Self {
        Self::new(phase, "sh").arg("-e").arg("-c").arg(body)
    }
}

/// Paths and values bound into every step's environment
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    pub recipe: &'a Recipe,
    pub source_root: &'a Path,
    pub staging_root: &'a Path,
    pub tools: &'a ToolConfig,
}

impl StepContext<'_> {
    /// Steps for a stage under the given strategy
    pub fn steps(&self, stage: HookStage, strategy: BuildStrategy<'_>) -> Vec<Step> {
        match strategy {
            BuildStrategy::RecipeHook(body) => vec![Step::shell(stage.as_str(), body)],
            BuildStrategy::Default => match stage {
                HookStage::Prepare => Vec::new(),
                HookStage::Build => self.default_build(),
                HookStage::Install => vec![self.default_install()],
            },
        }
    }

    fn default_build(&self) -> Vec<Step> {
        let mut steps = Vec::new();

        let configure = self.source_root.join("configure");
        if is_executable(&configure) {
            steps.push(Step::new("configure", configure).args(&self.recipe.configure));
        }

        steps.push(Step::new("build", &self.tools.make).args(&self.recipe.makeflags));
        steps
    }

    fn default_install(&self) -> Step {
        let mut destdir = OsString::from("DESTDIR=");
        destdir.push(self.staging_root);

        Step::new("install", &self.tools.make)
            .args(&self.recipe.makeflags)
            .arg("install")
            .arg(destdir)
    }

    /// Build the process for a step, optionally under privilege emulation
    pub fn command(&self, step: &Step, privilege: Option<&PrivilegeMode>) -> Command {
        let mut cmd = match privilege {
            Some(PrivilegeMode::Emulated(tool)) => {
                let mut cmd = Command::new(tool);
                cmd.arg("--").arg(&step.program).args(&step.args);
                cmd
            }
            _ => {
                let mut cmd = Command::new(&step.program);
                cmd.args(&step.args);
                cmd
            }
        };

        cmd.current_dir(self.source_root)
            .env("DESTDIR", self.staging_root)
            .env("SRCDIR", self.source_root)
            .env("PKGNAME", &self.recipe.name)
            .env("PKGVERSION", &self.recipe.version)
            .env("MAKEFLAGS", self.recipe.makeflags.join(" "));
        cmd
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// How install-stage processes obtain root-like file ownership
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeMode {
    /// Already running as root
    Native,
    /// Unprivileged, wrapped in an emulation tool such as fakeroot
    Emulated(PathBuf),
    /// Unprivileged and no emulation tool; ownership changes may misbehave
    Unprivileged,
}

impl PrivilegeMode {
    /// Detect the mode for the current process
    pub fn detect(tools: &ToolConfig) -> Self {
        let is_root = nix::unistd::geteuid().is_root();
        let tool = if is_root {
            None
        } else {
            which::which(&tools.fakeroot).ok()
        };
        Self::select(is_root, tool)
    }

    /// Pure selection logic behind [`PrivilegeMode::detect`]
    pub fn select(is_root: bool, emulator: Option<PathBuf>) -> Self {
        match (is_root, emulator) {
            (true, _) => Self::Native,
            (false, Some(tool)) => Self::Emulated(tool),
            (false, None) => Self::Unprivileged,
        }
    }
}
