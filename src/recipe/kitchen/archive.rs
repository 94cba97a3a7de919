// src/recipe/kitchen/archive.rs

//! Source extraction and patch application

use super::log::BuildLog;
use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Archive formats recognised by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarXz,
    TarGz,
    TarBz2,
    Zip,
    /// Anything else is handed to tar to figure out
    Tar,
}

impl ArchiveKind {
    /// Classify an archive by file name
    pub fn detect(filename: &str) -> Self {
        if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
            Self::TarXz
        } else if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
            Self::TarGz
        } else if filename.ends_with(".tar.bz2") {
            Self::TarBz2
        } else if filename.ends_with(".zip") {
            Self::Zip
        } else {
            Self::Tar
        }
    }

    fn command(&self, archive: &Path, dest: &Path, tools: &ToolConfig) -> Command {
        let mut cmd;
        match self {
            Self::Zip => {
                cmd = Command::new(&tools.unzip);
                cmd.arg("-q").arg("-o").arg(archive).arg("-d").arg(dest);
            }
            tar => {
                let flag = match tar {
                    Self::TarXz => "-xJf",
                    Self::TarGz => "-xzf",
                    Self::TarBz2 => "-xjf",
                    _ => "-xf",
                };
                cmd = Command::new(&tools.tar);
                cmd.arg(flag).arg(archive).arg("-C").arg(dest);
            }
        }
        cmd
    }
}

/// Extract an archive into a destination directory
pub fn extract_archive(
    archive: &Path,
    dest: &Path,
    tools: &ToolConfig,
    log: &mut BuildLog,
) -> Result<()> {
    let filename = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = ArchiveKind::detect(&filename);
    info!("Extracting {} ({:?})", filename, kind);

    let status = log
        .run("extract", &mut kind.command(archive, dest, tools))
        .map_err(|e| Error::ExtractionError(format!("could not run extractor: {}", e)))?;

    if !status.success() {
        return Err(Error::ExtractionError(format!(
            "{} exited with code {:?}, see {}",
            filename,
            status.code(),
            log.path().display()
        )));
    }

    Ok(())
}

/// Apply a single patch with strip level 1 inside `source_dir`
pub fn apply_patch(
    source_dir: &Path,
    patch_path: &Path,
    tools: &ToolConfig,
    log: &mut BuildLog,
) -> Result<()> {
    let mut cmd = Command::new(&tools.patch);
    cmd.arg("-p1").arg("-i").arg(patch_path).current_dir(source_dir);

    let phase = format!(
        "patch {}",
        patch_path.file_name().unwrap_or_default().to_string_lossy()
    );
    let status = log
        .run(&phase, &mut cmd)
        .map_err(|e| Error::PatchError(format!("could not run {}: {}", tools.patch, e)))?;

    if !status.success() {
        return Err(Error::PatchError(format!(
            "{} did not apply (exit code {:?}), see {}",
            patch_path.display(),
            status.code(),
            log.path().display()
        )));
    }

    Ok(())
}

/// Apply the recipe's patches in declared order
///
/// Stops at the first missing or failing patch. Patches applied before the
/// failure stay applied.
pub fn apply_patches(
    recipe: &Recipe,
    source_dir: &Path,
    tools: &ToolConfig,
    log: &mut BuildLog,
) -> Result<usize> {
    let patch_dir = recipe.patch_dir();

    for (applied, name) in recipe.patches.iter().enumerate() {
        let path = patch_dir.join(name);
        if !path.is_file() {
            return Err(Error::PatchError(format!(
                "patch {} not found after applying {} of {}",
                path.display(),
                applied,
                recipe.patches.len()
            )));
        }

        info!("Applying patch: {}", name);
        apply_patch(source_dir, &path, tools, log)?;
        log.line(&format!("Applied patch: {}", name));
    }

    Ok(recipe.patches.len())
}
