// src/commands/install.rs

//! Install command - unpack a built artifact into a root

use anyhow::{Context, Result};
use hearth::artifact::install_artifact;
use std::path::Path;

pub fn cmd_install_pkg(archive: &Path, root: &Path) -> Result<()> {
    install_artifact(archive, root).with_context(|| {
        format!("Failed to install {} into {}", archive.display(), root.display())
    })?;

    println!("[COMPLETE] Installed {} into {}", archive.display(), root.display());
    Ok(())
}
