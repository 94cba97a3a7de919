// src/sync.rs

//! Best-effort version-control commits of recipe and artifact trees
//!
//! Callers treat every error here as a warning: a failed commit never
//! changes the outcome of a build that already succeeded.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, info};

/// What a sync attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A commit was created
    Committed,
    /// The tree had no changes
    NothingToCommit,
    /// The directory is not inside a git work tree
    NotARepository,
}

fn git(git: &str, dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new(git)
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::IoError(format!("failed to run {}: {}", git, e)))
}

/// Stage everything under `dir` and commit it with `message`
pub fn commit_tree(git_bin: &str, dir: &Path, message: &str) -> Result<SyncOutcome> {
    if !dir.is_dir() {
        return Ok(SyncOutcome::NotARepository);
    }

    let inside = git(git_bin, dir, &["rev-parse", "--is-inside-work-tree"])?;
    if !inside.status.success() {
        debug!("{} is not a git work tree", dir.display());
        return Ok(SyncOutcome::NotARepository);
    }

    let add = git(git_bin, dir, &["add", "-A", "."])?;
    if !add.status.success() {
        return Err(Error::IoError(format!(
            "git add failed in {}: {}",
            dir.display(),
            String::from_utf8_lossy(&add.stderr).trim()
        )));
    }

    let diff = git(git_bin, dir, &["diff", "--cached", "--quiet", "--", "."])?;
    if diff.status.success() {
        return Ok(SyncOutcome::NothingToCommit);
    }

    let commit = git(git_bin, dir, &["commit", "-q", "-m", message, "--", "."])?;
    if !commit.status.success() {
        return Err(Error::IoError(format!(
            "git commit failed in {}: {}",
            dir.display(),
            String::from_utf8_lossy(&commit.stderr).trim()
        )));
    }

    info!("Committed {}: {}", dir.display(), message);
    Ok(SyncOutcome::Committed)
}
