// src/recipe/kitchen/log.rs

//! Per-package build log
//!
//! Output of every external process run for a build is appended to one log
//! file, `<log_dir>/<name>-<version>.log`, with a header per phase. The file
//! is truncated when a new build of the same package starts.

use crate::progress::run_with_spinner;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Log sink for one build, also responsible for running its processes
#[derive(Debug)]
pub struct BuildLog {
    path: PathBuf,
    file: File,
    interactive: bool,
}

impl BuildLog {
    /// Create (or truncate) the log at `path`
    pub fn create(path: &Path, interactive: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            interactive,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single line; a failing write only produces a warning
    pub fn line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{}", line) {
            warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }

    /// Run a process with stdout/stderr redirected into the log
    ///
    /// Blocks until the process exits. Spawn failures (missing binary,
    /// bad working directory) are returned as I/O errors; a non-zero exit is
    /// returned as a status for the caller to classify.
    pub fn run(&mut self, phase: &str, cmd: &mut Command) -> io::Result<ExitStatus> {
        self.line(&format!("=== {} ===", phase));
        self.line(&format!("$ {}", describe(cmd)));
        debug!("Running {} phase: {}", phase, describe(cmd));

        let stdout = self.file.try_clone()?;
        let stderr = self.file.try_clone()?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        let status = run_with_spinner(phase, self.interactive, || cmd.status());

        match &status {
            Ok(s) => self.line(&format!("=== {} finished: {} ===", phase, s)),
            Err(e) => self.line(&format!("=== {} could not start: {} ===", phase, e)),
        }
        status
    }
}

/// Render a command line for logs
pub fn describe(cmd: &Command) -> String {
    let mut out = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        out.push(' ');
        out.push_str(&arg.to_string_lossy());
    }
    out
}
