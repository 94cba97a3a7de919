// src/registry/mod.rs

//! Install registry: a local record of built-and-registered packages
//!
//! The registry directory holds:
//! - `installed.log`: append-only, one `name version timestamp` line per
//!   registration. Rebuilds append again; the log is history.
//! - `<name>-<version>.manifest`: every path under the staging root at
//!   registration time, relative to it, one per line in sorted order.
//!
//! Appends take an exclusive advisory lock on the log so concurrent builds
//! never interleave partial lines. The manifest is written before the log
//! line; a crash between the two leaves a manifest without a record, which
//! a later registration of the same package overwrites.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Name of the append-only registration log
pub const LOG_FILE: &str = "installed.log";

/// One registration event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRecord {
    pub name: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl InstallRecord {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Parse a log line; malformed lines yield `None`
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        let version = fields.next()?;
        let timestamp = DateTime::parse_from_rfc3339(fields.next()?).ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
            timestamp: timestamp.with_timezone(&Utc),
        })
    }
}

impl fmt::Display for InstallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.name,
            self.version,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Handle on a registry directory
#[derive(Debug, Clone)]
pub struct Registry {
    dir: PathBuf,
}

impl Registry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the registry directory and an empty log
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| self.error("create directory", e))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .map_err(|e| self.error("create log", e))?;
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    pub fn manifest_path(&self, name: &str, version: &str) -> PathBuf {
        self.dir.join(format!("{}-{}.manifest", name, version))
    }

    fn error(&self, what: &str, e: impl fmt::Display) -> Error {
        Error::RegistrationError(format!("{} in {}: {}", what, self.dir.display(), e))
    }

    /// Record a staged package: write its manifest, then append a log line
    pub fn register(&self, name: &str, version: &str, staging_root: &Path) -> Result<InstallRecord> {
        let paths = collect_manifest(staging_root)
            .map_err(|e| self.error("scan staging root", e))?;

        fs::create_dir_all(&self.dir).map_err(|e| self.error("create directory", e))?;
        self.write_manifest(name, version, &paths)?;

        let record = InstallRecord::new(name, version);
        self.append(&record)?;

        info!(
            "Registered {}-{} ({} paths)",
            name,
            version,
            paths.len()
        );
        Ok(record)
    }

    fn write_manifest(&self, name: &str, version: &str, paths: &[String]) -> Result<()> {
        let path = self.manifest_path(name, version);
        let mut content = paths.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&path, content).map_err(|e| self.error("write manifest", e))?;
        debug!("Wrote manifest {}", path.display());
        Ok(())
    }

    fn append(&self, record: &InstallRecord) -> Result<()> {
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .map_err(|e| self.error("open log", e))?;

        log.lock_exclusive().map_err(|e| self.error("lock log", e))?;
        let written = writeln!(log, "{}", record).and_then(|_| log.flush());
        let unlocked = FileExt::unlock(&log);

        written.map_err(|e| self.error("append to log", e))?;
        if let Err(e) = unlocked {
            warn!("Failed to unlock {}: {}", self.log_path().display(), e);
        }
        Ok(())
    }

    /// Every record in log order, including repeated registrations
    pub fn history(&self) -> Result<Vec<InstallRecord>> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| self.error("read log", e))?;
        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match InstallRecord::parse_line(line) {
                Some(record) => records.push(record),
                None => warn!("{}:{}: malformed record skipped", path.display(), lineno + 1),
            }
        }
        Ok(records)
    }

    /// Current state: the latest registration of each package name
    pub fn installed(&self) -> Result<Vec<InstallRecord>> {
        let mut latest: BTreeMap<String, InstallRecord> = BTreeMap::new();
        for record in self.history()? {
            latest.insert(record.name.clone(), record);
        }
        Ok(latest.into_values().collect())
    }

    /// Paths recorded for one registered package
    pub fn manifest(&self, name: &str, version: &str) -> Result<Vec<String>> {
        let path = self.manifest_path(name, version);
        let content = fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(format!("no manifest for {}-{}", name, version)))?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Relative paths of every entry under a staging root, sorted
pub fn collect_manifest(staging_root: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(staging_root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if let Ok(relative) = entry.path().strip_prefix(staging_root) {
            paths.push(relative.to_string_lossy().into_owned());
        }
    }
    paths.sort();
    Ok(paths)
}
