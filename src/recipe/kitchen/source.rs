// src/recipe/kitchen/source.rs

//! Source acquisition: download and checksum verification

use super::log::BuildLog;
use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::hash::{hash_file, HashAlgorithm};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Transfer backends, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downloader {
    Curl,
    Wget,
}

impl Downloader {
    /// Pick the first backend whose binary is on `PATH`
    pub fn detect(tools: &ToolConfig) -> Option<(Self, PathBuf)> {
        [(Self::Curl, &tools.curl), (Self::Wget, &tools.wget)]
            .into_iter()
            .find_map(|(backend, binary)| which::which(binary).ok().map(|p| (backend, p)))
    }

    fn args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        match self {
            Self::Curl => vec![
                "-fL".into(),
                "--silent".into(),
                "--show-error".into(),
                "-o".into(),
                dest.into(),
                url.into(),
            ],
            Self::Wget => vec!["-q".into(), "-O".into(), dest.into(), url.into()],
        }
    }
}

/// Download `url` to `dest` unless `dest` already exists
///
/// The transfer writes to `<dest>.part` and renames on success, so a file
/// at `dest` is always a completed download.
pub fn fetch_source(url: &str, dest: &Path, tools: &ToolConfig, log: &mut BuildLog) -> Result<()> {
    if dest.exists() {
        info!("Using cached source: {}", dest.display());
        log.line(&format!("Using cached source: {}", dest.display()));
        return Ok(());
    }

    if url.is_empty() {
        return Err(Error::FetchError(format!(
            "no source URL and nothing cached at {}",
            dest.display()
        )));
    }

    let (backend, binary) = Downloader::detect(tools).ok_or_else(|| {
        Error::FetchError(format!(
            "no download tool available (tried {} and {})",
            tools.curl, tools.wget
        ))
    })?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    info!("Downloading: {}", url);
    debug!("Using {:?} at {}", backend, binary.display());

    let status = log
        .run("fetch", Command::new(&binary).args(backend.args(url, &part)))
        .map_err(|e| Error::FetchError(format!("{} failed to start: {}", binary.display(), e)))?;

    if !status.success() {
        let _ = fs::remove_file(&part);
        return Err(Error::FetchError(format!(
            "failed to download {} (exit code {:?}), see {}",
            url,
            status.code(),
            log.path().display()
        )));
    }

    fs::rename(&part, dest)?;
    Ok(())
}

/// What a checksum verification actually established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Matched the declared checksum
    Verified(HashAlgorithm),
    /// No checksum declared; the source was used as-is
    Unverified,
}

/// Verify a file against the recipe's checksums
///
/// SHA-256 takes precedence; MD5 is only consulted when no SHA-256 value is
/// declared. With neither, the source is accepted with a warning.
pub fn verify_checksum(path: &Path, sha256: Option<&str>, md5: Option<&str>) -> Result<Verification> {
    let (algorithm, expected) = match (sha256, md5) {
        (Some(sum), _) => (HashAlgorithm::Sha256, sum),
        (None, Some(sum)) => (HashAlgorithm::Md5, sum),
        (None, None) => {
            warn!(
                "No checksum declared for {}, source is unverified",
                path.display()
            );
            return Ok(Verification::Unverified);
        }
    };

    let expected = expected.trim().to_lowercase();
    if expected.len() != algorithm.hex_len() {
        warn!(
            "Declared {} checksum has {} hex digits, expected {}",
            algorithm,
            expected.len(),
            algorithm.hex_len()
        );
    }

    let actual = hash_file(algorithm, path)?;
    if actual != expected {
        return Err(Error::ChecksumMismatch {
            algorithm: algorithm.name(),
            expected,
            actual,
        });
    }

    debug!("{} verified for {}", algorithm, path.display());
    Ok(Verification::Verified(algorithm))
}
