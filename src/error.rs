// src/error.rs

//! Error types shared across the build pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by recipe loading and the build stages
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("{algorithm} checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Extraction failed: {0}")]
    ExtractionError(String),

    #[error("Patch failed: {0}")]
    PatchError(String),

    #[error("{phase} failed with exit code {}, see {}", fmt_code(.code), .log.display())]
    BuildError {
        phase: String,
        code: Option<i32>,
        log: PathBuf,
    },

    #[error("install failed with exit code {}, see {}", fmt_code(.code), .log.display())]
    InstallError { code: Option<i32>, log: PathBuf },

    #[error("Packaging failed: {0}")]
    PackagingError(String),

    #[error("Registration failed: {0}")]
    RegistrationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none (did not start or killed by signal)".to_string(),
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_reports_exit_code() {
        let err = Error::BuildError {
            phase: "configure".to_string(),
            code: Some(2),
            log: PathBuf::from("/var/log/hearth/hello-2.12.log"),
        };
        let msg = err.to_string();
        assert!(msg.contains("configure"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("hello-2.12.log"));
    }

    #[test]
    fn test_signal_exit_code() {
        let err = Error::InstallError {
            code: None,
            log: PathBuf::from("x.log"),
        };
        assert!(err.to_string().contains("killed by signal"));
    }
}
