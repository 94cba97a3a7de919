// src/hash.rs

//! Source archive hashing
//!
//! Two algorithms are supported, matching what upstream projects publish
//! next to their release tarballs:
//! - **SHA-256**: preferred, used whenever a recipe declares `SOURCE_SHA256`
//! - **MD5**: legacy fallback for recipes that only carry an `MD5` sum

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Md5,
}

impl HashAlgorithm {
    /// Get the algorithm name as a string
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Md5 => "md5",
        }
    }

    /// Length of a hex digest for this algorithm
    #[inline]
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Md5 => 32,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Hash a reader to a lowercase hex digest without buffering it whole
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, mut reader: R) -> io::Result<String> {
    let mut buf = [0u8; 64 * 1024];
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        }
        HashAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        }
    }
}

/// Hash a file on disk
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> io::Result<String> {
    hash_reader(algorithm, File::open(path)?)
}

/// Hash an in-memory byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    // Reading from a slice cannot fail
    hash_reader(algorithm, data).unwrap_or_default()
}
