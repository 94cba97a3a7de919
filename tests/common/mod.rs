// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use hearth::compression::{create_decoder, CompressionFormat};
use hearth::config::Config;
use hearth::hash::{hash_file, HashAlgorithm};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway hearth installation rooted in a temporary directory.
///
/// Keep the value alive for the duration of the test; dropping it removes
/// every directory the configuration points at.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::rooted_at(dir.path());
        config.interactive = false;
        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `recipe.toml` for `<tree>/<name>/<name>-<version>` and return its directory.
    pub fn recipe(&self, tree: &str, name: &str, version: &str, body: &str) -> PathBuf {
        let dir = self
            .config
            .recipe_root
            .join(tree)
            .join(name)
            .join(format!("{}-{}", name, version));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("recipe.toml"), body).unwrap();
        dir
    }

    /// Place a source archive in the cache so no download is attempted.
    pub fn seed_source(&self, filename: &str, files: &[SourceFile]) -> PathBuf {
        fs::create_dir_all(&self.config.source_cache).unwrap();
        let path = self.config.source_cache.join(filename);
        let top = filename
            .trim_end_matches(".tar.gz")
            .trim_end_matches(".tgz")
            .to_string();
        write_tarball(&path, &top, files);
        path
    }

    /// Place arbitrary bytes in the source cache.
    pub fn seed_raw_source(&self, filename: &str, bytes: &[u8]) -> PathBuf {
        fs::create_dir_all(&self.config.source_cache).unwrap();
        let path = self.config.source_cache.join(filename);
        fs::write(&path, bytes).unwrap();
        path
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.config.artifact_dir.join(name)
    }

    pub fn log(&self, id: &str) -> String {
        fs::read_to_string(self.config.log_dir.join(format!("{}.log", id))).unwrap_or_default()
    }
}

/// One file inside a generated source tarball
pub struct SourceFile {
    pub path: &'static str,
    pub content: &'static [u8],
    pub mode: u32,
}

impl SourceFile {
    pub fn new(path: &'static str, content: &'static [u8]) -> Self {
        Self {
            path,
            content,
            mode: 0o644,
        }
    }

    pub fn executable(path: &'static str, content: &'static [u8]) -> Self {
        Self {
            path,
            content,
            mode: 0o755,
        }
    }
}

/// Write a gzip tarball with every file under a single `top` directory.
pub fn write_tarball(path: &Path, top: &str, files: &[SourceFile]) {
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_mode(0o755);
    dir.set_size(0);
    builder
        .append_data(&mut dir, format!("{}/", top), std::io::empty())
        .unwrap();

    for source in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(source.content.len() as u64);
        header.set_mode(source.mode);
        builder
            .append_data(&mut header, format!("{}/{}", top, source.path), source.content)
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
}

/// SHA-256 of a file, as a recipe would declare it.
pub fn sha256_of(path: &Path) -> String {
    hash_file(HashAlgorithm::Sha256, path).unwrap()
}

/// MD5 of a file, as a recipe would declare it.
pub fn md5_of(path: &Path) -> String {
    hash_file(HashAlgorithm::Md5, path).unwrap()
}

/// True when every named binary is on `PATH`; prints a skip notice otherwise.
pub fn have_tools(test: &str, tools: &[&str]) -> bool {
    for tool in tools {
        if which::which(tool).is_err() {
            eprintln!("Skipping {}: {} not found", test, tool);
            return false;
        }
    }
    true
}

/// Sources for a package built entirely by recipe hooks.
pub fn hook_sources() -> Vec<SourceFile> {
    vec![
        SourceFile::executable("hello.sh", b"#!/bin/sh\necho hello\n"),
        SourceFile::new("greeting.txt", b"hello\n"),
    ]
}

/// Recipe body for a hook-only build of `name`-`version`.
pub fn hook_recipe(name: &str, version: &str, extra: &str) -> String {
    format!(
        r#"NAME = "{name}"
VERSION = "{version}"
SOURCE_URL = "https://example.invalid/{name}-{version}.tar.gz"
BUILD = "cp hello.sh hello"
INSTALL = "mkdir -p \"$DESTDIR/usr/bin\" && cp hello \"$DESTDIR/usr/bin/$PKGNAME\""
{extra}
"#
    )
}

/// Path, uid and gid of every entry in an artifact.
pub fn archive_owners(path: &Path) -> Vec<(String, u64, u64)> {
    let format = CompressionFormat::from_extension(&path.to_string_lossy());
    let mut archive = tar::Archive::new(create_decoder(File::open(path).unwrap(), format));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let header = entry.header();
            (
                entry.path().unwrap().to_string_lossy().into_owned(),
                header.uid().unwrap(),
                header.gid().unwrap(),
            )
        })
        .collect()
}
