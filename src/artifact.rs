// src/artifact.rs

//! Package artifacts: compressed tarballs of a staging root
//!
//! An artifact is `<name>-<version>.tar.<ext>` holding every file, directory
//! and symlink under the staging root, with paths relative to that root.
//! Installing an artifact unpacks it over a target root; that is the only
//! operation in the crate that writes outside a staging tree.
//!
//! Ownership recorded in the headers follows [`Ownership`].

use crate::compression::{create_decoder, CompressionFormat, Encoder};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File name of an artifact
pub fn artifact_name(name: &str, version: &str, format: CompressionFormat) -> String {
    match format {
        CompressionFormat::None => format!("{}-{}.tar", name, version),
        _ => format!("{}-{}.tar.{}", name, version, format.extension()),
    }
}

/// Owner recorded for archived entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Keep the uid and gid found on disk
    Preserve,
    /// Record every entry as uid 0, gid 0 (`root:root`)
    Root,
}

/// Archive and compress a staging root into `artifact_dir`
///
/// The artifact is written to a `.part` file and renamed once complete, so
/// a file with the final name is never truncated.
pub fn create_artifact(
    staging_root: &Path,
    artifact_dir: &Path,
    name: &str,
    version: &str,
    format: CompressionFormat,
    ownership: Ownership,
) -> Result<PathBuf> {
    fs::create_dir_all(artifact_dir).map_err(|e| {
        Error::PackagingError(format!("cannot create {}: {}", artifact_dir.display(), e))
    })?;

    let final_path = artifact_dir.join(artifact_name(name, version, format));
    let part_path = artifact_dir.join(format!("{}.part", artifact_name(name, version, format)));

    let result = write_archive(staging_root, &part_path, format, ownership);
    if let Err(e) = result {
        let _ = fs::remove_file(&part_path);
        return Err(e);
    }

    fs::rename(&part_path, &final_path)
        .map_err(|e| Error::PackagingError(format!("cannot publish artifact: {}", e)))?;

    info!("Packaged {}", final_path.display());
    Ok(final_path)
}

fn write_archive(
    staging_root: &Path,
    dest: &Path,
    format: CompressionFormat,
    ownership: Ownership,
) -> Result<usize> {
    let packaging = |e: std::io::Error| Error::PackagingError(format!("{}: {}", dest.display(), e));

    if !staging_root.is_dir() {
        return Err(Error::PackagingError(format!(
            "staging root {} does not exist",
            staging_root.display()
        )));
    }

    let file = File::create(dest).map_err(packaging)?;
    let mut builder = tar::Builder::new(Encoder::new(BufWriter::new(file), format));

    let mut count = 0;
    for entry in WalkDir::new(staging_root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::PackagingError(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(staging_root)
            .map_err(|e| Error::PackagingError(e.to_string()))?;

        append_entry(&mut builder, entry.path(), relative, ownership).map_err(packaging)?;
        count += 1;
    }

    let encoder = builder.into_inner().map_err(packaging)?;
    let writer = encoder
        .finish()
        .map_err(|e| Error::PackagingError(e.to_string()))?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::PackagingError(e.to_string()))?;
    file.sync_all().map_err(packaging)?;

    debug!("Archived {} entries from {}", count, staging_root.display());
    Ok(count)
}

fn append_entry<W: io::Write>(
    builder: &mut tar::Builder<W>,
    path: &Path,
    relative: &Path,
    ownership: Ownership,
) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    let mut header = tar::Header::new_gnu();
    header.set_metadata_in_mode(&metadata, tar::HeaderMode::Complete);
    if ownership == Ownership::Root {
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("root")?;
        header.set_groupname("root")?;
    }

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        let target = fs::read_link(path)?;
        builder.append_link(&mut header, relative, target)
    } else if file_type.is_file() {
        builder.append_data(&mut header, relative, File::open(path)?)
    } else {
        header.set_size(0);
        builder.append_data(&mut header, relative, io::empty())
    }
}

/// Unpack an artifact over `root`
///
/// Compression is detected from the file suffix. Existing files are
/// overwritten; nothing is removed and nothing is rolled back on failure.
/// Recorded ownership is applied only when running as root.
pub fn install_artifact(archive: &Path, root: &Path) -> Result<()> {
    let format = CompressionFormat::from_extension(&archive.to_string_lossy());
    let file = File::open(archive)
        .map_err(|e| Error::NotFound(format!("{}: {}", archive.display(), e)))?;

    let mut tar = tar::Archive::new(create_decoder(file, format));
    tar.set_preserve_permissions(true);
    tar.set_preserve_ownerships(nix::unistd::geteuid().is_root());
    tar.set_overwrite(true);
    tar.unpack(root)?;

    info!("Installed {} into {}", archive.display(), root.display());
    Ok(())
}
