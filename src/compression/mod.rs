// src/compression/mod.rs
//! Compression utilities for package artifacts
//!
//! Artifacts are tarballs compressed with xz (preferred) or gzip. This module
//! maps between compressor names, file suffixes and streaming encoders and
//! decoders so the packager and the artifact installer agree on formats.

use flate2::Compression;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to finish {format} stream: {source}")]
    Finish {
        format: &'static str,
        source: io::Error,
    },
}

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// No compression (raw data)
    None,
    /// Gzip compression (.gz)
    Gzip,
    /// XZ/LZMA compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    ///
    /// # Examples
    /// ```
    /// use hearth::compression::CompressionFormat;
    ///
    /// assert_eq!(CompressionFormat::from_extension("hello-2.12.tar.gz"), CompressionFormat::Gzip);
    /// assert_eq!(CompressionFormat::from_extension("hello-2.12.tar.xz"), CompressionFormat::Xz);
    /// assert_eq!(CompressionFormat::from_extension("hello-2.12.tar"), CompressionFormat::None);
    /// ```
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".gz") || path.ends_with(".tgz") {
            Self::Gzip
        } else if path.ends_with(".xz") || path.ends_with(".txz") {
            Self::Xz
        } else {
            Self::None
        }
    }

    /// Parse a compressor name as written in configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "xz" | "lzma" => Some(Self::Xz),
            "gzip" | "gz" => Some(Self::Gzip),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Get the suffix appended after `.tar` (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => "gz",
            Self::Xz => "xz",
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A compressing writer that must be finished explicitly
///
/// Dropping an encoder without calling [`Encoder::finish`] may truncate the
/// stream, so the packager always finishes before publishing.
pub enum Encoder<W: Write> {
    Plain(W),
    Gzip(flate2::write::GzEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
}

impl<W: Write> Encoder<W> {
    /// Wrap a writer in the encoder for `format`
    pub fn new(writer: W, format: CompressionFormat) -> Self {
        match format {
            CompressionFormat::None => Self::Plain(writer),
            CompressionFormat::Gzip => {
                Self::Gzip(flate2::write::GzEncoder::new(writer, Compression::default()))
            }
            CompressionFormat::Xz => Self::Xz(xz2::write::XzEncoder::new(writer, 6)),
        }
    }

    /// Flush remaining compressed data and return the inner writer
    pub fn finish(self) -> Result<W, CompressionError> {
        match self {
            Self::Plain(w) => Ok(w),
            Self::Gzip(e) => e.finish().map_err(|source| CompressionError::Finish {
                format: "gzip",
                source,
            }),
            Self::Xz(e) => e.finish().map_err(|source| CompressionError::Finish {
                format: "xz",
                source,
            }),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(e) => e.write(buf),
            Self::Xz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(e) => e.flush(),
            Self::Xz(e) => e.flush(),
        }
    }
}

/// Create a decompressing reader for the given format
///
/// For `CompressionFormat::None`, returns the reader unchanged.
pub fn create_decoder<'a, R: Read + 'a>(reader: R, format: CompressionFormat) -> Box<dyn Read + 'a> {
    match format {
        CompressionFormat::None => Box::new(reader),
        CompressionFormat::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        CompressionFormat::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(CompressionFormat::from_extension("a.tar.gz"), CompressionFormat::Gzip);
        assert_eq!(CompressionFormat::from_extension("a.tgz"), CompressionFormat::Gzip);
        assert_eq!(CompressionFormat::from_extension("a.tar.xz"), CompressionFormat::Xz);
        assert_eq!(CompressionFormat::from_extension("a.txz"), CompressionFormat::Xz);
        assert_eq!(CompressionFormat::from_extension("a.tar"), CompressionFormat::None);
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(CompressionFormat::from_name("XZ"), Some(CompressionFormat::Xz));
        assert_eq!(CompressionFormat::from_name("gzip"), Some(CompressionFormat::Gzip));
        assert_eq!(CompressionFormat::from_name("bzip2"), None);
    }

    #[test]
    fn test_encoder_decoder_pair() {
        for format in [CompressionFormat::Gzip, CompressionFormat::Xz] {
            let mut encoder = Encoder::new(Vec::new(), format);
            encoder.write_all(b"staged tree contents").unwrap();
            let compressed = encoder.finish().unwrap();

            let mut out = Vec::new();
            create_decoder(compressed.as_slice(), format)
                .read_to_end(&mut out)
                .unwrap();
            assert_eq!(out, b"staged tree contents", "format {}", format);
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format!("{}", CompressionFormat::Gzip), "gzip");
        assert_eq!(format!("{}", CompressionFormat::Xz), "xz");
    }
}
