// src/lib.rs

//! hearth: a source-based package builder
//!
//! Builds packages for a from-scratch Linux system out of small TOML
//! recipes. Every build runs the same pipeline: fetch and verify the
//! source, extract and patch it, run the build and install steps into a
//! staging root, package that root as a tarball, and record the result in
//! a local install registry.
//!
//! # Architecture
//!
//! - Recipes are immutable values loaded once per build
//! - Every build gets its own extraction and staging directories
//! - Install steps run under privilege emulation when not root
//! - Nothing outside the staging root is touched until an artifact is
//!   explicitly installed

pub mod artifact;
pub mod compression;
pub mod config;
mod error;
pub mod hash;
pub mod progress;
pub mod recipe;
pub mod registry;
pub mod sync;

pub use config::Config;
pub use error::{Error, Result};
pub use recipe::{CookFailure, CookResult, Kitchen, Recipe, Stage};
pub use registry::{InstallRecord, Registry};
