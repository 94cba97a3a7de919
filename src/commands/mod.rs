// src/commands/mod.rs
//! Command handlers for the hearth CLI

mod build;
mod init;
mod install;
mod query;

pub use build::{cmd_build, cmd_rebuild_all};
pub use init::cmd_init;
pub use install::cmd_install_pkg;
pub use query::{cmd_list_installed, cmd_list_recipes};
