// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use hearth::config::Config;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.no_progress {
        config.interactive = false;
    }

    match cli.command {
        Commands::Init => commands::cmd_init(&config),
        Commands::ListRecipes => commands::cmd_list_recipes(&config),
        Commands::ListInstalled { history } => commands::cmd_list_installed(&config, history),
        Commands::Build { target } => commands::cmd_build(config, &target),
        Commands::InstallPkg { archive, root } => commands::cmd_install_pkg(&archive, &root),
        Commands::RebuildAll => commands::cmd_rebuild_all(config),
    }
}
