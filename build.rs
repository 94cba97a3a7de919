// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Global argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .global(true)
        .help("Configuration file (default: /etc/hearth/hearth.toml, then the user config dir)")
}

/// Global argument: disable spinners
fn no_progress_arg() -> Arg {
    Arg::new("no_progress")
        .long("no-progress")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Disable progress spinners")
}

fn build_cli() -> Command {
    Command::new("hearth")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Source-based package builder")
        .subcommand_required(true)
        .arg(config_arg())
        .arg(no_progress_arg())
        .subcommand(
            Command::new("init")
                .about("Create the configured directories and an empty install registry"),
        )
        .subcommand(Command::new("list-recipes").about("List every recipe under the recipe root"))
        .subcommand(
            Command::new("list-installed")
                .about("List registered packages (latest version of each)")
                .arg(
                    Arg::new("history")
                        .long("history")
                        .action(ArgAction::SetTrue)
                        .help("Show every registration instead of the current state"),
                ),
        )
        .subcommand(
            Command::new("build")
                .about("Build a package from its recipe")
                .arg(
                    Arg::new("target")
                        .required(true)
                        .help("Recipe as tree/name/name-version, name-version, name, or a recipe directory"),
                ),
        )
        .subcommand(
            Command::new("install-pkg")
                .about("Unpack a built artifact into a root directory")
                .arg(Arg::new("archive").required(true).help("Path to the artifact"))
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .default_value("/")
                        .help("Install root directory"),
                ),
        )
        .subcommand(
            Command::new("rebuild-all")
                .about("Rebuild every recipe in order, stopping at the first failure"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("hearth.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
