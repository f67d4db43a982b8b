//! cli
//!
//! Command-line interface layer for hypercube.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load the global config and merge it with the flags
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers load a problem file into a
//! [`HyperCube`](crate::core::cube::HyperCube) and only use its public query
//! and tiling methods; all output goes through [`crate::ui`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub verbosity: Verbosity,
    pub json: bool,
    pub config: Config,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let loaded = Config::load().context("Failed to load config")?;
    let debug = cli.debug || loaded.config.debug();
    let verbosity = Verbosity::from_flags(cli.quiet, debug);

    for warning in &loaded.warnings {
        output::warn(
            format!("{}: {}", warning.path.display(), warning.message),
            verbosity,
        );
    }
    if let Some(path) = loaded.config.global_config_loaded_from() {
        output::debug(format!("loaded config from {}", path.display()), verbosity);
    }

    let ctx = Context {
        verbosity,
        json: cli.json,
        config: loaded.config,
    };

    commands::dispatch(cli.command, &ctx)
}
