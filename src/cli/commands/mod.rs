//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the problem file and applies any `--extent` overrides
//! 2. Queries the cube
//! 3. Formats and displays output (tables or JSON)
//!
//! Problem files are never modified; only `init` writes a file.

mod completion;
mod fit;
mod init;
mod show;
mod tiles;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use fit::fit;
pub use init::init;
pub use show::show;
pub use tiles::tiles;

use std::path::Path;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::config::Config;
use crate::core::cube::{DimensionUpdate, HyperCube};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Show { problem, extents } => show::show(ctx, &problem, &extents),
        Command::Tiles {
            problem,
            tiles,
            extents,
            limit,
        } => tiles::tiles(ctx, &problem, &tiles, &extents, limit),
        Command::Fit {
            problem,
            dim,
            budget,
            extents,
        } => fit::fit(ctx, &problem, &dim, budget, &extents),
        Command::Init { path, force } => init::init(ctx, &path, force),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load a problem file and apply extent overrides.
///
/// Overrides are applied atomically: if any of them is invalid the command
/// fails without reporting a half-updated problem.
pub(crate) fn load_cube(
    ctx: &Context,
    path: &Path,
    extents: &[DimensionUpdate],
) -> Result<HyperCube> {
    let loaded = Config::load_problem(path)
        .with_context(|| format!("Failed to load problem '{}'", path.display()))?;

    for warning in &loaded.warnings {
        output::warn(
            format!("{}: {}", warning.path.display(), warning.message),
            ctx.verbosity,
        );
    }

    let mut cube = loaded.cube;
    output::debug(
        format!(
            "loaded {} dimensions and {} arrays from {}",
            cube.dimensions().count(),
            cube.arrays().count(),
            path.display()
        ),
        ctx.verbosity,
    );

    if !extents.is_empty() {
        cube.update_dimensions_atomic(extents)
            .context("Invalid --extent")?;
        for update in extents {
            output::debug(
                format!(
                    "extent of '{}' set to ({}, {})",
                    update.name, update.lower_extent, update.upper_extent
                ),
                ctx.verbosity,
            );
        }
    }

    Ok(cube)
}
