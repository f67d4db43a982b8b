//! fit command - Largest tile of a dimension within a memory budget

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;

use super::load_cube;
use crate::cli::Context;
use crate::core::cube::DimensionUpdate;
use crate::ui::output;

#[derive(Debug, Serialize)]
struct FitReport<'a> {
    dimension: &'a str,
    budget: u64,
    tile_size: usize,
    tiles: usize,
    bytes: u64,
}

/// Print the largest tile length of `dim` that fits the budget.
pub fn fit(
    ctx: &Context,
    problem: &Path,
    dim: &str,
    budget: Option<u64>,
    extents: &[DimensionUpdate],
) -> Result<()> {
    let budget = match budget {
        Some(budget) => budget,
        None => ctx.config.memory_budget()?.ok_or_else(|| {
            anyhow!("no memory budget; pass --budget or set memory_budget in the global config")
        })?,
    };

    let cube = load_cube(ctx, problem, extents)?;
    let tile_size = cube
        .max_tile_size(dim, budget)
        .with_context(|| format!("Cannot fit '{dim}' into {}", output::format_bytes(budget)))?;

    let tiling = cube.tiling([(dim, tile_size)])?;
    let bytes = match cube.cube_iter([(dim, tile_size)])?.next() {
        Some(tile) => tile.bytes_required()?,
        None => 0,
    };
    output::debug(
        format!("full problem needs {}", output::format_bytes(cube.bytes_required()?)),
        ctx.verbosity,
    );

    let report = FitReport {
        dimension: dim,
        budget,
        tile_size,
        tiles: tiling.len(),
        bytes,
    };

    if ctx.json {
        return output::json(&report);
    }

    output::print(
        format!(
            "{}: {} per tile ({} tiles), {} of {}",
            report.dimension,
            report.tile_size,
            report.tiles,
            output::format_bytes(report.bytes),
            output::format_bytes(report.budget)
        ),
        ctx.verbosity,
    );
    Ok(())
}
