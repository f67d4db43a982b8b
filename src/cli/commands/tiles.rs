//! tiles command - List the tiles covering a problem

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::load_cube;
use crate::cli::args::TileSpec;
use crate::cli::Context;
use crate::core::cube::DimensionUpdate;
use crate::ui::output;

/// One tile in `--json` output.
#[derive(Debug, Serialize)]
struct TileReport {
    index: usize,
    updates: Vec<DimensionUpdate>,
    bytes: u64,
}

#[derive(Debug, Serialize)]
struct TilesReport {
    total: usize,
    tiles: Vec<TileReport>,
}

/// List tiles with their memory requirement.
pub fn tiles(
    ctx: &Context,
    problem: &Path,
    specs: &[TileSpec],
    extents: &[DimensionUpdate],
    limit: Option<usize>,
) -> Result<()> {
    let cube = load_cube(ctx, problem, extents)?;
    let pairs: Vec<(&str, usize)> = specs.iter().map(|s| (s.dim.as_str(), s.size)).collect();

    let tiling = cube.tiling(pairs.iter().copied()).context("Invalid --tile")?;
    if tiling.is_empty() {
        let empty: Vec<&str> = tiling
            .axes()
            .iter()
            .filter(|axis| axis.extent().is_empty())
            .map(|axis| axis.name().as_str())
            .collect();
        output::warn(
            format!("empty extent on {}, no tiles produced", empty.join(", ")),
            ctx.verbosity,
        );
    }
    output::debug(
        format!("{} tiles over {} dimensions", tiling.len(), tiling.axes().len()),
        ctx.verbosity,
    );

    let total = tiling.len();
    let shown = limit.unwrap_or(total).min(total);

    let mut reports = Vec::with_capacity(shown);
    let steps = tiling.updates().zip(cube.cube_iter(pairs.iter().copied())?);
    for (index, (updates, tile)) in steps.take(shown).enumerate() {
        reports.push(TileReport {
            index,
            updates,
            bytes: tile.bytes_required()?,
        });
    }

    if ctx.json {
        return output::json(&TilesReport {
            total,
            tiles: reports,
        });
    }

    for report in &reports {
        let windows: Vec<String> = report
            .updates
            .iter()
            .map(|u| format!("{}=[{}, {})", u.name, u.lower_extent, u.upper_extent))
            .collect();
        output::print(
            format!(
                "tile {}/{}: {}  {}",
                report.index + 1,
                total,
                windows.join(" "),
                output::format_bytes(report.bytes)
            ),
            ctx.verbosity,
        );
    }
    if shown < total {
        output::print(format!("... {} more", total - shown), ctx.verbosity);
    }

    Ok(())
}
