//! show command - Print the dimension, array and property tables

use std::path::Path;

use anyhow::Result;

use super::load_cube;
use crate::cli::Context;
use crate::core::cube::DimensionUpdate;
use crate::ui::{output, table};

/// Show a problem's tables and local memory usage.
pub fn show(ctx: &Context, problem: &Path, extents: &[DimensionUpdate]) -> Result<()> {
    let cube = load_cube(ctx, problem, extents)?;
    let summary = cube.summary()?;

    if ctx.json {
        return output::json(&summary);
    }

    output::print(table::render_summary(&summary), ctx.verbosity);
    Ok(())
}
