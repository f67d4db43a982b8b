//! init command - Write an example problem file

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{Config, ProblemConfig};
use crate::core::cube::HyperCube;
use crate::core::types::DType;
use crate::shape;
use crate::ui::output;

/// A small radio-interferometry problem: 64 antennas, 100 timesteps,
/// 64 channels and 4 correlations.
pub(crate) fn example_cube() -> Result<HyperCube> {
    let mut cube = HyperCube::new();
    cube.register_dimension("ntime", 100, "Timesteps")?;
    cube.register_dimension("na", 64, "Antennas")?;
    cube.register_dimension("nbl", 64 * 63 / 2, "Baselines")?;
    cube.register_dimension("nchan", 64, "Channels")?;
    cube.register_dimension("npol", 4, "Correlations")?;

    cube.register_array("uvw", shape!["ntime", "na", 3]?, DType::Float64, "UVW coordinates")?;
    cube.register_array(
        "antenna1",
        shape!["ntime", "nbl"]?,
        DType::Int32,
        "First antenna of each baseline",
    )?;
    cube.register_array(
        "vis",
        shape!["ntime", "nbl", "nchan", "npol"]?,
        DType::Complex128,
        "Visibilities",
    )?;
    cube.register_array(
        "weight",
        shape!["ntime", "nbl", "nchan", "npol"]?,
        DType::Float32,
        "Visibility weights",
    )?;

    cube.register_property("ref_freq", DType::Float64, 1.4e9)?;
    Ok(cube)
}

/// Write the example problem to `path`.
pub fn init(ctx: &Context, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "'{}' already exists; use --force to overwrite",
            path.display()
        );
    }

    let problem = ProblemConfig::from_cube(&example_cube()?)?;
    Config::write_problem(path, &problem)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;

    output::print(
        format!("Wrote example problem to {}", path.display()),
        ctx.verbosity,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_is_valid() {
        let cube = example_cube().unwrap();
        assert_eq!(cube.dim_global_size(["nbl"]).unwrap(), vec![2016]);
        assert_eq!(
            cube.array_size("vis").unwrap(),
            100 * 2016 * 64 * 4 * 16
        );
    }

    #[test]
    fn example_survives_problem_file() {
        let cube = example_cube().unwrap();
        let rebuilt = ProblemConfig::from_cube(&cube).unwrap().build_cube().unwrap();
        assert_eq!(rebuilt.summary().unwrap(), cube.summary().unwrap());
    }
}
