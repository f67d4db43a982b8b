//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::parse_byte_size;
use crate::core::cube::DimensionUpdate;

/// hypercube - Size and tile multi-dimensional problems
#[derive(Parser, Debug)]
#[command(name = "hc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// A `NAME=SIZE` tile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSpec {
    pub dim: String,
    pub size: usize,
}

fn split_assignment<'a>(s: &'a str, expected: &str) -> Result<(&'a str, &'a str), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected {expected}, got '{s}'"))
}

/// Parse `NAME=SIZE`.
pub fn parse_tile_spec(s: &str) -> Result<TileSpec, String> {
    let (dim, size) = split_assignment(s, "NAME=SIZE")?;
    let size = size
        .parse()
        .map_err(|e| format!("invalid tile size '{size}': {e}"))?;
    Ok(TileSpec {
        dim: dim.to_string(),
        size,
    })
}

/// Parse `NAME=LOWER:UPPER`.
pub fn parse_extent_spec(s: &str) -> Result<DimensionUpdate, String> {
    let (dim, range) = split_assignment(s, "NAME=LOWER:UPPER")?;
    let (lower, upper) = range
        .split_once(':')
        .ok_or_else(|| format!("expected LOWER:UPPER, got '{range}'"))?;
    let bound = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid extent bound '{v}': {e}"))
    };
    Ok(DimensionUpdate::new(dim, bound(lower)?, bound(upper)?))
}

/// Parse a byte budget such as `4GiB` or `1048576`.
pub fn parse_budget(s: &str) -> Result<u64, String> {
    parse_byte_size(s).map_err(|e| e.to_string())
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show dimensions, arrays and memory usage of a problem
    #[command(
        name = "show",
        long_about = "Show the registered dimensions, arrays and properties of a problem file.\n\n\
            Tables are sorted by name. Array sizes are computed from the current \
            dimension extents, and the final row gives the local memory usage.",
        after_help = "\
EXAMPLES:
    # Full problem
    hc show problem.toml

    # Memory usage of a 10 timestep slice
    hc show problem.toml --extent ntime=0:10"
    )]
    Show {
        /// Problem file
        problem: PathBuf,

        /// Set a dimension extent before computing sizes
        #[arg(long = "extent", value_name = "NAME=LOWER:UPPER", value_parser = parse_extent_spec)]
        extents: Vec<DimensionUpdate>,
    },

    /// List the tiles covering a problem
    #[command(
        name = "tiles",
        long_about = "List the tiles that cover the current extents of the given dimensions.\n\n\
            Each --tile NAME=SIZE splits that dimension into windows of SIZE; several \
            --tile flags combine, with the first varying slowest. Every tile is printed \
            with its memory requirement.",
        after_help = "\
EXAMPLES:
    # 100 timesteps at a time
    hc tiles problem.toml --tile ntime=100

    # Timesteps and channels together
    hc tiles problem.toml --tile ntime=100 --tile nchan=64"
    )]
    Tiles {
        /// Problem file
        problem: PathBuf,

        /// Tile a dimension
        #[arg(long = "tile", value_name = "NAME=SIZE", required = true, value_parser = parse_tile_spec)]
        tiles: Vec<TileSpec>,

        /// Set a dimension extent before tiling
        #[arg(long = "extent", value_name = "NAME=LOWER:UPPER", value_parser = parse_extent_spec)]
        extents: Vec<DimensionUpdate>,

        /// Print at most this many tiles
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Find the largest tile of a dimension that fits a memory budget
    #[command(
        name = "fit",
        long_about = "Find the largest window of a dimension that keeps the local memory \
            usage within a budget. Other dimensions keep their current extents.\n\n\
            The budget defaults to memory_budget from the global config file.",
        after_help = "\
EXAMPLES:
    hc fit problem.toml --dim ntime --budget 2GiB"
    )]
    Fit {
        /// Problem file
        problem: PathBuf,

        /// Dimension to shrink
        #[arg(long)]
        dim: String,

        /// Memory budget, e.g. 512MiB
        #[arg(long, value_parser = parse_budget)]
        budget: Option<u64>,

        /// Set a dimension extent first
        #[arg(long = "extent", value_name = "NAME=LOWER:UPPER", value_parser = parse_extent_spec)]
        extents: Vec<DimensionUpdate>,
    },

    /// Write an example problem file
    Init {
        /// Where to write the problem file
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    hc completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    hc completion zsh >> ~/.zshrc

    # Fish
    hc completion fish > ~/.config/fish/completions/hc.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    mod specs {
        use super::*;

        #[test]
        fn tile_spec() {
            assert_eq!(
                parse_tile_spec("ntime=100").unwrap(),
                TileSpec {
                    dim: "ntime".into(),
                    size: 100
                }
            );
            assert_eq!(parse_tile_spec(" nchan = 64 ").unwrap().size, 64);
        }

        #[test]
        fn tile_spec_errors() {
            assert!(parse_tile_spec("ntime").is_err());
            assert!(parse_tile_spec("=5").is_err());
            assert!(parse_tile_spec("ntime=-1").is_err());
        }

        #[test]
        fn extent_spec() {
            assert_eq!(
                parse_extent_spec("ntime=10:20").unwrap(),
                DimensionUpdate::new("ntime", 10, 20)
            );
            assert!(parse_extent_spec("ntime=10").is_err());
            assert!(parse_extent_spec("ntime=a:b").is_err());
        }

        #[test]
        fn budget() {
            assert_eq!(parse_budget("2KiB").unwrap(), 2048);
            assert!(parse_budget("a lot").is_err());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn tiles_requires_tile() {
            assert!(Cli::try_parse_from(["hc", "tiles", "p.toml"]).is_err());
        }

        #[test]
        fn tiles_collects_repeated_flags() {
            let cli =
                Cli::try_parse_from(["hc", "--json", "tiles", "p.toml", "--tile", "a=1", "--tile", "b=2"])
                    .unwrap();
            assert!(cli.json);
            match cli.command {
                Command::Tiles { tiles, .. } => {
                    assert_eq!(tiles.len(), 2);
                    assert_eq!(tiles[1].dim, "b");
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }
    }
}
