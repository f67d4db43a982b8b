//! hypercube - Size and tile large multi-dimensional problems
//!
//! A problem is described as named, sized **dimensions** and **arrays** whose
//! shapes are written in terms of those dimensions. hypercube computes memory
//! footprints from each dimension's current **extent**, shrinks extents so a
//! sub-problem fits a memory budget, and enumerates the tiles that cover the
//! whole problem.
//!
//! # Architecture
//!
//! - [`core`] - Domain types, the registry, tiling and configuration
//! - [`ui`] - Output formatting and verbosity
//! - [`cli`] - Command-line interface (`hc`)
//!
//! # Correctness Invariants
//!
//! 1. Every dimension satisfies `0 <= lower <= upper <= global_size`
//! 2. Every dimension an array refers to is registered
//! 3. Array sizes are always recomputed from the current extents
//! 4. Tiling never mutates the cube it was built from

pub mod cli;
pub mod core;
pub mod ui;
