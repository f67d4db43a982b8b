//! core
//!
//! Domain types, the dimension/array registry and tiling.
//!
//! # Modules
//!
//! - [`types`] - Strong types: DimName, ArrayName, Extent, DType
//! - [`dims`] - Dimension records and extent validation
//! - [`arrays`] - Symbolic array schemas and the `shape!` macro
//! - [`properties`] - Scalar problem properties
//! - [`cube`] - The HyperCube registry: registration, extent queries and updates, sizes
//! - [`tiling`] - Tile plans and their iterators
//! - [`summary`] - Serialisable view of a cube's tables
//! - [`config`] - Global settings and problem files
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid names and extents at construction
//! - Array sizes are always derived from current extents
//! - No I/O outside [`config`]; no global state

pub mod arrays;
pub mod config;
pub mod cube;
pub mod dims;
pub mod properties;
pub mod summary;
pub mod tiling;
pub mod types;
