//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity, diagnostics and JSON output
//! - [`table`] - Plain-text tables for cube summaries
//!
//! # Design
//!
//! All output goes through this module so that quiet, debug and JSON modes
//! behave the same for every command. The core never prints.

pub mod output;
pub mod table;
