//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! Diagnostics (debug, warnings, errors) go to stderr so that `--json`
//! output on stdout stays machine-readable.

use std::fmt::Display;

use anyhow::Result;
use bytesize::ByteSize;
use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON (always shown).
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a byte count for humans, e.g. `1.5 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}
