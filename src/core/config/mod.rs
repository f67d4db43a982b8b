//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! hypercube reads two kinds of file:
//! - **Global**: user-level settings (default memory budget, debug output)
//! - **Problem**: a declarative problem description that builds a
//!   [`HyperCube`](crate::core::cube::HyperCube)
//!
//! # Precedence
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$HYPERCUBE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hypercube/config.toml`
//! 3. `~/.hypercube/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use hypercube::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load().unwrap().config;
//! println!("Budget: {:?}", config.memory_budget().unwrap());
//!
//! let problem = Config::load_problem(Path::new("problem.toml")).unwrap();
//! for warning in &problem.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! println!("{} bytes", problem.cube.bytes_required().unwrap());
//! ```

pub mod schema;

pub use schema::{
    parse_byte_size, ArrayConfig, DimensionConfig, GlobalConfig, ProblemConfig, PropertyConfig,
    ShapeEntry,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::cube::{CubeError, HyperCube};

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "HYPERCUBE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Cube(#[from] CubeError),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Result of loading a problem file.
#[derive(Debug)]
pub struct ProblemLoadResult {
    /// The cube built from the file.
    pub cube: HyperCube,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded global configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let candidates = Self::global_candidates(
            std::env::var(CONFIG_ENV).ok(),
            std::env::var("XDG_CONFIG_HOME").ok(),
            dirs::home_dir(),
        );
        Self::load_from(&candidates)
    }

    /// Candidate global config paths, in search order.
    fn global_candidates(
        explicit: Option<String>,
        xdg_home: Option<String>,
        home: Option<PathBuf>,
    ) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = explicit {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg) = xdg_home {
            candidates.push(PathBuf::from(xdg).join("hypercube/config.toml"));
        }
        if let Some(home) = home {
            candidates.push(home.join(".hypercube/config.toml"));
        }
        candidates
    }

    /// Load the first existing file among `candidates`.
    fn load_from(candidates: &[PathBuf]) -> Result<ConfigLoadResult, ConfigError> {
        let Some(path) = candidates.iter().find(|p| p.exists()) else {
            return Ok(ConfigLoadResult {
                config: Config::default(),
                warnings: Vec::new(),
            });
        };

        let global: GlobalConfig = Self::read_toml(path)?;
        global.validate()?;

        Ok(ConfigLoadResult {
            config: Config {
                global,
                global_path: Some(path.clone()),
            },
            warnings: Vec::new(),
        })
    }

    /// Read and parse a TOML file.
    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and validate a problem file without building it.
    pub fn read_problem(path: &Path) -> Result<ProblemConfig, ConfigError> {
        let problem: ProblemConfig = Self::read_toml(path)?;
        problem.validate()?;
        Ok(problem)
    }

    /// Read a problem file and build its cube.
    ///
    /// Warns about problems without arrays and about dimensions no array
    /// refers to, since neither contributes to the memory estimate.
    pub fn load_problem(path: &Path) -> Result<ProblemLoadResult, ConfigError> {
        let problem = Self::read_problem(path)?;
        let cube = Self::build_cube(&problem)?;

        let mut warnings = Vec::new();
        if cube.arrays().next().is_none() {
            warnings.push(ConfigWarning {
                message: "problem declares no arrays".to_string(),
                path: path.to_path_buf(),
            });
        } else {
            for dim in cube.dimensions() {
                let name = dim.name().as_str();
                if !cube.arrays().any(|a| a.references(name)) {
                    warnings.push(ConfigWarning {
                        message: format!("dimension '{name}' is not used by any array"),
                        path: path.to_path_buf(),
                    });
                }
            }
        }

        Ok(ProblemLoadResult { cube, warnings })
    }

    /// Build a cube from a parsed problem.
    pub fn build_cube(problem: &ProblemConfig) -> Result<HyperCube, ConfigError> {
        problem.build_cube()
    }

    /// Write a problem file atomically.
    ///
    /// Creates parent directories if needed.
    pub fn write_problem(path: &Path, problem: &ProblemConfig) -> Result<(), ConfigError> {
        problem.validate()?;
        Self::write_config_atomic(path, problem)
    }

    /// Write a config file atomically (temp file in the same directory, then
    /// rename).
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Default memory budget in bytes, if configured.
    pub fn memory_budget(&self) -> Result<Option<u64>, ConfigError> {
        self.global
            .memory_budget
            .as_deref()
            .map(parse_byte_size)
            .transpose()
    }

    /// Check if debug output is enabled by default.
    ///
    /// Defaults to `false` if not configured.
    pub fn debug(&self) -> bool {
        self.global.debug.unwrap_or(false)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}
