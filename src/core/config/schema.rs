//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$HYPERCUBE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hypercube/config.toml`
//! 3. `~/.hypercube/config.toml` (canonical write location)
//!
//! # Problem Files
//!
//! A problem file declares dimensions, arrays and properties and is always
//! given explicitly. Entries are registered in file order, so arrays may
//! only reference dimensions, and the file reads top to bottom.
//!
//! # Validation
//!
//! Values are validated after parsing, before anything is registered on a
//! cube: sizes and extents must be non-negative, names well formed and
//! dtypes known.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::arrays::ShapeComponent;
use crate::core::cube::HyperCube;
use crate::core::properties::ScalarValue;
use crate::core::types::{ArrayName, DType, DimName, Extent};

/// Parse a byte size such as `"4 GiB"`, `"512MB"` or `"1048576"`.
pub fn parse_byte_size(s: &str) -> Result<u64, ConfigError> {
    let s = s.trim();
    if let Ok(bytes) = s.parse::<u64>() {
        return Ok(bytes);
    }
    s.parse::<bytesize::ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid byte size '{s}': {e}")))
}

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// memory_budget = "4 GiB"
/// debug = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default memory budget for `hc fit`
    pub memory_budget: Option<String>,

    /// Enable debug output by default
    pub debug: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(budget) = &self.memory_budget {
            parse_byte_size(budget)?;
        }
        Ok(())
    }
}

/// A declared dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DimensionConfig {
    pub name: String,

    /// Signed so that negative sizes are reported instead of failing to parse
    pub global_size: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_extent: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_extent: Option<i64>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One entry of a declared array shape: a dimension name or a literal length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ShapeEntry {
    Length(i64),
    Dim(String),
}

/// A declared array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ArrayConfig {
    pub name: String,
    pub shape: Vec<ShapeEntry>,
    pub dtype: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A declared scalar property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PropertyConfig {
    pub name: String,
    pub dtype: String,
    pub default: ScalarValue,
}

/// A problem description.
///
/// # Example
///
/// ```toml
/// [[dimensions]]
/// name = "ntime"
/// global_size = 100
/// description = "Timesteps"
///
/// [[dimensions]]
/// name = "na"
/// global_size = 7
///
/// [[arrays]]
/// name = "uvw"
/// shape = ["ntime", "na", 3]
/// dtype = "float64"
///
/// [[properties]]
/// name = "ref_freq"
/// dtype = "float64"
/// default = 1.4e9
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProblemConfig {
    pub dimensions: Vec<DimensionConfig>,
    pub arrays: Vec<ArrayConfig>,
    pub properties: Vec<PropertyConfig>,
}

fn non_negative(value: i64, what: impl FnOnce() -> String) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| {
        ConfigError::InvalidValue(format!("{} must be non-negative, got {value}", what()))
    })
}

fn parse_dtype(name: &str, dtype: &str) -> Result<DType, ConfigError> {
    dtype
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("'{name}': {e}")))
}

impl DimensionConfig {
    /// Global size and initial extent, checked for sign.
    fn sizes(&self) -> Result<(usize, Extent), ConfigError> {
        let global_size = non_negative(self.global_size, || {
            format!("global size of dimension '{}'", self.name)
        })?;
        let lower = match self.lower_extent {
            Some(v) => non_negative(v, || format!("lower extent of dimension '{}'", self.name))?,
            None => 0,
        };
        let upper = match self.upper_extent {
            Some(v) => non_negative(v, || format!("upper extent of dimension '{}'", self.name))?,
            None => global_size,
        };
        Ok((global_size, Extent::new(lower, upper)))
    }
}

impl ArrayConfig {
    fn shape_components(&self) -> Result<Vec<ShapeComponent>, ConfigError> {
        self.shape
            .iter()
            .map(|entry| match entry {
                ShapeEntry::Length(len) => {
                    non_negative(*len, || format!("shape length of array '{}'", self.name))
                        .map(ShapeComponent::Literal)
                }
                ShapeEntry::Dim(dim) => DimName::new(dim.as_str())
                    .map(ShapeComponent::Dim)
                    .map_err(|e| ConfigError::InvalidValue(e.to_string())),
            })
            .collect()
    }
}

impl ProblemConfig {
    /// Validate the problem description without building a cube.
    ///
    /// Registration rules that depend on ordering (duplicates, unknown
    /// dimensions, extent bounds) are checked by [`build_cube`](Self::build_cube).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dim in &self.dimensions {
            DimName::new(dim.name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            dim.sizes()?;
        }

        for array in &self.arrays {
            ArrayName::new(array.name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            array.shape_components()?;
            parse_dtype(&array.name, &array.dtype)?;
        }

        for property in &self.properties {
            if property.name.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "property name cannot be empty".to_string(),
                ));
            }
            parse_dtype(&property.name, &property.dtype)?;
        }

        Ok(())
    }

    /// Register everything on a fresh cube, in file order.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for malformed values, `Cube` for registration failures.
    pub fn build_cube(&self) -> Result<HyperCube, ConfigError> {
        self.validate()?;
        let mut cube = HyperCube::new();

        for dim in &self.dimensions {
            let (global_size, extent) = dim.sizes()?;
            cube.register_dimension_with_extent(
                &dim.name,
                global_size,
                extent,
                dim.description.as_str(),
            )?;
        }

        for array in &self.arrays {
            let dtype = parse_dtype(&array.name, &array.dtype)?;
            cube.register_array(
                &array.name,
                array.shape_components()?,
                dtype,
                array.description.as_str(),
            )?;
        }

        for property in &self.properties {
            let dtype = parse_dtype(&property.name, &property.dtype)?;
            cube.register_property(&property.name, dtype, property.default)?;
        }

        Ok(cube)
    }

    /// Capture a cube, including its current extents.
    ///
    /// Fails if a size or extent does not fit the file format's `i64`.
    pub fn from_cube(cube: &HyperCube) -> Result<Self, ConfigError> {
        let dimensions = cube
            .dimensions()
            .map(|dim| {
                let name = dim.name().as_str();
                let full = dim.extent() == Extent::full(dim.global_size());
                let (lower_extent, upper_extent) = if full {
                    (None, None)
                } else {
                    (
                        Some(to_i64(dim.lower_extent(), name)?),
                        Some(to_i64(dim.upper_extent(), name)?),
                    )
                };
                Ok(DimensionConfig {
                    name: name.to_string(),
                    global_size: to_i64(dim.global_size(), name)?,
                    lower_extent,
                    upper_extent,
                    description: dim.description().to_string(),
                })
            })
            .collect::<Result<_, ConfigError>>()?;

        let arrays = cube
            .arrays()
            .map(|array| {
                let shape = array
                    .shape()
                    .iter()
                    .map(|component| match component {
                        ShapeComponent::Literal(len) => {
                            to_i64(*len, array.name().as_str()).map(ShapeEntry::Length)
                        }
                        ShapeComponent::Dim(dim) => Ok(ShapeEntry::Dim(dim.to_string())),
                    })
                    .collect::<Result<_, ConfigError>>()?;
                Ok(ArrayConfig {
                    name: array.name().to_string(),
                    shape,
                    dtype: array.dtype().to_string(),
                    description: array.description().to_string(),
                })
            })
            .collect::<Result<_, ConfigError>>()?;

        let properties = cube
            .properties()
            .map(|p| PropertyConfig {
                name: p.name().to_string(),
                dtype: p.dtype().to_string(),
                default: p.default_value(),
            })
            .collect();

        Ok(Self {
            dimensions,
            arrays,
            properties,
        })
    }
}

fn to_i64(value: usize, owner: &str) -> Result<i64, ConfigError> {
    i64::try_from(value).map_err(|_| {
        ConfigError::InvalidValue(format!("'{owner}': {value} does not fit in a problem file"))
    })
}
