//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`DimName`] - Validated dimension name
//! - [`ArrayName`] - Validated array name
//! - [`Extent`] - Half-open `[lower, upper)` window over a dimension
//! - [`DType`] - Element type with a fixed byte width
//!
//! # Validation
//!
//! Names are validated at construction time. Since dimension lists may be
//! given as a single delimited string (`"ntime,nbl:nchan nsrc"`), names can
//! never contain the list separators.
//!
//! # Examples
//!
//! ```
//! use hypercube::core::types::{DType, DimName, Extent};
//!
//! let name = DimName::new("ntime").unwrap();
//! assert_eq!(name.as_str(), "ntime");
//!
//! let extent = Extent::new(10, 25);
//! assert_eq!(extent.size(), 15);
//!
//! let dtype: DType = "complex128".parse().unwrap();
//! assert_eq!(dtype.size(), 16);
//!
//! assert!(DimName::new("bad,name").is_err());
//! assert!("float128".parse::<DType>().is_err());
//! ```

use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid dimension name: {0}")]
    InvalidDimName(String),

    #[error("invalid array name: {0}")]
    InvalidArrayName(String),

    #[error("unknown element type '{0}'")]
    UnknownDType(String),

    #[error("invalid axis length {0}")]
    InvalidLength(i64),
}

/// Characters that separate names in a delimited dimension list.
pub const NAME_SEPARATORS: [char; 3] = [',', ':', ';'];

/// Check the character rules shared by every registered name.
fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }

    for c in NAME_SEPARATORS {
        if name.contains(c) {
            return Err(format!("name '{name}' cannot contain '{c}'"));
        }
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!(
            "name '{}' cannot contain whitespace or control characters",
            name.escape_debug()
        ));
    }

    Ok(())
}

/// A validated dimension name.
///
/// # Example
///
/// ```
/// use hypercube::core::types::DimName;
///
/// assert!(DimName::new("nchan").is_ok());
/// assert!(DimName::new("").is_err());
/// assert!(DimName::new("two words").is_err());
/// assert!(DimName::new("a;b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimName(String);

impl DimName {
    /// Create a new validated dimension name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidDimName` if the name is empty or contains
    /// whitespace, control characters or list separators.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_name(&name).map_err(TypeError::InvalidDimName)?;
        Ok(Self(name))
    }

    /// Get the dimension name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DimName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DimName> for String {
    fn from(name: DimName) -> Self {
        name.0
    }
}

impl AsRef<str> for DimName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DimName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated array name. Same character rules as [`DimName`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArrayName(String);

impl ArrayName {
    /// Create a new validated array name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidArrayName` if the name is empty or contains
    /// whitespace, control characters or list separators.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_name(&name).map_err(TypeError::InvalidArrayName)?;
        Ok(Self(name))
    }

    /// Get the array name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ArrayName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ArrayName> for String {
    fn from(name: ArrayName) -> Self {
        name.0
    }
}

impl AsRef<str> for ArrayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArrayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The active half-open window `[lower, upper)` of a dimension.
///
/// An `Extent` carries no invariant of its own. Bounds are checked against
/// a dimension's global size when the extent is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub lower: usize,
    pub upper: usize,
}

impl Extent {
    /// Create an extent from its bounds.
    pub fn new(lower: usize, upper: usize) -> Self {
        Self { lower, upper }
    }

    /// The full extent `[0, size)`.
    pub fn full(size: usize) -> Self {
        Self::new(0, size)
    }

    /// Window length, `upper - lower`. Saturates to zero for inverted bounds.
    pub fn size(&self) -> usize {
        self.upper.saturating_sub(self.lower)
    }

    /// True when the window holds no indices.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Check `0 <= lower <= upper <= global_size`.
    pub fn fits_within(&self, global_size: usize) -> bool {
        self.lower <= self.upper && self.upper <= global_size
    }

    /// The window as an index range.
    pub fn as_range(&self) -> Range<usize> {
        self.lower..self.upper
    }
}

impl From<(usize, usize)> for Extent {
    fn from((lower, upper): (usize, usize)) -> Self {
        Self::new(lower, upper)
    }
}

impl From<Extent> for (usize, usize) {
    fn from(extent: Extent) -> Self {
        (extent.lower, extent.upper)
    }
}

impl From<Range<usize>> for Extent {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lower, self.upper)
    }
}

/// Element type of an array, carrying a fixed byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl DType {
    /// Every supported element type.
    pub const ALL: [DType; 13] = [
        DType::Bool,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    /// Width of one element in bytes.
    pub fn size(&self) -> u64 {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 | DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }

    /// Canonical name, e.g. `"complex128"`.
    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DType::Int8
                | DType::Int16
                | DType::Int32
                | DType::Int64
                | DType::UInt8
                | DType::UInt16
                | DType::UInt32
                | DType::UInt64
        )
    }

    /// Inclusive value range of an integer dtype, clamped to what an `i64`
    /// can hold. `None` for non-integer dtypes.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        let range = match self {
            DType::Int8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
            DType::Int16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
            DType::Int32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
            DType::Int64 => (i64::MIN, i64::MAX),
            DType::UInt8 => (0, i64::from(u8::MAX)),
            DType::UInt16 => (0, i64::from(u16::MAX)),
            DType::UInt32 => (0, i64::from(u32::MAX)),
            DType::UInt64 => (0, i64::MAX),
            _ => return None,
        };
        Some(range)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }
}

impl FromStr for DType {
    type Err = TypeError;

    /// Parse canonical names plus the short type codes (`f8`, `c16`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "?" => DType::Bool,
            "int8" | "i1" => DType::Int8,
            "int16" | "i2" => DType::Int16,
            "int32" | "i4" => DType::Int32,
            "int64" | "i8" => DType::Int64,
            "uint8" | "u1" => DType::UInt8,
            "uint16" | "u2" => DType::UInt16,
            "uint32" | "u4" => DType::UInt32,
            "uint64" | "u8" => DType::UInt64,
            "float32" | "f4" => DType::Float32,
            "float64" | "f8" | "double" => DType::Float64,
            "complex64" | "c8" => DType::Complex64,
            "complex128" | "c16" => DType::Complex128,
            _ => return Err(TypeError::UnknownDType(s.to_string())),
        };
        Ok(dtype)
    }
}

impl TryFrom<String> for DType {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DType> for String {
    fn from(dtype: DType) -> Self {
        dtype.name().to_string()
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
