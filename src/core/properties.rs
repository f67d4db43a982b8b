//! core::properties
//!
//! Scalar problem properties (reference frequency, integration time, ...).
//!
//! Properties sit beside dimensions and arrays on a cube. They carry a
//! dtype and every value written to them is coerced to it, so a property
//! registered as `int32` always reads back as an integer.

use serde::{Deserialize, Serialize};

use super::types::DType;

/// A scalar value as written by a caller or read from a problem file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    /// Coerce to the representation of `dtype`.
    ///
    /// Floats truncate toward zero when stored as integers; booleans map to
    /// and from `0`/`1`. Returns `None` for dtypes that cannot hold a scalar
    /// property (complex types) and for integers outside the dtype's range.
    pub fn coerce(self, dtype: DType) -> Option<ScalarValue> {
        if dtype == DType::Bool {
            return Some(ScalarValue::Bool(match self {
                ScalarValue::Bool(b) => b,
                ScalarValue::Int(i) => i != 0,
                ScalarValue::Float(f) => f != 0.0,
            }));
        }

        if let Some((min, max)) = dtype.integer_range() {
            let value = match self {
                ScalarValue::Bool(b) => i64::from(b),
                ScalarValue::Int(i) => i,
                ScalarValue::Float(f) => {
                    let f = f.trunc();
                    // NaN fails both comparisons
                    if !(f >= min as f64 && f <= max as f64) {
                        return None;
                    }
                    f as i64
                }
            };
            return (min..=max).contains(&value).then_some(ScalarValue::Int(value));
        }

        if dtype.is_float() {
            let value = match self {
                ScalarValue::Bool(b) => f64::from(u8::from(b)),
                ScalarValue::Int(i) => i as f64,
                ScalarValue::Float(f) => f,
            };
            let value = if dtype == DType::Float32 {
                f64::from(value as f32)
            } else {
                value
            };
            return Some(ScalarValue::Float(value));
        }

        None
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A registered property with its default and current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    name: String,
    dtype: DType,
    default: ScalarValue,
    value: ScalarValue,
}

impl Property {
    /// Create a property whose value starts at the coerced default.
    ///
    /// Returns `None` if `dtype` cannot hold the default.
    pub(crate) fn new(name: String, dtype: DType, default: ScalarValue) -> Option<Self> {
        let default = default.coerce(dtype)?;
        Some(Self {
            name,
            dtype,
            default,
            value: default,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn default_value(&self) -> ScalarValue {
        self.default
    }

    pub fn value(&self) -> ScalarValue {
        self.value
    }

    pub(crate) fn set(&mut self, value: ScalarValue) -> Option<ScalarValue> {
        let coerced = value.coerce(self.dtype)?;
        self.value = coerced;
        Some(coerced)
    }
}
