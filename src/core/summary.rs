//! core::summary
//!
//! Serialisable snapshot of a cube's tables, used for `--json` output and by
//! the table renderer.

use serde::Serialize;

use super::arrays::ShapeComponent;
use super::cube::{CubeError, HyperCube};
use super::properties::ScalarValue;
use super::types::DType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    pub name: String,
    pub description: String,
    pub global_size: usize,
    pub lower_extent: usize,
    pub upper_extent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySummary {
    pub name: String,
    pub description: String,
    pub shape: Vec<ShapeComponent>,
    /// Concrete shape under the current extents.
    pub extent_shape: Vec<usize>,
    pub dtype: DType,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub dtype: DType,
    pub default: ScalarValue,
    pub value: ScalarValue,
}

/// Everything registered on a cube, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeSummary {
    pub dimensions: Vec<DimensionSummary>,
    pub arrays: Vec<ArraySummary>,
    pub properties: Vec<PropertySummary>,
    /// Local memory usage in bytes.
    pub total_bytes: u64,
}

impl HyperCube {
    /// Capture the current tables.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if an array size overflows.
    pub fn summary(&self) -> Result<CubeSummary, CubeError> {
        let dimensions = self
            .dimensions()
            .map(|dim| DimensionSummary {
                name: dim.name().to_string(),
                description: dim.description().to_string(),
                global_size: dim.global_size(),
                lower_extent: dim.lower_extent(),
                upper_extent: dim.upper_extent(),
            })
            .collect();

        let arrays = self
            .arrays()
            .map(|array| {
                let name = array.name().as_str();
                Ok(ArraySummary {
                    name: name.to_string(),
                    description: array.description().to_string(),
                    shape: array.shape().to_vec(),
                    extent_shape: self.array_shape(name)?,
                    dtype: array.dtype(),
                    bytes: self.array_size(name)?,
                })
            })
            .collect::<Result<Vec<_>, CubeError>>()?;

        let properties = self
            .properties()
            .map(|p| PropertySummary {
                name: p.name().to_string(),
                dtype: p.dtype(),
                default: p.default_value(),
                value: p.value(),
            })
            .collect();

        Ok(CubeSummary {
            dimensions,
            arrays,
            properties,
            total_bytes: self.bytes_required()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn summary_reflects_extents() {
        let mut cube = HyperCube::new();
        cube.register_dimension("ntime", 10, "Timesteps").unwrap();
        cube.register_array("uvw", shape!["ntime", 3].unwrap(), DType::Float64, "UVW coordinates")
            .unwrap();
        cube.register_property("ref_freq", DType::Float64, 1.5e9)
            .unwrap();
        cube.update_dimension("ntime", 2, 6).unwrap();

        let summary = cube.summary().unwrap();
        assert_eq!(summary.dimensions[0].lower_extent, 2);
        assert_eq!(summary.dimensions[0].description, "Timesteps");
        assert_eq!(summary.arrays[0].extent_shape, vec![4, 3]);
        assert_eq!(summary.arrays[0].bytes, 4 * 3 * 8);
        assert_eq!(summary.total_bytes, 96);
        assert_eq!(summary.properties[0].value, ScalarValue::Float(1.5e9));
    }

    #[test]
    fn summary_json_shape() {
        let mut cube = HyperCube::new();
        cube.register_dimension("na", 7, "").unwrap();
        cube.register_array("ant", shape!["na", 2].unwrap(), DType::Int32, "")
            .unwrap();

        let json = serde_json::to_value(cube.summary().unwrap()).unwrap();
        assert_eq!(json["arrays"][0]["shape"], serde_json::json!(["na", 2]));
        assert_eq!(json["arrays"][0]["dtype"], "int32");
        assert_eq!(json["total_bytes"], 56);
    }
}
