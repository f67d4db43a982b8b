//! core::arrays
//!
//! Symbolic array schemas.
//!
//! An array's shape is a list of [`ShapeComponent`]s, each either a
//! reference to a registered dimension or a fixed literal length. Schemas
//! never store a size; sizes are resolved against the current dimension
//! extents every time they are asked for (see [`ArraySchema::resolve_shape`]).

use serde::{Deserialize, Serialize};

use super::types::{ArrayName, DType, DimName, TypeError};

/// One axis of an array shape.
///
/// Serialised untagged, so a shape reads naturally in TOML and JSON:
/// `["ntime", "nbl", 3]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeComponent {
    /// A fixed-length axis not tied to any dimension.
    Literal(usize),
    /// An axis whose length is the current extent size of a dimension.
    Dim(DimName),
}

impl ShapeComponent {
    /// The referenced dimension, if any.
    pub fn dim_name(&self) -> Option<&DimName> {
        match self {
            ShapeComponent::Dim(name) => Some(name),
            ShapeComponent::Literal(_) => None,
        }
    }
}

impl From<usize> for ShapeComponent {
    fn from(len: usize) -> Self {
        ShapeComponent::Literal(len)
    }
}

impl From<DimName> for ShapeComponent {
    fn from(name: DimName) -> Self {
        ShapeComponent::Dim(name)
    }
}

impl std::fmt::Display for ShapeComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeComponent::Literal(len) => write!(f, "{len}"),
            ShapeComponent::Dim(name) => write!(f, "{name}"),
        }
    }
}

/// Build a shape from a mix of dimension names and literal lengths.
///
/// Evaluates to `Result<Vec<ShapeComponent>, TypeError>`; names are
/// validated as they are converted.
///
/// ```
/// use hypercube::shape;
/// use hypercube::core::arrays::ShapeComponent;
///
/// let s = shape!["ntime", "nbl", 3].unwrap();
/// assert_eq!(s.len(), 3);
/// assert_eq!(s[2], ShapeComponent::Literal(3));
///
/// assert!(shape!["bad name", 3].is_err());
/// ```
#[macro_export]
macro_rules! shape {
    ( $( $component:expr ),* $(,)? ) => {
        (|| -> ::std::result::Result<
            ::std::vec::Vec<$crate::core::arrays::ShapeComponent>,
            $crate::core::types::TypeError,
        > {
            ::std::result::Result::Ok(::std::vec![
                $( $crate::core::arrays::TryIntoShapeComponent::try_into_shape_component($component)? ),*
            ])
        })()
    };
}

/// Fallible conversion used by the [`shape!`] macro.
pub trait TryIntoShapeComponent {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError>;
}

impl TryIntoShapeComponent for usize {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        Ok(ShapeComponent::Literal(self))
    }
}

impl TryIntoShapeComponent for i32 {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        usize::try_from(self)
            .map(ShapeComponent::Literal)
            .map_err(|_| TypeError::InvalidLength(i64::from(self)))
    }
}

impl TryIntoShapeComponent for i64 {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        usize::try_from(self)
            .map(ShapeComponent::Literal)
            .map_err(|_| TypeError::InvalidLength(self))
    }
}

impl TryIntoShapeComponent for &str {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        DimName::new(self).map(ShapeComponent::Dim)
    }
}

impl TryIntoShapeComponent for DimName {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        Ok(ShapeComponent::Dim(self))
    }
}

impl TryIntoShapeComponent for ShapeComponent {
    fn try_into_shape_component(self) -> Result<ShapeComponent, TypeError> {
        Ok(self)
    }
}

/// A named array defined over dimensions and literal axis lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArraySchema {
    name: ArrayName,
    shape: Vec<ShapeComponent>,
    dtype: DType,
    description: String,
}

impl ArraySchema {
    pub(crate) fn new(
        name: ArrayName,
        shape: Vec<ShapeComponent>,
        dtype: DType,
        description: String,
    ) -> Self {
        Self {
            name,
            shape,
            dtype,
            description,
        }
    }

    pub fn name(&self) -> &ArrayName {
        &self.name
    }

    pub fn shape(&self) -> &[ShapeComponent] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Dimensions referenced by the shape, in axis order.
    pub fn dim_names(&self) -> impl Iterator<Item = &DimName> {
        self.shape.iter().filter_map(ShapeComponent::dim_name)
    }

    /// True if any axis refers to `name`.
    pub fn references(&self, name: &str) -> bool {
        self.dim_names().any(|d| d.as_str() == name)
    }

    /// Resolve the symbolic shape to concrete axis lengths.
    ///
    /// `extent_size` maps a dimension name to its current extent size and
    /// returns `None` for unknown dimensions; the first unknown name is
    /// returned as the error.
    pub fn resolve_shape<F>(&self, mut extent_size: F) -> Result<Vec<usize>, DimName>
    where
        F: FnMut(&DimName) -> Option<usize>,
    {
        self.shape
            .iter()
            .map(|component| match component {
                ShapeComponent::Literal(len) => Ok(*len),
                ShapeComponent::Dim(name) => extent_size(name).ok_or_else(|| name.clone()),
            })
            .collect()
    }

    /// Shape rendered as `(ntime,nbl,3)`.
    pub fn shape_string(&self) -> String {
        let parts: Vec<String> = self.shape.iter().map(ToString::to_string).collect();
        format!("({})", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uvw() -> ArraySchema {
        ArraySchema::new(
            ArrayName::new("uvw").unwrap(),
            crate::shape!["ntime", "nbl", 3].unwrap(),
            DType::Float64,
            String::new(),
        )
    }

    #[test]
    fn shape_macro_mixes_names_and_literals() {
        let s = crate::shape!["ntime", 4usize, "nchan"].unwrap();
        assert_eq!(
            s,
            vec![
                ShapeComponent::Dim(DimName::new("ntime").unwrap()),
                ShapeComponent::Literal(4),
                ShapeComponent::Dim(DimName::new("nchan").unwrap()),
            ]
        );
    }

    #[test]
    fn shape_macro_rejects_bad_input() {
        assert_eq!(
            crate::shape!["ntime", -1].unwrap_err(),
            TypeError::InvalidLength(-1)
        );
        assert!(crate::shape!["n chan"].is_err());
    }

    #[test]
    fn dim_names_skip_literals() {
        let binding = uvw();
        let names: Vec<&str> = binding.dim_names().map(DimName::as_str).collect();
        assert_eq!(names, vec!["ntime", "nbl"]);
        assert!(uvw().references("nbl"));
        assert!(!uvw().references("nchan"));
    }

    #[test]
    fn resolve_shape_uses_lookup() {
        let shape = uvw()
            .resolve_shape(|name| match name.as_str() {
                "ntime" => Some(10),
                "nbl" => Some(21),
                _ => None,
            })
            .unwrap();
        assert_eq!(shape, vec![10, 21, 3]);
    }

    #[test]
    fn resolve_shape_reports_unknown() {
        let err = uvw()
            .resolve_shape(|name| (name.as_str() == "ntime").then_some(10))
            .unwrap_err();
        assert_eq!(err.as_str(), "nbl");
    }

    #[test]
    fn shape_string() {
        assert_eq!(uvw().shape_string(), "(ntime,nbl,3)");
    }

    #[test]
    fn untagged_serde() {
        let json = serde_json::to_string(uvw().shape()).unwrap();
        assert_eq!(json, r#"["ntime","nbl",3]"#);
        let parsed: Vec<ShapeComponent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uvw().shape());
    }
}
