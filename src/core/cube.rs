//! core::cube
//!
//! The dimension/array registry.
//!
//! # Overview
//!
//! A [`HyperCube`] owns every [`Dimension`], [`ArraySchema`] and
//! [`Property`] of one problem description. Dimensions, arrays and
//! properties live in separate name spaces and are kept in registration
//! order.
//!
//! # Invariants
//!
//! - Every dimension satisfies `0 <= lower <= upper <= global_size`
//! - Every dimension referenced by an array shape is registered
//! - Array sizes are derived from current extents on every query, never
//!   stored
//! - `Clone` produces a fully independent copy
//!
//! # Concurrency
//!
//! The cube does no locking. Registration and extent updates take
//! `&mut self`; callers sharing a cube across threads wrap it in their own
//! lock, or hand each consumer a snapshot (see [`HyperCube::cube_iter`]).
//!
//! # Example
//!
//! ```
//! use hypercube::core::cube::HyperCube;
//! use hypercube::core::types::DType;
//! use hypercube::shape;
//!
//! let mut cube = HyperCube::new();
//! cube.register_dimension("ntime", 100, "Timesteps").unwrap();
//! cube.register_dimension("nchan", 64, "Channels").unwrap();
//! cube.register_array("vis", shape!["ntime", "nchan", 4].unwrap(), DType::Complex128, "")
//!     .unwrap();
//!
//! assert_eq!(cube.array_size("vis").unwrap(), 100 * 64 * 4 * 16);
//!
//! cube.update_dimension("ntime", 0, 10).unwrap();
//! assert_eq!(cube.array_size("vis").unwrap(), 10 * 64 * 4 * 16);
//! ```

use std::borrow::Borrow;
use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::arrays::{ArraySchema, ShapeComponent};
use super::dims::{Dimension, ExtentViolation};
use super::properties::{Property, ScalarValue};
use super::types::{ArrayName, DType, DimName, Extent, TypeError, NAME_SEPARATORS};

/// Which name space a duplicate registration collided in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Dimension,
    Array,
    Property,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NameKind::Dimension => "dimension",
            NameKind::Array => "array",
            NameKind::Property => "property",
        })
    }
}

/// Errors from registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CubeError {
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: NameKind, name: String },

    #[error("dimension '{0}' is not registered")]
    UnknownDimension(String),

    #[error("array '{0}' is not registered")]
    UnknownArray(String),

    #[error("property '{0}' is not registered")]
    UnknownProperty(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A batch update failed at entry `index`. Earlier entries may have
    /// been applied.
    #[error("update #{index} of dimension '{name}' failed: {source}")]
    BatchUpdate {
        index: usize,
        name: String,
        source: Box<CubeError>,
    },
}

impl CubeError {
    /// The underlying error with any batch context removed.
    pub fn root(&self) -> &CubeError {
        match self {
            CubeError::BatchUpdate { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<TypeError> for CubeError {
    fn from(e: TypeError) -> Self {
        CubeError::InvalidValue(e.to_string())
    }
}

impl From<ExtentViolation> for CubeError {
    fn from(v: ExtentViolation) -> Self {
        CubeError::InvalidValue(v.to_string())
    }
}

/// One dimension update instruction, as produced by [`HyperCube::dim_iter`]
/// and consumed by [`HyperCube::update_dimensions`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionUpdate {
    pub name: String,
    pub lower_extent: usize,
    pub upper_extent: usize,
}

impl DimensionUpdate {
    pub fn new(name: impl Into<String>, lower_extent: usize, upper_extent: usize) -> Self {
        Self {
            name: name.into(),
            lower_extent,
            upper_extent,
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.lower_extent, self.upper_extent)
    }
}

/// Split a delimited dimension list such as `"ntime,nbl:nchan nsrc"`.
///
/// Accepts `,`, `:`, `;` and whitespace as separators and skips empty
/// entries.
///
/// ```
/// use hypercube::core::cube::split_dim_names;
///
/// let names: Vec<&str> = split_dim_names("ntime,nbl:nchan  nsrc").collect();
/// assert_eq!(names, vec!["ntime", "nbl", "nchan", "nsrc"]);
/// ```
pub fn split_dim_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| NAME_SEPARATORS.contains(&c) || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// Registry of dimensions, arrays and properties for one problem.
#[derive(Debug, Clone, Default)]
pub struct HyperCube {
    dims: IndexMap<String, Dimension>,
    arrays: IndexMap<String, ArraySchema>,
    properties: IndexMap<String, Property>,
}

impl HyperCube {
    /// Create an empty cube.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a dimension spanning `[0, global_size)`.
    ///
    /// # Errors
    ///
    /// - `DuplicateName` if a dimension of that name exists
    /// - `InvalidValue` if the name is malformed
    pub fn register_dimension(
        &mut self,
        name: &str,
        global_size: usize,
        description: impl Into<String>,
    ) -> Result<&Dimension, CubeError> {
        self.register_dimension_with_extent(
            name,
            global_size,
            Extent::full(global_size),
            description,
        )
    }

    /// Register a dimension with an explicit initial extent.
    ///
    /// # Errors
    ///
    /// As [`register_dimension`](Self::register_dimension), plus
    /// `InvalidValue` if the extent does not fit the global size.
    pub fn register_dimension_with_extent(
        &mut self,
        name: &str,
        global_size: usize,
        extent: Extent,
        description: impl Into<String>,
    ) -> Result<&Dimension, CubeError> {
        let dim_name = DimName::new(name)?;
        if self.dims.contains_key(name) {
            return Err(CubeError::DuplicateName {
                kind: NameKind::Dimension,
                name: name.to_string(),
            });
        }

        let dim = Dimension::with_extent(dim_name, global_size, extent)?
            .with_description(description);
        Ok(self.insert_dimension(dim))
    }

    /// Register already-built dimensions, stopping at the first failure.
    pub fn register_dimensions<I>(&mut self, dims: I) -> Result<(), CubeError>
    where
        I: IntoIterator<Item = Dimension>,
    {
        for dim in dims {
            if self.dims.contains_key(dim.name().as_str()) {
                return Err(CubeError::DuplicateName {
                    kind: NameKind::Dimension,
                    name: dim.name().to_string(),
                });
            }
            self.insert_dimension(dim);
        }
        Ok(())
    }

    fn insert_dimension(&mut self, dim: Dimension) -> &Dimension {
        let entry = self.dims.entry(dim.name().to_string());
        entry.or_insert(dim)
    }

    /// Register an array over registered dimensions and literal lengths.
    ///
    /// On failure the array set is unchanged.
    ///
    /// # Errors
    ///
    /// - `DuplicateName` if an array of that name exists
    /// - `UnknownDimension` for a shape entry naming an unregistered dimension
    /// - `InvalidValue` for a zero literal or a malformed name
    pub fn register_array(
        &mut self,
        name: &str,
        shape: Vec<ShapeComponent>,
        dtype: DType,
        description: impl Into<String>,
    ) -> Result<&ArraySchema, CubeError> {
        let array_name = ArrayName::new(name)?;
        if self.arrays.contains_key(name) {
            return Err(CubeError::DuplicateName {
                kind: NameKind::Array,
                name: name.to_string(),
            });
        }

        for (axis, component) in shape.iter().enumerate() {
            match component {
                ShapeComponent::Literal(0) => {
                    return Err(CubeError::InvalidValue(format!(
                        "array '{name}' axis {axis} has literal length 0, must be positive"
                    )));
                }
                ShapeComponent::Literal(_) => {}
                ShapeComponent::Dim(dim) => {
                    if !self.dims.contains_key(dim.as_str()) {
                        return Err(CubeError::UnknownDimension(dim.to_string()));
                    }
                }
            }
        }

        let schema = ArraySchema::new(array_name, shape, dtype, description.into());
        Ok(self.arrays.entry(name.to_string()).or_insert(schema))
    }

    /// Register a scalar property.
    ///
    /// # Errors
    ///
    /// - `DuplicateName` if a property of that name exists
    /// - `InvalidValue` for an empty name, a dtype that cannot hold a
    ///   scalar (complex types) or a default outside the dtype's range
    pub fn register_property(
        &mut self,
        name: &str,
        dtype: DType,
        default: impl Into<ScalarValue>,
    ) -> Result<&Property, CubeError> {
        if name.is_empty() {
            return Err(CubeError::InvalidValue(
                "property name cannot be empty".into(),
            ));
        }
        if self.properties.contains_key(name) {
            return Err(CubeError::DuplicateName {
                kind: NameKind::Property,
                name: name.to_string(),
            });
        }

        let default = default.into();
        let property = Property::new(name.to_string(), dtype, default).ok_or_else(|| {
            CubeError::InvalidValue(format!("property '{name}' of dtype {dtype} cannot hold {default}"))
        })?;
        Ok(self.properties.entry(name.to_string()).or_insert(property))
    }

    /// Set a property, returning the value as stored after coercion.
    pub fn set_property(
        &mut self,
        name: &str,
        value: impl Into<ScalarValue>,
    ) -> Result<ScalarValue, CubeError> {
        let property = self
            .properties
            .get_mut(name)
            .ok_or_else(|| CubeError::UnknownProperty(name.to_string()))?;
        let dtype = property.dtype();
        let value = value.into();
        property.set(value).ok_or_else(|| {
            CubeError::InvalidValue(format!("property '{name}' of dtype {dtype} cannot hold {value}"))
        })
    }

    // =========================================================================
    // Lookup and enumeration
    // =========================================================================

    pub fn dimension(&self, name: &str) -> Result<&Dimension, CubeError> {
        self.dims
            .get(name)
            .ok_or_else(|| CubeError::UnknownDimension(name.to_string()))
    }

    /// Registration position of a dimension.
    pub(crate) fn dimension_slot(&self, name: &str) -> Result<usize, CubeError> {
        self.dims
            .get_index_of(name)
            .ok_or_else(|| CubeError::UnknownDimension(name.to_string()))
    }

    /// Narrow the dimension at `slot` to a window of its current extent.
    pub(crate) fn narrow_dimension(&mut self, slot: usize, window: Extent) {
        self.dims[slot].narrow_to(window);
    }

    pub fn array(&self, name: &str) -> Result<&ArraySchema, CubeError> {
        self.arrays
            .get(name)
            .ok_or_else(|| CubeError::UnknownArray(name.to_string()))
    }

    pub fn property(&self, name: &str) -> Result<&Property, CubeError> {
        self.properties
            .get(name)
            .ok_or_else(|| CubeError::UnknownProperty(name.to_string()))
    }

    /// Dimensions in registration order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dims.values()
    }

    /// Arrays in registration order.
    pub fn arrays(&self) -> impl Iterator<Item = &ArraySchema> {
        self.arrays.values()
    }

    /// Properties in registration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dims.contains_key(name)
    }

    pub fn has_array(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    // =========================================================================
    // Extent queries
    // =========================================================================

    fn dim_attribute<I, S, T, F>(&self, names: I, attr: F) -> Result<Vec<T>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&Dimension) -> T,
    {
        names
            .into_iter()
            .map(|name| self.dimension(name.as_ref()).map(&attr))
            .collect()
    }

    /// Global sizes of the named dimensions, in request order.
    pub fn dim_global_size<I, S>(&self, names: I) -> Result<Vec<usize>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, Dimension::global_size)
    }

    /// Lower extents of the named dimensions, in request order.
    pub fn dim_lower_extent<I, S>(&self, names: I) -> Result<Vec<usize>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, Dimension::lower_extent)
    }

    /// Upper extents of the named dimensions, in request order.
    pub fn dim_upper_extent<I, S>(&self, names: I) -> Result<Vec<usize>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, Dimension::upper_extent)
    }

    /// Window lengths (`upper - lower`) of the named dimensions.
    pub fn dim_extent_size<I, S>(&self, names: I) -> Result<Vec<usize>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, Dimension::extent_size)
    }

    /// `(lower, upper)` extents of the named dimensions.
    ///
    /// ```
    /// use hypercube::core::cube::{split_dim_names, HyperCube};
    ///
    /// let mut cube = HyperCube::new();
    /// cube.register_dimension("ntime", 10, "").unwrap();
    /// cube.register_dimension("na", 7, "").unwrap();
    /// cube.update_dimension("ntime", 2, 5).unwrap();
    ///
    /// let extents = cube.dim_extents(split_dim_names("ntime,na")).unwrap();
    /// assert_eq!(extents[0].as_range(), 2..5);
    /// assert_eq!(extents[1].as_range(), 0..7);
    /// ```
    pub fn dim_extents<I, S>(&self, names: I) -> Result<Vec<Extent>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, Dimension::extent)
    }

    /// Mapping of dimension name to global size.
    pub fn dim_global_sizes(&self) -> IndexMap<String, usize> {
        self.dim_map(Dimension::global_size)
    }

    /// Mapping of dimension name to lower extent.
    pub fn dim_lower_extents(&self) -> IndexMap<String, usize> {
        self.dim_map(Dimension::lower_extent)
    }

    /// Mapping of dimension name to upper extent.
    pub fn dim_upper_extents(&self) -> IndexMap<String, usize> {
        self.dim_map(Dimension::upper_extent)
    }

    fn dim_map(&self, attr: impl Fn(&Dimension) -> usize) -> IndexMap<String, usize> {
        self.dims
            .iter()
            .map(|(name, dim)| (name.clone(), attr(dim)))
            .collect()
    }

    // =========================================================================
    // Extent updates
    // =========================================================================

    /// Replace both extent bounds of a dimension.
    ///
    /// # Errors
    ///
    /// - `UnknownDimension` if `name` is not registered
    /// - `InvalidValue` if `0 <= lower <= upper <= global_size` fails; the
    ///   dimension keeps its previous extent
    pub fn update_dimension(
        &mut self,
        name: &str,
        lower_extent: usize,
        upper_extent: usize,
    ) -> Result<(), CubeError> {
        let dim = self
            .dims
            .get_mut(name)
            .ok_or_else(|| CubeError::UnknownDimension(name.to_string()))?;
        dim.set_extent(Extent::new(lower_extent, upper_extent))?;
        Ok(())
    }

    /// Apply a batch of updates in order.
    ///
    /// This is NOT atomic: if entry `i` fails, entries `0..i` stay applied.
    /// The error is `BatchUpdate` naming the failing entry. Use
    /// [`update_dimensions_atomic`](Self::update_dimensions_atomic) for
    /// all-or-nothing semantics.
    pub fn update_dimensions<I, U>(&mut self, updates: I) -> Result<(), CubeError>
    where
        I: IntoIterator<Item = U>,
        U: Borrow<DimensionUpdate>,
    {
        for (index, update) in updates.into_iter().enumerate() {
            let update = update.borrow();
            self.update_dimension(&update.name, update.lower_extent, update.upper_extent)
                .map_err(|source| CubeError::BatchUpdate {
                    index,
                    name: update.name.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Apply a batch of updates only if every entry is valid.
    ///
    /// Validity of an update depends only on the dimension's global size, so
    /// checking each entry up front is equivalent to applying them in order.
    pub fn update_dimensions_atomic<I, U>(&mut self, updates: I) -> Result<(), CubeError>
    where
        I: IntoIterator<Item = U>,
        U: Borrow<DimensionUpdate>,
    {
        let updates: Vec<U> = updates.into_iter().collect();

        for (index, update) in updates.iter().enumerate() {
            let update = update.borrow();
            let checked = self
                .dimension(&update.name)
                .and_then(|dim| dim.check_extent(update.extent()).map_err(CubeError::from));
            checked.map_err(|source| CubeError::BatchUpdate {
                index,
                name: update.name.clone(),
                source: Box::new(source),
            })?;
        }

        self.update_dimensions(updates)
    }

    // =========================================================================
    // Array sizes
    // =========================================================================

    fn extent_size_of(&self, name: &DimName) -> Option<usize> {
        self.dims.get(name.as_str()).map(Dimension::extent_size)
    }

    /// Concrete shape of an array under the current extents.
    pub fn array_shape(&self, name: &str) -> Result<Vec<usize>, CubeError> {
        let schema = self.array(name)?;
        schema
            .resolve_shape(|dim| self.extent_size_of(dim))
            .map_err(|dim| CubeError::UnknownDimension(dim.to_string()))
    }

    /// Size in bytes of an array under the current extents.
    ///
    /// # Errors
    ///
    /// - `UnknownArray` if the array is not registered
    /// - `InvalidValue` if the size overflows `u64`
    pub fn array_size(&self, name: &str) -> Result<u64, CubeError> {
        let schema = self.array(name)?;
        self.schema_bytes(schema, |dim| self.extent_size_of(dim))
    }

    fn schema_bytes<F>(&self, schema: &ArraySchema, extent_size: F) -> Result<u64, CubeError>
    where
        F: FnMut(&DimName) -> Option<usize>,
    {
        let shape = schema
            .resolve_shape(extent_size)
            .map_err(|dim| CubeError::UnknownDimension(dim.to_string()))?;

        shape
            .iter()
            .try_fold(schema.dtype().size(), |acc, &len| {
                u64::try_from(len).ok().and_then(|len| acc.checked_mul(len))
            })
            .ok_or_else(|| {
                CubeError::InvalidValue(format!("size of array '{}' overflows", schema.name()))
            })
    }

    fn total_bytes<F>(&self, extent_size: F) -> Result<u64, CubeError>
    where
        F: Fn(&DimName) -> Option<usize>,
    {
        self.arrays.values().try_fold(0u64, |acc, schema| {
            let bytes = self.schema_bytes(schema, &extent_size)?;
            acc.checked_add(bytes)
                .ok_or_else(|| CubeError::InvalidValue("total array size overflows".into()))
        })
    }

    /// Local memory usage: the summed size of every registered array.
    pub fn bytes_required(&self) -> Result<u64, CubeError> {
        self.total_bytes(|dim| self.extent_size_of(dim))
    }

    /// Per-axis extents of an array. A literal axis of length `n` yields
    /// `[0, n)`.
    pub fn array_extents(&self, name: &str) -> Result<Vec<Extent>, CubeError> {
        let schema = self.array(name)?;
        schema
            .shape()
            .iter()
            .map(|component| match component {
                ShapeComponent::Literal(len) => Ok(Extent::full(*len)),
                ShapeComponent::Dim(dim) => self.dimension(dim.as_str()).map(Dimension::extent),
            })
            .collect()
    }

    /// Per-axis index ranges selecting an array's current window out of
    /// its global extent.
    pub fn array_slice_index(&self, name: &str) -> Result<Vec<Range<usize>>, CubeError> {
        Ok(self
            .array_extents(name)?
            .iter()
            .map(Extent::as_range)
            .collect())
    }

    /// Index ranges of the named dimensions' current windows.
    pub fn slice_index<I, S>(&self, names: I) -> Result<Vec<Range<usize>>, CubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dim_attribute(names, |dim| dim.extent().as_range())
    }

    /// Largest window length along `name` that keeps the local memory usage
    /// within `budget` bytes.
    ///
    /// The window is taken from the dimension's current lower extent, other
    /// dimensions keep their current extents, and the cube is not modified.
    ///
    /// # Errors
    ///
    /// - `UnknownDimension` if `name` is not registered
    /// - `InvalidValue` if the extent is empty or a window of length 1
    ///   already exceeds the budget
    pub fn max_tile_size(&self, name: &str, budget: u64) -> Result<usize, CubeError> {
        let dim = self.dimension(name)?;
        let available = dim.extent_size();
        if available == 0 {
            return Err(CubeError::InvalidValue(format!(
                "dimension '{name}' has an empty extent"
            )));
        }

        // A window whose byte total overflows cannot fit any budget.
        let fits = |len: usize| -> Result<bool, CubeError> {
            let bytes = self.total_bytes(|d| {
                if d.as_str() == name {
                    Some(len)
                } else {
                    self.extent_size_of(d)
                }
            });
            match bytes {
                Ok(bytes) => Ok(bytes <= budget),
                Err(CubeError::InvalidValue(_)) => Ok(false),
                Err(e) => Err(e),
            }
        };

        if fits(available)? {
            return Ok(available);
        }
        if !fits(1)? {
            return Err(CubeError::InvalidValue(format!(
                "a single step of dimension '{name}' needs more than {budget} bytes"
            )));
        }

        // Usage grows monotonically with the window length.
        let (mut largest, mut exceeds) = (1usize, available);
        while exceeds - largest > 1 {
            let mid = largest + (exceeds - largest) / 2;
            if fits(mid)? {
                largest = mid;
            } else {
                exceeds = mid;
            }
        }
        Ok(largest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    /// The visibility problem from the module docs, small enough to reason about.
    fn vis_cube() -> HyperCube {
        let mut cube = HyperCube::new();
        cube.register_dimension("ntime", 100, "Timesteps").unwrap();
        cube.register_dimension("nbl", 21, "Baselines").unwrap();
        cube.register_dimension("nchan", 64, "Channels").unwrap();
        cube.register_dimension("nsrc", 10, "Sources").unwrap();
        cube.register_array(
            "vis",
            shape!["ntime", "nbl", "nchan", 4].unwrap(),
            DType::Complex128,
            "",
        )
        .unwrap();
        cube.register_array("uvw", shape!["ntime", "nbl", 3].unwrap(), DType::Float64, "")
            .unwrap();
        cube.register_array("lm", shape!["nsrc", 2].unwrap(), DType::Float32, "")
            .unwrap();
        cube
    }

    mod registration {
        use super::*;

        #[test]
        fn dimension_starts_at_full_extent() {
            let mut cube = HyperCube::new();
            let dim = cube.register_dimension("ntime", 2016, "").unwrap();
            assert_eq!(dim.extent(), Extent::new(0, 2016));
        }

        #[test]
        fn duplicate_dimension_rejected() {
            let mut cube = HyperCube::new();
            cube.register_dimension("ntime", 100, "").unwrap();
            cube.update_dimension("ntime", 10, 20).unwrap();

            let err = cube.register_dimension("ntime", 500, "").unwrap_err();
            assert_eq!(
                err,
                CubeError::DuplicateName {
                    kind: NameKind::Dimension,
                    name: "ntime".into()
                }
            );

            let dim = cube.dimension("ntime").unwrap();
            assert_eq!(dim.global_size(), 100);
            assert_eq!(dim.extent(), Extent::new(10, 20));
        }

        #[test]
        fn invalid_name_rejected() {
            let mut cube = HyperCube::new();
            assert!(matches!(
                cube.register_dimension("n time", 10, ""),
                Err(CubeError::InvalidValue(_))
            ));
        }

        #[test]
        fn initial_extent_validated() {
            let mut cube = HyperCube::new();
            cube.register_dimension_with_extent("ntime", 10, Extent::new(2, 7), "")
                .unwrap();
            assert_eq!(cube.dim_extents(["ntime"]).unwrap(), vec![Extent::new(2, 7)]);

            let err = cube
                .register_dimension_with_extent("na", 3, Extent::new(2, 7), "")
                .unwrap_err();
            assert_eq!(
                err,
                CubeError::InvalidValue("dimension 'na' fails 0 <= 2 <= 7 <= 3".into())
            );
            assert!(!cube.has_dimension("na"));
        }

        #[test]
        fn register_dimensions_batch() {
            let mut cube = HyperCube::new();
            let dims = vec![
                Dimension::new(DimName::new("a").unwrap(), 1),
                Dimension::new(DimName::new("b").unwrap(), 2),
            ];
            cube.register_dimensions(dims.clone()).unwrap();
            assert_eq!(cube.dimensions().count(), 2);
            assert!(cube.register_dimensions(dims).is_err());
        }

        #[test]
        fn array_with_unknown_dimension_rejected() {
            let mut cube = vis_cube();
            let before: Vec<String> = cube.arrays().map(|a| a.name().to_string()).collect();

            let err = cube
                .register_array("bad", shape!["ntime", "npol"].unwrap(), DType::Int32, "")
                .unwrap_err();
            assert_eq!(err, CubeError::UnknownDimension("npol".into()));

            let after: Vec<String> = cube.arrays().map(|a| a.name().to_string()).collect();
            assert_eq!(before, after);
        }

        #[test]
        fn duplicate_array_rejected() {
            let mut cube = vis_cube();
            let err = cube
                .register_array("uvw", shape![3].unwrap(), DType::Float32, "")
                .unwrap_err();
            assert!(matches!(
                err,
                CubeError::DuplicateName {
                    kind: NameKind::Array,
                    ..
                }
            ));
            assert_eq!(cube.array("uvw").unwrap().dtype(), DType::Float64);
        }

        #[test]
        fn zero_literal_rejected() {
            let mut cube = vis_cube();
            let err = cube
                .register_array("flat", shape!["ntime", 0usize].unwrap(), DType::Int8, "")
                .unwrap_err();
            assert!(matches!(err, CubeError::InvalidValue(_)));
            assert!(!cube.has_array("flat"));
        }

        #[test]
        fn array_may_share_a_dimension_name() {
            let mut cube = vis_cube();
            cube.register_array("ntime", shape!["ntime"].unwrap(), DType::Float64, "")
                .unwrap();
            assert!(cube.has_array("ntime"));
            assert!(cube.has_dimension("ntime"));
        }

        #[test]
        fn properties() {
            let mut cube = HyperCube::new();
            cube.register_property("ref_freq", DType::Float64, 1.4e9)
                .unwrap();
            assert_eq!(
                cube.property("ref_freq").unwrap().value(),
                ScalarValue::Float(1.4e9)
            );

            assert_eq!(
                cube.set_property("ref_freq", 2).unwrap(),
                ScalarValue::Float(2.0)
            );
            assert!(matches!(
                cube.register_property("ref_freq", DType::Float64, 0.0),
                Err(CubeError::DuplicateName { .. })
            ));
            assert!(matches!(
                cube.set_property("missing", 1),
                Err(CubeError::UnknownProperty(_))
            ));
            assert!(matches!(
                cube.register_property("z", DType::Complex64, 0.0),
                Err(CubeError::InvalidValue(_))
            ));
        }

        #[test]
        fn property_values_respect_width() {
            let mut cube = HyperCube::new();
            assert!(cube.register_property("nbits", DType::Int8, 300).is_err());

            cube.register_property("nbits", DType::Int8, 8).unwrap();
            let err = cube.set_property("nbits", 300).unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid value: property 'nbits' of dtype int8 cannot hold 300"
            );
            assert_eq!(cube.property("nbits").unwrap().value(), ScalarValue::Int(8));
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn attributes_in_request_order() {
            let mut cube = vis_cube();
            cube.update_dimension("nchan", 16, 48).unwrap();

            let names = ["nchan", "ntime"];
            assert_eq!(cube.dim_lower_extent(names).unwrap(), vec![16, 0]);
            assert_eq!(cube.dim_upper_extent(names).unwrap(), vec![48, 100]);
            assert_eq!(cube.dim_extent_size(names).unwrap(), vec![32, 100]);
            assert_eq!(cube.dim_global_size(names).unwrap(), vec![64, 100]);
        }

        #[test]
        fn delimited_list() {
            let cube = vis_cube();
            let sizes = cube
                .dim_global_size(split_dim_names("ntime,nbl:nchan nsrc"))
                .unwrap();
            assert_eq!(sizes, vec![100, 21, 64, 10]);
        }

        #[test]
        fn unknown_name_fails() {
            let cube = vis_cube();
            assert_eq!(
                cube.dim_extents(["ntime", "nfreq"]).unwrap_err(),
                CubeError::UnknownDimension("nfreq".into())
            );
        }

        #[test]
        fn maps_follow_registration_order() {
            let mut cube = vis_cube();
            cube.update_dimension("nbl", 1, 3).unwrap();

            let sizes = cube.dim_global_sizes();
            let keys: Vec<&str> = sizes.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["ntime", "nbl", "nchan", "nsrc"]);
            assert_eq!(cube.dim_lower_extents()["nbl"], 1);
            assert_eq!(cube.dim_upper_extents()["nbl"], 3);
        }

        #[test]
        fn array_extents_and_slices() {
            let mut cube = vis_cube();
            cube.update_dimension("ntime", 10, 20).unwrap();

            assert_eq!(
                cube.array_extents("uvw").unwrap(),
                vec![Extent::new(10, 20), Extent::new(0, 21), Extent::new(0, 3)]
            );
            assert_eq!(
                cube.array_slice_index("uvw").unwrap(),
                vec![10..20, 0..21, 0..3]
            );
            assert_eq!(cube.slice_index(["ntime"]).unwrap(), vec![10..20]);
        }
    }

    mod updates {
        use super::*;

        #[test]
        fn roundtrip() {
            let mut cube = vis_cube();
            cube.update_dimension("ntime", 25, 75).unwrap();
            assert_eq!(cube.dim_extents(["ntime"]).unwrap(), vec![Extent::new(25, 75)]);
        }

        #[test]
        fn invalid_update_keeps_extent() {
            let mut cube = vis_cube();
            cube.update_dimension("ntime", 25, 75).unwrap();

            assert!(cube.update_dimension("ntime", 80, 70).is_err());
            assert!(cube.update_dimension("ntime", 0, 101).is_err());
            assert_eq!(cube.dim_extents(["ntime"]).unwrap(), vec![Extent::new(25, 75)]);
        }

        #[test]
        fn unknown_dimension() {
            let mut cube = vis_cube();
            assert_eq!(
                cube.update_dimension("nfreq", 0, 1).unwrap_err(),
                CubeError::UnknownDimension("nfreq".into())
            );
        }

        #[test]
        fn batch_is_not_atomic() {
            let mut cube = vis_cube();
            let updates = vec![
                DimensionUpdate::new("ntime", 0, 10),
                DimensionUpdate::new("nchan", 0, 65),
                DimensionUpdate::new("nbl", 0, 5),
            ];

            let err = cube.update_dimensions(&updates).unwrap_err();
            match &err {
                CubeError::BatchUpdate { index, name, .. } => {
                    assert_eq!(*index, 1);
                    assert_eq!(name, "nchan");
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert!(matches!(err.root(), CubeError::InvalidValue(_)));

            // First entry stays applied, entries after the failure are skipped
            assert_eq!(cube.dim_extent_size(["ntime", "nchan", "nbl"]).unwrap(), vec![10, 64, 21]);
        }

        #[test]
        fn atomic_batch_applies_nothing_on_failure() {
            let mut cube = vis_cube();
            let updates = vec![
                DimensionUpdate::new("ntime", 0, 10),
                DimensionUpdate::new("nsrc", 0, 5),
                DimensionUpdate::new("nfreq", 0, 1),
            ];

            let err = cube.update_dimensions_atomic(&updates).unwrap_err();
            assert_eq!(err.root(), &CubeError::UnknownDimension("nfreq".into()));
            assert_eq!(cube.dim_extent_size(["ntime", "nsrc"]).unwrap(), vec![100, 10]);

            cube.update_dimensions_atomic(&updates[..2]).unwrap();
            assert_eq!(cube.dim_extent_size(["ntime", "nsrc"]).unwrap(), vec![10, 5]);
        }

        #[test]
        fn batch_error_message_names_entry() {
            let mut cube = vis_cube();
            let err = cube
                .update_dimensions([DimensionUpdate::new("ntime", 5, 1)])
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "update #0 of dimension 'ntime' failed: invalid value: \
                 dimension 'ntime' fails 0 <= 5 <= 1 <= 100"
            );
        }
    }

    mod sizes {
        use super::*;

        #[test]
        fn array_size_from_extents() {
            let cube = vis_cube();
            assert_eq!(cube.array_size("vis").unwrap(), 100 * 21 * 64 * 4 * 16);
            assert_eq!(cube.array_size("uvw").unwrap(), 100 * 21 * 3 * 8);
            assert_eq!(cube.array_size("lm").unwrap(), 10 * 2 * 4);
            assert_eq!(cube.array_shape("uvw").unwrap(), vec![100, 21, 3]);
        }

        #[test]
        fn bytes_required_sums_arrays() {
            let cube = vis_cube();
            let expected: u64 = ["vis", "uvw", "lm"]
                .iter()
                .map(|a| cube.array_size(a).unwrap())
                .sum();
            assert_eq!(cube.bytes_required().unwrap(), expected);
        }

        #[test]
        fn unaffected_by_unreferenced_dimension() {
            let mut cube = vis_cube();
            let before = cube.array_size("uvw").unwrap();
            cube.update_dimension("nchan", 3, 9).unwrap();
            cube.update_dimension("nsrc", 0, 1).unwrap();
            assert_eq!(cube.array_size("uvw").unwrap(), before);
        }

        #[test]
        fn zero_extent_gives_zero_size() {
            let mut cube = vis_cube();
            cube.update_dimension("ntime", 50, 50).unwrap();
            assert_eq!(cube.array_size("vis").unwrap(), 0);
            assert_eq!(cube.bytes_required().unwrap(), cube.array_size("lm").unwrap());
        }

        #[test]
        fn unknown_array() {
            let cube = vis_cube();
            assert_eq!(
                cube.array_size("flags").unwrap_err(),
                CubeError::UnknownArray("flags".into())
            );
        }

        #[test]
        fn overflow_reported() {
            let mut cube = HyperCube::new();
            cube.register_dimension("huge", usize::MAX, "").unwrap();
            cube.register_array("a", shape!["huge", "huge"].unwrap(), DType::Complex128, "")
                .unwrap();
            assert!(matches!(
                cube.array_size("a"),
                Err(CubeError::InvalidValue(_))
            ));
        }
    }

    mod budget {
        use super::*;

        #[test]
        fn fits_whole_extent() {
            let cube = vis_cube();
            let total = cube.bytes_required().unwrap();
            assert_eq!(cube.max_tile_size("ntime", total).unwrap(), 100);
        }

        #[test]
        fn largest_fitting_window() {
            let cube = vis_cube();
            // Per timestep: vis 21*64*4*16 + uvw 21*3*8, plus lm fixed at 80
            let per_step: u64 = 21 * 64 * 4 * 16 + 21 * 3 * 8;
            let budget = 7 * per_step + 80 + per_step / 2;

            let len = cube.max_tile_size("ntime", budget).unwrap();
            assert_eq!(len, 7);

            let mut tile = cube.clone();
            tile.update_dimension("ntime", 0, len).unwrap();
            assert!(tile.bytes_required().unwrap() <= budget);
            tile.update_dimension("ntime", 0, len + 1).unwrap();
            assert!(tile.bytes_required().unwrap() > budget);
        }

        #[test]
        fn too_small_budget() {
            let cube = vis_cube();
            assert!(matches!(
                cube.max_tile_size("ntime", 100),
                Err(CubeError::InvalidValue(_))
            ));
        }

        #[test]
        fn empty_extent() {
            let mut cube = vis_cube();
            cube.update_dimension("ntime", 0, 0).unwrap();
            assert!(cube.max_tile_size("ntime", u64::MAX).is_err());
        }

        #[test]
        fn fits_when_full_extent_overflows() {
            let mut cube = HyperCube::new();
            cube.register_dimension("nrow", 1 << 62, "Rows").unwrap();
            cube.register_array("data", shape!["nrow"].unwrap(), DType::Complex128, "")
                .unwrap();
            assert!(cube.bytes_required().is_err());

            // 2^26 rows of 16 bytes is exactly 1 GiB
            assert_eq!(cube.max_tile_size("nrow", 1 << 30).unwrap(), 1 << 26);
            assert_eq!(cube.dim_extent_size(["nrow"]).unwrap(), vec![1 << 62]);
        }
    }

    #[test]
    fn clone_is_independent() {
        let cube = vis_cube();
        let mut copy = cube.clone();
        copy.update_dimension("ntime", 0, 1).unwrap();
        copy.register_dimension("npol", 4, "").unwrap();

        assert_eq!(cube.dim_extent_size(["ntime"]).unwrap(), vec![100]);
        assert!(!cube.has_dimension("npol"));
    }
}
