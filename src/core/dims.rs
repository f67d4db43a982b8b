//! core::dims
//!
//! Dimension records.
//!
//! # Invariants
//!
//! - `0 <= lower_extent <= upper_extent <= global_size` at all times
//! - Name and global size never change after construction
//! - Both extent bounds are replaced together or not at all

use serde::Serialize;

use super::types::{DimName, Extent};

/// A named axis of the problem space with its currently active window.
///
/// # Example
///
/// ```
/// use hypercube::core::dims::Dimension;
/// use hypercube::core::types::{DimName, Extent};
///
/// let mut dim = Dimension::new(DimName::new("ntime").unwrap(), 100);
/// assert_eq!(dim.extent(), Extent::new(0, 100));
///
/// dim.set_extent(Extent::new(10, 20)).unwrap();
/// assert_eq!(dim.extent_size(), 10);
///
/// // Out of bounds updates are rejected and leave the extent untouched
/// assert!(dim.set_extent(Extent::new(90, 101)).is_err());
/// assert_eq!(dim.extent(), Extent::new(10, 20));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    name: DimName,
    global_size: usize,
    extent: Extent,
    description: String,
}

impl Dimension {
    /// Create a dimension spanning its full global size.
    pub fn new(name: DimName, global_size: usize) -> Self {
        Self {
            name,
            global_size,
            extent: Extent::full(global_size),
            description: String::new(),
        }
    }

    /// Create a dimension with an explicit initial extent.
    ///
    /// # Errors
    ///
    /// Returns the violated bound description if the extent does not fit.
    pub fn with_extent(
        name: DimName,
        global_size: usize,
        extent: Extent,
    ) -> Result<Self, ExtentViolation> {
        let mut dim = Self::new(name, global_size);
        dim.set_extent(extent)?;
        Ok(dim)
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &DimName {
        &self.name
    }

    pub fn global_size(&self) -> usize {
        self.global_size
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn lower_extent(&self) -> usize {
        self.extent.lower
    }

    pub fn upper_extent(&self) -> usize {
        self.extent.upper
    }

    /// Length of the active window.
    pub fn extent_size(&self) -> usize {
        self.extent.size()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check an extent against this dimension's global size without applying it.
    pub fn check_extent(&self, extent: Extent) -> Result<(), ExtentViolation> {
        if extent.fits_within(self.global_size) {
            Ok(())
        } else {
            Err(ExtentViolation {
                name: self.name.to_string(),
                extent,
                global_size: self.global_size,
            })
        }
    }

    /// Replace both bounds of the active window.
    ///
    /// On failure the previous extent is kept.
    pub fn set_extent(&mut self, extent: Extent) -> Result<(), ExtentViolation> {
        self.check_extent(extent)?;
        self.extent = extent;
        Ok(())
    }

    /// Shrink the active window to a sub-window of the current extent.
    ///
    /// A window inside the current extent always satisfies the bounds, so
    /// this cannot fail.
    pub(crate) fn narrow_to(&mut self, window: Extent) {
        debug_assert!(
            self.extent.lower <= window.lower && window.upper <= self.extent.upper,
            "{window:?} is outside {:?}",
            self.extent
        );
        self.extent = window;
    }
}

// The description is informational and not part of identity.
impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.global_size == other.global_size
            && self.extent == other.extent
    }
}

impl Eq for Dimension {}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "['{}': global: {} lower: {} upper: {}]",
            self.name, self.global_size, self.extent.lower, self.extent.upper
        )
    }
}

/// An extent that does not satisfy `0 <= lower <= upper <= global_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtentViolation {
    pub name: String,
    pub extent: Extent,
    pub global_size: usize,
}

impl std::fmt::Display for ExtentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dimension '{}' fails 0 <= {} <= {} <= {}",
            self.name, self.extent.lower, self.extent.upper, self.global_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(name: &str, size: usize) -> Dimension {
        Dimension::new(DimName::new(name).unwrap(), size)
    }

    #[test]
    fn new_spans_full_size() {
        let d = dim("nchan", 64);
        assert_eq!(d.lower_extent(), 0);
        assert_eq!(d.upper_extent(), 64);
        assert_eq!(d.extent_size(), 64);
        assert_eq!(d.description(), "");
    }

    #[test]
    fn zero_sized_dimension() {
        let d = dim("empty", 0);
        assert_eq!(d.extent(), Extent::new(0, 0));
        assert_eq!(d.extent_size(), 0);
    }

    #[test]
    fn with_extent_validates() {
        let name = DimName::new("ntime").unwrap();
        assert!(Dimension::with_extent(name.clone(), 10, Extent::new(2, 7)).is_ok());
        assert!(Dimension::with_extent(name, 10, Extent::new(2, 11)).is_err());
    }

    #[test]
    fn set_extent_rejects_inverted_bounds() {
        let mut d = dim("ntime", 10);
        let err = d.set_extent(Extent::new(6, 5)).unwrap_err();
        assert_eq!(err.to_string(), "dimension 'ntime' fails 0 <= 6 <= 5 <= 10");
        assert_eq!(d.extent(), Extent::new(0, 10));
    }

    #[test]
    fn empty_window_at_upper_bound_allowed() {
        let mut d = dim("ntime", 10);
        d.set_extent(Extent::new(10, 10)).unwrap();
        assert_eq!(d.extent_size(), 0);
    }

    #[test]
    fn equality_ignores_description() {
        let a = dim("na", 7).with_description("antennas");
        let b = dim("na", 7);
        assert_eq!(a, b);

        let mut c = dim("na", 7);
        c.set_extent(Extent::new(0, 3)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn display() {
        let d = dim("ntime", 100);
        assert_eq!(d.to_string(), "['ntime': global: 100 lower: 0 upper: 100]");
    }
}
