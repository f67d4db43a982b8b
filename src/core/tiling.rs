//! core::tiling
//!
//! Tile enumeration over dimension extents.
//!
//! # Overview
//!
//! A [`Tiling`] is built from `(dimension, tile_size)` pairs. Each pair
//! captures the dimension's current extent `[L, U)` and splits it into the
//! consecutive windows
//!
//! ```text
//! [L, min(L+T, U)), [L+T, min(L+2T, U)), ...
//! ```
//!
//! stopping once a window's lower bound reaches `U`. The last window is
//! clamped to `U` and may be narrower than `T`. Several pairs combine as a
//! Cartesian product with the first pair outermost.
//!
//! A tiling has four projections:
//!
//! - [`ExtentIter`]: the raw [`Extent`] of each dimension
//! - [`SliceIter`]: the same windows as index ranges
//! - [`DimIter`]: [`DimensionUpdate`] records accepted by
//!   [`HyperCube::update_dimensions`]
//! - [`CubeIter`]: an independent [`HyperCube`] snapshot with the windows
//!   applied
//!
//! All of them are lazy, `Clone`, double-ended and exact-size. None of them
//! mutates the cube they were built from.
//!
//! # Example
//!
//! ```
//! use hypercube::core::cube::HyperCube;
//!
//! let mut cube = HyperCube::new();
//! cube.register_dimension("ntime", 2016, "").unwrap();
//!
//! let windows: Vec<_> = cube.extent_iter([("ntime", 100)]).unwrap().collect();
//! assert_eq!(windows.len(), 21);
//! assert_eq!(windows[20][0].as_range(), 2000..2016);
//! ```

use std::iter::FusedIterator;
use std::ops::Range;

use super::cube::{CubeError, DimensionUpdate, HyperCube};
use super::types::{DimName, Extent};

/// One tiled dimension: its captured extent and the tile width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAxis {
    name: DimName,
    extent: Extent,
    tile_size: usize,
}

impl TileAxis {
    pub fn name(&self) -> &DimName {
        &self.name
    }

    /// The extent captured when the tiling was built.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of windows covering the extent; zero for an empty extent.
    pub fn num_windows(&self) -> usize {
        self.extent.size().div_ceil(self.tile_size)
    }

    /// The `index`-th window, clamped to the extent's upper bound.
    pub fn window(&self, index: usize) -> Option<Extent> {
        if index >= self.num_windows() {
            return None;
        }
        let lower = self.extent.lower + index * self.tile_size;
        let upper = lower.saturating_add(self.tile_size).min(self.extent.upper);
        Some(Extent::new(lower, upper))
    }

    /// All windows in ascending order.
    pub fn windows(&self) -> impl Iterator<Item = Extent> + '_ {
        (0..self.num_windows()).filter_map(|i| self.window(i))
    }
}

/// A validated tile plan over one or more dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tiling {
    axes: Vec<TileAxis>,
    len: usize,
}

impl Tiling {
    pub fn axes(&self) -> &[TileAxis] {
        &self.axes
    }

    /// Number of tile combinations.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when some tiled dimension has an empty extent, so the plan
    /// produces no tiles at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Windows of the `index`-th combination, in axis order.
    ///
    /// Combinations are numbered in mixed radix with the last axis varying
    /// fastest.
    pub fn combination(&self, index: usize) -> Option<Vec<Extent>> {
        if index >= self.len {
            return None;
        }

        let mut windows = Vec::with_capacity(self.axes.len());
        let mut rest = index;
        for axis in self.axes.iter().rev() {
            let count = axis.num_windows();
            windows.push(axis.window(rest % count)?);
            rest /= count;
        }
        windows.reverse();
        Some(windows)
    }

    pub fn extents(&self) -> ExtentIter {
        ExtentIter {
            front: 0,
            back: self.len,
            tiling: self.clone(),
        }
    }

    pub fn slices(&self) -> SliceIter {
        SliceIter {
            inner: self.extents(),
        }
    }

    pub fn updates(&self) -> DimIter {
        DimIter {
            inner: self.extents(),
        }
    }
}

/// Raw extent windows, one `Vec<Extent>` per tile.
#[derive(Debug, Clone)]
pub struct ExtentIter {
    tiling: Tiling,
    front: usize,
    back: usize,
}

impl ExtentIter {
    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }
}

impl Iterator for ExtentIter {
    type Item = Vec<Extent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.tiling.combination(self.front)?;
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for ExtentIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.tiling.combination(self.back)
    }
}

impl ExactSizeIterator for ExtentIter {}
impl FusedIterator for ExtentIter {}

/// Tile windows as index ranges.
#[derive(Debug, Clone)]
pub struct SliceIter {
    inner: ExtentIter,
}

fn to_ranges(windows: Vec<Extent>) -> Vec<Range<usize>> {
    windows.iter().map(Extent::as_range).collect()
}

impl Iterator for SliceIter {
    type Item = Vec<Range<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(to_ranges)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for SliceIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(to_ranges)
    }
}

impl ExactSizeIterator for SliceIter {}
impl FusedIterator for SliceIter {}

/// Tiles as update instructions.
///
/// The iterator owns its plan, so each step can be applied back to the
/// cube it came from while iterating.
#[derive(Debug, Clone)]
pub struct DimIter {
    inner: ExtentIter,
}

impl DimIter {
    fn to_updates(&self, windows: Vec<Extent>) -> Vec<DimensionUpdate> {
        self.inner
            .tiling
            .axes
            .iter()
            .zip(windows)
            .map(|(axis, w)| DimensionUpdate::new(axis.name.as_str(), w.lower, w.upper))
            .collect()
    }
}

impl Iterator for DimIter {
    type Item = Vec<DimensionUpdate>;

    fn next(&mut self) -> Option<Self::Item> {
        let windows = self.inner.next()?;
        Some(self.to_updates(windows))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for DimIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        let windows = self.inner.next_back()?;
        Some(self.to_updates(windows))
    }
}

impl ExactSizeIterator for DimIter {}
impl FusedIterator for DimIter {}

/// Tiles as independent cube snapshots.
#[derive(Debug, Clone)]
pub struct CubeIter<'a> {
    base: &'a HyperCube,
    // Registration position of each tiled dimension in `base`.
    slots: Vec<usize>,
    inner: ExtentIter,
}

impl CubeIter<'_> {
    fn snapshot(&self, windows: Vec<Extent>) -> HyperCube {
        // Windows lie inside extents captured from `base`, which cannot
        // change while it is borrowed.
        let mut cube = self.base.clone();
        for (&slot, window) in self.slots.iter().zip(windows) {
            cube.narrow_dimension(slot, window);
        }
        cube
    }
}

impl Iterator for CubeIter<'_> {
    type Item = HyperCube;

    fn next(&mut self) -> Option<Self::Item> {
        let windows = self.inner.next()?;
        Some(self.snapshot(windows))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for CubeIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let windows = self.inner.next_back()?;
        Some(self.snapshot(windows))
    }
}

impl ExactSizeIterator for CubeIter<'_> {}
impl FusedIterator for CubeIter<'_> {}

impl HyperCube {
    /// Build a tile plan from `(dimension, tile_size)` pairs, capturing each
    /// dimension's current extent.
    ///
    /// An empty pair list yields a single tile with no windows.
    ///
    /// # Errors
    ///
    /// - `UnknownDimension` for an unregistered dimension
    /// - `InvalidValue` for a zero tile size or a plan whose tile count
    ///   overflows `usize`
    pub fn tiling<I, S>(&self, pairs: I) -> Result<Tiling, CubeError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        let mut axes = Vec::new();
        let mut len = 1usize;

        for (name, tile_size) in pairs {
            let name = name.as_ref();
            let dim = self.dimension(name)?;
            if tile_size == 0 {
                return Err(CubeError::InvalidValue(format!(
                    "tile size for dimension '{name}' must be positive"
                )));
            }

            let axis = TileAxis {
                name: dim.name().clone(),
                extent: dim.extent(),
                tile_size,
            };
            len = len.checked_mul(axis.num_windows()).ok_or_else(|| {
                CubeError::InvalidValue("tile plan has too many combinations".into())
            })?;
            axes.push(axis);
        }

        Ok(Tiling { axes, len })
    }

    /// Tiles as raw extents.
    pub fn extent_iter<I, S>(&self, pairs: I) -> Result<ExtentIter, CubeError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        Ok(self.tiling(pairs)?.extents())
    }

    /// Tiles as index ranges.
    pub fn slice_iter<I, S>(&self, pairs: I) -> Result<SliceIter, CubeError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        Ok(self.tiling(pairs)?.slices())
    }

    /// Tiles as update instructions for [`update_dimensions`](Self::update_dimensions).
    ///
    /// ```
    /// use hypercube::core::cube::HyperCube;
    ///
    /// let mut cube = HyperCube::new();
    /// cube.register_dimension("nchan", 64, "").unwrap();
    ///
    /// for updates in cube.dim_iter([("nchan", 16)]).unwrap() {
    ///     cube.update_dimensions(&updates).unwrap();
    ///     assert_eq!(cube.dim_extent_size(["nchan"]).unwrap(), vec![16]);
    /// }
    /// ```
    pub fn dim_iter<I, S>(&self, pairs: I) -> Result<DimIter, CubeError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        Ok(self.tiling(pairs)?.updates())
    }

    /// Tiles as independent cube snapshots.
    pub fn cube_iter<I, S>(&self, pairs: I) -> Result<CubeIter<'_>, CubeError>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        let tiling = self.tiling(pairs)?;
        let slots: Vec<usize> = tiling
            .axes
            .iter()
            .map(|axis| self.dimension_slot(axis.name.as_str()))
            .collect::<Result<_, _>>()?;
        Ok(CubeIter {
            base: self,
            slots,
            inner: tiling.extents(),
        })
    }
}
