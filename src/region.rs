//! Rectangular grid regions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular window onto a grid.
///
/// Coordinates are 1-based. The extents are optional: a region with
/// `nrows`/`ncols` of `None` is an *anchor* whose real size is decided later,
/// either by region expansion on read or by the size of the written value.
/// [`Region::shape`] treats an unresolved extent as 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Top row, 1-based.
    pub row: usize,
    /// Left column, 1-based.
    pub col: usize,
    /// Number of rows, or `None` for an unresolved anchor.
    pub nrows: Option<usize>,
    /// Number of columns, or `None` for an unresolved anchor.
    pub ncols: Option<usize>,
}

impl Region {
    /// Create a fully resolved region.
    pub fn new(row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        debug_assert!(row >= 1 && col >= 1, "region coordinates are 1-based");
        debug_assert!(nrows >= 1 && ncols >= 1, "region extents are at least 1");
        Region {
            row,
            col,
            nrows: Some(nrows),
            ncols: Some(ncols),
        }
    }

    /// Create a single-cell anchor with unresolved extents.
    pub fn anchor(row: usize, col: usize) -> Self {
        debug_assert!(row >= 1 && col >= 1, "region coordinates are 1-based");
        Region {
            row,
            col,
            nrows: None,
            ncols: None,
        }
    }

    /// The region's shape, defaulting unresolved extents to 1.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows.unwrap_or(1), self.ncols.unwrap_or(1))
    }

    /// True if both extents are resolved.
    pub fn is_resolved(&self) -> bool {
        self.nrows.is_some() && self.ncols.is_some()
    }

    /// True if the region covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.shape() == (1, 1)
    }

    /// This region with both extents replaced.
    pub fn with_shape(self, nrows: usize, ncols: usize) -> Self {
        Region::new(self.row, self.col, nrows, ncols)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nrows, ncols) = self.shape();
        write!(f, "({}, {})+{}x{}", self.row, self.col, nrows, ncols)
    }
}
