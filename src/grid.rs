//! The grid backend interface.
//!
//! A [`GridAccessor`] is the only thing the conversion pipeline knows about a
//! spreadsheet-style backend. Implementations exist for real grid providers;
//! the [`testing`](crate::testing) module ships an in-memory one for tests.
//!
//! Backends deal exclusively in raw [`CellValue`]s. Everything richer -
//! cleaning, reshaping, typed conversion - happens in pipeline stages on this
//! side of the boundary.

use crate::cell::CellValue;
use crate::error::Result;

/// Cell-level access to a grid backend.
///
/// Coordinates are 1-based. Reading never fails for being out of range:
/// addressed cells that were never set read back as [`CellValue::Empty`], so
/// [`get_block`](GridAccessor::get_block) always returns a fully populated
/// `nrows` by `ncols` block.
///
/// Writes take `&self`. Backends that buffer internally use interior
/// mutability, mirroring how grid providers expose handles rather than
/// exclusive references.
pub trait GridAccessor {
    /// Read a single cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) if the backend
    /// refuses the read.
    fn get_cell(&self, row: usize, col: usize) -> Result<CellValue>;

    /// Read a rectangular block, row-major, `nrows` rows of `ncols` cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) if the backend
    /// refuses the read.
    fn get_block(&self, row: usize, col: usize, nrows: usize, ncols: usize)
    -> Result<Vec<Vec<CellValue>>>;

    /// Write a rectangular block whose top-left cell lands at `(row, col)`.
    ///
    /// Callers guarantee the block is rectangular; reshaping and validation
    /// happen upstream in the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) if the backend
    /// refuses the write.
    fn set_block(&self, row: usize, col: usize, values: &[Vec<CellValue>]) -> Result<()>;

    /// True if the cell counts as occupied for region expansion.
    ///
    /// The default classifies by stored value. Backends that distinguish
    /// formulas from results override this so a formula evaluating to an
    /// empty string still counts as occupied; strict expansion ignores this
    /// method and classifies by computed value alone.
    fn cell_has_content(&self, row: usize, col: usize) -> Result<bool> {
        Ok(!self.get_cell(row, col)?.is_empty())
    }
}
