//! Testing utilities for conversion pipelines.
//!
//! This module provides what end-users need to write idiomatic Rust tests
//! against their own converters and pipelines without a real grid backend:
//!
//! - **[`TestGrid`]**: An in-memory [`GridAccessor`] backed by a sparse map
//! - **Call counters**: Verify how often a pipeline touched the backend
//! - **Write recording**: Inspect every block a pipeline wrote, in order
//! - **Failure injection**: Make writes fail to exercise error paths
//! - **[`block!`](crate::block) / [`rows!`](crate::rows)**: Literal-style
//!   builders for cell and scalar blocks
//!
//! # Quick Start
//!
//! ```
//! use gridcast::testing::TestGrid;
//! use gridcast::{read, Options, Region, Registry, Scalar, Value};
//!
//! let grid = TestGrid::new();
//! grid.put(1, 1, 1.0);
//! grid.put(1, 2, 2.0);
//!
//! let registry = Registry::with_defaults();
//! let value = read(
//!     &grid,
//!     Region::new(1, 1, 1, 2),
//!     None,
//!     &Options::new(),
//!     &registry,
//! )?;
//! assert_eq!(
//!     value,
//!     Value::List(vec![Scalar::Number(1.0), Scalar::Number(2.0)])
//! );
//! # Ok::<(), gridcast::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::grid::GridAccessor;

/// An in-memory grid for tests.
///
/// Cells live in a sparse map; anything never written reads back as
/// [`CellValue::Empty`]. The grid counts backend calls and records every
/// written block, so tests can assert not just what a pipeline produced
/// but how it talked to the backend.
///
/// All mutation goes through `&self`, like any other [`GridAccessor`].
#[derive(Default)]
pub struct TestGrid {
    cells: RefCell<HashMap<(usize, usize), CellValue>>,
    formulas: RefCell<HashSet<(usize, usize)>>,
    writes: RefCell<Vec<((usize, usize), Vec<Vec<CellValue>>)>>,
    get_cell_calls: Cell<usize>,
    get_block_calls: Cell<usize>,
    set_block_calls: Cell<usize>,
    deny_writes: Cell<bool>,
}

impl TestGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid seeded with a block anchored at `(row, col)`.
    pub fn from_rows(row: usize, col: usize, rows: Vec<Vec<CellValue>>) -> Self {
        let grid = Self::new();
        for (dr, cells) in rows.into_iter().enumerate() {
            for (dc, cell) in cells.into_iter().enumerate() {
                grid.put(row + dr, col + dc, cell);
            }
        }
        grid
    }

    /// Set a single cell.
    pub fn put<V: Into<CellValue>>(&self, row: usize, col: usize, value: V) {
        self.cells.borrow_mut().insert((row, col), value.into());
    }

    /// Mark a cell as formula-bearing.
    ///
    /// The cell keeps whatever computed value it has (none, unless [`put`]
    /// was also called), but [`cell_has_content`] reports it occupied. This
    /// models a formula evaluating to an empty result.
    ///
    /// [`put`]: TestGrid::put
    /// [`cell_has_content`]: GridAccessor::cell_has_content
    pub fn mark_formula(&self, row: usize, col: usize) {
        self.formulas.borrow_mut().insert((row, col));
    }

    /// Peek at a cell without counting a backend read.
    pub fn cell(&self, row: usize, col: usize) -> CellValue {
        self.cells
            .borrow()
            .get(&(row, col))
            .cloned()
            .unwrap_or_default()
    }

    /// Every block written so far, in call order, as `((row, col), block)`.
    pub fn writes(&self) -> Vec<((usize, usize), Vec<Vec<CellValue>>)> {
        self.writes.borrow().clone()
    }

    /// Make every following [`set_block`](GridAccessor::set_block) fail
    /// with a backend error.
    pub fn deny_writes(&self) {
        self.deny_writes.set(true);
    }

    /// Number of [`get_cell`](GridAccessor::get_cell) calls so far.
    pub fn get_cell_count(&self) -> usize {
        self.get_cell_calls.get()
    }

    /// Number of [`get_block`](GridAccessor::get_block) calls so far.
    pub fn get_block_count(&self) -> usize {
        self.get_block_calls.get()
    }

    /// Number of [`set_block`](GridAccessor::set_block) calls so far.
    pub fn set_block_count(&self) -> usize {
        self.set_block_calls.get()
    }
}

impl GridAccessor for TestGrid {
    fn get_cell(&self, row: usize, col: usize) -> Result<CellValue> {
        self.get_cell_calls.set(self.get_cell_calls.get() + 1);
        Ok(self.cell(row, col))
    }

    fn get_block(
        &self,
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    ) -> Result<Vec<Vec<CellValue>>> {
        self.get_block_calls.set(self.get_block_calls.get() + 1);
        let cells = self.cells.borrow();
        let block = (0..nrows)
            .map(|dr| {
                (0..ncols)
                    .map(|dc| {
                        cells
                            .get(&(row + dr, col + dc))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Ok(block)
    }

    fn set_block(&self, row: usize, col: usize, values: &[Vec<CellValue>]) -> Result<()> {
        self.set_block_calls.set(self.set_block_calls.get() + 1);
        if self.deny_writes.get() {
            return Err(Error::backend(anyhow::anyhow!(
                "writes are denied on this grid"
            )));
        }
        let mut cells = self.cells.borrow_mut();
        for (dr, cells_row) in values.iter().enumerate() {
            for (dc, cell) in cells_row.iter().enumerate() {
                cells.insert((row + dr, col + dc), cell.clone());
            }
        }
        self.writes
            .borrow_mut()
            .push(((row, col), values.to_vec()));
        Ok(())
    }

    fn cell_has_content(&self, row: usize, col: usize) -> Result<bool> {
        let occupied =
            self.formulas.borrow().contains(&(row, col)) || !self.cell(row, col).is_empty();
        Ok(occupied)
    }
}

/// Build a `Vec<Vec<CellValue>>` block from literal rows.
///
/// Every element goes through [`CellValue::from`](crate::CellValue), so
/// rows can mix numbers, text and booleans:
///
/// ```
/// use gridcast::{block, CellValue};
///
/// let block = block![["name", "paid"], ["ada", true]];
/// assert_eq!(block[1][1], CellValue::Bool(true));
/// ```
#[macro_export]
macro_rules! block {
    ($([$($cell:expr),* $(,)?]),* $(,)?) => {
        vec![$(vec![$($crate::CellValue::from($cell)),*]),*]
    };
}

/// Build a `Vec<Vec<Scalar>>` block from literal rows, via
/// [`Scalar::from`](crate::Scalar).
///
/// Integer literals become [`Scalar::Int`](crate::Scalar::Int); use float
/// literals where a grid read-back is being compared, since grids hold
/// floating-point numbers.
#[macro_export]
macro_rules! rows {
    ($([$($cell:expr),* $(,)?]),* $(,)?) => {
        vec![$(vec![$($crate::Scalar::from($cell)),*]),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_cells_read_back_empty() {
        let grid = TestGrid::new();
        assert_eq!(grid.get_cell(3, 7).unwrap(), CellValue::Empty);
        assert_eq!(grid.get_cell_count(), 1);
    }

    #[test]
    fn blocks_pad_with_empty() {
        let grid = TestGrid::from_rows(1, 1, block![[1.0, 2.0]]);
        let block = grid.get_block(1, 1, 2, 2).unwrap();
        assert_eq!(
            block,
            block![[1.0, 2.0], [CellValue::Empty, CellValue::Empty]]
        );
    }

    #[test]
    fn writes_are_recorded_in_order() {
        let grid = TestGrid::new();
        grid.set_block(1, 1, &block![["a"]]).unwrap();
        grid.set_block(5, 2, &block![["b"]]).unwrap();
        let writes = grid.writes();
        assert_eq!(writes[0].0, (1, 1));
        assert_eq!(writes[1].0, (5, 2));
        assert_eq!(grid.set_block_count(), 2);
    }

    #[test]
    fn denied_writes_fail_with_backend_errors() {
        let grid = TestGrid::new();
        grid.deny_writes();
        let err = grid.set_block(1, 1, &block![[1.0]]).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
        assert!(grid.writes().is_empty());
    }

    #[test]
    fn formula_cells_count_as_content_but_read_empty() {
        let grid = TestGrid::new();
        grid.mark_formula(2, 2);
        assert!(grid.cell_has_content(2, 2).unwrap());
        assert_eq!(grid.get_cell(2, 2).unwrap(), CellValue::Empty);
    }
}
