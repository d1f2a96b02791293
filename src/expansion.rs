//! Contiguous-region expansion.
//!
//! Given an anchor cell, expansion finds the rectangular extent of the block
//! of occupied cells logically attached to it, mirroring the host grid's
//! "select contiguous block" behavior:
//!
//! - **Vertical** - measure the occupied run downward from the anchor; the
//!   result keeps the region's current width.
//! - **Horizontal** - measure the occupied run rightward; the result keeps
//!   the region's current height.
//! - **Table** - measure both runs from the anchor independently and span
//!   the rectangle. This is *not* a flood fill: an L-shaped block yields the
//!   bounding rectangle of its two axis runs, and callers rely on exactly
//!   that.
//!
//! Each run uses a two-step lookahead. If the immediate neighbor is empty
//! the run has length 1; if the cell after it is empty, length 2; otherwise
//! the walk continues cell-by-cell until the first empty cell. Runs of one
//! and two cells therefore cost at most two probes.
//!
//! Expansion never walks upward or leftward, and the anchor itself is always
//! included regardless of its own content.

use crate::error::{Error, Result};
use crate::grid::GridAccessor;
use crate::region::Region;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Direction tag for region expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpandMode {
    /// Span the vertical and horizontal runs from the anchor.
    Table,
    /// Walk downward, keeping the region's width.
    Vertical,
    /// Walk rightward, keeping the region's height.
    Horizontal,
}

impl ExpandMode {
    /// The canonical name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpandMode::Table => "table",
            ExpandMode::Vertical => "vertical",
            ExpandMode::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for ExpandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpandMode {
    type Err = Error;

    /// Parse a mode name or one of its short aliases.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "table" => Ok(ExpandMode::Table),
            "vertical" | "down" | "d" => Ok(ExpandMode::Vertical),
            "horizontal" | "right" | "r" => Ok(ExpandMode::Horizontal),
            other => Err(Error::lookup(format!("unknown expansion mode '{other}'"))),
        }
    }
}

/// Expand `region` from its anchor in the given mode.
///
/// In strict mode a cell counts as occupied only if its computed value is
/// non-empty; otherwise the backend's
/// [`cell_has_content`](GridAccessor::cell_has_content) classification is
/// used, which may treat formula-bearing cells as occupied even when they
/// evaluate to an empty value.
///
/// # Errors
///
/// Returns [`Error::Backend`] if a lookahead read fails.
pub fn expand(
    grid: &dyn GridAccessor,
    region: &Region,
    mode: ExpandMode,
    strict: bool,
) -> Result<Region> {
    let Region { row, col, .. } = *region;
    let (height, width) = region.shape();

    let expanded = match mode {
        ExpandMode::Vertical => {
            let nrows = run_down(grid, row, col, strict)?;
            Region::new(row, col, nrows, width)
        }
        ExpandMode::Horizontal => {
            let ncols = run_right(grid, row, col, strict)?;
            Region::new(row, col, height, ncols)
        }
        ExpandMode::Table => {
            let nrows = run_down(grid, row, col, strict)?;
            let ncols = run_right(grid, row, col, strict)?;
            Region::new(row, col, nrows, ncols)
        }
    };

    debug!("expanded {mode} at ({row}, {col}) to {expanded}");
    Ok(expanded)
}

fn occupied(grid: &dyn GridAccessor, row: usize, col: usize, strict: bool) -> Result<bool> {
    if strict {
        Ok(!grid.get_cell(row, col)?.is_empty())
    } else {
        grid.cell_has_content(row, col)
    }
}

/// Length of the occupied run downward from `(row, col)`, anchor included.
fn run_down(grid: &dyn GridAccessor, row: usize, col: usize, strict: bool) -> Result<usize> {
    if !occupied(grid, row + 1, col, strict)? {
        return Ok(1);
    }
    if !occupied(grid, row + 2, col, strict)? {
        return Ok(2);
    }
    let mut last = row + 2;
    while occupied(grid, last + 1, col, strict)? {
        last += 1;
    }
    Ok(last - row + 1)
}

/// Length of the occupied run rightward from `(row, col)`, anchor included.
fn run_right(grid: &dyn GridAccessor, row: usize, col: usize, strict: bool) -> Result<usize> {
    if !occupied(grid, row, col + 1, strict)? {
        return Ok(1);
    }
    if !occupied(grid, row, col + 2, strict)? {
        return Ok(2);
    }
    let mut last = col + 2;
    while occupied(grid, row, last + 1, strict)? {
        last += 1;
    }
    Ok(last - col + 1)
}
