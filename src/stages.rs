//! The standard pipeline stages.
//!
//! Every converter's pipeline is assembled from the six stages here:
//!
//! | Stage | Read | Write |
//! |---|---|---|
//! | [`ExpandRegion`] | expand the region from its anchor | - |
//! | [`RawIo`] | fetch the raw block, optionally in row-batches | write it, optionally in row-batches |
//! | [`CleanData`] | raw cells to typed scalars (`empty`, `dates`, `numbers`) | typed scalars back to raw cells |
//! | [`Ensure2D`] | - | normalize scalars and flat lists to nested rows |
//! | [`AdjustDimensions`] | apply the `ndim` collapse policy | - |
//! | [`Transpose`] | swap rows and columns | swap rows and columns |
//!
//! The plain reader runs ExpandRegion, RawIo, CleanData, Transpose (when
//! requested), AdjustDimensions; the plain writer runs Ensure2D, Transpose,
//! CleanData, RawIo. Shape problems surface in Ensure2D, before RawIo has
//! touched the grid.

use crate::cell::{CellValue, Scalar};
use crate::error::{Error, Result};
use crate::expansion::{self, ExpandMode};
use crate::options::{DateBuilder, DateParts, NumberFormat, Options};
use crate::pipeline::{ConversionContext, Stage};
use crate::region::Region;
use crate::value::Value;
use log::trace;

/// Replaces the context's region with its expansion, when requested.
pub struct ExpandRegion {
    expand: Option<ExpandMode>,
    strict: bool,
}

impl ExpandRegion {
    /// Configure from the `expand` and `expand_strict` options.
    pub fn new(options: &Options) -> Self {
        ExpandRegion {
            expand: options.get_expand(),
            strict: options.get_expand_strict(),
        }
    }
}

impl Stage for ExpandRegion {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        if let Some(mode) = self.expand {
            ctx.region = expansion::expand(ctx.grid, &ctx.region, mode, self.strict)?;
        }
        Ok(())
    }
}

/// Moves raw blocks across the backend boundary.
///
/// With a `chunksize` set, transfers happen in row-batches issued strictly in
/// order; a mid-stream failure leaves earlier batches applied.
pub struct RawIo {
    chunksize: Option<usize>,
}

impl RawIo {
    /// Configure from the `chunksize` option.
    pub fn new(options: &Options) -> Self {
        RawIo {
            chunksize: options.get_chunksize(),
        }
    }
}

impl Stage for RawIo {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        // A caller-provided block short-circuits the fetch.
        if ctx.value.is_some() {
            return Ok(());
        }

        let Region { row, col, .. } = ctx.region;
        let (nrows, ncols) = ctx.region.shape();

        let block = if ctx.region.is_single_cell() && self.chunksize.is_none() {
            vec![vec![ctx.grid.get_cell(row, col)?]]
        } else {
            match self.chunksize {
                None => ctx.grid.get_block(row, col, nrows, ncols)?,
                Some(size) => {
                    let mut block = Vec::with_capacity(nrows);
                    let mut offset = 0;
                    while offset < nrows {
                        let take = size.min(nrows - offset);
                        trace!("fetching rows {}..{} of {nrows}", offset, offset + take);
                        let mut batch = ctx.grid.get_block(row + offset, col, take, ncols)?;
                        block.append(&mut batch);
                        offset += take;
                    }
                    block
                }
            }
        };

        ctx.value = Some(Value::Raw(block));
        Ok(())
    }

    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let block = match &ctx.value {
            Some(Value::Raw(block)) => block,
            Some(other) => {
                return Err(Error::shape(format!(
                    "raw write: expected a raw block, got {}",
                    other.kind()
                )));
            }
            None => return Err(Error::shape("raw write: no value in the conversion context")),
        };
        if block.is_empty() || block[0].is_empty() {
            return Ok(());
        }

        let Region { row, col, .. } = ctx.region;

        if ctx.meta.scalar {
            let (height, width) = ctx.region.shape();
            if height > 1 || width > 1 {
                // Broadcast a single value across the whole target region.
                let fill = vec![vec![block[0][0].clone(); width]; height];
                return ctx.grid.set_block(row, col, &fill);
            }
        }

        // The value's shape wins; the region is re-anchored to fit it.
        ctx.region = ctx.region.with_shape(block.len(), block[0].len());

        match self.chunksize {
            None => ctx.grid.set_block(row, col, block),
            Some(size) => {
                let mut offset = 0;
                for batch in block.chunks(size) {
                    trace!("writing rows {}..{} of {}", offset, offset + batch.len(), block.len());
                    ctx.grid.set_block(row + offset, col, batch)?;
                    offset += batch.len();
                }
                Ok(())
            }
        }
    }
}

/// Converts between raw cells and typed scalars.
pub struct CleanData {
    dates: Option<DateBuilder>,
    empty: Scalar,
    numbers: Option<NumberFormat>,
}

impl CleanData {
    /// Configure from the `dates`, `empty` and `numbers` options.
    pub fn new(options: &Options) -> Self {
        CleanData {
            dates: options.get_dates(),
            empty: options.get_empty(),
            numbers: options.get_numbers(),
        }
    }

    fn clean(&self, cell: CellValue) -> Scalar {
        match cell {
            cell if cell.is_empty() => self.empty.clone(),
            CellValue::Number(number) => match self.numbers {
                Some(format) => format.apply(number),
                None => Scalar::Number(number),
            },
            CellValue::DateTime(stamp) => match self.dates {
                Some(builder) => builder(DateParts::from(stamp)),
                None => Scalar::DateTime(stamp),
            },
            CellValue::Text(text) => Scalar::Text(text),
            CellValue::Bool(flag) => Scalar::Bool(flag),
            CellValue::Empty => self.empty.clone(),
        }
    }
}

impl Stage for CleanData {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let block = ctx.take_value("clean")?.into_raw("clean")?;
        let rows: Vec<Vec<Scalar>> = block
            .into_iter()
            .map(|row| row.into_iter().map(|cell| self.clean(cell)).collect())
            .collect();
        ctx.value = Some(Value::Rows(rows));
        Ok(())
    }

    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("clean")?.into_rows("clean")?;
        let block: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Scalar::into_cell).collect())
            .collect();
        ctx.value = Some(Value::Raw(block));
        Ok(())
    }
}

/// Normalizes a written value to nested rows.
///
/// A bare scalar becomes a 1x1 block and is remembered in
/// [`Meta::scalar`](crate::pipeline::Meta::scalar); a flat list becomes a
/// single row; nested rows pass through after a rectangularity check.
pub struct Ensure2D;

impl Stage for Ensure2D {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = match ctx.take_value("2d normalization")? {
            Value::Scalar(scalar) => {
                ctx.meta.scalar = true;
                vec![vec![scalar]]
            }
            Value::List(list) => vec![list],
            Value::Rows(rows) => {
                let width = rows.first().map_or(0, Vec::len);
                for (index, row) in rows.iter().enumerate() {
                    if row.len() != width {
                        return Err(Error::shape(format!(
                            "jagged rows: row {index} has {} cells, every row must have {width}",
                            row.len()
                        )));
                    }
                }
                rows
            }
            other => {
                return Err(Error::shape(format!(
                    "cannot write a {} as a plain value",
                    other.kind()
                )));
            }
        };
        ctx.value = Some(Value::Rows(rows));
        Ok(())
    }
}

/// Applies the `ndim` dimensionality-collapse policy after a read.
///
/// - `None`: a 1x1 block collapses to a scalar, a single row or column to a
///   flat list, anything else stays nested
/// - `Some(1)`: a single row or column flattens; a genuinely 2D block is a
///   shape error
/// - `Some(2)`: nested rows pass through unchanged
pub struct AdjustDimensions {
    ndim: Option<u8>,
}

impl AdjustDimensions {
    /// Configure from the `ndim` option.
    pub fn new(options: &Options) -> Self {
        AdjustDimensions {
            ndim: options.get_ndim(),
        }
    }
}

impl Stage for AdjustDimensions {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx
            .take_value("dimension adjustment")?
            .into_rows("dimension adjustment")?;
        let value = match self.ndim {
            None => collapse(rows),
            Some(1) => flatten(rows)?,
            Some(2) => Value::Rows(rows),
            Some(other) => {
                return Err(Error::shape(format!("invalid ndim {other}, expected 1 or 2")));
            }
        };
        ctx.value = Some(value);
        Ok(())
    }
}

fn collapse(rows: Vec<Vec<Scalar>>) -> Value {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    match (nrows, ncols) {
        (1, 1) => Value::Scalar(rows.into_iter().flatten().next().unwrap_or_default()),
        (1, _) => Value::List(rows.into_iter().next().unwrap_or_default()),
        (_, 1) => Value::List(rows.into_iter().flatten().collect()),
        _ => Value::Rows(rows),
    }
}

fn flatten(rows: Vec<Vec<Scalar>>) -> Result<Value> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if nrows <= 1 {
        Ok(Value::List(rows.into_iter().next().unwrap_or_default()))
    } else if ncols == 1 {
        Ok(Value::List(rows.into_iter().flatten().collect()))
    } else {
        Err(Error::shape(format!(
            "a {nrows}x{ncols} block does not flatten to one dimension"
        )))
    }
}

/// Swaps rows and columns, in both directions.
pub struct Transpose;

fn flip(rows: Vec<Vec<Scalar>>) -> Vec<Vec<Scalar>> {
    let ncols = rows.first().map_or(0, Vec::len);
    (0..ncols)
        .map(|col| rows.iter().map(|row| row[col].clone()).collect())
        .collect()
}

impl Stage for Transpose {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("transpose")?.into_rows("transpose")?;
        ctx.value = Some(Value::Rows(flip(rows)));
        Ok(())
    }

    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("transpose")?.into_rows("transpose")?;
        ctx.value = Some(Value::Rows(flip(rows)));
        Ok(())
    }
}
