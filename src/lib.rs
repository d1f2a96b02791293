//! # Gridcast
//!
//! A **typed conversion layer** between spreadsheet-style grids and rich Rust
//! values. Gridcast turns rectangular cell blocks into scalars, lists, row
//! matrices, mappings, labeled frames and file-backed relations, and writes
//! every one of them back, through small, explicit stage pipelines.
//!
//! ## Key Features
//!
//! - **Region expansion** - grow a region over its occupied neighborhood,
//!   down, right, or both
//! - **Typed cells** - raw [`CellValue`]s clean into [`Scalar`]s with
//!   pluggable date building and number coercion
//! - **Dimension shaping** - collapse blocks to scalars and flat lists, or
//!   pin a dimensionality and let shape errors surface early
//! - **Converters** - plain values, key/value [`Mapping`]s, numeric
//!   matrices, labeled frames and series, file-backed relations
//! - **Explicit registry** - converters live in an owned [`Registry`];
//!   nothing registers itself behind your back
//! - **Chunked transfer** - bounded reads and writes for large blocks
//! - **Test support** - an in-memory grid in [`testing`], call counters
//!   included
//!
//! ## Quick Start
//!
//! ```
//! use gridcast::testing::TestGrid;
//! use gridcast::{read, rows, ExpandMode, Options, Region, Registry, Value};
//!
//! # fn main() -> gridcast::Result<()> {
//! let grid = TestGrid::new();
//! grid.put(1, 1, "city");
//! grid.put(1, 2, "total");
//! grid.put(2, 1, "berlin");
//! grid.put(2, 2, 10.0);
//! grid.put(3, 1, "madrid");
//! grid.put(3, 2, 20.0);
//!
//! // Read the whole table from its top-left cell.
//! let registry = Registry::with_defaults();
//! let options = Options::new().expand(ExpandMode::Table);
//! let value = read(&grid, Region::anchor(1, 1), None, &options, &registry)?;
//!
//! assert_eq!(
//!     value,
//!     Value::Rows(rows![
//!         ["city", "total"],
//!         ["berlin", 10.0],
//!         ["madrid", 20.0],
//!     ])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Regions and Expansion
//!
//! A [`Region`] addresses a rectangular block by its 1-based top-left cell
//! and an optional shape. A region without a shape is an *anchor*; pair it
//! with an [`ExpandMode`] and the read pipeline resolves it against the
//! grid's occupied cells, so `Region::anchor(1, 1)` plus
//! [`ExpandMode::Table`] means "the table starting at A1" no matter how big
//! it is today.
//!
//! ### Values
//!
//! A [`Value`] is what conversion produces and consumes: a [`Scalar`], a
//! flat list, rows of scalars, a raw cell block, or one of the richer
//! converter types. Writes route by variant when no converter is named.
//!
//! ### Options
//!
//! [`Options`] is an ordered key/value bag with typed accessors. Options
//! set later override earlier ones, so converters can pin what they need
//! (a frame read always works on rows, for example) while everything else
//! stays caller-controlled.
//!
//! ### Converters and the Registry
//!
//! A converter is an [`Accessor`]: one function building the read pipeline,
//! one building the write pipeline. Converters register in a [`Registry`]
//! under a [`Convert`] tag. [`Registry::with_defaults`] knows every
//! converter compiled into the crate; [`Registry::register`] adds your own.
//!
//! ### Pipelines
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s sharing a
//! [`ConversionContext`]. Reads run front to back, writes likewise, and
//! the first failing stage aborts the run. The stage vocabulary lives in
//! [`stages`].
//!
//! ## Feature Flags
//!
//! - `matrix` - numeric n-dimensional arrays via ndarray (default)
//! - `frame` - labeled frames and series (default)
//! - `relation` - file-backed relations staged as CSV (default)
//!
//! ## Examples
//!
//! ### Reading a Mapping
//!
//! ```
//! use gridcast::testing::TestGrid;
//! use gridcast::{read, Convert, Options, Region, Registry, Value};
//!
//! # fn main() -> gridcast::Result<()> {
//! let grid = TestGrid::new();
//! grid.put(1, 1, "a");
//! grid.put(1, 2, 1.0);
//! grid.put(2, 1, "b");
//! grid.put(2, 2, 2.0);
//!
//! let options = Options::new().convert(Convert::Mapping);
//! let registry = Registry::with_defaults();
//! let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry)?;
//!
//! let Value::Mapping(map) = value else { unreachable!() };
//! assert_eq!(map.get("a"), Some(&1.0.into()));
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing a Frame
//!
//! ```ignore
//! use gridcast::testing::TestGrid;
//! use gridcast::{rows, write, Frame, Options, Region, Registry, Value};
//!
//! let frame = Frame::new(
//!     vec!["city", "total"],
//!     rows![["berlin", 10.0], ["madrid", 20.0]],
//! )?
//! .with_index("id", vec![1, 2])?;
//!
//! let grid = TestGrid::new();
//! write(
//!     &grid,
//!     Value::Frame(frame),
//!     Region::anchor(1, 1),
//!     &Options::new(),
//!     &Registry::with_defaults(),
//! )?;
//! ```
//!
//! ### Scalar Fill
//!
//! ```
//! use gridcast::testing::TestGrid;
//! use gridcast::{write, CellValue, Options, Region, Registry, Value};
//!
//! # fn main() -> gridcast::Result<()> {
//! // A single scalar written to a multi-cell region fills it.
//! let grid = TestGrid::new();
//! write(
//!     &grid,
//!     Value::from(0.0),
//!     Region::new(1, 1, 2, 3),
//!     &Options::new(),
//!     &Registry::with_defaults(),
//! )?;
//! assert_eq!(grid.cell(2, 3), CellValue::Number(0.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Gridcast uses a **staged pipeline** model:
//! 1. [`read`] and [`write`] pick a converter, by explicit [`Convert`] tag
//!    or (for writes) by the value's variant
//! 2. The converter builds a [`Pipeline`] for the requested direction
//! 3. Stages run in order over a shared [`ConversionContext`] holding the
//!    grid handle, the region, and the value in transit
//! 4. The context's value (reads) or the grid (writes) holds the result
//!
//! ## Module Overview
//!
//! - [`cell`] - Raw cell values and cleaned scalars
//! - [`region`] - Rectangular block addressing
//! - [`grid`] - The backend trait conversion runs against
//! - [`expansion`] - Region growth over occupied cells
//! - [`options`] - The conversion option bag and its keys
//! - [`pipeline`] - Stages, pipelines, and the conversion context
//! - [`stages`] - The built-in stage vocabulary
//! - [`convert`] - Converters, tags, and the registry
//! - [`value`] - The conversion value type
//! - [`error`] - The crate-wide error type
//! - [`testing`] - In-memory grid and block builders for tests

pub mod cell;
pub mod convert;
pub mod error;
pub mod expansion;
pub mod grid;
pub mod options;
pub mod pipeline;
pub mod region;
pub mod stages;
pub mod testing;
pub mod value;

// General re-exports
pub use cell::{duration_text, CellValue, Scalar};
pub use convert::{read, route, write, Accessor, Convert, Mapping, Registry};
pub use error::{Error, Result};
pub use expansion::{expand, ExpandMode};
pub use grid::GridAccessor;
pub use options::{ColumnSelector, DateBuilder, DateParts, NumberFormat, Options};
pub use pipeline::{ConversionContext, Meta, Pipeline, Stage};
pub use region::Region;
pub use value::Value;

// Gated re-exports
#[cfg(feature = "frame")]
pub use convert::{Frame, Series};

#[cfg(feature = "relation")]
pub use convert::RelationHandle;
