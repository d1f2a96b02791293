//! Converters, the registry, and the conversion entry points.
//!
//! A converter is an [`Accessor`]: a pair of pipeline-building functions,
//! one per direction. Converters register in a [`Registry`] under a
//! [`Convert`] tag; the entry points [`read`] and [`write`] pick one by the
//! caller's explicit tag, or - for writes without a tag - by matching the
//! value's variant. Reads without a tag use the plain converter.
//!
//! The registry is an owned, explicitly constructed value with no global
//! state; [`Registry::with_defaults`] registers every converter compiled
//! into the crate.
//!
//! ```
//! use gridcast::testing::TestGrid;
//! use gridcast::{read, Options, Region, Registry, Value};
//!
//! let grid = TestGrid::new();
//! grid.put(1, 1, 42.0);
//!
//! let registry = Registry::with_defaults();
//! let value = read(&grid, Region::anchor(1, 1), None, &Options::new(), &registry)?;
//! assert_eq!(value, Value::from(42.0));
//! # Ok::<(), gridcast::Error>(())
//! ```

pub mod mapping;
pub mod plain;

#[cfg(feature = "frame")]
#[cfg_attr(docsrs, doc(cfg(feature = "frame")))]
pub mod frame;
#[cfg(feature = "matrix")]
#[cfg_attr(docsrs, doc(cfg(feature = "matrix")))]
pub mod matrix;
#[cfg(feature = "relation")]
#[cfg_attr(docsrs, doc(cfg(feature = "relation")))]
pub mod relation;

pub use mapping::{Mapping, MappingAccessor};
pub use plain::{PlainAccessor, RawAccessor};

#[cfg(feature = "frame")]
pub use frame::{Frame, FrameAccessor, Series, SeriesAccessor};
#[cfg(feature = "matrix")]
pub use matrix::MatrixAccessor;
#[cfg(feature = "relation")]
pub use relation::{serial_to_datetime, RelationAccessor, RelationHandle};

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::grid::GridAccessor;
use crate::options::Options;
use crate::pipeline::{ConversionContext, Pipeline};
use crate::region::Region;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A registered converter: builds the reader and writer pipelines for one
/// value shape.
pub trait Accessor {
    /// Build the pipeline that decodes a region into a typed value.
    fn reader(&self, options: &Options) -> Pipeline;

    /// Build the pipeline that encodes a typed value into a region.
    fn writer(&self, options: &Options) -> Pipeline;
}

/// Converter tags.
///
/// Tags parse from their canonical names and short aliases, so callers can
/// accept configuration strings:
///
/// ```
/// use gridcast::Convert;
///
/// assert_eq!("dict".parse::<Convert>()?, Convert::Mapping);
/// assert_eq!("df".parse::<Convert>()?, Convert::Frame);
/// # Ok::<(), gridcast::Error>(())
/// ```
///
/// Every tag exists regardless of compiled features; looking up a tag whose
/// converter was not compiled in fails with a lookup error at the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Convert {
    /// Plain scalars, lists and nested rows.
    Plain,
    /// Uncleaned raw blocks, straight from and to the backend.
    Raw,
    /// Ordered key-value mappings.
    Mapping,
    /// Homogeneous numeric matrices.
    Matrix,
    /// Labeled 2-axis tables.
    Frame,
    /// Labeled 1-axis series.
    Series,
    /// Relational snapshots behind an opaque handle.
    Relation,
}

impl Convert {
    /// The canonical tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Convert::Plain => "plain",
            Convert::Raw => "raw",
            Convert::Mapping => "mapping",
            Convert::Matrix => "matrix",
            Convert::Frame => "frame",
            Convert::Series => "series",
            Convert::Relation => "relation",
        }
    }
}

impl fmt::Display for Convert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Convert {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "plain" | "value" => Ok(Convert::Plain),
            "raw" => Ok(Convert::Raw),
            "mapping" | "dict" | "map" => Ok(Convert::Mapping),
            "matrix" | "array" => Ok(Convert::Matrix),
            "frame" | "df" | "table" => Ok(Convert::Frame),
            "series" => Ok(Convert::Series),
            "relation" | "rel" => Ok(Convert::Relation),
            other => Err(Error::lookup(format!("unknown converter tag '{other}'"))),
        }
    }
}

/// An owned converter registry.
pub struct Registry {
    accessors: HashMap<Convert, Box<dyn Accessor>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            accessors: HashMap::new(),
        }
    }

    /// Create a registry holding every converter compiled into the crate.
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        registry.register(Convert::Plain, PlainAccessor);
        registry.register(Convert::Raw, RawAccessor);
        registry.register(Convert::Mapping, MappingAccessor);
        #[cfg(feature = "matrix")]
        registry.register(Convert::Matrix, MatrixAccessor);
        #[cfg(feature = "frame")]
        registry.register(Convert::Frame, FrameAccessor);
        #[cfg(feature = "frame")]
        registry.register(Convert::Series, SeriesAccessor);
        #[cfg(feature = "relation")]
        registry.register(Convert::Relation, RelationAccessor);
        registry
    }

    /// Register (or replace) the converter for a tag.
    pub fn register<A: Accessor + 'static>(&mut self, tag: Convert, accessor: A) {
        self.accessors.insert(tag, Box::new(accessor));
    }

    /// True if a converter is registered for `tag`.
    pub fn contains(&self, tag: Convert) -> bool {
        self.accessors.contains_key(&tag)
    }

    /// Look up the converter for a tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lookup`] naming the tag if nothing is registered
    /// under it.
    pub fn get(&self, tag: Convert) -> Result<&dyn Accessor> {
        self.accessors
            .get(&tag)
            .map(Box::as_ref)
            .ok_or_else(|| Error::lookup(format!("no converter registered for tag '{tag}'")))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_defaults()
    }
}

/// The tag a value routes to when written without an explicit `convert`.
pub fn route(value: &Value) -> Convert {
    match value {
        Value::Scalar(_) | Value::List(_) | Value::Rows(_) => Convert::Plain,
        Value::Raw(_) => Convert::Raw,
        Value::Mapping(_) => Convert::Mapping,
        #[cfg(feature = "matrix")]
        Value::Matrix(_) => Convert::Matrix,
        #[cfg(feature = "frame")]
        Value::Frame(_) => Convert::Frame,
        #[cfg(feature = "frame")]
        Value::Series(_) => Convert::Series,
        #[cfg(feature = "relation")]
        Value::Relation(_) => Convert::Relation,
    }
}

/// Read `region` into a typed value.
///
/// `raw` optionally supplies an already-fetched block (as a remote transport
/// would); the raw I/O stage then skips its fetch and the block must be
/// rectangular. The converter is picked by the `convert` option, defaulting
/// to [`Convert::Plain`].
///
/// # Errors
///
/// Shape, lookup and backend errors per the converter's pipeline.
pub fn read(
    grid: &dyn GridAccessor,
    region: Region,
    raw: Option<Vec<Vec<CellValue>>>,
    options: &Options,
    registry: &Registry,
) -> Result<Value> {
    let tag = options.get_convert().unwrap_or(Convert::Plain);
    let accessor = registry.get(tag)?;
    let pipeline = accessor.reader(options);

    let mut ctx = ConversionContext::new(grid, region);
    if let Some(block) = raw {
        require_rectangular(&block)?;
        ctx.value = Some(Value::Raw(block));
    }
    pipeline.run_read(&mut ctx)?;
    ctx.take_value("read")
}

/// Write a typed value at `region`.
///
/// The converter is picked by the `convert` option when present, otherwise
/// by [`route`] over the value's variant. An unresolved region takes the
/// value's shape; shape and lookup errors surface before any cell is
/// written.
///
/// # Errors
///
/// Shape, lookup and backend errors per the converter's pipeline.
pub fn write(
    grid: &dyn GridAccessor,
    value: Value,
    region: Region,
    options: &Options,
    registry: &Registry,
) -> Result<()> {
    let tag = options.get_convert().unwrap_or_else(|| route(&value));
    let accessor = registry.get(tag)?;
    let pipeline = accessor.writer(options);

    let mut ctx = ConversionContext::with_value(grid, region, value);
    pipeline.run_write(&mut ctx)
}

fn require_rectangular(block: &[Vec<CellValue>]) -> Result<()> {
    let width = block.first().map_or(0, Vec::len);
    for (index, row) in block.iter().enumerate() {
        if row.len() != width {
            return Err(Error::shape(format!(
                "jagged raw block: row {index} has {} cells, every row must have {width}",
                row.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Scalar;

    #[test]
    fn tags_parse_canonical_names_and_aliases() {
        assert_eq!("plain".parse::<Convert>().unwrap(), Convert::Plain);
        assert_eq!("value".parse::<Convert>().unwrap(), Convert::Plain);
        assert_eq!("dict".parse::<Convert>().unwrap(), Convert::Mapping);
        assert_eq!("map".parse::<Convert>().unwrap(), Convert::Mapping);
        assert_eq!("array".parse::<Convert>().unwrap(), Convert::Matrix);
        assert_eq!("table".parse::<Convert>().unwrap(), Convert::Frame);
        assert_eq!("rel".parse::<Convert>().unwrap(), Convert::Relation);
        assert!("csv".parse::<Convert>().is_err());
    }

    #[test]
    fn lookup_errors_name_the_missing_tag() {
        let registry = Registry::new();
        let err = registry.get(Convert::Frame).err().unwrap();
        assert!(err.is_lookup());
        assert!(err.to_string().contains("'frame'"));
    }

    #[test]
    fn plain_shapes_route_to_the_plain_converter() {
        assert_eq!(route(&Value::from(1.0)), Convert::Plain);
        assert_eq!(route(&Value::List(vec![Scalar::Int(1)])), Convert::Plain);
        assert_eq!(route(&Value::Rows(vec![])), Convert::Plain);
        assert_eq!(route(&Value::Raw(vec![])), Convert::Raw);
        assert_eq!(
            route(&Value::Mapping(Mapping::default())),
            Convert::Mapping
        );
    }

    #[test]
    fn default_registry_has_every_compiled_converter() {
        let registry = Registry::with_defaults();
        assert!(registry.contains(Convert::Plain));
        assert!(registry.contains(Convert::Raw));
        assert!(registry.contains(Convert::Mapping));
        #[cfg(feature = "matrix")]
        assert!(registry.contains(Convert::Matrix));
        #[cfg(feature = "frame")]
        {
            assert!(registry.contains(Convert::Frame));
            assert!(registry.contains(Convert::Series));
        }
        #[cfg(feature = "relation")]
        assert!(registry.contains(Convert::Relation));
    }
}
