//! The typed value union flowing through pipelines.

use crate::cell::{CellValue, Scalar};
use crate::convert::Mapping;
use crate::error::{Error, Result};

#[cfg(feature = "frame")]
use crate::convert::{Frame, Series};
#[cfg(feature = "relation")]
use crate::convert::RelationHandle;
#[cfg(feature = "matrix")]
use ndarray::ArrayD;

/// A value at some point of its journey between grid and caller.
///
/// `Raw` and `Rows` are the pipeline's working forms (raw cells around the
/// backend boundary, cleaned scalars between stages); the remaining variants
/// are the user-facing shapes converters decode to and encode from. Which of
/// `Scalar`, `List` and `Rows` a plain read produces is decided by the
/// dimensionality-adjustment stage.
#[derive(Debug, PartialEq)]
pub enum Value {
    /// A single cleaned scalar.
    Scalar(Scalar),
    /// A flat sequence, from a 1 x N or N x 1 block.
    List(Vec<Scalar>),
    /// A nested row-major sequence of cleaned scalars.
    Rows(Vec<Vec<Scalar>>),
    /// An uncleaned row-major block of raw cells.
    Raw(Vec<Vec<CellValue>>),
    /// An ordered key-value mapping.
    Mapping(Mapping),
    /// A homogeneous numeric array.
    #[cfg(feature = "matrix")]
    Matrix(ArrayD<f64>),
    /// A labeled 2-axis table.
    #[cfg(feature = "frame")]
    Frame(Frame),
    /// A labeled 1-axis series.
    #[cfg(feature = "frame")]
    Series(Series),
    /// A handle over a relational snapshot of a block.
    #[cfg(feature = "relation")]
    Relation(RelationHandle),
}

impl Value {
    /// A short name for this variant, used in error messages and routing.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
            Value::Rows(_) => "rows",
            Value::Raw(_) => "raw",
            Value::Mapping(_) => "mapping",
            #[cfg(feature = "matrix")]
            Value::Matrix(_) => "matrix",
            #[cfg(feature = "frame")]
            Value::Frame(_) => "frame",
            #[cfg(feature = "frame")]
            Value::Series(_) => "series",
            #[cfg(feature = "relation")]
            Value::Relation(_) => "relation",
        }
    }

    /// Unwrap the nested-scalar form, as produced between cleaning and
    /// decoding when `ndim` is pinned to 2.
    ///
    /// # Errors
    ///
    /// Returns a shape error naming `stage` if the value is anything else.
    pub fn into_rows(self, stage: &str) -> Result<Vec<Vec<Scalar>>> {
        match self {
            Value::Rows(rows) => Ok(rows),
            other => Err(Error::shape(format!(
                "{stage}: expected nested rows, got {}",
                other.kind()
            ))),
        }
    }

    /// Unwrap the raw-block form held around the backend boundary.
    ///
    /// # Errors
    ///
    /// Returns a shape error naming `stage` if the value is anything else.
    pub fn into_raw(self, stage: &str) -> Result<Vec<Vec<CellValue>>> {
        match self {
            Value::Raw(block) => Ok(block),
            other => Err(Error::shape(format!(
                "{stage}: expected a raw block, got {}",
                other.kind()
            ))),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Number(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Int(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::Text(value))
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(value: Vec<Scalar>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<Vec<Scalar>>> for Value {
    fn from(value: Vec<Vec<Scalar>>) -> Self {
        Value::Rows(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

#[cfg(feature = "matrix")]
impl From<ArrayD<f64>> for Value {
    fn from(value: ArrayD<f64>) -> Self {
        Value::Matrix(value)
    }
}

#[cfg(feature = "matrix")]
impl From<ndarray::Array1<f64>> for Value {
    fn from(value: ndarray::Array1<f64>) -> Self {
        Value::Matrix(value.into_dyn())
    }
}

#[cfg(feature = "matrix")]
impl From<ndarray::Array2<f64>> for Value {
    fn from(value: ndarray::Array2<f64>) -> Self {
        Value::Matrix(value.into_dyn())
    }
}

#[cfg(feature = "frame")]
impl From<Frame> for Value {
    fn from(value: Frame) -> Self {
        Value::Frame(value)
    }
}

#[cfg(feature = "frame")]
impl From<Series> for Value {
    fn from(value: Series) -> Self {
        Value::Series(value)
    }
}

#[cfg(feature = "relation")]
impl From<RelationHandle> for Value {
    fn from(value: RelationHandle) -> Self {
        Value::Relation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_name_their_variant() {
        assert_eq!(Value::from(1.5).kind(), "scalar");
        assert_eq!(Value::List(vec![]).kind(), "list");
        assert_eq!(Value::Rows(vec![]).kind(), "rows");
        assert_eq!(Value::Raw(vec![]).kind(), "raw");
    }

    #[test]
    fn into_rows_rejects_other_shapes() {
        let rows = vec![vec![Scalar::Int(1)]];
        assert_eq!(
            Value::Rows(rows.clone()).into_rows("test").unwrap(),
            rows
        );
        let err = Value::from("text").into_rows("decode").unwrap_err();
        assert!(err.to_string().contains("decode"));
        assert!(err.is_shape());
    }
}
