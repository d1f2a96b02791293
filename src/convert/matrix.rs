//! The homogeneous numeric matrix converter.
//!
//! Decoding runs the plain reader with empty cells defaulting to NaN, then
//! lifts the result into an [`ArrayD<f64>`]: a bare scalar becomes a 0-d
//! array, a flat list a 1-d array, nested rows a 2-d array. The `ndim`
//! option doubles as a minimum dimensionality: axes are prepended until the
//! array has at least that many, so a single row read with `ndim` 2 comes
//! back as a 1 x N matrix.
//!
//! Encoding replaces NaN elements with empty cells and flattens 0-, 1- and
//! 2-d arrays back to rows; higher dimensionalities have no cell layout and
//! fail with a shape error.

use crate::cell::Scalar;
use crate::convert::{plain, Accessor};
use crate::error::{Error, Result};
use crate::options::{keys, Options};
use crate::pipeline::{ConversionContext, Pipeline, Stage};
use crate::value::Value;
use ndarray::{ArrayD, Axis, IxDyn};

fn numeric(scalar: Scalar) -> Result<f64> {
    match scalar {
        Scalar::Number(number) => Ok(number),
        Scalar::Int(number) => Ok(number as f64),
        Scalar::Bool(flag) => Ok(if flag { 1.0 } else { 0.0 }),
        Scalar::Empty => Ok(f64::NAN),
        other => Err(Error::shape(format!(
            "matrix cells must be numeric, got {other:?}"
        ))),
    }
}

struct DecodeMatrix {
    min_dims: usize,
}

impl DecodeMatrix {
    fn new(options: &Options) -> Self {
        DecodeMatrix {
            min_dims: options.get_ndim().unwrap_or(0) as usize,
        }
    }
}

impl Stage for DecodeMatrix {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("matrix decode")?;
        let mut array = match value {
            Value::Scalar(scalar) => ArrayD::from_elem(IxDyn(&[]), numeric(scalar)?),
            Value::List(list) => {
                let len = list.len();
                let numbers = list.into_iter().map(numeric).collect::<Result<Vec<f64>>>()?;
                ArrayD::from_shape_vec(IxDyn(&[len]), numbers)
                    .map_err(|err| Error::shape(err.to_string()))?
            }
            Value::Rows(rows) => {
                let nrows = rows.len();
                let ncols = rows.first().map_or(0, Vec::len);
                let numbers = rows
                    .into_iter()
                    .flatten()
                    .map(numeric)
                    .collect::<Result<Vec<f64>>>()?;
                ArrayD::from_shape_vec(IxDyn(&[nrows, ncols]), numbers)
                    .map_err(|err| Error::shape(err.to_string()))?
            }
            other => {
                return Err(Error::shape(format!(
                    "matrix decode: expected plain values, got {}",
                    other.kind()
                )));
            }
        };

        while array.ndim() < self.min_dims {
            array = array.insert_axis(Axis(0));
        }

        ctx.value = Some(Value::Matrix(array));
        Ok(())
    }
}

struct EncodeMatrix;

impl Stage for EncodeMatrix {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("matrix encode")?;
        let Value::Matrix(array) = value else {
            return Err(Error::shape(format!(
                "matrix encode: expected a matrix, got {}",
                value.kind()
            )));
        };

        let element = |number: f64| {
            if number.is_nan() {
                Scalar::Empty
            } else {
                Scalar::Number(number)
            }
        };

        let value = match array.ndim() {
            0 => Value::Scalar(array.iter().next().copied().map_or(Scalar::Empty, element)),
            1 => Value::List(array.iter().copied().map(element).collect()),
            2 => Value::Rows(
                array
                    .outer_iter()
                    .map(|row| row.iter().copied().map(element).collect())
                    .collect(),
            ),
            dims => {
                return Err(Error::shape(format!(
                    "a {dims}-dimensional matrix has no cell layout"
                )));
            }
        };

        ctx.value = Some(value);
        Ok(())
    }
}

/// Converter between numeric regions and [`ArrayD<f64>`] matrices.
pub struct MatrixAccessor;

impl Accessor for MatrixAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        let options = options.clone().defaults(keys::EMPTY, Scalar::Number(f64::NAN));
        plain::reader(&options).append_stage(DecodeMatrix::new(&options))
    }

    fn writer(&self, options: &Options) -> Pipeline {
        plain::writer(options).prepend_stage(EncodeMatrix)
    }
}
