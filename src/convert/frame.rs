//! The labeled table and series converters.
//!
//! A [`Frame`] is a 2-axis table: a rectangular data body, optionally
//! multi-level column labels, and an optional (possibly multi-level) row
//! index. A [`Series`] is its 1-axis sibling: one data column with a name
//! and an optional index.
//!
//! Decoding splits a block by the `header` and `index` counts. With both at
//! their default of 1, the corner cell holds the index name:
//!
//! ```text
//! |      | c1 | c2 |        columns: c1, c2
//! | r1   |  1 |  2 |   ->   index:   r1, r2 (unnamed)
//! | r2   |  3 |  4 |        data:    [[1, 2], [3, 4]]
//! ```
//!
//! With several header rows, index names sit in the *last* header row's
//! leading cells and the rows above them stay blank. Encoding is the exact
//! inverse, and stringifies duration values on the way out since no grid
//! cell holds an elapsed time natively.

use crate::cell::{duration_text, Scalar};
use crate::convert::{plain, Accessor};
use crate::error::{Error, Result};
use crate::options::{keys, Options};
use crate::pipeline::{ConversionContext, Pipeline, Stage};
use crate::value::Value;

/// A labeled 2-axis table.
///
/// Invariants, enforced by the constructors:
/// - the data body is rectangular
/// - there are as many column label vectors as data columns (or none at all
///   for a label-free table), all with the same number of levels
/// - there are as many index label vectors as data rows, all with one label
///   per index level
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Vec<Scalar>>,
    index_names: Vec<Scalar>,
    index: Vec<Vec<Scalar>>,
    data: Vec<Vec<Scalar>>,
}

impl Frame {
    /// Create a frame with single-level column labels and no row index.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the body is jagged or does not match the
    /// number of columns.
    pub fn new<C: Into<Scalar>>(columns: Vec<C>, data: Vec<Vec<Scalar>>) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|label| vec![label.into()])
            .collect();
        Frame::from_parts(columns, Vec::new(), Vec::new(), data)
    }

    /// Create a frame from its four parts.
    ///
    /// # Errors
    ///
    /// Returns a shape error if any invariant listed on [`Frame`] is
    /// violated.
    pub fn from_parts(
        columns: Vec<Vec<Scalar>>,
        index_names: Vec<Scalar>,
        index: Vec<Vec<Scalar>>,
        data: Vec<Vec<Scalar>>,
    ) -> Result<Self> {
        let width = data.first().map_or(columns.len(), Vec::len);
        for (number, row) in data.iter().enumerate() {
            if row.len() != width {
                return Err(Error::shape(format!(
                    "frame body is jagged: row {number} has {} cells, expected {width}",
                    row.len()
                )));
            }
        }
        if !columns.is_empty() {
            if columns.len() != width {
                return Err(Error::shape(format!(
                    "frame has {} column labels for {width} data columns",
                    columns.len()
                )));
            }
            let levels = columns[0].len();
            if levels == 0 || columns.iter().any(|column| column.len() != levels) {
                return Err(Error::shape(
                    "frame column labels must all have the same, non-zero number of levels",
                ));
            }
        }
        if index_names.is_empty() {
            if !index.is_empty() {
                return Err(Error::shape("frame index labels require index names"));
            }
        } else {
            if index.len() != data.len() {
                return Err(Error::shape(format!(
                    "frame has {} index labels for {} data rows",
                    index.len(),
                    data.len()
                )));
            }
            let levels = index_names.len();
            if index.iter().any(|labels| labels.len() != levels) {
                return Err(Error::shape(format!(
                    "frame index labels must have {levels} levels"
                )));
            }
        }
        Ok(Frame {
            columns,
            index_names,
            index,
            data,
        })
    }

    /// This frame with a single-level row index attached.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the label count does not match the body.
    pub fn with_index<N: Into<Scalar>, L: Into<Scalar>>(
        self,
        name: N,
        labels: Vec<L>,
    ) -> Result<Self> {
        let index = labels.into_iter().map(|label| vec![label.into()]).collect();
        Frame::from_parts(self.columns, vec![name.into()], index, self.data)
    }

    /// Number of data rows.
    pub fn nrows(&self) -> usize {
        self.data.len()
    }

    /// Number of data columns.
    pub fn ncols(&self) -> usize {
        self.data.first().map_or(self.columns.len(), Vec::len)
    }

    /// Number of column label levels; zero for a label-free table.
    pub fn header_levels(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of row index levels; zero when there is no index.
    pub fn index_levels(&self) -> usize {
        self.index_names.len()
    }

    /// Column labels, one vector of levels per data column.
    pub fn columns(&self) -> &[Vec<Scalar>] {
        &self.columns
    }

    /// Index level names. Unnamed levels hold [`Scalar::Empty`].
    pub fn index_names(&self) -> &[Scalar] {
        &self.index_names
    }

    /// Row index labels, one vector of levels per data row.
    pub fn index_labels(&self) -> &[Vec<Scalar>] {
        &self.index
    }

    /// The data body, row-major.
    pub fn data(&self) -> &[Vec<Scalar>] {
        &self.data
    }

    fn decode(rows: Vec<Vec<Scalar>>, header: usize, index: usize) -> Result<Frame> {
        if header > rows.len() {
            return Err(Error::shape(format!(
                "block has {} rows, fewer than the {header} header rows requested",
                rows.len()
            )));
        }
        let width = rows.first().map_or(0, Vec::len);
        if index > width {
            return Err(Error::shape(format!(
                "block has {width} columns, fewer than the {index} index columns requested"
            )));
        }

        let mut header_rows = rows;
        let body = header_rows.split_off(header);

        // Index names live in the last header row's leading cells.
        let index_names = if index == 0 {
            Vec::new()
        } else if header > 0 {
            header_rows[header - 1][..index].to_vec()
        } else {
            vec![Scalar::Empty; index]
        };

        let columns: Vec<Vec<Scalar>> = if header == 0 {
            Vec::new()
        } else {
            (index..width)
                .map(|col| header_rows.iter().map(|row| row[col].clone()).collect())
                .collect()
        };

        let mut index_labels = Vec::with_capacity(body.len());
        let mut data = Vec::with_capacity(body.len());
        for mut row in body {
            let rest = row.split_off(index);
            index_labels.push(row);
            data.push(rest);
        }
        if index == 0 {
            index_labels = Vec::new();
        }

        Frame::from_parts(columns, index_names, index_labels, data)
    }

    fn encode(&self, include_header: bool, include_index: bool) -> Vec<Vec<Scalar>> {
        let levels = self.header_levels();
        let index_levels = if include_index { self.index_levels() } else { 0 };
        let width = index_levels + self.ncols();
        let mut out = Vec::new();

        if include_header {
            for level in 0..levels {
                let mut row = Vec::with_capacity(width);
                if level + 1 == levels {
                    row.extend(self.index_names.iter().take(index_levels).cloned().map(stringify));
                } else {
                    row.extend(std::iter::repeat_n(Scalar::Empty, index_levels));
                }
                row.extend(self.columns.iter().map(|column| stringify(column[level].clone())));
                out.push(row);
            }
        }

        for (number, data_row) in self.data.iter().enumerate() {
            let mut row = Vec::with_capacity(width);
            if index_levels > 0 {
                row.extend(self.index[number].iter().cloned().map(stringify));
            }
            row.extend(data_row.iter().cloned().map(stringify));
            out.push(row);
        }
        out
    }
}

/// A labeled 1-axis series.
///
/// Invariants mirror [`Frame`]'s: one index label vector per value, each
/// with one label per index level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    name: Scalar,
    index_names: Vec<Scalar>,
    index: Vec<Vec<Scalar>>,
    values: Vec<Scalar>,
}

impl Series {
    /// Create a named series without an index.
    pub fn new<N: Into<Scalar>>(name: N, values: Vec<Scalar>) -> Self {
        Series {
            name: name.into(),
            index_names: Vec::new(),
            index: Vec::new(),
            values,
        }
    }

    /// Create a series from its four parts.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the index does not match the values.
    pub fn from_parts(
        name: Scalar,
        index_names: Vec<Scalar>,
        index: Vec<Vec<Scalar>>,
        values: Vec<Scalar>,
    ) -> Result<Self> {
        if index_names.is_empty() {
            if !index.is_empty() {
                return Err(Error::shape("series index labels require index names"));
            }
        } else {
            if index.len() != values.len() {
                return Err(Error::shape(format!(
                    "series has {} index labels for {} values",
                    index.len(),
                    values.len()
                )));
            }
            let levels = index_names.len();
            if index.iter().any(|labels| labels.len() != levels) {
                return Err(Error::shape(format!(
                    "series index labels must have {levels} levels"
                )));
            }
        }
        Ok(Series {
            name,
            index_names,
            index,
            values,
        })
    }

    /// This series with a single-level index attached.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the label count does not match the values.
    pub fn with_index<N: Into<Scalar>, L: Into<Scalar>>(
        self,
        name: N,
        labels: Vec<L>,
    ) -> Result<Self> {
        let index = labels.into_iter().map(|label| vec![label.into()]).collect();
        Series::from_parts(self.name, vec![name.into()], index, self.values)
    }

    /// The series name. Unnamed series hold [`Scalar::Empty`].
    pub fn name(&self) -> &Scalar {
        &self.name
    }

    /// Index level names.
    pub fn index_names(&self) -> &[Scalar] {
        &self.index_names
    }

    /// Index labels, one vector of levels per value.
    pub fn index_labels(&self) -> &[Vec<Scalar>] {
        &self.index
    }

    /// The values.
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn decode(rows: Vec<Vec<Scalar>>, header: usize, index: usize) -> Result<Series> {
        let has_header = header > 0;
        if has_header && rows.is_empty() {
            return Err(Error::shape("block has no rows for the series header"));
        }
        let width = rows.first().map_or(0, Vec::len);
        if width != index + 1 {
            return Err(Error::shape(format!(
                "series blocks have exactly one data column after {index} index columns, got {width}"
            )));
        }

        let mut rows = rows;
        let body = if has_header {
            rows.split_off(1)
        } else {
            std::mem::take(&mut rows)
        };

        let (name, index_names) = match rows.into_iter().next() {
            Some(mut header_row) => {
                let name = header_row.split_off(index).into_iter().next().unwrap_or_default();
                (name, header_row)
            }
            None => (Scalar::Empty, vec![Scalar::Empty; index]),
        };
        let index_names = if index == 0 { Vec::new() } else { index_names };

        let mut index_labels = Vec::with_capacity(body.len());
        let mut values = Vec::with_capacity(body.len());
        for mut row in body {
            let value = row.split_off(index).into_iter().next().unwrap_or_default();
            index_labels.push(row);
            values.push(value);
        }
        if index == 0 {
            index_labels = Vec::new();
        }

        Series::from_parts(name, index_names, index_labels, values)
    }

    fn encode(&self, include_header: Option<bool>, include_index: bool) -> Vec<Vec<Scalar>> {
        // An unnamed, anonymously indexed series writes values only.
        let default_header =
            !self.name.is_empty() || self.index_names.iter().any(|name| !name.is_empty());
        let include_header = include_header.unwrap_or(default_header);
        let index_levels = if include_index { self.index_names.len() } else { 0 };

        let mut out = Vec::new();
        if include_header {
            let mut row = Vec::with_capacity(index_levels + 1);
            row.extend(self.index_names.iter().take(index_levels).cloned());
            row.push(self.name.clone());
            out.push(row);
        }
        for (number, value) in self.values.iter().enumerate() {
            let mut row = Vec::with_capacity(index_levels + 1);
            if index_levels > 0 {
                row.extend(self.index[number].iter().cloned().map(stringify));
            }
            row.push(stringify(value.clone()));
            out.push(row);
        }
        out
    }
}

fn stringify(scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::Duration(span) => Scalar::Text(duration_text(span)),
        other => other,
    }
}

struct DecodeFrame {
    header: usize,
    index: usize,
}

impl Stage for DecodeFrame {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("frame decode")?.into_rows("frame decode")?;
        let frame = Frame::decode(rows, self.header, self.index)?;
        ctx.value = Some(Value::Frame(frame));
        Ok(())
    }
}

struct EncodeFrame {
    header: bool,
    index: bool,
}

impl Stage for EncodeFrame {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("frame encode")?;
        let Value::Frame(frame) = value else {
            return Err(Error::shape(format!(
                "frame encode: expected a frame, got {}",
                value.kind()
            )));
        };
        ctx.value = Some(Value::Rows(frame.encode(self.header, self.index)));
        Ok(())
    }
}

struct DecodeSeries {
    header: usize,
    index: usize,
}

impl Stage for DecodeSeries {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("series decode")?.into_rows("series decode")?;
        let series = Series::decode(rows, self.header, self.index)?;
        ctx.value = Some(Value::Series(series));
        Ok(())
    }
}

struct EncodeSeries {
    header: Option<bool>,
    index: bool,
}

impl Stage for EncodeSeries {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("series encode")?;
        let Value::Series(series) = value else {
            return Err(Error::shape(format!(
                "series encode: expected a series, got {}",
                value.kind()
            )));
        };
        ctx.value = Some(Value::Rows(series.encode(self.header, self.index)));
        Ok(())
    }
}

/// Converter between labeled blocks and [`Frame`] tables.
pub struct FrameAccessor;

impl Accessor for FrameAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        let pinned = options.clone().set(keys::NDIM, 2);
        let decode = DecodeFrame {
            header: options.get_header(),
            index: options.get_index(),
        };
        plain::reader(&pinned).append_stage(decode)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        let encode = EncodeFrame {
            header: options.get_header() > 0,
            index: options.get_index() > 0,
        };
        plain::writer(options).prepend_stage(encode)
    }
}

/// Converter between one-column blocks and [`Series`] values.
pub struct SeriesAccessor;

impl Accessor for SeriesAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        let pinned = options.clone().set(keys::NDIM, 2);
        let decode = DecodeSeries {
            header: options.get_header(),
            index: options.get_index(),
        };
        plain::reader(&pinned).append_stage(decode)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        let encode = EncodeSeries {
            header: options
                .contains(keys::HEADER)
                .then(|| options.get_header() > 0),
            index: options.get_index() > 0,
        };
        plain::writer(options).prepend_stage(encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(labels: &[&str]) -> Vec<Scalar> {
        labels.iter().map(|label| Scalar::Text((*label).into())).collect()
    }

    #[test]
    fn decode_splits_header_index_and_body() {
        let rows = vec![
            vec![Scalar::Empty, Scalar::Text("c1".into()), Scalar::Text("c2".into())],
            vec![Scalar::Text("r1".into()), Scalar::Number(1.0), Scalar::Number(2.0)],
            vec![Scalar::Text("r2".into()), Scalar::Number(3.0), Scalar::Number(4.0)],
        ];
        let frame = Frame::decode(rows, 1, 1).unwrap();

        assert_eq!(frame.columns(), &[texts(&["c1"]), texts(&["c2"])]);
        assert_eq!(frame.index_names(), &[Scalar::Empty]);
        assert_eq!(frame.index_labels(), &[texts(&["r1"]), texts(&["r2"])]);
        assert_eq!(
            frame.data(),
            &[
                vec![Scalar::Number(1.0), Scalar::Number(2.0)],
                vec![Scalar::Number(3.0), Scalar::Number(4.0)],
            ]
        );
    }

    #[test]
    fn encode_is_the_exact_inverse_of_decode() {
        let rows = vec![
            vec![Scalar::Empty, Scalar::Text("c1".into()), Scalar::Text("c2".into())],
            vec![Scalar::Text("r1".into()), Scalar::Number(1.0), Scalar::Number(2.0)],
            vec![Scalar::Text("r2".into()), Scalar::Number(3.0), Scalar::Number(4.0)],
        ];
        let frame = Frame::decode(rows.clone(), 1, 1).unwrap();
        assert_eq!(frame.encode(true, true), rows);
    }

    #[test]
    fn multi_level_headers_blank_the_rows_above_the_index_names() {
        let rows = vec![
            vec![Scalar::Empty, Scalar::Text("a".into()), Scalar::Text("a".into())],
            vec![Scalar::Text("ix".into()), Scalar::Text("one".into()), Scalar::Text("two".into())],
            vec![Scalar::Text("r1".into()), Scalar::Number(1.0), Scalar::Number(2.0)],
        ];
        let frame = Frame::decode(rows.clone(), 2, 1).unwrap();
        assert_eq!(frame.header_levels(), 2);
        assert_eq!(frame.columns(), &[texts(&["a", "one"]), texts(&["a", "two"])]);
        assert_eq!(frame.index_names(), &[Scalar::Text("ix".into())]);
        assert_eq!(frame.encode(true, true), rows);
    }

    #[test]
    fn headerless_decode_keeps_positional_columns() {
        let rows = vec![
            vec![Scalar::Number(1.0), Scalar::Number(2.0)],
            vec![Scalar::Number(3.0), Scalar::Number(4.0)],
        ];
        let frame = Frame::decode(rows.clone(), 0, 0).unwrap();
        assert_eq!(frame.header_levels(), 0);
        assert_eq!(frame.index_levels(), 0);
        assert_eq!(frame.encode(true, true), rows);
    }

    #[test]
    fn excluding_the_index_drops_labels_and_corner() {
        let frame = Frame::new(vec!["c1"], vec![vec![Scalar::Number(1.0)]])
            .unwrap()
            .with_index("rows", vec!["r1"])
            .unwrap();
        assert_eq!(
            frame.encode(true, false),
            vec![
                vec![Scalar::Text("c1".into())],
                vec![Scalar::Number(1.0)],
            ]
        );
        assert_eq!(
            frame.encode(false, true),
            vec![vec![Scalar::Text("r1".into()), Scalar::Number(1.0)]]
        );
    }

    #[test]
    fn jagged_bodies_are_rejected() {
        let err = Frame::new(
            vec!["c1", "c2"],
            vec![
                vec![Scalar::Number(1.0), Scalar::Number(2.0)],
                vec![Scalar::Number(3.0)],
            ],
        )
        .unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn duration_cells_stringify_on_encode() {
        let span = chrono::Duration::hours(26);
        let frame = Frame::new(vec!["elapsed"], vec![vec![Scalar::Duration(span)]]).unwrap();
        assert_eq!(
            frame.encode(true, true),
            vec![
                vec![Scalar::Text("elapsed".into())],
                vec![Scalar::Text("1 days 02:00:00".into())],
            ]
        );
    }

    #[test]
    fn series_decode_requires_one_data_column() {
        let rows = vec![
            vec![Scalar::Text("s".into()), Scalar::Text("extra".into())],
            vec![Scalar::Number(1.0), Scalar::Number(2.0)],
        ];
        let err = Series::decode(rows, 1, 0).unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn series_round_trips_with_name_and_index() {
        let rows = vec![
            vec![Scalar::Text("date".into()), Scalar::Text("total".into())],
            vec![Scalar::Text("mon".into()), Scalar::Number(10.0)],
            vec![Scalar::Text("tue".into()), Scalar::Number(20.0)],
        ];
        let series = Series::decode(rows.clone(), 1, 1).unwrap();
        assert_eq!(series.name(), &Scalar::Text("total".into()));
        assert_eq!(series.index_names(), &[Scalar::Text("date".into())]);
        assert_eq!(series.values(), &[Scalar::Number(10.0), Scalar::Number(20.0)]);
        assert_eq!(series.encode(None, true), rows);
    }

    #[test]
    fn anonymous_series_default_to_headerless_output() {
        let series = Series::new(Scalar::Empty, vec![Scalar::Number(1.0), Scalar::Number(2.0)]);
        assert_eq!(
            series.encode(None, true),
            vec![vec![Scalar::Number(1.0)], vec![Scalar::Number(2.0)]]
        );
        // An explicit header request overrides the default.
        assert_eq!(
            series.encode(Some(true), true),
            vec![
                vec![Scalar::Empty],
                vec![Scalar::Number(1.0)],
                vec![Scalar::Number(2.0)],
            ]
        );
    }
}
