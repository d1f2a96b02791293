//! The file-backed relation converter.
//!
//! Reading a block as a relation does not materialize it in memory.
//! Instead the block is staged into a temporary CSV file and the caller
//! gets a [`RelationHandle`]: a named view over that file, suitable for
//! handing to query engines that ingest CSV. The first block row becomes
//! the relation's column names; everything below is data.
//!
//! The staging file is *not* removed automatically. A handle that is
//! dropped without [`RelationHandle::close`] leaks its file, exactly like
//! an unclosed connection leaks its socket. Close every handle you are
//! done with.
//!
//! Columns listed under the `parse_dates` option are read back as
//! date-times, decoding spreadsheet serial day numbers (see
//! [`serial_to_datetime`]).

use std::path::{Path, PathBuf};

use crate::cell::{duration_text, Scalar};
use crate::convert::{plain, Accessor};
use crate::error::{Error, Result};
use crate::options::{keys, ColumnSelector, Options};
use crate::pipeline::{ConversionContext, Pipeline, Stage};
use crate::value::Value;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Convert a spreadsheet serial day number into a date-time.
///
/// Serial numbers count days from 1899-12-30, with the fractional part
/// holding the time of day. Returns `None` for non-finite input or a
/// serial outside the representable date range.
///
/// # Example
///
/// ```
/// use gridcast::convert::serial_to_datetime;
///
/// let stamp = serial_to_datetime(45_292.5).unwrap();
/// assert_eq!(stamp.to_string(), "2024-01-01 12:00:00");
/// ```
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let days = serial.trunc() as i64;
    let micros = (serial.fract() * 86_400_000_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::microseconds(micros))
}

/// A named, file-backed view over a rectangular block.
///
/// The handle owns nothing but the path; cloning it clones the view, not
/// the file. Call [`close`](RelationHandle::close) on exactly one clone
/// when the relation is no longer needed.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationHandle {
    name: String,
    columns: Vec<String>,
    path: PathBuf,
    parse_dates: Vec<usize>,
}

impl RelationHandle {
    /// Stage `rows` into a fresh temporary CSV file under `columns`.
    ///
    /// # Errors
    ///
    /// Returns a shape error if a row's width does not match the column
    /// count, and a resource error if the staging file cannot be created
    /// or written.
    pub fn create<N: Into<String>>(
        name: N,
        columns: Vec<String>,
        rows: &[Vec<Scalar>],
    ) -> Result<Self> {
        let name = name.into();
        for (number, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::shape(format!(
                    "relation row {number} has {} cells for {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }

        let staged = tempfile::Builder::new()
            .prefix("gridcast-relation-")
            .suffix(".csv")
            .tempfile()
            .map_err(Error::resource)?;
        // Persist the file: its lifetime is the handle's, not this scope's.
        let (file, path) = staged.keep().map_err(Error::resource)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&columns).map_err(Error::resource)?;
        for row in rows {
            writer
                .write_record(row.iter().map(|cell| encode_field(cell.clone())))
                .map_err(Error::resource)?;
        }
        writer.flush().map_err(Error::resource)?;

        log::debug!(
            "staged relation '{name}' ({} columns, {} rows) at {}",
            columns.len(),
            rows.len(),
            path.display()
        );

        Ok(RelationHandle {
            name,
            columns,
            path,
            parse_dates: Vec::new(),
        })
    }

    /// This handle with serial-date decoding enabled for `columns`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if an index is out of range.
    pub fn parse_dates(mut self, columns: Vec<usize>) -> Result<Self> {
        for &column in &columns {
            if column >= self.columns.len() {
                return Err(Error::lookup(format!(
                    "date column index {column} out of range for {} columns",
                    self.columns.len()
                )));
            }
        }
        self.parse_dates = columns;
        Ok(self)
    }

    /// The relation's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names, taken from the block's first row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Path of the staging file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the staged data back, one [`Scalar`] row per data row.
    ///
    /// CSV carries no types, so fields come back by parse: integers,
    /// floats, booleans and ISO date-times are recognized, everything
    /// else stays text. Columns marked via
    /// [`parse_dates`](RelationHandle::parse_dates) additionally decode
    /// numeric fields as serial day numbers.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the staging file is gone or unreadable.
    pub fn rows(&self) -> Result<Vec<Vec<Scalar>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(Error::resource)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(Error::resource)?;
            let mut row: Vec<Scalar> = record.iter().map(parse_field).collect();
            for &column in &self.parse_dates {
                if let Some(cell) = row.get_mut(column) {
                    *cell = decode_serial_cell(cell.clone());
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Remove the staging file, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the file cannot be removed.
    pub fn close(self) -> Result<()> {
        log::debug!("closing relation '{}' at {}", self.name, self.path.display());
        std::fs::remove_file(&self.path).map_err(Error::resource)
    }
}

/// Render a scalar as a CSV field that [`parse_field`] maps back to the
/// same value. Text is written bare, so text that happens to look like a
/// number comes back as one.
fn encode_field(cell: Scalar) -> String {
    match cell {
        Scalar::Empty => String::new(),
        Scalar::Number(number) => format!("{number:?}"),
        Scalar::Int(number) => number.to_string(),
        Scalar::Text(text) => text,
        Scalar::Bool(flag) => flag.to_string(),
        Scalar::DateTime(stamp) => stamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        Scalar::Date(date) => date
            .and_time(NaiveTime::MIN)
            .format("%Y-%m-%dT%H:%M:%S%.f")
            .to_string(),
        Scalar::Duration(span) => duration_text(span),
    }
}

fn parse_field(field: &str) -> Scalar {
    if field.is_empty() {
        return Scalar::Empty;
    }
    if let Ok(number) = field.parse::<i64>() {
        return Scalar::Int(number);
    }
    if let Ok(number) = field.parse::<f64>() {
        return Scalar::Number(number);
    }
    match field {
        "true" => return Scalar::Bool(true),
        "false" => return Scalar::Bool(false),
        _ => {}
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(field, "%Y-%m-%dT%H:%M:%S%.f") {
        return Scalar::DateTime(stamp);
    }
    Scalar::Text(field.to_owned())
}

fn decode_serial_cell(cell: Scalar) -> Scalar {
    let serial = match cell {
        Scalar::Number(number) => number,
        Scalar::Int(number) => number as f64,
        other => return other,
    };
    match serial_to_datetime(serial) {
        Some(stamp) => Scalar::DateTime(stamp),
        None => Scalar::Number(serial),
    }
}

fn resolve_date_columns(
    selectors: &[ColumnSelector],
    columns: &[String],
) -> Result<Vec<usize>> {
    selectors
        .iter()
        .map(|selector| match selector {
            ColumnSelector::Name(name) => columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| Error::lookup(format!("no column named '{name}'"))),
            ColumnSelector::Index(index) if *index < columns.len() => Ok(*index),
            ColumnSelector::Index(index) => Err(Error::lookup(format!(
                "date column index {index} out of range for {} columns",
                columns.len()
            ))),
        })
        .collect()
}

struct DecodeRelation {
    name: String,
    parse_dates: Vec<ColumnSelector>,
}

impl Stage for DecodeRelation {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx
            .take_value("relation decode")?
            .into_rows("relation decode")?;
        let mut rows = rows.into_iter();
        let Some(header) = rows.next() else {
            return Err(Error::shape("relation blocks need a header row"));
        };
        let columns: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
        let data: Vec<Vec<Scalar>> = rows.collect();
        let dates = resolve_date_columns(&self.parse_dates, &columns)?;
        let handle =
            RelationHandle::create(self.name.clone(), columns, &data)?.parse_dates(dates)?;
        ctx.value = Some(Value::Relation(handle));
        Ok(())
    }
}

struct EncodeRelation;

impl Stage for EncodeRelation {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("relation encode")?;
        let Value::Relation(handle) = value else {
            return Err(Error::shape(format!(
                "relation encode: expected a relation, got {}",
                value.kind()
            )));
        };
        let mut rows = Vec::with_capacity(1);
        rows.push(
            handle
                .columns()
                .iter()
                .map(|column| Scalar::Text(column.clone()))
                .collect(),
        );
        rows.extend(handle.rows()?);
        ctx.value = Some(Value::Rows(rows));
        Ok(())
    }
}

/// Converter between header-led blocks and file-backed [`RelationHandle`]s.
pub struct RelationAccessor;

impl Accessor for RelationAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        let pinned = options.clone().set(keys::NDIM, 2);
        let decode = DecodeRelation {
            name: options.get_name().unwrap_or("rel").to_owned(),
            parse_dates: options.get_parse_dates().unwrap_or(&[]).to_vec(),
        };
        plain::reader(&pinned).append_stage(decode)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        plain::writer(options).prepend_stage(EncodeRelation)
    }
}
