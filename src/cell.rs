//! Cell-level value types.
//!
//! Two unions live here, one per side of the conversion boundary:
//!
//! - [`CellValue`] - what a grid backend can physically hold in one cell.
//!   This is the only type that crosses the [`GridAccessor`](crate::grid::GridAccessor)
//!   boundary, and it serializes with an explicit `{type, value}` tag so grid
//!   providers speaking a JSON transport can exchange blocks directly.
//! - [`Scalar`] - the richer per-cell type the cleaning stage produces and
//!   converters consume. It adds integers, calendar dates and durations, which
//!   exist only on the typed side of the pipeline.
//!
//! Lowering a [`Scalar`] back to a [`CellValue`] is total: every rich variant
//! has a defined raw form (see [`Scalar::into_cell`]).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw, cell-writable value.
///
/// `Empty` doubles as the reading for a cell that was never set. An empty
/// string is treated as empty-equivalent by [`CellValue::is_empty`], matching
/// how region expansion and cleaning classify cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// A cell with no content.
    #[default]
    Empty,
    /// A floating-point number.
    Number(f64),
    /// A text string.
    Text(String),
    /// A boolean.
    Bool(bool),
    /// A date-time without timezone.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// True if the cell holds nothing, or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Bool(flag) => write!(f, "{flag}"),
            CellValue::DateTime(stamp) => write!(f, "{stamp}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// A cleaned, typed per-cell value.
///
/// Produced by the read-side cleaning stage and consumed by converters;
/// the write-side cleaning stage lowers it back to [`CellValue`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Scalar {
    /// No value.
    #[default]
    Empty,
    /// A floating-point number.
    Number(f64),
    /// An integer, produced by the `numbers` read option.
    Int(i64),
    /// A text string.
    Text(String),
    /// A boolean.
    Bool(bool),
    /// A date-time without timezone.
    DateTime(NaiveDateTime),
    /// A calendar date, produced by a date builder such as
    /// [`dates::date_only`](crate::options::dates::date_only).
    Date(NaiveDate),
    /// An elapsed time, as found in frame columns of time deltas.
    Duration(chrono::Duration),
}

impl Scalar {
    /// True if the scalar holds nothing, or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Empty => true,
            Scalar::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Lower this scalar to its raw, cell-writable form.
    ///
    /// The lowering is total:
    /// - `Empty` and NaN numbers become [`CellValue::Empty`]
    /// - `Int` widens to a number
    /// - `Date` becomes a midnight date-time
    /// - `Duration` becomes its text rendering (see [`duration_text`])
    pub fn into_cell(self) -> CellValue {
        match self {
            Scalar::Empty => CellValue::Empty,
            Scalar::Number(number) if number.is_nan() => CellValue::Empty,
            Scalar::Number(number) => CellValue::Number(number),
            Scalar::Int(number) => CellValue::Number(number as f64),
            Scalar::Text(text) => CellValue::Text(text),
            Scalar::Bool(flag) => CellValue::Bool(flag),
            Scalar::DateTime(stamp) => CellValue::DateTime(stamp),
            Scalar::Date(date) => CellValue::DateTime(date.and_time(NaiveTime::MIN)),
            Scalar::Duration(span) => CellValue::Text(duration_text(span)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Empty => Ok(()),
            Scalar::Number(number) => write!(f, "{number}"),
            Scalar::Int(number) => write!(f, "{number}"),
            Scalar::Text(text) => write!(f, "{text}"),
            Scalar::Bool(flag) => write!(f, "{flag}"),
            Scalar::DateTime(stamp) => write!(f, "{stamp}"),
            Scalar::Date(date) => write!(f, "{date}"),
            Scalar::Duration(span) => write!(f, "{}", duration_text(*span)),
        }
    }
}

impl From<CellValue> for Scalar {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => Scalar::Empty,
            CellValue::Number(number) => Scalar::Number(number),
            CellValue::Text(text) => Scalar::Text(text),
            CellValue::Bool(flag) => Scalar::Bool(flag),
            CellValue::DateTime(stamp) => Scalar::DateTime(stamp),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(value: NaiveDateTime) -> Self {
        Scalar::DateTime(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl From<chrono::Duration> for Scalar {
    fn from(value: chrono::Duration) -> Self {
        Scalar::Duration(value)
    }
}

/// Render a duration as `"[-]D days HH:MM:SS[.ffffff]"`.
///
/// The fractional part is printed only when the duration has sub-second
/// precision. This is the form frame columns of durations take when written
/// to a grid.
pub fn duration_text(span: chrono::Duration) -> String {
    let negative = span < chrono::Duration::zero();
    let span = if negative { -span } else { span };

    let days = span.num_days();
    let hours = span.num_hours() - days * 24;
    let minutes = span.num_minutes() - span.num_hours() * 60;
    let seconds = span.num_seconds() - span.num_minutes() * 60;
    let micros = span.num_microseconds().map(|m| m % 1_000_000).unwrap_or(0);

    let sign = if negative { "-" } else { "" };
    if micros != 0 {
        format!("{sign}{days} days {hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    } else {
        format!("{sign}{days} days {hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_classification_includes_empty_strings() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
        assert!(Scalar::Text(String::new()).is_empty());
        assert!(!Scalar::Int(0).is_empty());
    }

    #[test]
    fn cell_values_serialize_with_explicit_tags() {
        let json = serde_json::to_string(&CellValue::Number(4.5)).unwrap();
        assert_eq!(json, r#"{"type":"number","value":4.5}"#);
        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CellValue::Number(4.5));

        let empty = serde_json::to_string(&CellValue::Empty).unwrap();
        assert_eq!(empty, r#"{"type":"empty"}"#);
    }

    #[test]
    fn lowering_scalars_is_total() {
        assert_eq!(Scalar::Empty.into_cell(), CellValue::Empty);
        assert_eq!(Scalar::Number(f64::NAN).into_cell(), CellValue::Empty);
        assert_eq!(Scalar::Int(7).into_cell(), CellValue::Number(7.0));
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        assert_eq!(
            Scalar::Date(date).into_cell(),
            CellValue::DateTime(date.and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn duration_rendering_matches_the_frame_format() {
        let span = chrono::Duration::days(1)
            + chrono::Duration::hours(2)
            + chrono::Duration::minutes(3)
            + chrono::Duration::seconds(4);
        assert_eq!(duration_text(span), "1 days 02:03:04");

        let fractional = span + chrono::Duration::microseconds(500_000);
        assert_eq!(duration_text(fractional), "1 days 02:03:04.500000");

        assert_eq!(duration_text(-span), "-1 days 02:03:04");
        assert_eq!(duration_text(chrono::Duration::zero()), "0 days 00:00:00");
    }
}
