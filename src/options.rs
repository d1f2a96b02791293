//! Declarative conversion options.
//!
//! An [`Options`] value is an insertion-ordered mapping from option name to
//! [`OptValue`], carried from the conversion entry points into every stage a
//! pipeline builds. Stages copy out what they need at construction time, so
//! an `Options` value is never mutated mid-run.
//!
//! Three operations cover the whole lifecycle:
//!
//! - **set** - force a key to a value (converters use this to pin `ndim`)
//! - **defaults** - set a key only if absent (converters use this to adjust
//!   fallbacks without clobbering a caller's explicit choice)
//! - **erase** - remove keys entirely
//!
//! Callers normally go through the typed builder methods instead of raw keys:
//!
//! ```
//! use gridcast::{ExpandMode, Options};
//!
//! let opts = Options::new()
//!     .ndim(2)
//!     .transpose(true)
//!     .expand(ExpandMode::Table)
//!     .chunksize(500);
//! assert_eq!(opts.get_ndim(), Some(2));
//! assert!(opts.get_transpose());
//! ```

use crate::cell::Scalar;
use crate::convert::Convert;
use crate::expansion::ExpandMode;
use chrono::{NaiveDateTime, Timelike};

/// Option keys recognized by the built-in stages and converters.
pub mod keys {
    /// Dimensionality-collapse policy, `1` or `2`.
    pub const NDIM: &str = "ndim";
    /// Swap rows and columns.
    pub const TRANSPOSE: &str = "transpose";
    /// Region expansion mode.
    pub const EXPAND: &str = "expand";
    /// Classify expansion cells by computed value instead of content.
    pub const EXPAND_STRICT: &str = "expand_strict";
    /// Row-batch size for raw block transfer.
    pub const CHUNKSIZE: &str = "chunksize";
    /// Timestamp builder applied to every date-time cell on read.
    pub const DATES: &str = "dates";
    /// Substitute for empty cells on read.
    pub const EMPTY: &str = "empty";
    /// Coercion applied to every numeric cell on read.
    pub const NUMBERS: &str = "numbers";
    /// Explicit converter tag.
    pub const CONVERT: &str = "convert";
    /// Leading header rows for table-shaped converters.
    pub const HEADER: &str = "header";
    /// Leading index columns for table-shaped converters.
    pub const INDEX: &str = "index";
    /// Columns to parse as serial dates when building a relation.
    pub const PARSE_DATES: &str = "parse_dates";
    /// Name to register a relation under.
    pub const NAME: &str = "name";
}

/// Date-time components handed to a [`DateBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl From<NaiveDateTime> for DateParts {
    fn from(stamp: NaiveDateTime) -> Self {
        use chrono::Datelike;
        DateParts {
            year: stamp.year(),
            month: stamp.month(),
            day: stamp.day(),
            hour: stamp.hour(),
            minute: stamp.minute(),
            second: stamp.second(),
            microsecond: stamp.nanosecond() / 1_000,
        }
    }
}

/// Builds a caller-preferred scalar from date-time components.
///
/// Installed via [`Options::dates`]; the cleaning stage calls it for every
/// date-time cell it reads. Without one installed, date-time cells pass
/// through as [`Scalar::DateTime`] untouched.
pub type DateBuilder = fn(DateParts) -> Scalar;

/// Stock date builders for [`Options::dates`].
pub mod dates {
    use super::DateParts;
    use crate::cell::Scalar;
    use chrono::NaiveDate;

    /// Rebuild the full timestamp. Equivalent to not installing a builder.
    pub fn timestamp(parts: DateParts) -> Scalar {
        let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day);
        match date.and_then(|d| {
            d.and_hms_micro_opt(parts.hour, parts.minute, parts.second, parts.microsecond)
        }) {
            Some(stamp) => Scalar::DateTime(stamp),
            None => Scalar::Empty,
        }
    }

    /// Keep the calendar date and discard the time of day.
    pub fn date_only(parts: DateParts) -> Scalar {
        match NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day) {
            Some(date) => Scalar::Date(date),
            None => Scalar::Empty,
        }
    }
}

/// Coercion applied to numeric cells on read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberFormat {
    /// Keep the floating-point reading as-is.
    #[default]
    Float,
    /// Round half away from zero to an integer.
    Int,
    /// Truncate toward zero to an integer.
    RawInt,
}

impl NumberFormat {
    /// Apply this coercion to one numeric reading.
    pub fn apply(&self, number: f64) -> Scalar {
        match self {
            NumberFormat::Float => Scalar::Number(number),
            NumberFormat::Int if number.is_finite() => Scalar::Int(number.round() as i64),
            NumberFormat::RawInt if number.is_finite() => Scalar::Int(number as i64),
            _ => Scalar::Number(number),
        }
    }
}

/// Selects a column by header name or 0-based data position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Match against the header row.
    Name(String),
    /// 0-based position among the data columns.
    Index(usize),
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::Name(name)
    }
}

impl From<usize> for ColumnSelector {
    fn from(index: usize) -> Self {
        ColumnSelector::Index(index)
    }
}

/// A single option value.
#[derive(Clone, Debug)]
pub enum OptValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer count or size.
    Int(i64),
    /// A name or tag string.
    Text(String),
    /// A scalar, as used by the `empty` substitute.
    Scalar(Scalar),
    /// A region expansion mode.
    Expand(ExpandMode),
    /// A timestamp builder.
    Dates(DateBuilder),
    /// A numeric coercion.
    Numbers(NumberFormat),
    /// An explicit converter tag.
    Convert(Convert),
    /// Column selectors, as used by `parse_dates`.
    Columns(Vec<ColumnSelector>),
}

impl From<bool> for OptValue {
    fn from(value: bool) -> Self {
        OptValue::Bool(value)
    }
}

impl From<i64> for OptValue {
    fn from(value: i64) -> Self {
        OptValue::Int(value)
    }
}

impl From<i32> for OptValue {
    fn from(value: i32) -> Self {
        OptValue::Int(value as i64)
    }
}

impl From<&str> for OptValue {
    fn from(value: &str) -> Self {
        OptValue::Text(value.to_string())
    }
}

impl From<String> for OptValue {
    fn from(value: String) -> Self {
        OptValue::Text(value)
    }
}

impl From<Scalar> for OptValue {
    fn from(value: Scalar) -> Self {
        OptValue::Scalar(value)
    }
}

impl From<ExpandMode> for OptValue {
    fn from(value: ExpandMode) -> Self {
        OptValue::Expand(value)
    }
}

impl From<DateBuilder> for OptValue {
    fn from(value: DateBuilder) -> Self {
        OptValue::Dates(value)
    }
}

impl From<NumberFormat> for OptValue {
    fn from(value: NumberFormat) -> Self {
        OptValue::Numbers(value)
    }
}

impl From<Convert> for OptValue {
    fn from(value: Convert) -> Self {
        OptValue::Convert(value)
    }
}

impl From<Vec<ColumnSelector>> for OptValue {
    fn from(value: Vec<ColumnSelector>) -> Self {
        OptValue::Columns(value)
    }
}

/// An insertion-ordered option mapping.
///
/// Setting an existing key replaces its value in place, keeping the original
/// position; setting a new key appends.
#[derive(Clone, Debug, Default)]
pub struct Options {
    entries: Vec<(String, OptValue)>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `key` to `value`, overriding any previous setting.
    pub fn set<V: Into<OptValue>>(mut self, key: &str, value: V) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    /// Set `key` to `value` only if the key is absent.
    pub fn defaults<V: Into<OptValue>>(mut self, key: &str, value: V) -> Self {
        if !self.contains(key) {
            self.entries.push((key.to_string(), value.into()));
        }
        self
    }

    /// Remove every listed key.
    pub fn erase(mut self, keys: &[&str]) -> Self {
        self.entries.retain(|(name, _)| !keys.contains(&name.as_str()));
        self
    }

    /// Look up a raw option value.
    pub fn get(&self, key: &str) -> Option<&OptValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// True if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Number of set options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    // Typed builder methods.

    /// Request a dimensionality-collapse policy (`1` or `2`).
    pub fn ndim(self, ndim: u8) -> Self {
        self.set(keys::NDIM, ndim as i64)
    }

    /// Swap rows and columns on both read and write.
    pub fn transpose(self, transpose: bool) -> Self {
        self.set(keys::TRANSPOSE, transpose)
    }

    /// Expand the region from its anchor before reading.
    pub fn expand(self, mode: ExpandMode) -> Self {
        self.set(keys::EXPAND, mode)
    }

    /// Make expansion classify cells by computed value instead of content.
    pub fn expand_strict(self, strict: bool) -> Self {
        self.set(keys::EXPAND_STRICT, strict)
    }

    /// Transfer raw blocks in row-batches of at most `rows` rows.
    pub fn chunksize(self, rows: usize) -> Self {
        self.set(keys::CHUNKSIZE, rows as i64)
    }

    /// Install a timestamp builder for date-time cells.
    pub fn dates(self, builder: DateBuilder) -> Self {
        self.set(keys::DATES, builder)
    }

    /// Substitute `value` for empty cells on read.
    pub fn empty<S: Into<Scalar>>(self, value: S) -> Self {
        self.set(keys::EMPTY, value.into())
    }

    /// Coerce numeric cells on read.
    pub fn numbers(self, format: NumberFormat) -> Self {
        self.set(keys::NUMBERS, format)
    }

    /// Select a converter explicitly instead of routing by value type.
    pub fn convert(self, tag: Convert) -> Self {
        self.set(keys::CONVERT, tag)
    }

    /// Number of leading header rows for table-shaped converters.
    pub fn header(self, rows: usize) -> Self {
        self.set(keys::HEADER, rows as i64)
    }

    /// Number of leading index columns for table-shaped converters.
    pub fn index(self, cols: usize) -> Self {
        self.set(keys::INDEX, cols as i64)
    }

    /// Columns to parse as serial dates when building a relation.
    pub fn parse_dates<C: Into<ColumnSelector>, I: IntoIterator<Item = C>>(
        self,
        columns: I,
    ) -> Self {
        let columns: Vec<ColumnSelector> = columns.into_iter().map(Into::into).collect();
        self.set(keys::PARSE_DATES, columns)
    }

    /// Name to register a relation under.
    pub fn name<S: Into<String>>(self, name: S) -> Self {
        self.set(keys::NAME, name.into())
    }

    // Typed getters. A value of the wrong kind reads as absent.

    /// The requested `ndim`, if any.
    pub fn get_ndim(&self) -> Option<u8> {
        match self.get(keys::NDIM) {
            Some(OptValue::Int(n)) if (0..=255).contains(n) => Some(*n as u8),
            _ => None,
        }
    }

    /// Whether to transpose. Defaults to `false`.
    pub fn get_transpose(&self) -> bool {
        matches!(self.get(keys::TRANSPOSE), Some(OptValue::Bool(true)))
    }

    /// The requested expansion mode, if any.
    pub fn get_expand(&self) -> Option<ExpandMode> {
        match self.get(keys::EXPAND) {
            Some(OptValue::Expand(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// Whether expansion runs in strict mode. Defaults to `false`.
    pub fn get_expand_strict(&self) -> bool {
        matches!(self.get(keys::EXPAND_STRICT), Some(OptValue::Bool(true)))
    }

    /// The row-batch size, if chunking is enabled. Zero disables chunking.
    pub fn get_chunksize(&self) -> Option<usize> {
        match self.get(keys::CHUNKSIZE) {
            Some(OptValue::Int(n)) if *n > 0 => Some(*n as usize),
            _ => None,
        }
    }

    /// The installed timestamp builder, if any.
    pub fn get_dates(&self) -> Option<DateBuilder> {
        match self.get(keys::DATES) {
            Some(OptValue::Dates(builder)) => Some(*builder),
            _ => None,
        }
    }

    /// The empty-cell substitute. Defaults to [`Scalar::Empty`].
    pub fn get_empty(&self) -> Scalar {
        match self.get(keys::EMPTY) {
            Some(OptValue::Scalar(value)) => value.clone(),
            _ => Scalar::Empty,
        }
    }

    /// The numeric coercion, if any.
    pub fn get_numbers(&self) -> Option<NumberFormat> {
        match self.get(keys::NUMBERS) {
            Some(OptValue::Numbers(format)) => Some(*format),
            _ => None,
        }
    }

    /// The explicit converter tag, if any.
    pub fn get_convert(&self) -> Option<Convert> {
        match self.get(keys::CONVERT) {
            Some(OptValue::Convert(tag)) => Some(*tag),
            _ => None,
        }
    }

    /// Header row count for table-shaped converters. Defaults to 1.
    pub fn get_header(&self) -> usize {
        match self.get(keys::HEADER) {
            Some(OptValue::Int(n)) if *n >= 0 => *n as usize,
            _ => 1,
        }
    }

    /// Index column count for table-shaped converters. Defaults to 1.
    pub fn get_index(&self) -> usize {
        match self.get(keys::INDEX) {
            Some(OptValue::Int(n)) if *n >= 0 => *n as usize,
            _ => 1,
        }
    }

    /// The serial-date column selectors, if any.
    pub fn get_parse_dates(&self) -> Option<&[ColumnSelector]> {
        match self.get(keys::PARSE_DATES) {
            Some(OptValue::Columns(columns)) => Some(columns),
            _ => None,
        }
    }

    /// The requested relation name, if any.
    pub fn get_name(&self) -> Option<&str> {
        match self.get(keys::NAME) {
            Some(OptValue::Text(name)) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let opts = Options::new()
            .ndim(1)
            .transpose(true)
            .ndim(2);
        let keys: Vec<&str> = opts.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ndim", "transpose"]);
        assert_eq!(opts.get_ndim(), Some(2));
    }

    #[test]
    fn defaults_only_fills_absent_keys() {
        let opts = Options::new().ndim(1).defaults(keys::NDIM, 2);
        assert_eq!(opts.get_ndim(), Some(1));

        let opts = Options::new().defaults(keys::NDIM, 2);
        assert_eq!(opts.get_ndim(), Some(2));
    }

    #[test]
    fn erase_removes_listed_keys() {
        let opts = Options::new()
            .ndim(2)
            .transpose(true)
            .erase(&[keys::NDIM]);
        assert_eq!(opts.get_ndim(), None);
        assert!(opts.get_transpose());
        assert_eq!(opts.len(), 1);
    }

    #[test]
    fn getters_fall_back_on_missing_keys() {
        let opts = Options::new();
        assert_eq!(opts.get_ndim(), None);
        assert!(!opts.get_transpose());
        assert_eq!(opts.get_empty(), Scalar::Empty);
        assert_eq!(opts.get_header(), 1);
        assert_eq!(opts.get_index(), 1);
        assert_eq!(opts.get_chunksize(), None);
    }

    #[test]
    fn zero_chunksize_disables_chunking() {
        let opts = Options::new().chunksize(0);
        assert_eq!(opts.get_chunksize(), None);
    }

    #[test]
    fn number_formats_round_and_truncate() {
        assert_eq!(NumberFormat::Float.apply(2.5), Scalar::Number(2.5));
        assert_eq!(NumberFormat::Int.apply(2.5), Scalar::Int(3));
        assert_eq!(NumberFormat::Int.apply(-2.5), Scalar::Int(-3));
        assert_eq!(NumberFormat::RawInt.apply(2.9), Scalar::Int(2));
        assert_eq!(NumberFormat::RawInt.apply(-2.9), Scalar::Int(-2));
    }

    #[test]
    fn date_builders_produce_their_scalar_kinds() {
        let parts = DateParts {
            year: 2021,
            month: 6,
            day: 15,
            hour: 10,
            minute: 30,
            second: 0,
            microsecond: 250,
        };
        match dates::timestamp(parts) {
            Scalar::DateTime(stamp) => {
                assert_eq!(DateParts::from(stamp), parts);
            }
            other => panic!("expected a date-time, got {other:?}"),
        }
        assert_eq!(
            dates::date_only(parts),
            Scalar::Date(chrono::NaiveDate::from_ymd_opt(2021, 6, 15).unwrap())
        );
    }
}
