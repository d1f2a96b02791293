//! The ordered key-value mapping converter.

use crate::cell::Scalar;
use crate::convert::{plain, Accessor};
use crate::error::{Error, Result};
use crate::options::{keys, Options};
use crate::pipeline::{ConversionContext, Pipeline, Stage};
use crate::value::Value;

/// An ordered mapping of scalar keys to scalar values.
///
/// Entries keep their insertion order, which is the row order of the block
/// they decode from. Inserting an existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(Scalar, Scalar)>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key-value pair, replacing in place if the key exists.
    pub fn insert<K: Into<Scalar>, V: Into<Scalar>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up the value for a key.
    pub fn get<K: Into<Scalar>>(&self, key: K) -> Option<&Scalar> {
        let key = key.into();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Scalar, &Scalar)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}

impl FromIterator<(Scalar, Scalar)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Scalar, Scalar)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (Scalar, Scalar);
    type IntoIter = std::vec::IntoIter<(Scalar, Scalar)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

struct DecodeMapping;

impl Stage for DecodeMapping {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let rows = ctx.take_value("mapping decode")?.into_rows("mapping decode")?;
        let mut mapping = Mapping::new();
        for row in rows {
            let mut cells = row.into_iter();
            match (cells.next(), cells.next(), cells.next()) {
                (Some(key), Some(value), None) => mapping.insert(key, value),
                _ => {
                    return Err(Error::shape(
                        "mapping rows must be exactly (key, value) pairs",
                    ));
                }
            }
        }
        ctx.value = Some(Value::Mapping(mapping));
        Ok(())
    }
}

struct EncodeMapping;

impl Stage for EncodeMapping {
    fn write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        let value = ctx.take_value("mapping encode")?;
        let Value::Mapping(mapping) = value else {
            return Err(Error::shape(format!(
                "mapping encode: expected a mapping, got {}",
                value.kind()
            )));
        };
        let rows: Vec<Vec<Scalar>> = mapping
            .into_iter()
            .map(|(key, value)| vec![key, value])
            .collect();
        ctx.value = Some(Value::Rows(rows));
        Ok(())
    }
}

/// Converter between two-column regions and ordered mappings.
pub struct MappingAccessor;

impl Accessor for MappingAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        let options = options.clone().set(keys::NDIM, 2);
        plain::reader(&options).append_stage(DecodeMapping)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        plain::writer(options).prepend_stage(EncodeMapping)
    }
}
