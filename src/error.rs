//! Error taxonomy for grid conversion.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type
//! sorts failures into four buckets:
//!
//! - **Shape** - a value and a region (or an explicit `ndim`) disagree about
//!   dimensionality, or a block is not rectangular
//! - **Lookup** - an unknown converter tag, or a column selector that does not
//!   resolve against a header row
//! - **Backend** - a grid backend refused a read or write; the underlying
//!   error is preserved unchanged
//! - **Resource** - an auxiliary resource (such as a relation's temporary
//!   backing file) could not be created or released
//!
//! Shape and lookup problems are detected before any cell is written, so a
//! write that fails with either of them has not touched the grid. Backend
//! errors can surface mid-write when chunking is enabled; such writes are not
//! atomic.

use std::fmt;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for conversion operations.
#[derive(Debug)]
pub enum Error {
    /// A value's dimensionality does not fit the target region or `ndim`.
    Shape(String),
    /// A name or tag did not resolve (converter tags, column selectors).
    Lookup(String),
    /// A grid backend failed; the source error is carried unchanged.
    Backend(anyhow::Error),
    /// An auxiliary resource could not be acquired or released.
    Resource(anyhow::Error),
}

impl Error {
    /// Create a shape error from a message.
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Error::Shape(message.into())
    }

    /// Create a lookup error from a message.
    pub fn lookup<S: Into<String>>(message: S) -> Self {
        Error::Lookup(message.into())
    }

    /// Wrap a backend failure without reinterpreting it.
    pub fn backend<E: Into<anyhow::Error>>(source: E) -> Self {
        Error::Backend(source.into())
    }

    /// Wrap a resource acquisition or cleanup failure.
    pub fn resource<E: Into<anyhow::Error>>(source: E) -> Self {
        Error::Resource(source.into())
    }

    /// True if this is a [`Error::Shape`] error.
    pub fn is_shape(&self) -> bool {
        matches!(self, Error::Shape(_))
    }

    /// True if this is a [`Error::Lookup`] error.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::Lookup(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Shape(message) => write!(f, "shape error: {message}"),
            Error::Lookup(message) => write!(f, "lookup error: {message}"),
            Error::Backend(source) => write!(f, "backend error: {source:#}"),
            Error::Resource(source) => write!(f, "resource error: {source:#}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(source) | Error::Resource(source) => {
                let inner: &(dyn std::error::Error + Send + Sync + 'static) = source.as_ref();
                Some(inner)
            }
            _ => None,
        }
    }
}
