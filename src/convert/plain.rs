//! The plain-value and raw-block converters.
//!
//! Every other converter is one decode/encode stage grafted onto the
//! pipelines built here, so the stage orders below are the canonical ones:
//!
//! - reader: [`ExpandRegion`] -> [`RawIo`] -> [`CleanData`] ->
//!   [`Transpose`] (when requested) -> [`AdjustDimensions`]
//! - writer: [`Ensure2D`] -> [`Transpose`] (when requested) ->
//!   [`CleanData`] -> [`RawIo`]
//!
//! The writer is assembled by prepending onto an empty pipeline, so the
//! builder reads in reverse of execution order.

use crate::convert::Accessor;
use crate::options::Options;
use crate::pipeline::Pipeline;
use crate::stages::{AdjustDimensions, CleanData, Ensure2D, ExpandRegion, RawIo, Transpose};

/// Build the plain reader pipeline.
pub fn reader(options: &Options) -> Pipeline {
    Pipeline::new()
        .append_stage(ExpandRegion::new(options))
        .append_stage(RawIo::new(options))
        .append_stage(CleanData::new(options))
        .append_stage_if(options.get_transpose(), Transpose)
        .append_stage(AdjustDimensions::new(options))
}

/// Build the plain writer pipeline.
pub fn writer(options: &Options) -> Pipeline {
    Pipeline::new()
        .prepend_stage(RawIo::new(options))
        .prepend_stage(CleanData::new(options))
        .prepend_stage_if(options.get_transpose(), Transpose)
        .prepend_stage(Ensure2D)
}

/// Converter for plain scalars, lists and nested rows.
pub struct PlainAccessor;

impl Accessor for PlainAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        reader(options)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        writer(options)
    }
}

/// Converter that moves raw blocks untouched.
///
/// No expansion, cleaning or reshaping happens on either side; chunked
/// transfer still applies when `chunksize` is set.
pub struct RawAccessor;

impl Accessor for RawAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        Pipeline::new().append_stage(RawIo::new(options))
    }

    fn writer(&self, options: &Options) -> Pipeline {
        Pipeline::new().prepend_stage(RawIo::new(options))
    }
}
