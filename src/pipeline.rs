//! The staged conversion substrate.
//!
//! A conversion is a [`Pipeline`] of [`Stage`]s threaded over one
//! [`ConversionContext`]. Each stage reads and overwrites the context's
//! single value slot; reading stages run front-to-back via
//! [`Pipeline::run_read`], writing stages via [`Pipeline::run_write`].
//!
//! Pipelines are assembled by explicit builder functions, one per converter,
//! using only [`append_stage`](Pipeline::append_stage) and
//! [`prepend_stage`](Pipeline::prepend_stage) (plus their `_if` variants).
//! Writer pipelines are conventionally built by prepending onto the plain
//! writer, so the code order of stages is the reverse of their execution
//! order.
//!
//! A context lives for exactly one read or write call.

use crate::error::{Error, Result};
use crate::grid::GridAccessor;
use crate::region::Region;
use crate::value::Value;

/// Scratch facts stages leave for later stages.
#[derive(Clone, Copy, Debug, Default)]
pub struct Meta {
    /// The written value was a bare scalar before 2D normalization.
    ///
    /// Lets the raw write stage replicate a single value across a multi-cell
    /// region instead of shrinking the region to 1x1.
    pub scalar: bool,
}

/// Mutable state threaded through every stage of one conversion.
pub struct ConversionContext<'g> {
    /// The grid backend under conversion.
    pub grid: &'g dyn GridAccessor,
    /// The region being read or written. Stages may resize it.
    pub region: Region,
    /// The value slot every stage reads and overwrites.
    pub value: Option<Value>,
    /// Cross-stage scratch facts.
    pub meta: Meta,
}

impl<'g> ConversionContext<'g> {
    /// Create a context for a read, with an empty value slot.
    pub fn new(grid: &'g dyn GridAccessor, region: Region) -> Self {
        ConversionContext {
            grid,
            region,
            value: None,
            meta: Meta::default(),
        }
    }

    /// Create a context for a write, seeded with the value to encode.
    pub fn with_value(grid: &'g dyn GridAccessor, region: Region, value: Value) -> Self {
        ConversionContext {
            grid,
            region,
            value: Some(value),
            meta: Meta::default(),
        }
    }

    /// Take the value out of the slot, failing if a prior stage left it empty.
    pub fn take_value(&mut self, stage: &str) -> Result<Value> {
        self.value
            .take()
            .ok_or_else(|| Error::shape(format!("{stage}: no value in the conversion context")))
    }
}

/// One composable transformation step.
///
/// A stage participates in reads, writes, or both; the default for either
/// direction is to leave the context untouched.
pub trait Stage {
    /// Transform the context during a read.
    fn read(&self, _ctx: &mut ConversionContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Transform the context during a write.
    fn write(&self, _ctx: &mut ConversionContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// An ordered sequence of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage to the end.
    pub fn append_stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a stage to the end if `only_if` holds.
    pub fn append_stage_if<S: Stage + 'static>(self, only_if: bool, stage: S) -> Self {
        if only_if { self.append_stage(stage) } else { self }
    }

    /// Add a stage to the front.
    pub fn prepend_stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.insert(0, Box::new(stage));
        self
    }

    /// Add a stage to the front if `only_if` holds.
    pub fn prepend_stage_if<S: Stage + 'static>(self, only_if: bool, stage: S) -> Self {
        if only_if { self.prepend_stage(stage) } else { self }
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage's read step, front to back.
    ///
    /// # Errors
    ///
    /// The first stage error aborts the remainder of the pipeline.
    pub fn run_read(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        for stage in &self.stages {
            stage.read(ctx)?;
        }
        Ok(())
    }

    /// Run every stage's write step, front to back.
    ///
    /// # Errors
    ///
    /// The first stage error aborts the remainder of the pipeline.
    pub fn run_write(&self, ctx: &mut ConversionContext<'_>) -> Result<()> {
        for stage in &self.stages {
            stage.write(ctx)?;
        }
        Ok(())
    }
}
