//! Value builders: conversion of one raw value into a value of a target type.
//!
//! A [`BuilderChain`] runs every builder in order for each terminal
//! assignment. A builder that cannot handle a target or an input returns
//! [`SkipProperty`]; the chain absorbs it and the last builder that did not
//! skip decides the value.

use core::any::Any;
use core::fmt;

use kvgraph_core::{ConvertError, Def, OptionDef, RawValue, Shape};

use crate::CancellationToken;

mod chain;
pub use chain::*;

mod default;
pub use default::*;

mod enum_;
pub use enum_::*;

mod identifier;
pub use identifier::*;

/// The type a builder is asked to produce.
///
/// Nullable targets are unwrapped once so builders only ever produce the
/// inner type, or report that there is no value.
#[derive(Clone, Copy, Debug)]
pub enum TargetType {
    /// A plain type: builders must produce a value of `shape`.
    Required(Shape),
    /// `Option<inner>`: builders produce an `inner`, or no value.
    Nullable {
        /// Shape of the wrapped type.
        inner: Shape,
        /// The option's vtable, used to wrap results back.
        option: OptionDef,
    },
}

impl TargetType {
    /// Classifies a declared type.
    pub fn of(shape: Shape) -> Self {
        match shape.def {
            Def::Option(option) => TargetType::Nullable {
                inner: option.t(),
                option,
            },
            _ => TargetType::Required(shape),
        }
    }

    /// The type builders produce values of.
    pub fn inner(&self) -> &Shape {
        match self {
            TargetType::Required(shape) => shape,
            TargetType::Nullable { inner, .. } => inner,
        }
    }

    /// Whether "no value" is an acceptable outcome.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TargetType::Nullable { .. })
    }
}

/// Outcome of one builder: a value of the inner target type, no value
/// (nullable targets only), or a skip.
pub type BuildResult = Result<Option<Box<dyn Any>>, SkipProperty>;

/// Converts raw values into values of a target type.
pub trait ValueBuilder: fmt::Debug + Send + Sync {
    /// Builds a value for `target` from `raw`.
    ///
    /// Implementations return [`SkipProperty`] when the target is not their
    /// category or the input cannot be converted, and should skip when
    /// `cancel` is already cancelled.
    fn build(&self, target: &TargetType, raw: &RawValue, cancel: &CancellationToken)
    -> BuildResult;
}

/// Why a builder declined to build a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The target type is not handled by this builder.
    NotApplicable,
    /// This builder never accepts a null input.
    NullInput,
    /// The input could not be converted.
    Conversion(ConvertError),
    /// The build was cancelled.
    Cancelled,
}

/// A builder could not produce a value; the chain moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipProperty {
    /// Builder that skipped.
    pub builder: &'static str,
    /// Why it skipped.
    pub reason: SkipReason,
}

impl SkipProperty {
    /// Creates a skip for the named builder.
    pub fn new(builder: &'static str, reason: SkipReason) -> Self {
        Self { builder, reason }
    }
}

impl fmt::Display for SkipProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: ", self.builder)?;
        match &self.reason {
            SkipReason::NotApplicable => f.write_str("target type not handled"),
            SkipReason::NullInput => f.write_str("null input"),
            SkipReason::Conversion(err) => write!(f, "{err}"),
            SkipReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

impl core::error::Error for SkipProperty {}
