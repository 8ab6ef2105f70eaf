use core::any::Any;

use kvgraph_core::{RawValue, Shape};
use tracing::trace;

use super::{
    DefaultBuilder, EnumBuilder, IdentifierBuilder, SkipProperty, SkipReason, TargetType,
    ValueBuilder,
};
use crate::CancellationToken;

/// What a [`BuilderChain`] produced for one target.
#[derive(Debug)]
pub enum Candidate {
    /// A value of the declared target type, ready to be assigned.
    Built(Box<dyn Any>),
    /// Every builder skipped; the raw input is handed back unconverted.
    Raw(RawValue),
}

/// An ordered list of [`ValueBuilder`]s.
///
/// Every builder runs, in order. Each one that does not skip replaces the
/// current candidate, so the last successful builder wins.
#[derive(Debug)]
pub struct BuilderChain {
    builders: Vec<Box<dyn ValueBuilder>>,
}

impl Default for BuilderChain {
    /// [`EnumBuilder`], [`IdentifierBuilder`], then [`DefaultBuilder`].
    fn default() -> Self {
        Self {
            builders: vec![
                Box::new(EnumBuilder),
                Box::new(IdentifierBuilder),
                Box::new(DefaultBuilder),
            ],
        }
    }
}

impl BuilderChain {
    /// A chain running `builders` in order. An empty list gives the default
    /// chain.
    pub fn new<I>(builders: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn ValueBuilder>>,
    {
        let builders: Vec<_> = builders.into_iter().collect();
        if builders.is_empty() {
            return Self::default();
        }
        Self { builders }
    }

    /// The builders, in order.
    pub fn builders(&self) -> &[Box<dyn ValueBuilder>] {
        &self.builders
    }

    /// Runs every builder for a target of type `shape`.
    ///
    /// For `Option` targets, builder results are wrapped back into the option
    /// type, so [`Candidate::Built`] always holds a value of `shape` itself.
    pub fn run(&self, shape: Shape, raw: &RawValue, cancel: &CancellationToken) -> Candidate {
        let target = TargetType::of(shape);
        self.builders
            .iter()
            .fold(Candidate::Raw(raw.clone()), |candidate, builder| {
                let built = builder
                    .build(&target, raw, cancel)
                    .and_then(|value| wrap(&target, value));
                match built {
                    Ok(value) => Candidate::Built(value),
                    Err(skip) => {
                        trace!(%skip, target = %shape, "builder skipped");
                        candidate
                    }
                }
            })
    }
}

fn wrap(target: &TargetType, value: Option<Box<dyn Any>>) -> Result<Box<dyn Any>, SkipProperty> {
    let mismatch = || SkipProperty::new("BuilderChain", SkipReason::NotApplicable);
    match (target, value) {
        (TargetType::Required(_), Some(value)) => Ok(value),
        (TargetType::Required(_), None) => Err(mismatch()),
        (TargetType::Nullable { option, .. }, Some(value)) => {
            (option.wrap_some)(value).map_err(|_| mismatch())
        }
        (TargetType::Nullable { option, .. }, None) => Ok((option.none)()),
    }
}
