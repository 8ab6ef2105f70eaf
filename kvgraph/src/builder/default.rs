use kvgraph_core::{Def, RawValue, ScalarDef};

use super::{BuildResult, SkipProperty, SkipReason, TargetType, ValueBuilder};
use crate::CancellationToken;

/// Catch-all builder for scalars.
///
/// - a null input for a plain target yields a fresh default instance of the
///   target, which is also how intermediate objects and list elements are
///   created while a path is walked
/// - a blank input for an `Option` target yields no value
/// - anything else goes through the scalar's generic conversion
///
/// Enums, identifiers, structs, lists and pointers are left to other
/// builders unless the input is null.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBuilder;

impl DefaultBuilder {
    const NAME: &'static str = "DefaultBuilder";

    fn skip(reason: SkipReason) -> SkipProperty {
        SkipProperty::new(Self::NAME, reason)
    }
}

impl ValueBuilder for DefaultBuilder {
    fn build(
        &self,
        target: &TargetType,
        raw: &RawValue,
        cancel: &CancellationToken,
    ) -> BuildResult {
        if cancel.is_cancelled() {
            return Err(Self::skip(SkipReason::Cancelled));
        }

        let shape = match target {
            TargetType::Nullable { inner, .. } => {
                if raw.is_blank() {
                    return Ok(None);
                }
                inner
            }
            TargetType::Required(shape) => {
                if raw.is_null() {
                    return shape
                        .construct()
                        .map(Some)
                        .ok_or_else(|| Self::skip(SkipReason::NullInput));
                }
                shape
            }
        };

        let Def::Scalar(ScalarDef {
            change_type: Some(change_type),
            ..
        }) = shape.def
        else {
            return Err(Self::skip(SkipReason::NotApplicable));
        };

        change_type(raw)
            .map(Some)
            .map_err(|err| Self::skip(SkipReason::Conversion(err)))
    }
}
