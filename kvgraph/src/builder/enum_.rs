use kvgraph_core::{Def, RawValue};
use tracing::trace;

use super::{BuildResult, SkipProperty, SkipReason, TargetType, ValueBuilder};
use crate::CancellationToken;

/// Builds fieldless enums from their name or discriminant.
///
/// The input text is trimmed. Text that parses as an integer selects the
/// variant with that discriminant, anything else is matched against variant
/// names ignoring case. An input that names no variant yields the default
/// member: the variant with discriminant zero, otherwise the first one.
///
/// Null inputs are always skipped; a blank input for an `Option` target
/// yields no value.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumBuilder;

impl EnumBuilder {
    const NAME: &'static str = "EnumBuilder";

    fn skip(reason: SkipReason) -> SkipProperty {
        SkipProperty::new(Self::NAME, reason)
    }
}

impl ValueBuilder for EnumBuilder {
    fn build(
        &self,
        target: &TargetType,
        raw: &RawValue,
        cancel: &CancellationToken,
    ) -> BuildResult {
        if cancel.is_cancelled() {
            return Err(Self::skip(SkipReason::Cancelled));
        }
        if raw.is_null() {
            return Err(Self::skip(SkipReason::NullInput));
        }
        let shape = target.inner();
        let Def::Enum(def) = shape.def else {
            return Err(Self::skip(SkipReason::NotApplicable));
        };
        if target.is_nullable() && raw.is_blank() {
            return Ok(None);
        }

        let text = raw.to_string();
        let text = text.trim();
        let index = match text.parse::<i64>() {
            Ok(discriminant) => def.by_discriminant(discriminant),
            Err(_) => def.by_name(text),
        };
        let index = index.unwrap_or_else(|| {
            trace!(input = text, target = %shape, "no such variant, using the default member");
            def.default_index()
        });

        (def.variant_at)(index)
            .map(Some)
            .ok_or_else(|| Self::skip(SkipReason::NotApplicable))
    }
}

#[cfg(test)]
mod tests {
    use kvgraph_core::{Model, model};

    use super::*;

    model! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Weekday {
            Monday = 1,
            Tuesday,
            Sunday = 0,
        }
    }

    model! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Grade {
            A = 10,
            B = 20,
        }
    }

    fn build<T: Model>(raw: impl Into<RawValue>) -> BuildResult {
        EnumBuilder.build(
            &TargetType::of(T::shape()),
            &raw.into(),
            &CancellationToken::new(),
        )
    }

    fn built<T: Model + Copy>(raw: impl Into<RawValue>) -> Option<T> {
        build::<T>(raw)
            .unwrap()
            .map(|v| *v.downcast_ref::<T>().unwrap())
    }

    /// Builds into `Option<T>`; the builder hands back the bare member.
    fn built_nullable<T: Model + Copy>(raw: impl Into<RawValue>) -> Option<T> {
        build::<Option<T>>(raw)
            .unwrap()
            .map(|v| *v.downcast_ref::<T>().unwrap())
    }

    #[test]
    fn test_by_name() {
        kvgraph_testhelpers::setup();
        assert_eq!(built::<Weekday>("Tuesday"), Some(Weekday::Tuesday));
        assert_eq!(built::<Weekday>("tUESDAY"), Some(Weekday::Tuesday));
        assert_eq!(built::<Weekday>("  monday "), Some(Weekday::Monday));
    }

    #[test]
    fn test_by_discriminant() {
        kvgraph_testhelpers::setup();
        assert_eq!(built::<Weekday>(2), Some(Weekday::Tuesday));
        assert_eq!(built::<Weekday>("1"), Some(Weekday::Monday));
        assert_eq!(built::<Grade>(20u8), Some(Grade::B));
    }

    #[test]
    fn test_undefined_yields_default_member() {
        kvgraph_testhelpers::setup();
        assert_eq!(built::<Weekday>("Caturday"), Some(Weekday::Sunday));
        assert_eq!(built::<Weekday>(99), Some(Weekday::Sunday));
        assert_eq!(built::<Weekday>(""), Some(Weekday::Sunday));
        assert_eq!(built::<Grade>("C"), Some(Grade::A));
        assert_eq!(built_nullable::<Weekday>("Caturday"), Some(Weekday::Sunday));
    }

    #[test]
    fn test_nullable() {
        kvgraph_testhelpers::setup();
        assert_eq!(built_nullable::<Weekday>("Monday"), Some(Weekday::Monday));
        assert_eq!(built_nullable::<Weekday>(" "), None);
        assert_eq!(built_nullable::<Grade>(""), None);
    }

    #[test]
    fn test_null_input_skips() {
        kvgraph_testhelpers::setup();
        for result in [build::<Weekday>(RawValue::Null), build::<Option<Weekday>>(RawValue::Null)] {
            assert_eq!(result.unwrap_err().reason, SkipReason::NullInput);
        }
    }

    #[test]
    fn test_non_enum_skips() {
        kvgraph_testhelpers::setup();
        let skip = build::<i32>("Monday").unwrap_err();
        assert_eq!(skip.reason, SkipReason::NotApplicable);
        insta::assert_snapshot!(skip, @"EnumBuilder skipped: target type not handled");
        assert!(build::<String>("x").is_err());
    }
}
