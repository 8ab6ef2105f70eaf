use kvgraph_core::{ConvertError, RawValue, ScalarType};
use uuid::Uuid;

use super::{BuildResult, SkipProperty, SkipReason, TargetType, ValueBuilder};
use crate::CancellationToken;

/// Builds [`Uuid`]s from their canonical hyphenated text form
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, either case).
///
/// Other forms (braced, simple, URN) are rejected. A rejected or blank input
/// yields no value for an `Option<Uuid>` target and a skip otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentifierBuilder;

impl IdentifierBuilder {
    const NAME: &'static str = "IdentifierBuilder";

    fn skip(reason: SkipReason) -> SkipProperty {
        SkipProperty::new(Self::NAME, reason)
    }
}

/// Parses the canonical hyphenated form only.
pub fn parse_hyphenated(text: &str) -> Result<Uuid, ConvertError> {
    let unparsable = || ConvertError::Unparsable {
        target: "Uuid",
        input: text.to_owned(),
    };
    if text.len() != 36 {
        return Err(unparsable());
    }
    Uuid::try_parse(text).map_err(|_| unparsable())
}

impl ValueBuilder for IdentifierBuilder {
    fn build(
        &self,
        target: &TargetType,
        raw: &RawValue,
        cancel: &CancellationToken,
    ) -> BuildResult {
        if cancel.is_cancelled() {
            return Err(Self::skip(SkipReason::Cancelled));
        }
        if target.inner().scalar_type() != Some(ScalarType::Uuid) {
            return Err(Self::skip(SkipReason::NotApplicable));
        }

        match (target, parse_hyphenated(&raw.to_string())) {
            (_, Ok(id)) => Ok(Some(Box::new(id))),
            (TargetType::Nullable { .. }, Err(_)) => Ok(None),
            (TargetType::Required(_), Err(_)) if raw.is_null() => {
                Err(Self::skip(SkipReason::NullInput))
            }
            (TargetType::Required(_), Err(err)) => Err(Self::skip(SkipReason::Conversion(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use kvgraph_core::Model;

    use super::*;

    const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn build<T: Model>(raw: impl Into<RawValue>) -> BuildResult {
        IdentifierBuilder.build(
            &TargetType::of(T::shape()),
            &raw.into(),
            &CancellationToken::new(),
        )
    }

    fn built<T: Model>(raw: impl Into<RawValue>) -> Option<Uuid> {
        build::<T>(raw)
            .unwrap()
            .map(|v| *v.downcast_ref::<Uuid>().unwrap())
    }

    #[test]
    fn test_hyphenated() {
        kvgraph_testhelpers::setup();
        let expected = Uuid::parse_str(ID).unwrap();
        assert_eq!(built::<Uuid>(ID), Some(expected));
        assert_eq!(built::<Uuid>(ID.to_uppercase()), Some(expected));
        assert_eq!(built::<Option<Uuid>>(ID), Some(expected));

        let random = Uuid::new_v4();
        assert_eq!(built::<Uuid>(random), Some(random));
        assert_eq!(built::<Uuid>(Uuid::nil()), Some(Uuid::nil()));
        assert_eq!(built::<Option<Uuid>>(Uuid::nil()), Some(Uuid::nil()));
    }

    #[test]
    fn test_other_forms_rejected() {
        kvgraph_testhelpers::setup();
        let simple = ID.replace('-', "");
        let braced = format!("{{{ID}}}");
        let urn = format!("urn:uuid:{ID}");
        for input in [simple.as_str(), braced.as_str(), urn.as_str(), "not-a-guid"] {
            let skip = build::<Uuid>(input).unwrap_err();
            assert!(matches!(skip.reason, SkipReason::Conversion(_)), "{input}");
            assert_eq!(built::<Option<Uuid>>(input), None, "{input}");
        }
    }

    #[test]
    fn test_blank_and_null() {
        kvgraph_testhelpers::setup();
        assert_eq!(built::<Option<Uuid>>(""), None);
        assert_eq!(built::<Option<Uuid>>(RawValue::Null), None);
        assert_eq!(
            build::<Uuid>(RawValue::Null).unwrap_err().reason,
            SkipReason::NullInput
        );
        let skip = build::<Uuid>("  ").unwrap_err();
        insta::assert_snapshot!(skip, @r#"IdentifierBuilder skipped: cannot parse "  " as Uuid"#);
    }

    #[test]
    fn test_non_uuid_skips() {
        kvgraph_testhelpers::setup();
        assert_eq!(build::<String>(ID).unwrap_err().reason, SkipReason::NotApplicable);
        assert_eq!(build::<Option<i32>>("1").unwrap_err().reason, SkipReason::NotApplicable);
    }
}
