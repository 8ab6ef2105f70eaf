//! Generic conversion of raw values into scalars.
//!
//! This is the catch-all conversion used for leaf values: numbers convert
//! between widths with range checks, numbers and the strings `"true"` and
//! `"false"` convert to `bool`, integer code points and one-character strings
//! convert to `char`, and anything converts to `String`.

use core::any::Any;
use core::fmt;
use core::num::IntErrorKind;

use crate::RawValue;

/// Why a raw value could not be converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConvertError {
    /// The text is not a literal of the target type.
    Unparsable {
        /// Target type.
        target: &'static str,
        /// The offending text.
        input: String,
    },
    /// The target type cannot be produced from this kind of value at all.
    Incompatible {
        /// Target type.
        target: &'static str,
        /// Kind of the raw value.
        from: &'static str,
    },
    /// The value does not fit in the target type.
    OutOfRange {
        /// Target type.
        target: &'static str,
    },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Unparsable { target, input } => {
                write!(f, "cannot parse {input:?} as {target}")
            }
            ConvertError::Incompatible { target, from } => {
                write!(f, "cannot convert {from} to {target}")
            }
            ConvertError::OutOfRange { target } => {
                write!(f, "value out of range for {target}")
            }
        }
    }
}

impl core::error::Error for ConvertError {}

impl RawValue {
    /// Kind of value, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Char(_) => "char",
            RawValue::Int(_) | RawValue::UInt(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Str(_) => "string",
        }
    }

    fn incompatible(&self, target: &'static str) -> ConvertError {
        ConvertError::Incompatible {
            target,
            from: self.kind(),
        }
    }
}

/// Conversion from a [`RawValue`].
pub trait ChangeType: Sized {
    /// Converts `raw` into `Self`.
    fn change_type(raw: &RawValue) -> Result<Self, ConvertError>;
}

/// [`ChangeTypeFn`](crate::ChangeTypeFn) for any `T: ChangeType`.
pub fn change_type_boxed<T: ChangeType + Any>(raw: &RawValue) -> Result<Box<dyn Any>, ConvertError> {
    T::change_type(raw).map(|v| Box::new(v) as Box<dyn Any>)
}

impl ChangeType for bool {
    fn change_type(raw: &RawValue) -> Result<Self, ConvertError> {
        match raw {
            RawValue::Bool(b) => Ok(*b),
            RawValue::Int(i) => Ok(*i != 0),
            RawValue::UInt(u) => Ok(*u != 0),
            RawValue::Float(x) => Ok(*x != 0.0),
            RawValue::Str(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(ConvertError::Unparsable {
                        target: "bool",
                        input: s.to_owned(),
                    })
                }
            }
            RawValue::Null | RawValue::Char(_) => Err(raw.incompatible("bool")),
        }
    }
}

impl ChangeType for char {
    fn change_type(raw: &RawValue) -> Result<Self, ConvertError> {
        let code_point = |n: Option<u32>| {
            n.and_then(char::from_u32)
                .ok_or(ConvertError::OutOfRange { target: "char" })
        };
        match raw {
            RawValue::Char(c) => Ok(*c),
            RawValue::Int(i) => code_point(u32::try_from(*i).ok()),
            RawValue::UInt(u) => code_point(u32::try_from(*u).ok()),
            RawValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConvertError::Unparsable {
                        target: "char",
                        input: s.clone(),
                    }),
                }
            }
            RawValue::Null | RawValue::Bool(_) | RawValue::Float(_) => {
                Err(raw.incompatible("char"))
            }
        }
    }
}

impl ChangeType for String {
    fn change_type(raw: &RawValue) -> Result<Self, ConvertError> {
        match raw {
            RawValue::Null => Err(raw.incompatible("String")),
            other => Ok(other.to_string()),
        }
    }
}

macro_rules! impl_change_type_int {
    ($($t:ty),+) => {
        $(
            impl ChangeType for $t {
                fn change_type(raw: &RawValue) -> Result<Self, ConvertError> {
                    const TARGET: &str = stringify!($t);
                    let out_of_range = ConvertError::OutOfRange { target: TARGET };
                    match raw {
                        RawValue::Int(i) => <$t>::try_from(*i).map_err(|_| out_of_range),
                        RawValue::UInt(u) => <$t>::try_from(*u).map_err(|_| out_of_range),
                        RawValue::Bool(b) => Ok(<$t>::from(*b)),
                        RawValue::Char(c) => <$t>::try_from(u32::from(*c)).map_err(|_| out_of_range),
                        RawValue::Float(x) => {
                            let rounded = x.round_ties_even();
                            // MAX rounds up in f64 for wide types, so bound by the
                            // exact power of two above it instead.
                            let signed = i32::from(<$t>::MIN != 0);
                            let (min, end) = (<$t>::MIN as f64, 2f64.powi(<$t>::BITS as i32 - signed));
                            if !rounded.is_finite() || rounded < min || rounded >= end {
                                return Err(out_of_range);
                            }
                            Ok(rounded as $t)
                        }
                        RawValue::Str(s) => s.trim().parse::<$t>().map_err(|e| match e.kind() {
                            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range,
                            _ => ConvertError::Unparsable {
                                target: TARGET,
                                input: s.clone(),
                            },
                        }),
                        RawValue::Null => Err(raw.incompatible(TARGET)),
                    }
                }
            }
        )+
    };
}

impl_change_type_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! impl_change_type_float {
    ($($t:ty),+) => {
        $(
            impl ChangeType for $t {
                fn change_type(raw: &RawValue) -> Result<Self, ConvertError> {
                    const TARGET: &str = stringify!($t);
                    match raw {
                        RawValue::Int(i) => Ok(*i as $t),
                        RawValue::UInt(u) => Ok(*u as $t),
                        RawValue::Float(x) => Ok(*x as $t),
                        RawValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
                        RawValue::Str(s) => {
                            s.trim().parse::<$t>().map_err(|_| ConvertError::Unparsable {
                                target: TARGET,
                                input: s.clone(),
                            })
                        }
                        RawValue::Null | RawValue::Char(_) => Err(raw.incompatible(TARGET)),
                    }
                }
            }
        )+
    };
}

impl_change_type_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_from_numbers_and_text() {
        assert_eq!(bool::change_type(&RawValue::from(1)), Ok(true));
        assert_eq!(bool::change_type(&RawValue::from(0)), Ok(false));
        assert_eq!(bool::change_type(&RawValue::from(2)), Ok(true));
        assert_eq!(bool::change_type(&RawValue::from("TRUE")), Ok(true));
        assert_eq!(bool::change_type(&RawValue::from(" false ")), Ok(false));
        assert!(bool::change_type(&RawValue::from("yes")).is_err());
        assert!(bool::change_type(&RawValue::from("")).is_err());
        assert!(bool::change_type(&RawValue::from('t')).is_err());
    }

    #[test]
    fn test_char_rules() {
        assert_eq!(char::change_type(&RawValue::from("H")), Ok('H'));
        assert_eq!(char::change_type(&RawValue::from(5)), Ok('\u{5}'));
        assert_eq!(char::change_type(&RawValue::from(65)), Ok('A'));
        assert!(char::change_type(&RawValue::from("Hello world")).is_err());
        assert!(char::change_type(&RawValue::from("")).is_err());
        assert_eq!(
            char::change_type(&RawValue::from(-1)),
            Err(ConvertError::OutOfRange { target: "char" })
        );
        assert!(char::change_type(&RawValue::from(0xD800)).is_err());
        assert!(char::change_type(&RawValue::from(true)).is_err());
    }

    #[test]
    fn test_integer_rules() {
        assert_eq!(i32::change_type(&RawValue::from("1")), Ok(1));
        assert_eq!(i32::change_type(&RawValue::from(" -42 ")), Ok(-42));
        assert_eq!(u8::change_type(&RawValue::from(true)), Ok(1));
        assert_eq!(u32::change_type(&RawValue::from('A')), Ok(65));
        assert_eq!(i32::change_type(&RawValue::from(2.5)), Ok(2));
        assert_eq!(i32::change_type(&RawValue::from(3.5)), Ok(4));
        assert_eq!(
            u8::change_type(&RawValue::from(256)),
            Err(ConvertError::OutOfRange { target: "u8" })
        );
        assert_eq!(
            i32::change_type(&RawValue::from("99999999999")),
            Err(ConvertError::OutOfRange { target: "i32" })
        );
        assert!(matches!(
            i32::change_type(&RawValue::from("this is not an integer")),
            Err(ConvertError::Unparsable { .. })
        ));
        assert!(i32::change_type(&RawValue::from(f64::MAX.to_string())).is_err());
        assert!(i32::change_type(&RawValue::from(f64::MIN)).is_err());
        assert!(i32::change_type(&RawValue::from("")).is_err());
    }

    #[test]
    fn test_float_at_integer_bounds() {
        let two_63 = 2f64.powi(63);
        let two_64 = 2f64.powi(64);
        assert_eq!(
            i64::change_type(&RawValue::from(two_63)),
            Err(ConvertError::OutOfRange { target: "i64" })
        );
        assert_eq!(i64::change_type(&RawValue::from(-two_63)), Ok(i64::MIN));
        assert_eq!(
            u64::change_type(&RawValue::from(two_64)),
            Err(ConvertError::OutOfRange { target: "u64" })
        );
        assert_eq!(u64::change_type(&RawValue::from(two_63)), Ok(1 << 63));
        assert!(u128::change_type(&RawValue::from(2f64.powi(128))).is_err());
        assert!(i128::change_type(&RawValue::from(2f64.powi(127))).is_err());
        assert_eq!(i8::change_type(&RawValue::from(127.0)), Ok(127));
        assert!(i8::change_type(&RawValue::from(128.0)).is_err());
        assert_eq!(i8::change_type(&RawValue::from(-128.0)), Ok(-128));
        assert!(u8::change_type(&RawValue::from(-0.7)).is_err());
    }

    #[test]
    fn test_float_rules() {
        assert_eq!(f64::change_type(&RawValue::from("1")), Ok(1.0));
        assert_eq!(f64::change_type(&RawValue::from("2.25")), Ok(2.25));
        assert_eq!(f32::change_type(&RawValue::from(3)), Ok(3.0));
        assert_eq!(f64::change_type(&RawValue::from(false)), Ok(0.0));
        assert!(f64::change_type(&RawValue::from("this is not a double")).is_err());
        assert!(f64::change_type(&RawValue::from('x')).is_err());
    }

    #[test]
    fn test_string_accepts_anything() {
        assert_eq!(String::change_type(&RawValue::from("")), Ok(String::new()));
        assert_eq!(
            String::change_type(&RawValue::from("Hello world")),
            Ok("Hello world".to_owned())
        );
        assert_eq!(String::change_type(&RawValue::from(12)), Ok("12".to_owned()));
    }

    #[test]
    fn test_error_messages() {
        let err = i32::change_type(&RawValue::from("abc")).unwrap_err();
        insta::assert_snapshot!(err, @r#"cannot parse "abc" as i32"#);
        let err = char::change_type(&RawValue::from(1.5)).unwrap_err();
        insta::assert_snapshot!(err, @"cannot convert float to char");
    }
}
