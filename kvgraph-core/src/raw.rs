use core::any::Any;
use core::fmt;

/// An unconverted input value, as handed to the value builders.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValue {
    /// No input at all.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A single character.
    Char(char),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer too large for [`RawValue::Int`], or given as unsigned.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// Text.
    Str(String),
}

impl RawValue {
    /// Whether this is [`RawValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Null, or text that is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Str(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The value as a plain Rust value: `String`, `i64`, `u64`, `f64`, `bool`
    /// or `char`. Null has no plain value.
    pub fn into_any(self) -> Option<Box<dyn Any>> {
        Some(match self {
            RawValue::Null => return None,
            RawValue::Bool(b) => Box::new(b),
            RawValue::Char(c) => Box::new(c),
            RawValue::Int(i) => Box::new(i),
            RawValue::UInt(u) => Box::new(u),
            RawValue::Float(f) => Box::new(f),
            RawValue::Str(s) => Box::new(s),
        })
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Char(c) => write!(f, "{c}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::UInt(u) => write!(f, "{u}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident <- $($t:ty),+) => {
        $(
            impl From<$t> for RawValue {
                fn from(value: $t) -> Self {
                    RawValue::$variant(value.into())
                }
            }
        )+
    };
}

impl_from!(Bool <- bool);
impl_from!(Char <- char);
impl_from!(Int <- i8, i16, i32, i64);
impl_from!(UInt <- u8, u16, u32, u64);
impl_from!(Float <- f32, f64);
impl_from!(Str <- String, &str, &String);

impl From<uuid::Uuid> for RawValue {
    fn from(value: uuid::Uuid) -> Self {
        RawValue::Str(value.hyphenated().to_string())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}
