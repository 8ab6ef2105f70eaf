use core::any::Any;

use crate::{ConvertError, RawValue, ScalarType, Shape};

/// The category of a type, with the operations specific to that category.
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// Leaf value: numbers, `bool`, `char`, `String`, `Uuid`.
    Scalar(ScalarDef),
    /// Fieldless enum.
    Enum(EnumDef),
    /// `Option<T>`, the nullable wrapper.
    Option(OptionDef),
    /// Growable list (`Vec<T>`).
    List(ListDef),
    /// Struct with named, settable fields.
    Struct(StructDef),
    /// Owning pointer that is transparent to paths (`Box<T>`).
    Pointer(PointerDef),
}

impl Def {
    /// Short name of the category, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Def::Scalar(_) => "scalar",
            Def::Enum(_) => "enum",
            Def::Option(_) => "option",
            Def::List(_) => "list",
            Def::Struct(_) => "struct",
            Def::Pointer(_) => "pointer",
        }
    }
}

/// Converts a raw value into a boxed scalar of the described type.
pub type ChangeTypeFn = fn(raw: &RawValue) -> Result<Box<dyn Any>, ConvertError>;

/// Scalar types.
#[derive(Clone, Copy, Debug)]
pub struct ScalarDef {
    /// Which scalar this is.
    pub scalar_type: ScalarType,

    /// Generic conversion from a raw value, if this scalar has one.
    /// `Uuid` has none: identifiers are parsed by a dedicated builder.
    pub change_type: Option<ChangeTypeFn>,
}

/// One member of a fieldless enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variant {
    /// Declared name of the variant.
    pub name: &'static str,
    /// Numeric value of the variant.
    pub discriminant: i64,
}

/// Fieldless enums.
#[derive(Clone, Copy, Debug)]
pub struct EnumDef {
    /// Variants in declaration order.
    pub variants: &'static [Variant],

    /// Creates the variant at the given declaration index.
    pub variant_at: fn(index: usize) -> Option<Box<dyn Any>>,
}

impl EnumDef {
    /// Index of the variant with the given discriminant.
    pub fn by_discriminant(&self, discriminant: i64) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.discriminant == discriminant)
    }

    /// Index of the variant with the given name, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
            .or_else(|| {
                let lower = name.to_lowercase();
                self.variants
                    .iter()
                    .position(|v| v.name.to_lowercase() == lower)
            })
    }

    /// Index of the default member: the variant whose discriminant is zero,
    /// otherwise the first declared one.
    pub fn default_index(&self) -> usize {
        self.by_discriminant(0).unwrap_or(0)
    }

    /// Creates the default member.
    pub fn default_variant(&self) -> Option<Box<dyn Any>> {
        (self.variant_at)(self.default_index())
    }
}

/// `Option<T>`.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// Shape of `T`.
    pub t: fn() -> Shape,

    /// Whether the option holds a value.
    pub is_some: fn(option: &dyn Any) -> bool,

    /// Mutable access to the held value.
    pub get_mut: fn(option: &mut dyn Any) -> Option<&mut dyn Any>,

    /// Wraps a boxed `T` into a boxed `Some(T)`; hands the value back if it is not a `T`.
    pub wrap_some: fn(value: Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>>,

    /// A boxed `None`.
    pub none: fn() -> Box<dyn Any>,
}

impl OptionDef {
    /// Shape of `T`.
    pub fn t(&self) -> Shape {
        (self.t)()
    }
}

/// Growable lists.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Shape of the elements.
    pub t: fn() -> Shape,

    /// Number of elements.
    pub len: fn(list: &dyn Any) -> usize,

    /// Mutable access to the element at `index`, `None` when out of bounds.
    pub get_mut: fn(list: &mut dyn Any, index: usize) -> Option<&mut dyn Any>,

    /// Appends a boxed element; hands the value back if it is not an element.
    pub push: fn(list: &mut dyn Any, item: Box<dyn Any>) -> Result<(), Box<dyn Any>>,
}

impl ListDef {
    /// Shape of the elements.
    pub fn t(&self) -> Shape {
        (self.t)()
    }
}

/// Whether a struct may be instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructKind {
    /// Has a default constructor.
    Concrete,
    /// Only describes fields; cannot be instantiated.
    Abstract,
}

impl StructKind {
    /// Whether this is [`StructKind::Abstract`].
    pub fn is_abstract(self) -> bool {
        self == StructKind::Abstract
    }
}

/// Structs with named fields.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// Fields in declaration order.
    pub fields: &'static [Field],

    /// Whether instances can be created.
    pub kind: StructKind,
}

/// A named, settable struct field.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Field name as declared.
    pub name: &'static str,

    /// Shape of the field type.
    ///
    /// The indirection allows recursive types.
    pub shape: fn() -> Shape,

    /// Mutable access to the field, given the containing struct.
    pub get_mut: fn(owner: &mut dyn Any) -> Option<&mut dyn Any>,
}

impl Field {
    /// Shape of the field type.
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

/// Owning pointers.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// Shape of the pointee.
    pub t: fn() -> Shape,

    /// Mutable access to the pointee.
    pub get_mut: fn(pointer: &mut dyn Any) -> Option<&mut dyn Any>,

    /// Boxes a pointee into a pointer; hands the value back if it is not a pointee.
    pub wrap: fn(value: Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>>,
}

impl PointerDef {
    /// Shape of the pointee.
    pub fn t(&self) -> Shape {
        (self.t)()
    }
}
