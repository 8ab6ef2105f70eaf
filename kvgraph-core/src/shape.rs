use core::any::Any;
use core::fmt;

use heck::ToSnakeCase;

use crate::{Def, EnumDef, Field, ScalarDef, StructDef, StructKind, Variant};

/// A type that can be reached by a key path.
///
/// The descriptor is produced on demand; nothing is cached between calls.
pub trait Model: Any {
    /// Returns the runtime descriptor of this type.
    fn shape() -> Shape;
}

/// Runtime descriptor of a type: what it is and how to create or overwrite it.
#[derive(Clone, Copy, Debug)]
pub struct Shape {
    /// Short name of the type, e.g. `"Address"`, `"u32"`, `"Vec"`.
    pub type_identifier: &'static str,

    /// Category of the type, with the operations specific to that category.
    pub def: Def,

    /// Operations every type supports.
    pub vtable: ValueVTable,
}

/// Creates a fresh default instance, or `None` if the type cannot be instantiated.
pub type ConstructFn = fn() -> Option<Box<dyn Any>>;

/// Overwrites `slot` with `value`. Both must be of the described type; on a
/// mismatch the value is handed back untouched.
pub type AssignFn = fn(slot: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>>;

/// Operations shared by all shapes.
#[derive(Clone, Copy, Debug)]
pub struct ValueVTable {
    /// See [`ConstructFn`].
    pub construct: ConstructFn,
    /// See [`AssignFn`].
    pub assign: AssignFn,
}

impl ValueVTable {
    /// vtable for a type with a `Default` impl.
    pub fn of_default<T: Any + Default>() -> Self {
        Self {
            construct: construct_default::<T>,
            assign: assign_value::<T>,
        }
    }

    /// vtable for a type that cannot be instantiated on its own.
    pub fn of_abstract<T: Any>() -> Self {
        Self {
            construct: construct_nothing,
            assign: assign_value::<T>,
        }
    }
}

fn construct_default<T: Any + Default>() -> Option<Box<dyn Any>> {
    Some(Box::new(T::default()))
}

fn construct_nothing() -> Option<Box<dyn Any>> {
    None
}

/// [`AssignFn`] for any `T`.
pub fn assign_value<T: Any>(slot: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
    let Some(slot) = slot.downcast_mut::<T>() else {
        return Err(value);
    };
    *slot = *value.downcast::<T>()?;
    Ok(())
}

impl Shape {
    /// Shape of a struct registered through [`model!`](crate::model).
    pub fn for_struct<T: Any>(
        type_identifier: &'static str,
        fields: &'static [Field],
        kind: StructKind,
        construct: ConstructFn,
    ) -> Self {
        Self {
            type_identifier,
            def: Def::Struct(StructDef { fields, kind }),
            vtable: ValueVTable {
                construct,
                assign: assign_value::<T>,
            },
        }
    }

    /// Shape of a fieldless enum registered through [`model!`](crate::model).
    pub fn for_enum<T: Any>(
        type_identifier: &'static str,
        variants: &'static [Variant],
        variant_at: fn(usize) -> Option<Box<dyn Any>>,
        construct: ConstructFn,
    ) -> Self {
        Self {
            type_identifier,
            def: Def::Enum(EnumDef {
                variants,
                variant_at,
            }),
            vtable: ValueVTable {
                construct,
                assign: assign_value::<T>,
            },
        }
    }

    /// Shape of a scalar with a `Default` impl.
    pub fn for_scalar<T: Any + Default>(type_identifier: &'static str, scalar: ScalarDef) -> Self {
        Self {
            type_identifier,
            def: Def::Scalar(scalar),
            vtable: ValueVTable::of_default::<T>(),
        }
    }

    /// Looks up a struct field by path segment.
    ///
    /// Matching ignores ASCII case, and a segment also matches a field when its
    /// snake_case form is the field name, so `FirstName` finds `first_name`.
    /// Non-struct shapes have no fields.
    pub fn field(&self, segment: &str) -> Option<&'static Field> {
        let Def::Struct(def) = self.def else {
            return None;
        };
        def.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(segment))
            .or_else(|| {
                let snake = segment.to_snake_case();
                def.fields.iter().find(|f| f.name == snake)
            })
    }

    /// Field names of a struct shape, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        let fields: &'static [Field] = match self.def {
            Def::Struct(def) => def.fields,
            _ => &[],
        };
        fields.iter().map(|f| f.name)
    }

    /// Whether this is a list (count, index and append capable).
    pub fn is_list(&self) -> bool {
        matches!(self.def, Def::List(_))
    }

    /// Creates a default instance of this type, if it can be instantiated.
    pub fn construct(&self) -> Option<Box<dyn Any>> {
        (self.vtable.construct)()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::Option(def) => write!(f, "Option<{}>", (def.t)()),
            Def::List(def) => write!(f, "{}<{}>", self.type_identifier, (def.t)()),
            Def::Pointer(def) => write!(f, "{}<{}>", self.type_identifier, (def.t)()),
            _ => f.write_str(self.type_identifier),
        }
    }
}
