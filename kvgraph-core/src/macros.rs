/// Declares a struct or fieldless enum and implements [`Model`](crate::Model) for it.
///
/// Structs must implement `Default`, which is how intermediate objects are
/// created while a path is walked. A struct that should never be instantiated
/// (the equivalent of an abstract class) is marked with `#[model(no_default)]`,
/// which must come before any other attribute:
///
/// ```
/// use kvgraph_core::{model, Def, Model, StructKind};
///
/// model! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Student {
///         pub name: String,
///         pub kind: StudentKind,
///         pub tags: Vec<String>,
///     }
/// }
///
/// model! {
///     #[derive(Debug, Default, Clone, Copy, PartialEq)]
///     pub enum StudentKind {
///         #[default]
///         Unknown,
///         Good = 5,
///         Bad,
///     }
/// }
///
/// model! {
///     #[model(no_default)]
///     pub struct Person {
///         pub name: String,
///     }
/// }
///
/// let Def::Enum(def) = StudentKind::shape().def else { unreachable!() };
/// assert_eq!(def.variants[2].discriminant, 6);
///
/// let Def::Struct(def) = Person::shape().def else { unreachable!() };
/// assert_eq!(def.kind, StructKind::Abstract);
/// assert!(Person::shape().construct().is_none());
/// ```
#[macro_export]
macro_rules! model {
    (
        #[model(no_default)]
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $ty ),*
        }

        $crate::__model_struct! {
            $name,
            $crate::StructKind::Abstract,
            || ::core::option::Option::None,
            { $( $field : $ty ),* }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $ty ),*
        }

        $crate::__model_struct! {
            $name,
            $crate::StructKind::Concrete,
            || ::core::option::Option::Some(
                __alloc::boxed::Box::new(<$name as ::core::default::Default>::default())
                    as __alloc::boxed::Box<dyn ::core::any::Any>
            ),
            { $( $field : $ty ),* }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(= $disc:expr)? ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant $(= $disc)? ),+
        }

        impl $crate::Model for $name {
            fn shape() -> $crate::Shape {
                extern crate alloc as __alloc;

                const VARIANTS: &[$crate::Variant] = &[
                    $(
                        $crate::Variant {
                            name: ::core::stringify!($variant),
                            discriminant: $name::$variant as i64,
                        },
                    )+
                ];

                fn variant_at(
                    index: usize,
                ) -> ::core::option::Option<__alloc::boxed::Box<dyn ::core::any::Any>> {
                    [$( $name::$variant ),+]
                        .into_iter()
                        .nth(index)
                        .map(|v| __alloc::boxed::Box::new(v) as __alloc::boxed::Box<dyn ::core::any::Any>)
                }

                fn construct() -> ::core::option::Option<__alloc::boxed::Box<dyn ::core::any::Any>> {
                    let index = VARIANTS
                        .iter()
                        .position(|v| v.discriminant == 0)
                        .unwrap_or(0);
                    variant_at(index)
                }

                $crate::Shape::for_enum::<$name>(
                    ::core::stringify!($name),
                    VARIANTS,
                    variant_at,
                    construct,
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_struct {
    (
        $name:ident,
        $kind:expr,
        $construct:expr,
        { $( $field:ident : $ty:ty ),* }
    ) => {
        impl $crate::Model for $name {
            fn shape() -> $crate::Shape {
                extern crate alloc as __alloc;

                const FIELDS: &[$crate::Field] = &[
                    $(
                        $crate::Field {
                            name: ::core::stringify!($field),
                            shape: <$ty as $crate::Model>::shape,
                            get_mut: {
                                fn get_mut(
                                    owner: &mut dyn ::core::any::Any,
                                ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                                    owner
                                        .downcast_mut::<$name>()
                                        .map(|owner| &mut owner.$field as &mut dyn ::core::any::Any)
                                }
                                get_mut
                            },
                        },
                    )*
                ];

                $crate::Shape::for_struct::<$name>(
                    ::core::stringify!($name),
                    FIELDS,
                    $kind,
                    $construct,
                )
            }
        }
    };
}
