//! [`Model`] implementations for std types and `uuid::Uuid`.

use core::any::Any;

use uuid::Uuid;

use crate::{
    Def, ListDef, Model, OptionDef, PointerDef, ScalarDef, ScalarType, Shape, ValueVTable,
    change_type_boxed,
};

macro_rules! impl_model_scalar {
    ($($t:ty => $scalar:ident),+ $(,)?) => {
        $(
            impl Model for $t {
                fn shape() -> Shape {
                    Shape::for_scalar::<$t>(
                        stringify!($t),
                        ScalarDef {
                            scalar_type: ScalarType::$scalar,
                            change_type: Some(change_type_boxed::<$t>),
                        },
                    )
                }
            }
        )+
    };
}

impl_model_scalar! {
    bool => Bool,
    char => Char,
    String => String,
    f32 => F32,
    f64 => F64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => USize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => ISize,
}

impl Model for Uuid {
    fn shape() -> Shape {
        Shape::for_scalar::<Uuid>(
            "Uuid",
            ScalarDef {
                scalar_type: ScalarType::Uuid,
                change_type: None,
            },
        )
    }
}

// Option<T>

fn option_is_some<T: Any>(option: &dyn Any) -> bool {
    option
        .downcast_ref::<Option<T>>()
        .is_some_and(Option::is_some)
}

fn option_get_mut<T: Any>(option: &mut dyn Any) -> Option<&mut dyn Any> {
    option
        .downcast_mut::<Option<T>>()?
        .as_mut()
        .map(|v| v as &mut dyn Any)
}

fn option_wrap_some<T: Any>(value: Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>> {
    let value = value.downcast::<T>()?;
    Ok(Box::new(Some(*value)))
}

fn option_none<T: Any>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

impl<T: Model> Model for Option<T> {
    fn shape() -> Shape {
        Shape {
            type_identifier: "Option",
            def: Def::Option(OptionDef {
                t: T::shape,
                is_some: option_is_some::<T>,
                get_mut: option_get_mut::<T>,
                wrap_some: option_wrap_some::<T>,
                none: option_none::<T>,
            }),
            vtable: ValueVTable::of_default::<Option<T>>(),
        }
    }
}

// Vec<T>

fn vec_len<T: Any>(list: &dyn Any) -> usize {
    list.downcast_ref::<Vec<T>>().map_or(0, Vec::len)
}

fn vec_get_mut<T: Any>(list: &mut dyn Any, index: usize) -> Option<&mut dyn Any> {
    list.downcast_mut::<Vec<T>>()?
        .get_mut(index)
        .map(|v| v as &mut dyn Any)
}

fn vec_push<T: Any>(list: &mut dyn Any, item: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
    let Some(list) = list.downcast_mut::<Vec<T>>() else {
        return Err(item);
    };
    list.push(*item.downcast::<T>()?);
    Ok(())
}

impl<T: Model> Model for Vec<T> {
    fn shape() -> Shape {
        Shape {
            type_identifier: "Vec",
            def: Def::List(ListDef {
                t: T::shape,
                len: vec_len::<T>,
                get_mut: vec_get_mut::<T>,
                push: vec_push::<T>,
            }),
            vtable: ValueVTable::of_default::<Vec<T>>(),
        }
    }
}

// Box<T>

fn box_get_mut<T: Any>(pointer: &mut dyn Any) -> Option<&mut dyn Any> {
    pointer
        .downcast_mut::<Box<T>>()
        .map(|b| &mut **b as &mut dyn Any)
}

fn box_wrap<T: Any>(value: Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>> {
    let value: Box<T> = value.downcast::<T>()?;
    Ok(Box::new(value))
}

fn box_construct<T: Model>() -> Option<Box<dyn Any>> {
    let value = T::shape().construct()?;
    box_wrap::<T>(value).ok()
}

impl<T: Model> Model for Box<T> {
    fn shape() -> Shape {
        Shape {
            type_identifier: "Box",
            def: Def::Pointer(PointerDef {
                t: T::shape,
                get_mut: box_get_mut::<T>,
                wrap: box_wrap::<T>,
            }),
            vtable: ValueVTable {
                construct: box_construct::<T>,
                assign: crate::assign_value::<Box<T>>,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_vtable() {
        let shape = <Option<u32>>::shape();
        let Def::Option(def) = shape.def else {
            panic!("expected option, got {}", shape.def.kind());
        };
        let mut value: Box<dyn Any> = shape.construct().unwrap();
        assert!(!(def.is_some)(&*value));
        assert!((def.get_mut)(&mut *value).is_none());

        let some = (def.wrap_some)(Box::new(7u32)).unwrap();
        (shape.vtable.assign)(&mut *value, some).unwrap();
        assert!((def.is_some)(&*value));
        assert_eq!(value.downcast_ref::<Option<u32>>(), Some(&Some(7)));

        assert!((def.wrap_some)(Box::new("nope")).is_err());
        assert_eq!(def.t().type_identifier, "u32");
    }

    #[test]
    fn test_vec_vtable() {
        let shape = <Vec<String>>::shape();
        let Def::List(def) = shape.def else {
            panic!("expected list, got {}", shape.def.kind());
        };
        let mut list = shape.construct().unwrap();
        assert_eq!((def.len)(&*list), 0);
        (def.push)(&mut *list, Box::new("a".to_owned())).unwrap();
        (def.push)(&mut *list, Box::new("b".to_owned())).unwrap();
        assert!((def.push)(&mut *list, Box::new(1u8)).is_err());
        assert_eq!((def.len)(&*list), 2);

        let second = (def.get_mut)(&mut *list, 1).unwrap();
        *second.downcast_mut::<String>().unwrap() = "c".to_owned();
        assert!((def.get_mut)(&mut *list, 2).is_none());
        assert_eq!(
            list.downcast_ref::<Vec<String>>(),
            Some(&vec!["a".to_owned(), "c".to_owned()])
        );
    }

    #[test]
    fn test_box_vtable() {
        let shape = <Box<i64>>::shape();
        let Def::Pointer(def) = shape.def else {
            panic!("expected pointer, got {}", shape.def.kind());
        };
        let mut boxed = shape.construct().unwrap();
        let inner = (def.get_mut)(&mut *boxed).unwrap();
        (i64::shape().vtable.assign)(inner, Box::new(-3i64)).unwrap();
        assert_eq!(boxed.downcast_ref::<Box<i64>>().map(|b| **b), Some(-3));
    }

    #[test]
    fn test_assign_mismatch_hands_value_back() {
        let mut slot = 1u16;
        let back = (u16::shape().vtable.assign)(&mut slot, Box::new(2u32)).unwrap_err();
        assert_eq!(back.downcast_ref::<u32>(), Some(&2));
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(<Vec<Option<u8>>>::shape().to_string(), "Vec<Option<u8>>");
        assert_eq!(<Box<String>>::shape().to_string(), "Box<String>");
        assert_eq!(Uuid::shape().to_string(), "Uuid");
    }
}
