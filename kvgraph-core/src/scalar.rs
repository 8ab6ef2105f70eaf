//! Scalar type identification for shapes.

use crate::{Def, Shape};

/// All scalar types supported out of the box.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ScalarType {
    /// Primitive type `bool`.
    Bool,
    /// Primitive type `char`.
    Char,
    /// `alloc::string::String`.
    String,
    /// Primitive type `f32`.
    F32,
    /// Primitive type `f64`.
    F64,
    /// Primitive type `u8`.
    U8,
    /// Primitive type `u16`.
    U16,
    /// Primitive type `u32`.
    U32,
    /// Primitive type `u64`.
    U64,
    /// Primitive type `u128`.
    U128,
    /// Primitive type `usize`.
    USize,
    /// Primitive type `i8`.
    I8,
    /// Primitive type `i16`.
    I16,
    /// Primitive type `i32`.
    I32,
    /// Primitive type `i64`.
    I64,
    /// Primitive type `i128`.
    I128,
    /// Primitive type `isize`.
    ISize,
    /// `uuid::Uuid`.
    Uuid,
}

impl ScalarType {
    /// Returns the scalar type of a shape, if it describes one.
    pub fn try_from_shape(shape: &Shape) -> Option<Self> {
        match shape.def {
            Def::Scalar(def) => Some(def.scalar_type),
            _ => None,
        }
    }

    /// Integer and floating point types.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            ScalarType::Bool | ScalarType::Char | ScalarType::String | ScalarType::Uuid
        )
    }
}

impl Shape {
    /// Scalar type of this shape, if any.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        ScalarType::try_from_shape(self)
    }
}
