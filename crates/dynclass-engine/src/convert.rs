//! Traits for converting between dynamic values and Rust types.
//!
//! `StaticType` and `ToValue` are what `#[derive(Describe)]` relies on to
//! turn struct fields into property descriptors; `FromValue` backs the typed
//! getter [`Instance::get_as`](crate::Instance::get_as).
//!
//! # Example
//!
//! ```ignore
//! use dynclass_engine::{FromValue, StaticType, ToValue, TypeRef, Value};
//!
//! assert_eq!(<Vec<i64> as StaticType>::type_ref(), TypeRef::list(TypeRef::I64));
//! assert_eq!(7i32.to_value(), Value::I32(7));
//! assert_eq!(i32::from_value(&Value::I32(7)), Some(7));
//! ```

use crate::types::TypeRef;
use crate::value::Value;

/// A Rust type with a fixed semantic type reference
pub trait StaticType {
    /// The type reference describing `Self`
    fn type_ref() -> TypeRef;
}

/// Convert a Rust value into a dynamic value
pub trait ToValue {
    /// Produce the dynamic representation of `self`
    fn to_value(&self) -> Value;
}

/// Extract a Rust value from a dynamic value
pub trait FromValue: Sized {
    /// Returns `None` when the value has a different type
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive_conversions {
    ($($ty:ty => $type_ref:ident, $accessor:ident;)*) => {
        $(
            impl StaticType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::$type_ref
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    value.$accessor()
                }
            }
        )*
    };
}

primitive_conversions! {
    bool => Bool, as_bool;
    i32 => I32, as_i32;
    i64 => I64, as_i64;
    f64 => F64, as_f64;
}

impl StaticType for String {
    fn type_ref() -> TypeRef {
        TypeRef::String
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl StaticType for Value {
    fn type_ref() -> TypeRef {
        TypeRef::Any
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: StaticType> StaticType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: StaticType> StaticType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::optional(T::type_ref())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map(ToValue::to_value).unwrap_or(Value::Null)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
