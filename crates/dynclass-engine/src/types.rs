//! Semantic type references
//!
//! A [`TypeRef`] names the type of a property, a constructor parameter or a
//! list element. It decides which [`Value`]s may be stored in a slot and what
//! a freshly constructed slot holds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Semantic type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 64-bit float
    F64,
    /// UTF-8 string
    String,
    /// Any value, including null
    Any,
    /// Homogeneous list
    List(Box<TypeRef>),
    /// Nullable wrapper
    Optional(Box<TypeRef>),
    /// Instance of the named compiled type (nullable)
    Object(String),
}

impl TypeRef {
    /// Create a list type
    pub fn list(element: TypeRef) -> Self {
        TypeRef::List(Box::new(element))
    }

    /// Create an optional type
    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    /// Create an object type referencing a compiled type by name
    pub fn object(type_name: impl Into<String>) -> Self {
        TypeRef::Object(type_name.into())
    }

    /// Whether `Null` can be stored in a slot of this type
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            TypeRef::Any | TypeRef::Optional(_) | TypeRef::Object(_)
        )
    }

    /// Check whether a value is assignable to this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeRef::Any, _) => true,
            (_, Value::Null) => self.is_nullable(),
            (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::I32, Value::I32(_))
            | (TypeRef::I64, Value::I64(_))
            | (TypeRef::F64, Value::F64(_))
            | (TypeRef::String, Value::String(_)) => true,
            (TypeRef::List(element), Value::List(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            (TypeRef::Optional(inner), v) => inner.accepts(v),
            (TypeRef::Object(name), Value::Object(instance)) => {
                instance.compiled_type().name() == name
            }
            _ => false,
        }
    }

    /// Zero/default value held by a freshly constructed slot
    pub fn default_value(&self) -> Value {
        match self {
            TypeRef::Bool => Value::Bool(false),
            TypeRef::I32 => Value::I32(0),
            TypeRef::I64 => Value::I64(0),
            TypeRef::F64 => Value::F64(0.0),
            TypeRef::String => Value::String(String::new()),
            TypeRef::List(_) => Value::List(Vec::new()),
            TypeRef::Any | TypeRef::Optional(_) | TypeRef::Object(_) => Value::Null,
        }
    }

    /// Convert a loosely typed value (e.g. parsed from JSON) into this type.
    ///
    /// Integers widen to `I64`/`F64` and narrow to `I32` when they fit.
    /// Returns `None` when no lossless conversion exists.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        if self.accepts(&value) {
            return Some(value);
        }
        match (self, value) {
            (TypeRef::I64, Value::I32(i)) => Some(Value::I64(i64::from(i))),
            (TypeRef::I32, Value::I64(i)) => i32::try_from(i).ok().map(Value::I32),
            (TypeRef::F64, Value::I32(i)) => Some(Value::F64(f64::from(i))),
            (TypeRef::F64, Value::I64(i)) => Some(Value::F64(i as f64)),
            (TypeRef::Optional(inner), v) => inner.coerce(v),
            (TypeRef::List(element), Value::List(items)) => items
                .into_iter()
                .map(|item| element.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::I32 => write!(f, "i32"),
            TypeRef::I64 => write!(f, "i64"),
            TypeRef::F64 => write!(f, "f64"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Any => write!(f, "any"),
            TypeRef::List(element) => write!(f, "list<{}>", element),
            TypeRef::Optional(inner) => write!(f, "{}?", inner),
            TypeRef::Object(name) => write!(f, "{}", name),
        }
    }
}

/// Format a positional type list the way constructor signatures are shown
pub(crate) fn format_signature(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_primitives() {
        assert!(TypeRef::I32.accepts(&Value::I32(1)));
        assert!(!TypeRef::I32.accepts(&Value::I64(1)));
        assert!(TypeRef::String.accepts(&Value::from("x")));
        assert!(!TypeRef::String.accepts(&Value::Null));
        assert!(TypeRef::Any.accepts(&Value::Null));
    }

    #[test]
    fn test_accepts_nested() {
        let ty = TypeRef::list(TypeRef::optional(TypeRef::I32));
        assert!(ty.accepts(&Value::List(vec![Value::I32(1), Value::Null])));
        assert!(!ty.accepts(&Value::List(vec![Value::from("a")])));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(TypeRef::I32.default_value(), Value::I32(0));
        assert_eq!(TypeRef::String.default_value(), Value::String(String::new()));
        assert_eq!(TypeRef::object("Point").default_value(), Value::Null);
        assert_eq!(TypeRef::list(TypeRef::Bool).default_value(), Value::List(vec![]));
    }

    #[test]
    fn test_coerce_integers() {
        assert_eq!(TypeRef::I64.coerce(Value::I32(7)), Some(Value::I64(7)));
        assert_eq!(TypeRef::I32.coerce(Value::I64(7)), Some(Value::I32(7)));
        assert_eq!(TypeRef::I32.coerce(Value::I64(i64::MAX)), None);
        assert_eq!(TypeRef::F64.coerce(Value::I32(2)), Some(Value::F64(2.0)));
        assert_eq!(TypeRef::Bool.coerce(Value::I32(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeRef::list(TypeRef::String).to_string(), "list<string>");
        assert_eq!(TypeRef::optional(TypeRef::I64).to_string(), "i64?");
        assert_eq!(format_signature(&[TypeRef::I32, TypeRef::String]), "i32, string");
    }
}
