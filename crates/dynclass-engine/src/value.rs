//! Dynamic values
//!
//! [`Value`] is what property slots, attribute fields and constructor
//! arguments hold. Primitive variants are stored inline; objects are
//! instances of a compiled type.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::object::Instance;
use crate::types::TypeRef;

/// Dynamic value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Instance of a compiled type
    Object(Instance),
}

impl Value {
    /// Runtime type of the value, `None` for `Null`
    ///
    /// The returned type always accepts the value. Lists report their
    /// common element type: `list<optional<T>>` when some elements are null,
    /// `list<any>` when empty, all null or mixed.
    pub fn runtime_type(&self) -> Option<TypeRef> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeRef::Bool),
            Value::I32(_) => Some(TypeRef::I32),
            Value::I64(_) => Some(TypeRef::I64),
            Value::F64(_) => Some(TypeRef::F64),
            Value::String(_) => Some(TypeRef::String),
            Value::List(items) => Some(TypeRef::list(element_type(items))),
            Value::Object(instance) => {
                Some(TypeRef::object(instance.compiled_type().name()))
            }
        }
    }

    /// Human readable type name, used in error messages
    pub fn type_name(&self) -> String {
        self.runtime_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64 (i32 widens)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(i) => Some(i64::from(*i)),
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as object instance
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Numbers compare across widths, `Null` sorts first, and values of
    /// unrelated kinds are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::F64(a), Value::F64(b)) => a.partial_cmp(b),
            (Value::F64(a), b) => b.as_i64().and_then(|b| a.partial_cmp(&(b as f64))),
            (a, Value::F64(b)) => a.as_i64().and_then(|a| (a as f64).partial_cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

fn element_type(items: &[Value]) -> TypeRef {
    let mut common: Option<TypeRef> = None;
    let mut has_null = false;
    for item in items {
        match (item.runtime_type(), &common) {
            (None, _) => has_null = true,
            (Some(ty), None) => common = Some(ty),
            (Some(ty), Some(seen)) if ty == *seen => {}
            (Some(_), Some(_)) => return TypeRef::Any,
        }
    }
    match common {
        Some(ty) if has_null && !ty.is_nullable() => TypeRef::optional(ty),
        Some(ty) => ty,
        None => TypeRef::Any,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(instance) => write!(f, "{}", instance),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&serde_json::Value> for Value {
    /// Integers that fit in 32 bits become `I32`, other integers `I64`.
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).map(Value::I32).unwrap_or(Value::I64(i))
                } else {
                    Value::F64(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            // Anonymous objects have no compiled type to instantiate
            serde_json::Value::Object(_) => Value::String(json.to_string()),
        }
    }
}

// ============================================================================
// Serde
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::I32(i) => serializer.serialize_i32(*i),
            Value::I64(i) => serializer.serialize_i64(*i),
            Value::F64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Object(instance) => {
                let properties = instance.compiled_type().properties();
                let mut map = serializer.serialize_map(Some(properties.len()))?;
                for (property, value) in properties.iter().zip(instance.values()) {
                    map.serialize_entry(property.name(), value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "null, a boolean, a number, a string or a list")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Value, E> {
        Ok(i32::try_from(i).map(Value::I32).unwrap_or(Value::I64(i)))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        i64::try_from(u)
            .map(|i| self.visit_i64::<E>(i))
            .unwrap_or_else(|_| Err(E::custom(format!("integer {} out of range", u))))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::F64(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<Value, A::Error> {
        Err(de::Error::custom(
            "object values cannot be deserialized without a compiled type",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_types() {
        assert_eq!(Value::I32(1).runtime_type(), Some(TypeRef::I32));
        assert_eq!(Value::from("a").runtime_type(), Some(TypeRef::String));
        assert_eq!(Value::Null.runtime_type(), None);
        assert_eq!(
            Value::List(vec![Value::Null, Value::I64(2)]).runtime_type(),
            Some(TypeRef::list(TypeRef::optional(TypeRef::I64)))
        );
        assert_eq!(
            Value::List(vec![Value::I32(1), Value::from("x")]).runtime_type(),
            Some(TypeRef::list(TypeRef::Any))
        );
        assert_eq!(
            Value::List(vec![Value::Null]).runtime_type(),
            Some(TypeRef::list(TypeRef::Any))
        );
        assert_eq!(Value::List(vec![]).type_name(), "list<any>");
    }

    #[test]
    fn test_runtime_type_accepts_value() {
        let values = [
            Value::List(vec![Value::Null, Value::I32(1)]),
            Value::List(vec![Value::I32(1), Value::from("x")]),
            Value::List(vec![
                Value::List(vec![Value::I32(1)]),
                Value::List(vec![Value::Null, Value::I32(2)]),
            ]),
            Value::List(vec![Value::List(vec![]), Value::Null]),
        ];
        for value in &values {
            let ty = value.runtime_type().unwrap();
            assert!(ty.accepts(value), "{} does not accept {}", ty, value);
        }
    }

    #[test]
    fn test_compare_across_widths() {
        assert_eq!(Value::I32(2).compare(&Value::I64(3)), Some(Ordering::Less));
        assert_eq!(Value::F64(2.5).compare(&Value::I32(2)), Some(Ordering::Greater));
        assert_eq!(Value::Null.compare(&Value::I32(0)), Some(Ordering::Less));
        assert_eq!(Value::from("a").compare(&Value::I32(0)), None);
    }

    #[test]
    fn test_json_round_trip() {
        let value = Value::List(vec![Value::I32(1), Value::from("two"), Value::Null]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,"two",null]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_deserialize_large_integer() {
        let back: Value = serde_json::from_str("5000000000").unwrap();
        assert_eq!(back, Value::I64(5_000_000_000));
        assert!(serde_json::from_str::<Value>(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(3)), Value::I32(3));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }
}
