//! Attribute descriptors
//!
//! An [`AttributeDescriptor`] is metadata to attach to a property. It either
//! names an existing carrier type, whose constructor receives the values
//! positionally, or carries only a label, in which case a carrier type is
//! synthesized when the schema is compiled.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};
use crate::object::{CompiledType, TypeKind};
use crate::types::TypeRef;
use crate::value::Value;

/// Ordered mapping of attribute field name to value.
///
/// Order is insertion order and is the order in which values bind to
/// constructor parameters. Inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeValues {
    entries: Vec<(String, Value)>,
}

impl AttributeValues {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Runtime types of the values in order (`None` for null values)
    pub fn runtime_types(&self) -> Vec<Option<TypeRef>> {
        self.values().map(Value::runtime_type).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = AttributeValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl Serialize for AttributeValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = AttributeValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of attribute values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AttributeValues, A::Error> {
                let mut values = AttributeValues::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    values.insert(key, value);
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Metadata to attach to a property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Display name; also the carrier name for synthesized carriers
    label: String,
    /// Existing carrier type, if any
    #[serde(skip)]
    carrier_type: Option<CompiledType>,
    /// Field name to value, in constructor order
    #[serde(default)]
    values: AttributeValues,
}

impl AttributeDescriptor {
    /// Create an ad hoc attribute descriptor with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            carrier_type: None,
            values: AttributeValues::new(),
        }
    }

    /// Create a descriptor bound to an existing carrier type
    pub fn for_carrier(carrier: &CompiledType) -> EngineResult<Self> {
        let mut attr = Self::default();
        attr.set_carrier_type(carrier.clone())?;
        Ok(attr)
    }

    /// Descriptor for a type already known to be a carrier
    pub(crate) fn bound(carrier: CompiledType, values: AttributeValues) -> Self {
        Self {
            label: carrier.name().to_string(),
            carrier_type: Some(carrier),
            values,
        }
    }

    /// Add a value (builder style)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Bind to an existing carrier type (builder style)
    pub fn with_carrier_type(mut self, carrier: CompiledType) -> EngineResult<Self> {
        self.set_carrier_type(carrier)?;
        Ok(self)
    }

    /// Bind to an existing carrier type.
    ///
    /// Fails with `InvalidAttributeType` unless the type is a metadata
    /// carrier. On success the label becomes the carrier's name.
    pub fn set_carrier_type(&mut self, carrier: CompiledType) -> EngineResult<()> {
        if carrier.kind() != TypeKind::Attribute {
            return Err(EngineError::InvalidAttributeType(carrier.name().to_string()));
        }
        self.label = carrier.name().to_string();
        self.carrier_type = Some(carrier);
        Ok(())
    }

    /// Get the label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Get the carrier type, if bound
    pub fn carrier_type(&self) -> Option<&CompiledType> {
        self.carrier_type.as_ref()
    }

    /// Get the values
    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Get the values mutably
    pub fn values_mut(&mut self) -> &mut AttributeValues {
        &mut self.values
    }
}
