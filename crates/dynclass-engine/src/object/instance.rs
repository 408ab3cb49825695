//! Live objects of a compiled type

use std::fmt;

use crate::convert::FromValue;
use crate::error::{EngineError, EngineResult};
use crate::object::{CompiledType, PropertyInfo};
use crate::schema::{AttributeDescriptor, AttributeValues};
use crate::value::Value;

/// Fields whose names start with this prefix are internal to a carrier and
/// are never exposed as attribute values.
pub(crate) const RESERVED_PREFIX: &str = "__";

/// Instance of a compiled type: one value per backing slot
#[derive(Clone)]
pub struct Instance {
    class: CompiledType,
    slots: Vec<Value>,
}

impl Instance {
    /// Bind slot values to a type. Callers guarantee one value per slot.
    pub(crate) fn from_slots(class: CompiledType, slots: Vec<Value>) -> Self {
        Self { class, slots }
    }

    /// The instance's type
    pub fn compiled_type(&self) -> &CompiledType {
        &self.class
    }

    fn property_info(&self, name: &str) -> EngineResult<&PropertyInfo> {
        self.class
            .property(name)
            .ok_or_else(|| EngineError::UnknownProperty {
                type_name: self.class.name().to_string(),
                property: name.to_string(),
            })
    }

    /// Read a property by name
    pub fn get(&self, name: &str) -> EngineResult<&Value> {
        let property = self.property_info(name)?;
        Ok(&self.slots[property.slot()])
    }

    /// Read a property and convert it to a Rust type.
    ///
    /// Returns `Ok(None)` when the stored value does not convert.
    pub fn get_as<T: FromValue>(&self, name: &str) -> EngineResult<Option<T>> {
        self.get(name).map(T::from_value)
    }

    /// Follow a dotted path through nested objects (`"Address.City"`).
    ///
    /// A null intermediate yields `Null`; a non-object intermediate or a
    /// missing property is an error.
    pub fn get_path(&self, path: &str) -> EngineResult<Value> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.get(first)?.clone();
        for segment in segments {
            current = match &current {
                Value::Null => return Ok(Value::Null),
                Value::Object(inner) => inner.get(segment)?.clone(),
                other => {
                    return Err(EngineError::UnknownProperty {
                        type_name: other.type_name(),
                        property: segment.to_string(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Write a property by name.
    ///
    /// The value must be assignable to the property's type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> EngineResult<()> {
        let value = value.into();
        let property = self.property_info(name)?;
        if !property.is_writable() {
            return Err(EngineError::ReadOnlyProperty {
                type_name: self.class.name().to_string(),
                property: name.to_string(),
            });
        }
        if !property.property_type().accepts(&value) {
            return Err(EngineError::mismatch(
                format!("property '{}'", name),
                property.property_type(),
                value.type_name(),
            ));
        }
        let slot = property.slot();
        self.slots[slot] = value;
        Ok(())
    }

    /// Write a property if the type has a writable property of that name.
    ///
    /// Returns whether the value was written.
    pub fn set_if_present(&mut self, name: &str, value: impl Into<Value>) -> EngineResult<bool> {
        match self.class.property(name) {
            Some(property) if property.is_writable() => {
                self.set(name, value)?;
                Ok(true)
            }
            _ => {
                tracing::trace!(type_name = %self.class.name(), property = %name, "no writable property, skipping");
                Ok(false)
            }
        }
    }

    /// Property values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.class.properties().iter().map(|p| &self.slots[p.slot()])
    }

    /// Property names paired with values, in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.class
            .properties()
            .iter()
            .map(|p| (p.name(), &self.slots[p.slot()]))
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.slots == other.slots
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class.name());
        for (name, value) in self.entries() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.class.name())?;
        for (i, (name, value)) in self.entries().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

/// Metadata object attached to a property of a compiled type
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInstance {
    instance: Instance,
}

impl AttributeInstance {
    pub(crate) fn new(instance: Instance) -> Self {
        Self { instance }
    }

    /// Carrier type name
    pub fn label(&self) -> &str {
        self.instance.compiled_type().name()
    }

    /// Carrier type
    pub fn carrier(&self) -> &CompiledType {
        self.instance.compiled_type()
    }

    /// Read a field of the metadata object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.instance.get(key).ok()
    }

    /// The underlying carrier instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Public, non-reserved fields in constructor order.
    ///
    /// The order follows the first constructor taking exactly those fields,
    /// falling back to declaration order.
    pub fn values(&self) -> AttributeValues {
        let carrier = self.carrier();
        let visible: Vec<&PropertyInfo> = carrier
            .properties()
            .iter()
            .filter(|p| !p.name().starts_with(RESERVED_PREFIX))
            .collect();

        let ordered = carrier
            .constructors()
            .iter()
            .find(|c| !c.parameters().is_empty() && c.parameters().len() == visible.len())
            .and_then(|ctor| {
                ctor.bindings()
                    .iter()
                    .map(|&slot| visible.iter().find(|p| p.slot() == slot).copied())
                    .collect::<Option<Vec<_>>>()
            })
            .unwrap_or(visible);

        ordered
            .into_iter()
            .map(|p| (p.name().to_string(), self.instance.slots[p.slot()].clone()))
            .collect()
    }

    /// Convert back into a descriptor bound to the carrier type
    pub fn to_descriptor(&self) -> AttributeDescriptor {
        AttributeDescriptor::bound(self.carrier().clone(), self.values())
    }
}
