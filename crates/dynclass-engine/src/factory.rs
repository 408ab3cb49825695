//! Instance Factory
//!
//! Creates instances of a compiled type, optionally populating them from
//! a schema's values, and builds homogeneous ordered collections.

use serde::{Serialize, Serializer};

use crate::error::{EngineError, EngineResult};
use crate::object::{CompiledType, Instance};
use crate::schema::Schema;
use crate::types::TypeRef;
use crate::value::Value;

/// Creates and populates instances
pub struct InstanceFactory;

impl InstanceFactory {
    /// Default-construct an instance and, if `populate` is set, copy every
    /// present descriptor value into the property of the same name.
    ///
    /// Descriptors without a matching writable property are skipped.
    pub fn create(ty: &CompiledType, schema: &Schema, populate: bool) -> EngineResult<Instance> {
        let mut instance = ty.create_instance()?;
        if !populate {
            return Ok(instance);
        }

        for descriptor in schema {
            let Some(value) = &descriptor.value else {
                continue;
            };
            instance.set_if_present(&descriptor.name, value.clone())?;
        }
        Ok(instance)
    }

    /// Create a list of `element_type` holding `initial` in order
    pub fn ordered_collection<I>(element_type: TypeRef, initial: I) -> EngineResult<TypedList>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut list = TypedList::new(element_type);
        list.extend(initial)?;
        Ok(list)
    }

    /// Create a list of instances of exactly `ty` holding `initial` in order.
    ///
    /// Instances of another type with the same name are rejected.
    pub fn instance_collection<I>(ty: &CompiledType, initial: I) -> EngineResult<TypedList>
    where
        I: IntoIterator<Item = Instance>,
    {
        let mut list = TypedList::of_type(ty);
        list.extend(initial.into_iter().map(Value::Object))?;
        Ok(list)
    }

    /// Create an empty list of `element_type`, or nothing when no element
    /// type is given
    pub fn ordered_collection_for(element_type: Option<TypeRef>) -> Option<TypedList> {
        element_type.map(TypedList::new)
    }
}

/// Ordered list whose elements all satisfy one element type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedList {
    element_type: TypeRef,
    /// Exact element type for lists of compiled-type instances
    element_class: Option<CompiledType>,
    items: Vec<Value>,
}

impl TypedList {
    /// Create an empty list
    pub fn new(element_type: TypeRef) -> Self {
        Self {
            element_type,
            element_class: None,
            items: Vec::new(),
        }
    }

    /// Create an empty list of instances of exactly `ty`
    pub fn of_type(ty: &CompiledType) -> Self {
        Self {
            element_type: TypeRef::object(ty.name()),
            element_class: Some(ty.clone()),
            items: Vec::new(),
        }
    }

    /// Element type
    pub fn element_type(&self) -> &TypeRef {
        &self.element_type
    }

    /// Append an element
    pub fn push(&mut self, item: impl Into<Value>) -> EngineResult<()> {
        let item = item.into();
        if !self.element_type.accepts(&item) {
            return Err(EngineError::mismatch(
                format!("list<{}> element", self.element_type),
                &self.element_type,
                item.type_name(),
            ));
        }
        if let (Some(class), Value::Object(instance)) = (&self.element_class, &item) {
            if instance.compiled_type() != class {
                return Err(EngineError::mismatch(
                    format!("list<{}> element", self.element_type),
                    format!("{} from module '{}'", class.name(), class.module_name()),
                    format!("unrelated type {}", instance.compiled_type().name()),
                ));
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Append elements in order, stopping at the first rejected one
    pub fn extend<I>(&mut self, items: I) -> EngineResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Get an element by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Elements in order
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Iterate elements in order
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert into a list value
    pub fn into_value(self) -> Value {
        Value::List(self.items)
    }
}

impl<'a> IntoIterator for &'a TypedList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for TypedList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}
