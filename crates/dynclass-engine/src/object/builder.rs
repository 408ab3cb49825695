//! Type Builder
//!
//! Incrementally defines a type: backing slots, properties bound to them,
//! attached metadata and constructors. [`TypeBuilder::create_type`]
//! finalizes the definition into an immutable [`CompiledType`].
//!
//! # Example
//!
//! ```ignore
//! // A carrier type usable as `AttributeDescriptor::for_carrier(&range)`
//! let range = TypeBuilder::attribute("Range")
//!     .with_property("min", TypeRef::I32)?
//!     .with_property("max", TypeRef::I32)?
//!     .with_default_constructor()
//!     .with_constructor(&["min", "max"])?
//!     .create_type(0);
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{EngineError, EngineResult};
use crate::object::{
    AttributeInstance, CompiledType, ConstructorInfo, FieldSlot, ParameterInfo, PropertyInfo,
    TypeDef, TypeKind,
};
use crate::types::TypeRef;

/// Builder for a type definition
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    module: String,
    kind: TypeKind,
    fields: Vec<FieldSlot>,
    properties: Vec<PropertyInfo>,
    property_indices: FxHashMap<String, usize>,
    constructors: Vec<ConstructorInfo>,
}

impl TypeBuilder {
    /// Start a plain data type
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Data)
    }

    /// Start a metadata carrier type
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Attribute)
    }

    /// Start a type of the given kind
    pub fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            module: String::new(),
            kind,
            fields: Vec::new(),
            properties: Vec::new(),
            property_indices: FxHashMap::default(),
            constructors: Vec::new(),
        }
    }

    /// Record the owning module's name
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of properties defined so far
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Reserve a private backing slot, returning its index
    pub fn define_field(&mut self, name: impl Into<String>, field_type: TypeRef) -> usize {
        let index = self.fields.len();
        self.fields.push(FieldSlot {
            name: name.into(),
            field_type,
            index,
        });
        index
    }

    /// Define a public property bound to an existing slot.
    ///
    /// Returns the property's declaration index.
    pub fn define_property(
        &mut self,
        name: impl Into<String>,
        property_type: TypeRef,
        slot: usize,
        writable: bool,
    ) -> EngineResult<usize> {
        let name = name.into();
        if self.property_indices.contains_key(&name) {
            return Err(EngineError::DuplicateProperty(name));
        }

        let field = self.fields.get(slot).ok_or_else(|| EngineError::UnknownProperty {
            type_name: self.name.clone(),
            property: format!("slot #{}", slot),
        })?;
        if field.field_type != property_type {
            return Err(EngineError::mismatch(
                format!("property '{}'", name),
                &field.field_type,
                &property_type,
            ));
        }

        let index = self.properties.len();
        self.property_indices.insert(name.clone(), index);
        self.properties.push(PropertyInfo {
            name,
            property_type,
            slot,
            description: None,
            attributes: Vec::new(),
            writable,
        });
        Ok(index)
    }

    /// Define a `_<name>` slot and a read/write property over it.
    ///
    /// Returns the property's declaration index.
    pub fn define_auto_property(
        &mut self,
        name: impl Into<String>,
        property_type: TypeRef,
    ) -> EngineResult<usize> {
        let name = name.into();
        if self.property_indices.contains_key(&name) {
            return Err(EngineError::DuplicateProperty(name));
        }
        let slot = self.define_field(format!("_{}", name), property_type.clone());
        tracing::trace!(type_name = %self.name, property = %name, slot, "defining property");
        self.define_property(name, property_type, slot, true)
    }

    /// Attach metadata to a property
    pub fn add_property_attribute(&mut self, property: usize, attribute: AttributeInstance) {
        if let Some(p) = self.properties.get_mut(property) {
            p.attributes.push(attribute);
        }
    }

    /// Set a property's description
    pub fn set_property_description(&mut self, property: usize, description: Option<String>) {
        if let Some(p) = self.properties.get_mut(property) {
            p.description = description;
        }
    }

    /// Define the public parameterless constructor
    pub fn define_default_constructor(&mut self) {
        if self.constructors.iter().any(|c| c.parameters.is_empty()) {
            return;
        }
        self.constructors.push(ConstructorInfo {
            parameters: Vec::new(),
            bindings: Vec::new(),
        });
    }

    /// Define a constructor storing each parameter into the given slot
    pub fn define_constructor(
        &mut self,
        parameters: Vec<(String, TypeRef)>,
        bindings: Vec<usize>,
    ) -> EngineResult<()> {
        if parameters.len() != bindings.len() {
            return Err(EngineError::ArgumentCount {
                type_name: self.name.clone(),
                expected: parameters.len(),
                got: bindings.len(),
            });
        }

        let mut params = Vec::with_capacity(parameters.len());
        for (index, ((name, param_type), &slot)) in parameters.into_iter().zip(&bindings).enumerate() {
            let field = self.fields.get(slot).ok_or_else(|| EngineError::UnknownProperty {
                type_name: self.name.clone(),
                property: format!("slot #{}", slot),
            })?;
            if field.field_type != param_type && field.field_type != TypeRef::Any {
                return Err(EngineError::mismatch(
                    format!("parameter '{}' of {}", name, self.name),
                    &field.field_type,
                    &param_type,
                ));
            }
            params.push(ParameterInfo {
                name,
                param_type,
                index,
            });
        }

        self.constructors.push(ConstructorInfo {
            parameters: params,
            bindings,
        });
        Ok(())
    }

    /// Builder-style [`define_auto_property`](Self::define_auto_property)
    pub fn with_property(mut self, name: impl Into<String>, property_type: TypeRef) -> EngineResult<Self> {
        self.define_auto_property(name, property_type)?;
        Ok(self)
    }

    /// Builder-style [`define_default_constructor`](Self::define_default_constructor)
    pub fn with_default_constructor(mut self) -> Self {
        self.define_default_constructor();
        self
    }

    /// Define a constructor taking the named properties, in the given order
    pub fn define_property_constructor(&mut self, property_names: &[&str]) -> EngineResult<()> {
        let mut parameters = Vec::with_capacity(property_names.len());
        let mut bindings = Vec::with_capacity(property_names.len());
        for &name in property_names {
            let index = self.property_indices.get(name).copied().ok_or_else(|| {
                EngineError::UnknownProperty {
                    type_name: self.name.clone(),
                    property: name.to_string(),
                }
            })?;
            let property = &self.properties[index];
            parameters.push((property.name.clone(), property.property_type.clone()));
            bindings.push(property.slot);
        }
        self.define_constructor(parameters, bindings)
    }

    /// Builder-style [`define_property_constructor`](Self::define_property_constructor)
    pub fn with_constructor(mut self, property_names: &[&str]) -> EngineResult<Self> {
        self.define_property_constructor(property_names)?;
        Ok(self)
    }

    /// Finalize the definition
    pub fn create_type(self, id: usize) -> CompiledType {
        tracing::trace!(
            type_name = %self.name,
            id,
            properties = self.properties.len(),
            constructors = self.constructors.len(),
            "finalizing type"
        );
        CompiledType(Arc::new(TypeDef {
            id,
            name: self.name,
            module: self.module,
            kind: self.kind,
            fields: self.fields,
            properties: self.properties,
            property_indices: self.property_indices,
            constructors: self.constructors,
        }))
    }
}
