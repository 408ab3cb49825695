//! Compiled type definitions
//!
//! A [`CompiledType`] is the finalized, immutable definition produced by a
//! [`TypeBuilder`](super::TypeBuilder): private backing slots, public
//! properties bound to those slots, and constructors. Handles are cheap to
//! clone and compare by identity.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{EngineError, EngineResult};
use crate::object::{AttributeInstance, Instance};
use crate::types::{format_signature, TypeRef};
use crate::value::Value;

/// What a compiled type is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Plain data type with get/set properties
    Data,
    /// Metadata carrier that can be attached to properties
    Attribute,
}

/// Private backing slot
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub(crate) name: String,
    pub(crate) field_type: TypeRef,
    pub(crate) index: usize,
}

impl FieldSlot {
    /// Slot name (`_<property>` for generated slots)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot type
    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }

    /// Slot index within an instance
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Public property bound to a backing slot
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub(crate) name: String,
    pub(crate) property_type: TypeRef,
    pub(crate) slot: usize,
    pub(crate) description: Option<String>,
    pub(crate) attributes: Vec<AttributeInstance>,
    pub(crate) writable: bool,
}

impl PropertyInfo {
    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property type
    pub fn property_type(&self) -> &TypeRef {
        &self.property_type
    }

    /// Index of the backing slot
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Description carried over from the schema
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Attached metadata, in declaration order
    pub fn attributes(&self) -> &[AttributeInstance] {
        &self.attributes
    }

    /// First attached metadata whose carrier has the given name
    pub fn attribute(&self, label: &str) -> Option<&AttributeInstance> {
        self.attributes.iter().find(|a| a.label() == label)
    }

    /// Whether the property has a setter
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// Constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub(crate) name: String,
    pub(crate) param_type: TypeRef,
    pub(crate) index: usize,
}

impl ParameterInfo {
    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type
    pub fn param_type(&self) -> &TypeRef {
        &self.param_type
    }

    /// Position in the parameter list
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Constructor: positional parameters, each stored into a slot
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInfo {
    pub(crate) parameters: Vec<ParameterInfo>,
    /// Slot receiving each parameter, by position
    pub(crate) bindings: Vec<usize>,
}

impl ConstructorInfo {
    /// Parameters in order
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Slot bound to each parameter
    pub fn bindings(&self) -> &[usize] {
        &self.bindings
    }

    /// Parameter types in order
    pub fn signature(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.param_type.clone()).collect()
    }

    /// Check whether arguments of the given runtime types bind positionally.
    ///
    /// Types must match exactly (an `any` parameter or an optional of the
    /// argument's type also matches); a `None` (null argument) matches any
    /// parameter type that accepts null.
    pub fn matches(&self, arg_types: &[Option<TypeRef>]) -> bool {
        self.parameters.len() == arg_types.len()
            && self
                .parameters
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| match (&param.param_type, arg) {
                    (TypeRef::Any, _) => true,
                    (TypeRef::Optional(inner), Some(ty)) => **inner == *ty,
                    (param_type, Some(ty)) => param_type == ty,
                    (param_type, None) => param_type.is_nullable(),
                })
    }
}

/// Type definition behind a [`CompiledType`] handle
#[derive(Debug)]
pub(crate) struct TypeDef {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) module: String,
    pub(crate) kind: TypeKind,
    pub(crate) fields: Vec<FieldSlot>,
    pub(crate) properties: Vec<PropertyInfo>,
    pub(crate) property_indices: FxHashMap<String, usize>,
    pub(crate) constructors: Vec<ConstructorInfo>,
}

/// Handle to a finalized type
#[derive(Clone)]
pub struct CompiledType(pub(crate) Arc<TypeDef>);

impl CompiledType {
    /// Type ID, unique within its working module
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Name of the working module that defined the type
    pub fn module_name(&self) -> &str {
        &self.0.module
    }

    /// Type kind
    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    /// Check if this is a metadata carrier
    pub fn is_attribute(&self) -> bool {
        self.0.kind == TypeKind::Attribute
    }

    /// Backing slots in order
    pub fn fields(&self) -> &[FieldSlot] {
        &self.0.fields
    }

    /// Public properties in declaration order
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.0.properties
    }

    /// Get a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.property_index(name).map(|i| &self.0.properties[i])
    }

    /// Get a property's declaration index by name
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.0.property_indices.get(name).copied()
    }

    /// Check if a property exists
    pub fn has_property(&self, name: &str) -> bool {
        self.0.property_indices.contains_key(name)
    }

    /// Constructors in declaration order
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.0.constructors
    }

    /// Find a constructor accepting arguments of the given runtime types
    pub fn find_constructor(&self, arg_types: &[Option<TypeRef>]) -> Option<&ConstructorInfo> {
        self.0.constructors.iter().find(|c| c.matches(arg_types))
    }

    /// Check if two handles refer to the same definition
    pub fn ptr_eq(&self, other: &CompiledType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Create an instance with the parameterless constructor
    pub fn create_instance(&self) -> EngineResult<Instance> {
        self.construct(Vec::new())
    }

    /// Create an instance with the constructor matching the argument types
    pub fn construct(&self, args: Vec<Value>) -> EngineResult<Instance> {
        let arg_types: Vec<_> = args.iter().map(Value::runtime_type).collect();
        let ctor = self.find_constructor(&arg_types).ok_or_else(|| {
            EngineError::NoMatchingConstructor {
                type_name: self.name().to_string(),
                signature: describe_arguments(&arg_types),
            }
        })?;
        self.construct_with(ctor, args)
    }

    /// Create an instance with a specific constructor.
    ///
    /// Slots start at their type's default; each argument is then stored
    /// into the slot bound to its parameter.
    pub fn construct_with(&self, ctor: &ConstructorInfo, args: Vec<Value>) -> EngineResult<Instance> {
        if ctor.parameters.len() != args.len() {
            return Err(EngineError::ArgumentCount {
                type_name: self.name().to_string(),
                expected: ctor.parameters.len(),
                got: args.len(),
            });
        }

        let mut slots: Vec<Value> = self
            .0
            .fields
            .iter()
            .map(|f| f.field_type.default_value())
            .collect();

        for ((param, &slot), arg) in ctor.parameters.iter().zip(&ctor.bindings).zip(args) {
            if !param.param_type.accepts(&arg) {
                return Err(EngineError::mismatch(
                    format!("parameter '{}' of {}", param.name, self.name()),
                    &param.param_type,
                    arg.type_name(),
                ));
            }
            slots[slot] = arg;
        }

        Ok(Instance::from_slots(self.clone(), slots))
    }
}

/// Render argument runtime types for error messages
pub(crate) fn describe_arguments(arg_types: &[Option<TypeRef>]) -> String {
    let types: Vec<TypeRef> = arg_types
        .iter()
        .map(|t| t.clone().unwrap_or(TypeRef::Any))
        .collect();
    format_signature(&types)
}

impl PartialEq for CompiledType {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for CompiledType {}

impl fmt::Debug for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledType")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field(
                "properties",
                &self.0.properties.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}
