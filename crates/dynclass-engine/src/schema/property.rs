//! Property descriptors

use serde::{Deserialize, Serialize};

use crate::object::PropertyInfo;
use crate::schema::AttributeDescriptor;
use crate::types::TypeRef;
use crate::value::Value;

/// One property to be materialized on a compiled type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name, unique (case-sensitive) within a schema
    pub name: String,
    /// Property type
    #[serde(rename = "type")]
    pub property_type: TypeRef,
    /// Value to populate instances with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Metadata attached to the property, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDescriptor>,
}

impl PropertyDescriptor {
    /// Create a descriptor with no value, description or attributes
    pub fn new(name: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            property_type,
            value: None,
            description: None,
            attributes: Vec::new(),
        }
    }

    /// Set the value
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an attribute
    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Build a descriptor from a property of a compiled type.
    ///
    /// Attached metadata is converted back into descriptors bound to their
    /// carrier types. The descriptor carries no value.
    pub fn from_reflected(property: &PropertyInfo) -> Self {
        Self {
            name: property.name().to_string(),
            property_type: property.property_type().clone(),
            value: None,
            description: property.description().map(str::to_string),
            attributes: property
                .attributes()
                .iter()
                .map(|attr| attr.to_descriptor())
                .collect(),
        }
    }

    /// Find the first attribute with the given label
    pub fn attribute(&self, label: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.label() == label)
    }
}
