//! Property Schema Model
//!
//! Passive data describing the type to compile: an ordered list of
//! [`PropertyDescriptor`]s, each with optional [`AttributeDescriptor`]
//! metadata.
//!
//! ## Merge policy
//!
//! [`Schema::add_property`] is lenient:
//! - a new name is appended,
//! - an existing name with the same type has its value and attributes
//!   overwritten in place,
//! - an existing name with a different type leaves the schema unchanged.
//!
//! Deserializing a schema, or collecting one with [`Schema::try_from`], is
//! strict and rejects repeated names.

mod attribute;
mod property;

pub use attribute::{AttributeDescriptor, AttributeValues};
pub use property::PropertyDescriptor;

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Result of [`Schema::add_property`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The descriptor was appended
    Appended,
    /// An existing descriptor of the same type was overwritten in place
    Merged,
    /// An existing descriptor has a different type; nothing changed
    TypeMismatch,
}

/// Ordered sequence of property descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PropertyDescriptor>", into = "Vec<PropertyDescriptor>")]
pub struct Schema {
    properties: Vec<PropertyDescriptor>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a descriptor into the schema (see module docs for the policy)
    pub fn add_property(&mut self, descriptor: PropertyDescriptor) -> MergeOutcome {
        let Some(existing) = self
            .properties
            .iter_mut()
            .find(|p| p.name == descriptor.name)
        else {
            tracing::trace!(property = %descriptor.name, "appending property");
            self.properties.push(descriptor);
            return MergeOutcome::Appended;
        };

        if existing.property_type != descriptor.property_type {
            tracing::trace!(
                property = %descriptor.name,
                existing = %existing.property_type,
                incoming = %descriptor.property_type,
                "ignoring property with mismatched type"
            );
            return MergeOutcome::TypeMismatch;
        }

        tracing::trace!(property = %descriptor.name, "merging property");
        existing.value = descriptor.value;
        existing.attributes = descriptor.attributes;
        MergeOutcome::Merged
    }

    /// Builder-style [`add_property`](Self::add_property)
    pub fn with_property(mut self, descriptor: PropertyDescriptor) -> Self {
        self.add_property(descriptor);
        self
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Check if a descriptor with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Descriptors in order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Iterate descriptors in order
    pub fn iter(&self) -> std::slice::Iter<'_, PropertyDescriptor> {
        self.properties.iter()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the schema has no descriptors
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Append without the merge check. Callers guarantee the name is new.
    pub(crate) fn push_unchecked(&mut self, descriptor: PropertyDescriptor) {
        self.properties.push(descriptor);
    }

    /// Order descriptors by the value an attribute holds for `key`.
    ///
    /// Applies only when every descriptor carries an attribute labelled
    /// `label` and every attribute of every descriptor has `key`; otherwise
    /// the schema is left as is. The sort is stable.
    pub fn order_by_attribute(&mut self, label: &str, key: &str) {
        let applicable = self.properties.iter().all(|p| {
            p.attribute(label).is_some() && p.attributes.iter().all(|a| a.values().contains_key(key))
        });
        if !applicable {
            return;
        }

        self.properties.sort_by(|a, b| {
            let a = a.attribute(label).and_then(|attr| attr.values().get(key));
            let b = b.attribute(label).and_then(|attr| attr.values().get(key));
            match (a, b) {
                (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        });
    }

    /// Coerce every present value to its declared type.
    fn coerce_values(&mut self) -> EngineResult<()> {
        for property in &mut self.properties {
            let Some(value) = property.value.take() else {
                continue;
            };
            let got = value.type_name();
            property.value = Some(property.property_type.coerce(value).ok_or_else(|| {
                EngineError::mismatch(
                    format!("property '{}'", property.name),
                    &property.property_type,
                    got,
                )
            })?);
        }
        Ok(())
    }
}

impl TryFrom<Vec<PropertyDescriptor>> for Schema {
    type Error = EngineError;

    /// Strict conversion: repeated names fail with `DuplicateProperty`, and
    /// values are coerced to their declared types.
    fn try_from(properties: Vec<PropertyDescriptor>) -> EngineResult<Self> {
        let mut seen = FxHashSet::default();
        for property in &properties {
            if !seen.insert(property.name.as_str()) {
                return Err(EngineError::DuplicateProperty(property.name.clone()));
            }
        }
        let mut schema = Schema { properties };
        schema.coerce_values()?;
        Ok(schema)
    }
}

impl From<Schema> for Vec<PropertyDescriptor> {
    fn from(schema: Schema) -> Self {
        schema.properties
    }
}

impl FromIterator<PropertyDescriptor> for Schema {
    /// Lenient collection: descriptors are merged one by one.
    fn from_iter<I: IntoIterator<Item = PropertyDescriptor>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for descriptor in iter {
            schema.add_property(descriptor);
        }
        schema
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a PropertyDescriptor;
    type IntoIter = std::slice::Iter<'a, PropertyDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}
