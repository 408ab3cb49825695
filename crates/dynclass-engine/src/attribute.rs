//! Attribute Synthesizer
//!
//! Turns an [`AttributeDescriptor`] into an [`AttributeInstance`] that can be
//! attached to a property.
//!
//! ## Carrier resolution
//!
//! 1. A descriptor bound to a carrier type uses it directly.
//! 2. Otherwise the label names the carrier. An existing carrier with that
//!    name in the working module is reused.
//! 3. Otherwise a carrier is defined: one property per value key, typed by
//!    the value's runtime type (`any` for null), a default constructor and a
//!    constructor taking every value in order. Keys starting with `__` are
//!    reserved for carrier internals and rejected. The name of the type
//!    being compiled is never available as a label.
//!
//! The carrier is then constructed with the constructor whose parameter
//! types match the values' runtime types positionally.

use crate::error::{EngineError, EngineResult};
use crate::module::WorkingModule;
use crate::object::{describe_arguments, AttributeInstance, CompiledType, TypeBuilder, RESERVED_PREFIX};
use crate::schema::AttributeDescriptor;
use crate::types::TypeRef;

/// Resolves carrier types and constructs metadata objects
pub struct AttributeSynthesizer<'m> {
    module: &'m mut WorkingModule,
    reserved_name: Option<String>,
}

impl<'m> AttributeSynthesizer<'m> {
    /// Create a synthesizer defining carriers into `module`
    pub fn new(module: &'m mut WorkingModule) -> Self {
        Self {
            module,
            reserved_name: None,
        }
    }

    /// Keep `name` free for a type defined after the attributes
    pub fn reserving(mut self, name: impl Into<String>) -> Self {
        self.reserved_name = Some(name.into());
        self
    }

    /// Build the metadata object described by `descriptor`
    pub fn synthesize(&mut self, descriptor: &AttributeDescriptor) -> EngineResult<AttributeInstance> {
        let carrier = self.resolve_carrier(descriptor)?;
        let values = descriptor.values();
        let arg_types = values.runtime_types();

        let ctor = carrier.find_constructor(&arg_types).ok_or_else(|| {
            tracing::debug!(carrier = %carrier.name(), "no constructor matches attribute values");
            EngineError::AttributeConstruction {
                carrier: carrier.name().to_string(),
                signature: describe_arguments(&arg_types),
            }
        })?;

        let instance = carrier
            .construct_with(ctor, values.values().cloned().collect())
            .map_err(|err| {
                tracing::debug!(carrier = %carrier.name(), error = %err, "attribute construction failed");
                EngineError::AttributeConstruction {
                    carrier: carrier.name().to_string(),
                    signature: describe_arguments(&arg_types),
                }
            })?;
        Ok(AttributeInstance::new(instance))
    }

    /// Find or define the carrier type for a descriptor
    pub fn resolve_carrier(&mut self, descriptor: &AttributeDescriptor) -> EngineResult<CompiledType> {
        if let Some(carrier) = descriptor.carrier_type() {
            return Ok(carrier.clone());
        }

        let label = descriptor.label();
        if label.is_empty() || self.reserved_name.as_deref() == Some(label) {
            return Err(EngineError::AttributeConstruction {
                carrier: String::new(),
                signature: describe_arguments(&descriptor.values().runtime_types()),
            });
        }

        match self.module.get(label) {
            Some(existing) if existing.is_attribute() => {
                tracing::debug!(carrier = %label, "reusing carrier type");
                Ok(existing.clone())
            }
            Some(_) => Err(EngineError::AttributeConstruction {
                carrier: label.to_string(),
                signature: describe_arguments(&descriptor.values().runtime_types()),
            }),
            None => self.define_carrier(descriptor),
        }
    }

    /// Define an ad hoc carrier shaped after the descriptor's values
    fn define_carrier(&mut self, descriptor: &AttributeDescriptor) -> EngineResult<CompiledType> {
        if let Some(key) = descriptor.values().keys().find(|k| k.starts_with(RESERVED_PREFIX)) {
            return Err(EngineError::ReservedAttributeKey {
                carrier: descriptor.label().to_string(),
                key: key.to_string(),
            });
        }

        let mut builder = TypeBuilder::attribute(descriptor.label());
        for (key, value) in descriptor.values().iter() {
            builder.define_auto_property(key, value.runtime_type().unwrap_or(TypeRef::Any))?;
        }

        builder.define_default_constructor();
        let keys: Vec<&str> = descriptor.values().keys().collect();
        if !keys.is_empty() {
            builder.define_property_constructor(&keys)?;
        }

        tracing::debug!(carrier = %descriptor.label(), fields = descriptor.values().len(), "defining carrier type");
        self.module.define_type(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn module() -> WorkingModule {
        WorkingModule::new("Test.MainModule", "1.0.0.1")
    }

    #[test]
    fn test_ad_hoc_carrier_binds_every_value() {
        let mut module = module();
        let descriptor = AttributeDescriptor::new("Display")
            .with_value("level", 3)
            .with_value("label", "x");

        let attr = AttributeSynthesizer::new(&mut module).synthesize(&descriptor).unwrap();

        assert_eq!(attr.label(), "Display");
        assert_eq!(attr.get("level"), Some(&Value::I32(3)));
        assert_eq!(attr.get("label"), Some(&Value::from("x")));
        assert!(module.get("Display").unwrap().is_attribute());
    }

    #[test]
    fn test_ad_hoc_carrier_is_reused() {
        let mut module = module();
        let first = AttributeDescriptor::new("Tag").with_value("name", "a");
        let second = AttributeDescriptor::new("Tag").with_value("name", "b");

        let mut synth = AttributeSynthesizer::new(&mut module);
        let a = synth.synthesize(&first).unwrap();
        let b = synth.synthesize(&second).unwrap();

        assert_eq!(a.carrier(), b.carrier());
        assert_eq!(b.get("name"), Some(&Value::from("b")));
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_reused_carrier_with_other_shape_fails() {
        let mut module = module();
        let mut synth = AttributeSynthesizer::new(&mut module);
        synth
            .synthesize(&AttributeDescriptor::new("Tag").with_value("name", "a"))
            .unwrap();

        let err = synth
            .synthesize(&AttributeDescriptor::new("Tag").with_value("name", 1))
            .unwrap_err();
        assert!(matches!(err, EngineError::AttributeConstruction { carrier, .. } if carrier == "Tag"));
    }

    #[test]
    fn test_null_value_becomes_any_parameter() {
        let mut module = module();
        let descriptor = AttributeDescriptor::new("Hint").with_value("text", Value::Null);

        let attr = AttributeSynthesizer::new(&mut module).synthesize(&descriptor).unwrap();

        let ctor = &attr.carrier().constructors()[1];
        assert_eq!(ctor.signature(), vec![TypeRef::Any]);
        assert_eq!(attr.get("text"), Some(&Value::Null));
    }

    #[test]
    fn test_existing_carrier_matches_constructor() {
        let range = TypeBuilder::attribute("Range")
            .with_property("min", TypeRef::I32)
            .unwrap()
            .with_property("max", TypeRef::I32)
            .unwrap()
            .with_constructor(&["min", "max"])
            .unwrap()
            .create_type(0);
        let mut module = module();
        let mut synth = AttributeSynthesizer::new(&mut module);

        let ok = AttributeDescriptor::for_carrier(&range)
            .unwrap()
            .with_value("min", 1)
            .with_value("max", 5);
        let attr = synth.synthesize(&ok).unwrap();
        assert_eq!(attr.get("max"), Some(&Value::I32(5)));

        let bad = AttributeDescriptor::for_carrier(&range)
            .unwrap()
            .with_value("min", "low");
        let err = synth.synthesize(&bad).unwrap_err();
        assert!(matches!(err, EngineError::AttributeConstruction { carrier, .. } if carrier == "Range"));
    }

    #[test]
    fn test_name_held_by_data_type() {
        let mut module = module();
        module.define_type(TypeBuilder::new("Person")).unwrap();

        let err = AttributeSynthesizer::new(&mut module)
            .synthesize(&AttributeDescriptor::new("Person"))
            .unwrap_err();
        assert!(matches!(err, EngineError::AttributeConstruction { .. }));
    }

    #[test]
    fn test_list_values_with_nulls_or_mixed_elements() {
        let mut module = module();
        let mut synth = AttributeSynthesizer::new(&mut module);

        let sparse = AttributeDescriptor::new("Hint").with_value("items", vec![Value::Null, Value::I32(1)]);
        let attr = synth.synthesize(&sparse).unwrap();
        assert_eq!(attr.get("items"), Some(&Value::List(vec![Value::Null, Value::I32(1)])));

        let mixed = AttributeDescriptor::new("Choices").with_value("items", vec![Value::I32(1), Value::from("x")]);
        let attr = synth.synthesize(&mixed).unwrap();
        assert_eq!(
            attr.carrier().property("items").unwrap().property_type(),
            &TypeRef::list(TypeRef::Any)
        );
    }

    #[test]
    fn test_bound_carrier_rejecting_value_is_construction_error() {
        let tags = TypeBuilder::attribute("Tags")
            .with_property("items", TypeRef::list(TypeRef::I32))
            .unwrap()
            .with_constructor(&["items"])
            .unwrap()
            .create_type(0);
        let mut module = module();

        let descriptor = AttributeDescriptor::for_carrier(&tags)
            .unwrap()
            .with_value("items", vec![Value::Null, Value::I32(1)]);
        let err = AttributeSynthesizer::new(&mut module).synthesize(&descriptor).unwrap_err();

        assert!(matches!(err, EngineError::AttributeConstruction { carrier, .. } if carrier == "Tags"));
    }

    #[test]
    fn test_reserved_name_is_not_a_label() {
        let mut module = module();
        let err = AttributeSynthesizer::new(&mut module)
            .reserving("Row")
            .synthesize(&AttributeDescriptor::new("Row").with_value("v", 1))
            .unwrap_err();

        assert!(matches!(err, EngineError::AttributeConstruction { carrier, .. } if carrier == "Row"));
        assert!(module.is_empty());
    }

    #[test]
    fn test_reserved_key_prefix() {
        let mut module = module();
        let descriptor = AttributeDescriptor::new("Tag").with_value("a", 1).with_value("__x", 2);

        let err = AttributeSynthesizer::new(&mut module).synthesize(&descriptor).unwrap_err();

        assert!(matches!(err, EngineError::ReservedAttributeKey { key, .. } if key == "__x"));
        assert!(module.is_empty());
    }

    #[test]
    fn test_empty_label() {
        let mut module = module();
        let err = AttributeSynthesizer::new(&mut module)
            .synthesize(&AttributeDescriptor::new(""))
            .unwrap_err();
        assert!(matches!(err, EngineError::AttributeConstruction { .. }));
        assert!(module.is_empty());
    }
}
