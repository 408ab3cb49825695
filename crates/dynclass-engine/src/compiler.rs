//! Type Compiler
//!
//! Turns a [`Schema`] into a [`CompiledType`]. For each descriptor, in
//! schema order, the compiler reserves a `_<name>` backing slot, defines a
//! read/write property over it and attaches one metadata object per
//! attribute descriptor. The type gets a public default constructor and is
//! registered in the working module.
//!
//! Compilation is transactional: it runs against a staged copy of the
//! module, which replaces the original only on success.

use crate::attribute::AttributeSynthesizer;
use crate::error::{EngineError, EngineResult};
use crate::module::WorkingModule;
use crate::object::{CompiledType, TypeBuilder};
use crate::schema::Schema;

/// Schema-to-type compiler
pub struct TypeCompiler<'m> {
    module: &'m mut WorkingModule,
}

impl<'m> TypeCompiler<'m> {
    /// Create a compiler registering types into `module`
    pub fn new(module: &'m mut WorkingModule) -> Self {
        Self { module }
    }

    /// Compile a schema into a type named `type_name`
    pub fn compile(&mut self, schema: &Schema, type_name: &str) -> EngineResult<CompiledType> {
        if schema.is_empty() {
            return Err(EngineError::SchemaEmpty);
        }

        tracing::debug!(type_name, properties = schema.len(), "compiling type");

        let mut staged = self.module.clone();
        let compiled = Self::compile_into(&mut staged, schema, type_name)?;
        *self.module = staged;

        tracing::debug!(type_name, id = compiled.id(), "compiled type");
        Ok(compiled)
    }

    fn compile_into(
        module: &mut WorkingModule,
        schema: &Schema,
        type_name: &str,
    ) -> EngineResult<CompiledType> {
        let mut builder = TypeBuilder::new(type_name);

        for descriptor in schema {
            let property = builder.define_auto_property(&descriptor.name, descriptor.property_type.clone())?;
            builder.set_property_description(property, descriptor.description.clone());

            let mut synthesizer = AttributeSynthesizer::new(module).reserving(type_name);
            for attribute in &descriptor.attributes {
                let instance = synthesizer.synthesize(attribute)?;
                builder.add_property_attribute(property, instance);
            }
        }

        builder.define_default_constructor();
        module.define_type(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDescriptor, PropertyDescriptor};
    use crate::types::TypeRef;
    use crate::value::Value;

    fn module() -> WorkingModule {
        WorkingModule::new("Test.MainModule", "1.0.0.1")
    }

    #[test]
    fn test_compile_properties_in_order() {
        let schema = Schema::new()
            .with_property(PropertyDescriptor::new("Id", TypeRef::I32).with_description("key"))
            .with_property(PropertyDescriptor::new("Name", TypeRef::String))
            .with_property(PropertyDescriptor::new("Tags", TypeRef::list(TypeRef::String)));
        let mut module = module();

        let ty = TypeCompiler::new(&mut module).compile(&schema, "Row").unwrap();

        let names: Vec<_> = ty.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Id", "Name", "Tags"]);
        let slots: Vec<_> = ty.fields().iter().map(|f| f.name()).collect();
        assert_eq!(slots, vec!["_Id", "_Name", "_Tags"]);
        assert_eq!(ty.property("Id").unwrap().description(), Some("key"));
        assert_eq!(ty.constructors().len(), 1);
        assert_eq!(module.get("Row"), Some(&ty));
    }

    #[test]
    fn test_compile_attaches_attributes() {
        let schema = Schema::new().with_property(
            PropertyDescriptor::new("Level", TypeRef::I32)
                .with_attribute(AttributeDescriptor::new("Display").with_value("order", 2))
                .with_attribute(AttributeDescriptor::new("Required")),
        );
        let mut module = module();

        let ty = TypeCompiler::new(&mut module).compile(&schema, "Row").unwrap();

        let level = ty.property("Level").unwrap();
        assert_eq!(level.attributes().len(), 2);
        assert_eq!(
            level.attribute("Display").unwrap().get("order"),
            Some(&Value::I32(2))
        );
        assert!(level.attribute("Required").is_some());
        assert_eq!(module.carriers().count(), 2);
    }

    #[test]
    fn test_empty_schema() {
        let mut module = module();
        let err = TypeCompiler::new(&mut module)
            .compile(&Schema::new(), "Row")
            .unwrap_err();
        assert!(matches!(err, EngineError::SchemaEmpty));
    }

    #[test]
    fn test_duplicate_in_hand_built_schema() {
        let mut schema = Schema::new();
        schema.push_unchecked(PropertyDescriptor::new("A", TypeRef::I32));
        schema.push_unchecked(PropertyDescriptor::new("A", TypeRef::I32));
        let mut module = module();

        let err = TypeCompiler::new(&mut module).compile(&schema, "Row").unwrap_err();
        assert!(matches!(err, EngineError::DuplicateProperty(name) if name == "A"));
    }

    #[test]
    fn test_attribute_named_like_the_type() {
        let schema = Schema::new().with_property(
            PropertyDescriptor::new("A", TypeRef::I32)
                .with_attribute(AttributeDescriptor::new("Row").with_value("v", 1)),
        );
        let mut module = module();

        let err = TypeCompiler::new(&mut module).compile(&schema, "Row").unwrap_err();

        assert!(matches!(err, EngineError::AttributeConstruction { carrier, .. } if carrier == "Row"));
        assert!(module.is_empty());
    }

    #[test]
    fn test_failed_compile_leaves_module_untouched() {
        let schema = Schema::new()
            .with_property(
                PropertyDescriptor::new("A", TypeRef::I32)
                    .with_attribute(AttributeDescriptor::new("Tag").with_value("v", 1)),
            )
            .with_property(
                PropertyDescriptor::new("B", TypeRef::I32)
                    .with_attribute(AttributeDescriptor::new("Tag").with_value("v", "x")),
            );
        let mut module = module();

        let err = TypeCompiler::new(&mut module).compile(&schema, "Row").unwrap_err();

        assert!(matches!(err, EngineError::AttributeConstruction { .. }));
        assert!(module.is_empty());
    }
}
