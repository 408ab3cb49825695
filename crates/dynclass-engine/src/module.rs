//! Working Module
//!
//! Registry of the types a builder has defined so far: synthesized carrier
//! types and the compiled type itself. Each builder owns one module; there
//! is no process-wide registry.
//!
//! Type IDs are allocated sequentially and never reused within a module.

use rustc_hash::FxHashMap;

use crate::error::{EngineError, EngineResult};
use crate::object::{CompiledType, TypeBuilder};

/// Registry of runtime-defined types
#[derive(Debug, Clone)]
pub struct WorkingModule {
    /// Module name
    name: String,
    /// Module version
    version: String,
    /// Types by ID, in definition order
    types: Vec<CompiledType>,
    /// Type name to position in `types`
    type_names: FxHashMap<String, usize>,
    /// Next type ID to allocate
    next_type_id: usize,
}

impl WorkingModule {
    /// Create an empty module
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            types: Vec::new(),
            type_names: FxHashMap::default(),
            next_type_id: 0,
        }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Finalize a type definition and register it.
    ///
    /// Fails with `DuplicateType` if the name is taken.
    pub fn define_type(&mut self, builder: TypeBuilder) -> EngineResult<CompiledType> {
        if self.type_names.contains_key(builder.name()) {
            return Err(EngineError::DuplicateType(builder.name().to_string()));
        }

        let id = self.next_type_id;
        self.next_type_id += 1;

        let ty = builder.in_module(self.name.clone()).create_type(id);
        tracing::debug!(module = %self.name, type_name = %ty.name(), id, kind = ?ty.kind(), "defined type");

        self.type_names.insert(ty.name().to_string(), self.types.len());
        self.types.push(ty.clone());
        Ok(ty)
    }

    /// Get a type by name
    pub fn get(&self, name: &str) -> Option<&CompiledType> {
        self.type_names.get(name).map(|&i| &self.types[i])
    }

    /// Check if a type with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.type_names.contains_key(name)
    }

    /// Types in definition order
    pub fn types(&self) -> &[CompiledType] {
        &self.types
    }

    /// Metadata carrier types in definition order
    pub fn carriers(&self) -> impl Iterator<Item = &CompiledType> {
        self.types.iter().filter(|t| t.is_attribute())
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are defined
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    #[test]
    fn test_define_and_lookup() {
        let mut module = WorkingModule::new("Test.MainModule", "1.0.0.1");
        let carrier = module.define_type(TypeBuilder::attribute("Tag")).unwrap();
        let data = module
            .define_type(TypeBuilder::new("Row").with_property("Id", TypeRef::I32).unwrap())
            .unwrap();

        assert_eq!(carrier.id(), 0);
        assert_eq!(data.id(), 1);
        assert_eq!(data.module_name(), "Test.MainModule");
        assert_eq!(module.get("Tag"), Some(&carrier));
        assert_eq!(module.len(), 2);
        assert_eq!(module.carriers().count(), 1);
    }

    #[test]
    fn test_duplicate_type() {
        let mut module = WorkingModule::new("Test.MainModule", "1.0.0.1");
        module.define_type(TypeBuilder::attribute("Tag")).unwrap();

        let err = module.define_type(TypeBuilder::new("Tag")).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateType(name) if name == "Tag"));
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_staged_copy_is_independent() {
        let mut module = WorkingModule::new("Test.MainModule", "1.0.0.1");
        let mut staged = module.clone();
        staged.define_type(TypeBuilder::attribute("Tag")).unwrap();

        assert!(staged.contains("Tag"));
        assert!(!module.contains("Tag"));
        module.define_type(TypeBuilder::attribute("Other")).unwrap();
        assert_eq!(module.get("Other").unwrap().id(), 0);
    }
}
