//! Builder
//!
//! The engine instance. A [`Builder`] owns a [`Schema`], a working module and
//! at most one compiled type. The type is compiled on first demand and
//! cached; from then on the schema is frozen.
//!
//! ```ignore
//! let mut builder = Builder::new();
//! builder.add_property(PropertyDescriptor::new("Id", TypeRef::I32).with_value(7))?;
//! let row = builder.instance(true)?;
//! assert_eq!(row.get("Id")?, &Value::I32(7));
//! ```
//!
//! [`SharedBuilder`] wraps a builder for use from several threads.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::compiler::TypeCompiler;
use crate::error::{EngineError, EngineResult};
use crate::extract::{self, Describe};
use crate::factory::{InstanceFactory, TypedList};
use crate::module::WorkingModule;
use crate::object::{CompiledType, Instance, PropertyInfo};
use crate::schema::{MergeOutcome, PropertyDescriptor, Schema};

/// Default name of the compiled type
pub const DEFAULT_TYPE_NAME: &str = "DynamicType";

/// Default working module version
pub const DEFAULT_VERSION: &str = "1.0.0.1";

/// Options for creating a [`Builder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Name of the compiled type
    pub type_name: String,

    /// Working module name; `<type_name>.MainModule` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    /// Working module version
    pub version: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            type_name: DEFAULT_TYPE_NAME.to_string(),
            module_name: None,
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl BuilderOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compiled type's name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Set the working module's name
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    /// Set the working module's version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Working module name, derived from the type name when unset
    pub fn effective_module_name(&self) -> String {
        self.module_name
            .clone()
            .unwrap_or_else(|| format!("{}.MainModule", self.type_name))
    }
}

/// Schema-driven type compiler and object factory
#[derive(Debug)]
pub struct Builder {
    options: BuilderOptions,
    schema: Schema,
    module: WorkingModule,
    compiled: Option<CompiledType>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Create a builder with an empty schema and default options
    pub fn new() -> Self {
        Self::with_options(BuilderOptions::default())
    }

    /// Create a builder with an empty schema
    pub fn with_options(options: BuilderOptions) -> Self {
        let module = WorkingModule::new(options.effective_module_name(), options.version.clone());
        tracing::debug!(type_name = %options.type_name, module = %module.name(), "created builder");
        Self {
            options,
            schema: Schema::new(),
            module,
            compiled: None,
        }
    }

    /// Create a builder over an existing schema
    pub fn from_schema(schema: Schema) -> Self {
        Self::from_schema_with_options(schema, BuilderOptions::default())
    }

    /// Create a builder over an existing schema with options
    pub fn from_schema_with_options(schema: Schema, options: BuilderOptions) -> Self {
        let mut builder = Self::with_options(options);
        builder.schema = schema;
        builder
    }

    /// Create a builder whose schema lists the properties of `T`
    pub fn from_type<T: Describe>() -> Self {
        Self::from_schema(extract::schema_of_type::<T>())
    }

    /// Create a builder whose schema lists the properties and values of `value`
    pub fn from_object<T: Describe>(value: &T) -> Self {
        Self::from_schema(extract::schema_of_object(value))
    }

    /// Get the options
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get the working module
    pub fn module(&self) -> &WorkingModule {
        &self.module
    }

    /// The compiled type, if compilation has happened
    pub fn compiled_type(&self) -> Option<&CompiledType> {
        self.compiled.as_ref()
    }

    /// Check if the type has been compiled
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    fn ensure_mutable(&self) -> EngineResult<()> {
        match &self.compiled {
            Some(ty) => Err(EngineError::SchemaFrozen(ty.name().to_string())),
            None => Ok(()),
        }
    }

    /// Merge a descriptor into the schema.
    ///
    /// Fails with `SchemaFrozen` once compiled; otherwise follows the
    /// lenient merge policy of [`Schema::add_property`].
    pub fn add_property(&mut self, descriptor: PropertyDescriptor) -> EngineResult<MergeOutcome> {
        self.ensure_mutable()?;
        Ok(self.schema.add_property(descriptor))
    }

    /// Append a property copied from an already compiled type.
    ///
    /// Fails with `SchemaFrozen` once compiled and with `DuplicateProperty`
    /// if the name is already in the schema.
    pub fn add_reflected_property(&mut self, property: &PropertyInfo) -> EngineResult<()> {
        self.ensure_mutable()?;
        if self.schema.contains(property.name()) {
            return Err(EngineError::DuplicateProperty(property.name().to_string()));
        }
        self.schema.push_unchecked(PropertyDescriptor::from_reflected(property));
        Ok(())
    }

    /// Compile the schema, or return the cached type
    pub fn compile(&mut self) -> EngineResult<CompiledType> {
        if let Some(ty) = &self.compiled {
            return Ok(ty.clone());
        }

        let ty = TypeCompiler::new(&mut self.module).compile(&self.schema, &self.options.type_name)?;
        self.compiled = Some(ty.clone());
        Ok(ty)
    }

    /// Create an instance of the compiled type.
    ///
    /// If nothing is compiled yet, `schema` becomes the builder's schema and
    /// is compiled. With `populate`, every value in `schema` is copied into
    /// the property of the same name.
    pub fn create_instance(&mut self, schema: Option<&Schema>, populate: bool) -> EngineResult<Instance> {
        let schema = match schema {
            Some(schema) if !schema.is_empty() => schema,
            _ => return Err(EngineError::SchemaEmpty),
        };

        if !self.is_compiled() {
            self.schema = schema.clone();
        }
        let ty = self.compile()?;
        InstanceFactory::create(&ty, schema, populate)
    }

    /// Create an instance populated from the builder's own schema
    pub fn instance(&mut self, populate: bool) -> EngineResult<Instance> {
        if self.schema.is_empty() {
            return Err(EngineError::SchemaEmpty);
        }
        let ty = self.compile()?;
        InstanceFactory::create(&ty, &self.schema, populate)
    }

    /// Create a list of compiled-type instances holding `initial` in order
    pub fn create_ordered_collection<I>(&mut self, initial: I) -> EngineResult<TypedList>
    where
        I: IntoIterator<Item = Instance>,
    {
        let ty = self.compile()?;
        InstanceFactory::instance_collection(&ty, initial)
    }
}

/// Builder shared between threads.
///
/// Every operation holds the lock for its whole duration, so the
/// compile-once check and the cache write happen atomically.
#[derive(Debug, Clone, Default)]
pub struct SharedBuilder {
    inner: Arc<Mutex<Builder>>,
}

impl SharedBuilder {
    /// Wrap a builder
    pub fn new(builder: Builder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(builder)),
        }
    }

    /// Run `f` with exclusive access to the builder
    pub fn with<R>(&self, f: impl FnOnce(&mut Builder) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// See [`Builder::add_property`]
    pub fn add_property(&self, descriptor: PropertyDescriptor) -> EngineResult<MergeOutcome> {
        self.inner.lock().add_property(descriptor)
    }

    /// See [`Builder::compile`]
    pub fn compile(&self) -> EngineResult<CompiledType> {
        self.inner.lock().compile()
    }

    /// See [`Builder::compiled_type`]
    pub fn compiled_type(&self) -> Option<CompiledType> {
        self.inner.lock().compiled_type().cloned()
    }

    /// See [`Builder::create_instance`]
    pub fn create_instance(&self, schema: Option<&Schema>, populate: bool) -> EngineResult<Instance> {
        self.inner.lock().create_instance(schema, populate)
    }

    /// See [`Builder::instance`]
    pub fn instance(&self, populate: bool) -> EngineResult<Instance> {
        self.inner.lock().instance(populate)
    }
}

impl From<Builder> for SharedBuilder {
    fn from(builder: Builder) -> Self {
        Self::new(builder)
    }
}
