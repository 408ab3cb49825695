//! Dynclass Engine - runtime schema-driven types
//!
//! Given an ordered set of named, typed property descriptors (optionally
//! annotated with metadata), the engine compiles a new type at runtime,
//! creates and populates instances of it, and derives schemas from existing
//! types, objects and JSON.
//!
//! # Example
//!
//! ```ignore
//! use dynclass_engine::{AttributeDescriptor, Builder, PropertyDescriptor, TypeRef};
//!
//! let mut builder = Builder::new();
//! builder.add_property(
//!     PropertyDescriptor::new("Level", TypeRef::I32)
//!         .with_value(3)
//!         .with_attribute(AttributeDescriptor::new("Display").with_value("order", 1)),
//! )?;
//!
//! let row = builder.instance(true)?;
//! let level = row.compiled_type().property("Level").unwrap();
//! assert_eq!(level.attribute("Display").unwrap().get("order"), Some(&1.into()));
//! ```
//!
//! # Modules
//!
//! - [`schema`]: property and attribute descriptors
//! - [`object`]: compiled types, instances and metadata objects
//! - [`compiler`], [`attribute`]: schema to type
//! - [`factory`]: instance creation and typed lists
//! - [`builder`]: the engine facade
//! - [`extract`]: schemas from Rust types, compiled types and JSON

#![warn(missing_docs)]

// Lets `#[derive(Describe)]` refer to `::dynclass_engine` inside this crate
extern crate self as dynclass_engine;

pub mod attribute;
pub mod builder;
pub mod compiler;
pub mod convert;
pub mod error;
pub mod extract;
pub mod factory;
pub mod module;
pub mod object;
pub mod schema;
pub mod types;
pub mod value;

pub use attribute::AttributeSynthesizer;
pub use builder::{Builder, BuilderOptions, SharedBuilder};
pub use compiler::TypeCompiler;
pub use convert::{FromValue, StaticType, ToValue};
pub use error::{EngineError, EngineResult};
pub use extract::Describe;
pub use factory::{InstanceFactory, TypedList};
pub use module::WorkingModule;
pub use object::{AttributeInstance, CompiledType, Instance, PropertyInfo, TypeBuilder, TypeKind};
pub use schema::{AttributeDescriptor, AttributeValues, MergeOutcome, PropertyDescriptor, Schema};
pub use types::TypeRef;
pub use value::Value;

/// Derive [`Describe`] for a struct with named fields
pub use dynclass_derive::Describe;
