//! Runtime Object Model
//!
//! Types defined at runtime are interpreted: a [`CompiledType`] holds a
//! name-indexed property table over private backing slots, and an
//! [`Instance`] is a slot vector bound to one type.
//!
//! - [`TypeBuilder`]: defines slots, properties and constructors
//! - [`CompiledType`]: immutable, shareable handle to a finished type
//! - [`Instance`]: named get/set over the slots
//! - [`AttributeInstance`]: metadata object attached to a property

mod builder;
mod class;
mod instance;

pub use builder::TypeBuilder;
pub use class::{CompiledType, ConstructorInfo, FieldSlot, ParameterInfo, PropertyInfo, TypeKind};
pub use instance::{AttributeInstance, Instance};

pub(crate) use instance::RESERVED_PREFIX;

pub(crate) use class::{describe_arguments, TypeDef};
