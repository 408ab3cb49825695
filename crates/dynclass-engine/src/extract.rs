//! Schema Extractors
//!
//! Produce a [`Schema`] from something that already has a shape:
//!
//! - Rust structs implementing [`Describe`] (usually via `#[derive(Describe)]`)
//! - compiled types and their instances
//! - JSON objects and anything `Serialize`
//!
//! Type-level extraction lists properties without values; object-level
//! extraction also records each property's current value.

use serde::Serialize;

use crate::error::EngineResult;
use crate::object::{CompiledType, Instance};
use crate::schema::{PropertyDescriptor, Schema};
use crate::types::TypeRef;
use crate::value::Value;

/// Types that can list their public properties.
///
/// Derive it with `#[derive(Describe)]`. Field options:
///
/// - `#[describe(rename = "Name")]` exposes the field under another name
/// - `#[describe(description = "...")]` sets the property description
/// - `#[describe(skip)]` leaves the field out
/// - `#[attribute(Label, key = 1, other = "x")]` attaches ad hoc metadata
pub trait Describe {
    /// Properties of the type, without values
    fn describe() -> Vec<PropertyDescriptor>;

    /// Properties of this value, with values
    fn to_properties(&self) -> Vec<PropertyDescriptor>;
}

/// Schema of a [`Describe`] type (no values)
pub fn schema_of_type<T: Describe>() -> Schema {
    T::describe().into_iter().collect()
}

/// Schema of a [`Describe`] value (with values)
pub fn schema_of_object<T: Describe>(value: &T) -> Schema {
    value.to_properties().into_iter().collect()
}

/// Schema of a compiled type's public properties and their metadata
pub fn schema_of_compiled(ty: &CompiledType) -> Schema {
    ty.properties()
        .iter()
        .map(PropertyDescriptor::from_reflected)
        .collect()
}

/// Schema of an instance, with its current values
pub fn schema_of_instance(instance: &Instance) -> Schema {
    instance
        .compiled_type()
        .properties()
        .iter()
        .zip(instance.values())
        .map(|(property, value)| PropertyDescriptor::from_reflected(property).with_value(value.clone()))
        .collect()
}

/// Schema of a JSON object: one property per key, typed by its value.
///
/// Nulls become `any`; lists of mixed element types become `list<any>`;
/// nested objects are kept as their JSON text.
pub fn schema_of_json(json: &serde_json::Value) -> EngineResult<Schema> {
    let Some(object) = json.as_object() else {
        let err: serde_json::Error =
            serde::de::Error::custom(format!("expected a JSON object, found {}", json_kind(json)));
        return Err(err.into());
    };

    Ok(object
        .iter()
        .map(|(key, value)| {
            let value = Value::from(value);
            let property_type = value.runtime_type().unwrap_or(TypeRef::Any);
            PropertyDescriptor::new(key.clone(), property_type).with_value(value)
        })
        .collect())
}

/// Schema of any serializable value that serializes to a JSON object
pub fn schema_of_serialize<T: Serialize + ?Sized>(value: &T) -> EngineResult<Schema> {
    schema_of_json(&serde_json::to_value(value)?)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::object::TypeBuilder;
    use serde_json::json;

    #[test]
    fn test_json_types() {
        let schema = schema_of_json(&json!({
            "Age": 30,
            "Big": 5_000_000_000i64,
            "Ratio": 0.5,
            "Name": "Ann",
            "Alive": true,
            "Nick": null,
            "Tags": ["a", "b"],
            "Mixed": [1, "x"]
        }))
        .unwrap();

        let ty = |name: &str| schema.get(name).unwrap().property_type.clone();
        assert_eq!(ty("Age"), TypeRef::I32);
        assert_eq!(ty("Big"), TypeRef::I64);
        assert_eq!(ty("Ratio"), TypeRef::F64);
        assert_eq!(ty("Name"), TypeRef::String);
        assert_eq!(ty("Alive"), TypeRef::Bool);
        assert_eq!(ty("Nick"), TypeRef::Any);
        assert_eq!(ty("Tags"), TypeRef::list(TypeRef::String));
        assert_eq!(ty("Mixed"), TypeRef::list(TypeRef::Any));
        assert_eq!(schema.get("Age").unwrap().value, Some(Value::I32(30)));
    }

    #[test]
    fn test_json_must_be_object() {
        let err = schema_of_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_serialize() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let schema = schema_of_serialize(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("y").unwrap().value, Some(Value::I32(2)));
    }

    #[test]
    fn test_compiled_and_instance() {
        let ty = TypeBuilder::new("Row")
            .with_property("Id", TypeRef::I32)
            .unwrap()
            .with_default_constructor()
            .create_type(0);
        let mut row = ty.create_instance().unwrap();
        row.set("Id", 12).unwrap();

        let type_schema = schema_of_compiled(&ty);
        assert_eq!(type_schema.get("Id").unwrap().value, None);

        let object_schema = schema_of_instance(&row);
        assert_eq!(object_schema.get("Id").unwrap().value, Some(Value::I32(12)));
    }
}
