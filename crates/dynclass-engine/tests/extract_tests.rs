//! Tests for schema extraction
//!
//! Tests cover:
//! - #[derive(Describe)] field options and metadata
//! - Builders created from Rust types and objects
//! - JSON extraction feeding compilation
//! - Re-extracting compiled types

use dynclass_engine::extract::{
    schema_of_compiled, schema_of_instance, schema_of_json, schema_of_object, schema_of_serialize,
    schema_of_type,
};
use dynclass_engine::{Builder, Describe, EngineError, TypeRef, Value};
use serde::Serialize;
use serde_json::json;

#[derive(Describe, Serialize)]
struct Person {
    #[describe(rename = "Name", description = "Full name")]
    name: String,
    #[attribute(Range, min = 0, max = 150)]
    #[attribute(Display, order = 2)]
    age: i32,
    nickname: Option<String>,
    tags: Vec<String>,
    #[describe(skip)]
    cache: Vec<u8>,
}

fn ann() -> Person {
    Person {
        name: "Ann".to_string(),
        age: 30,
        nickname: None,
        tags: vec!["admin".to_string()],
        cache: Vec::new(),
    }
}

// =============================================================================
// DERIVE
// =============================================================================

mod derived {
    use super::*;

    #[test]
    fn test_type_level_schema() {
        let schema = schema_of_type::<Person>();

        let names: Vec<_> = schema.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "age", "nickname", "tags"]);
        assert!(schema.iter().all(|p| p.value.is_none()));

        assert_eq!(schema.get("Name").unwrap().description.as_deref(), Some("Full name"));
        assert_eq!(
            schema.get("nickname").unwrap().property_type,
            TypeRef::optional(TypeRef::String)
        );
        assert_eq!(
            schema.get("tags").unwrap().property_type,
            TypeRef::list(TypeRef::String)
        );
    }

    #[test]
    fn test_field_metadata() {
        let schema = schema_of_type::<Person>();
        let age = schema.get("age").unwrap();

        assert_eq!(age.attributes.len(), 2);
        let range = age.attribute("Range").unwrap();
        assert_eq!(range.values().keys().collect::<Vec<_>>(), vec!["min", "max"]);
        assert_eq!(range.values().get("max"), Some(&Value::I32(150)));
        assert!(range.carrier_type().is_none());
    }

    #[test]
    fn test_object_level_schema() {
        let schema = schema_of_object(&ann());

        assert_eq!(schema.get("Name").unwrap().value, Some(Value::from("Ann")));
        assert_eq!(schema.get("age").unwrap().value, Some(Value::I32(30)));
        assert_eq!(schema.get("nickname").unwrap().value, Some(Value::Null));
        assert_eq!(
            schema.get("tags").unwrap().value,
            Some(Value::List(vec![Value::from("admin")]))
        );
    }
}

// =============================================================================
// BUILDERS FROM EXISTING SHAPES
// =============================================================================

mod builders {
    use super::*;

    #[test]
    fn test_builder_from_type() {
        let mut builder = Builder::from_type::<Person>();
        let row = builder.instance(true).unwrap();

        assert_eq!(row.get("age").unwrap(), &Value::I32(0));
        let age = row.compiled_type().property("age").unwrap();
        assert_eq!(age.attribute("Range").unwrap().get("min"), Some(&Value::I32(0)));
        assert_eq!(age.attribute("Display").unwrap().get("order"), Some(&Value::I32(2)));
    }

    #[test]
    fn test_builder_from_object() {
        let mut builder = Builder::from_object(&ann());
        let row = builder.instance(true).unwrap();

        assert_eq!(row.get("Name").unwrap(), &Value::from("Ann"));
        assert_eq!(row.get("nickname").unwrap(), &Value::Null);
    }

    #[test]
    fn test_json_extract_compile_populate() {
        let schema = schema_of_json(&json!({ "Age": 30 })).unwrap();
        let mut builder = Builder::new();

        let row = builder.create_instance(Some(&schema), true).unwrap();

        assert_eq!(row.get("Age").unwrap(), &Value::I32(30));
    }

    #[test]
    fn test_serialize_extract_keeps_field_order() {
        let schema = schema_of_serialize(&ann()).unwrap();

        let names: Vec<_> = schema.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "nickname", "tags", "cache"]);
        assert_eq!(schema.get("nickname").unwrap().property_type, TypeRef::Any);
        assert_eq!(schema.get("cache").unwrap().property_type, TypeRef::list(TypeRef::Any));
    }

    #[test]
    fn test_json_scalar_is_rejected() {
        let err = schema_of_json(&json!(42)).unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }
}

// =============================================================================
// REFLECTION
// =============================================================================

mod reflection {
    use super::*;

    #[test]
    fn test_compiled_type_schema_round_trips_metadata() {
        let mut source = Builder::from_type::<Person>();
        let ty = source.compile().unwrap();

        let schema = schema_of_compiled(&ty);
        let range = schema.get("age").unwrap().attribute("Range").unwrap();
        assert!(range.carrier_type().is_some());
        assert_eq!(range.values().get("max"), Some(&Value::I32(150)));

        let copy = Builder::from_schema(schema).compile().unwrap();
        let copied = copy.property("age").unwrap().attribute("Range").unwrap();
        assert_eq!(copied.carrier(), ty.property("age").unwrap().attribute("Range").unwrap().carrier());
        assert_eq!(copied.get("min"), Some(&Value::I32(0)));
    }

    #[test]
    fn test_instance_schema_carries_values() {
        let mut builder = Builder::from_object(&ann());
        let mut row = builder.instance(true).unwrap();
        row.set("age", 31).unwrap();

        let schema = schema_of_instance(&row);

        assert_eq!(schema.get("age").unwrap().value, Some(Value::I32(31)));
        assert_eq!(schema.get("Name").unwrap().value, Some(Value::from("Ann")));
    }

    #[test]
    fn test_schema_json_interchange() {
        let person = Person {
            nickname: Some("Annie".to_string()),
            ..ann()
        };
        let schema = schema_of_object(&person);
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json[1]["name"], "age");
        assert_eq!(json[1]["value"], 30);
        assert_eq!(json[1]["attributes"][0]["label"], "Range");
        assert_eq!(json[1]["attributes"][0]["values"]["max"], 150);

        let back: dynclass_engine::Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}
