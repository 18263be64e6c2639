//! Strict rewriting of JSON Schema leaf documents.

use serde_json::{Map, Value};

/// Keywords whose value maps names to subschemas.
const SCHEMA_MAPS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Keywords whose value is a single subschema.
const SCHEMA_VALUES: [&str; 11] = [
    "propertyNames",
    "additionalProperties",
    "unevaluatedProperties",
    "items",
    "contains",
    "additionalItems",
    "unevaluatedItems",
    "not",
    "if",
    "then",
    "else",
];

/// Keywords whose value is a list of subschemas.
const SCHEMA_LISTS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

/// Forbid undeclared properties in every object schema that declares
/// `properties` and leaves `additionalProperties` open.
///
/// Free-form object schemas (no `properties`) are left as they are.
pub fn forbid_undeclared_properties(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if declares_properties(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for keyword in SCHEMA_MAPS {
                if let Some(Value::Object(children)) = map.get_mut(keyword) {
                    children.values_mut().for_each(forbid_undeclared_properties);
                }
            }
            for keyword in SCHEMA_VALUES {
                if let Some(child) = map.get_mut(keyword) {
                    forbid_undeclared_properties(child);
                }
            }
            for keyword in SCHEMA_LISTS {
                if let Some(Value::Array(children)) = map.get_mut(keyword) {
                    children.iter_mut().for_each(forbid_undeclared_properties);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(forbid_undeclared_properties),
        _ => {}
    }
}

fn declares_properties(map: &Map<String, Value>) -> bool {
    let object_typed = match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => true,
    };
    object_typed && matches!(map.get("properties"), Some(Value::Object(_)))
}
