use serde_json::{Map, Value};

/// Keys whose values are instance data, not subschemas.
const DATA_KEYWORDS: [&str; 5] = ["example", "examples", "default", "enum", "const"];

/// Keys whose values map arbitrary names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
];

/// Rewrite OpenAPI 3.0 schema dialect into plain JSON Schema.
///
/// - `nullable: true` becomes a `"null"` member of `type` (and of `enum`)
/// - boolean `exclusiveMinimum`/`exclusiveMaximum` become the numeric form
///
/// 3.1 documents pass through unchanged.
pub fn normalize_schema(schema: &mut Value) {
    match schema {
        Value::Object(obj) => {
            normalize_nullable(obj);
            normalize_exclusive(obj, "exclusiveMinimum", "minimum");
            normalize_exclusive(obj, "exclusiveMaximum", "maximum");
            for (key, value) in obj.iter_mut() {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                match value {
                    // Names in here are property names, never keywords
                    Value::Object(named) if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) => {
                        named.values_mut().for_each(normalize_schema);
                    }
                    _ => normalize_schema(value),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_schema),
        _ => {}
    }
}

fn normalize_nullable(obj: &mut Map<String, Value>) {
    let Some(nullable) = obj.get("nullable").and_then(Value::as_bool) else {
        return;
    };
    obj.remove("nullable");
    if !nullable {
        return;
    }

    let widened = match obj.remove("type") {
        Some(Value::String(t)) => Some(Value::Array(vec![
            Value::String(t),
            Value::String("null".to_string()),
        ])),
        Some(Value::Array(mut types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(Value::String("null".to_string()));
            }
            Some(Value::Array(types))
        }
        other => other,
    };
    if let Some(types) = widened {
        obj.insert("type".to_string(), types);
    }
    if let Some(Value::Array(values)) = obj.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }
}

fn normalize_exclusive(obj: &mut Map<String, Value>, exclusive: &str, bound: &str) {
    let Some(flag) = obj.get(exclusive).and_then(Value::as_bool) else {
        return;
    };
    obj.remove(exclusive);
    if flag {
        if let Some(limit) = obj.remove(bound) {
            obj.insert(exclusive.to_string(), limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nullable_becomes_type_union() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "nullable": true},
                "tags": {"type": ["array"], "nullable": true},
                "state": {"type": "string", "enum": ["on", "off"], "nullable": true}
            }
        });
        normalize_schema(&mut schema);

        assert_eq!(schema["properties"]["name"]["type"], json!(["string", "null"]));
        assert_eq!(schema["properties"]["tags"]["type"], json!(["array", "null"]));
        assert_eq!(schema["properties"]["state"]["enum"], json!(["on", "off", null]));
        assert!(schema["properties"]["name"].get("nullable").is_none());
    }

    #[test]
    fn test_boolean_exclusive_bounds() {
        let mut schema = json!({"type": "integer", "minimum": 0, "exclusiveMinimum": true,
                                "maximum": 10, "exclusiveMaximum": false});
        normalize_schema(&mut schema);
        assert_eq!(schema, json!({"type": "integer", "exclusiveMinimum": 0, "maximum": 10}));
    }

    #[test]
    fn test_examples_are_left_alone() {
        let mut schema = json!({"type": "object", "example": {"nullable": true}});
        normalize_schema(&mut schema);
        assert_eq!(schema["example"], json!({"nullable": true}));
    }

    #[test]
    fn test_keyword_named_properties_are_normalized() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "default": {"type": "string", "nullable": true},
                "enum": {"type": "integer", "nullable": true},
                "example": {"type": "object", "properties": {"const": {"type": "string", "nullable": true}}},
                "other": {"type": "string", "nullable": true}
            },
            "patternProperties": {"^x-": {"type": "boolean", "nullable": true}},
            "$defs": {"examples": {"type": "number", "nullable": true}}
        });
        normalize_schema(&mut schema);

        let properties = &schema["properties"];
        assert_eq!(properties["default"], json!({"type": ["string", "null"]}));
        assert_eq!(properties["enum"]["type"], json!(["integer", "null"]));
        assert_eq!(properties["example"]["properties"]["const"]["type"], json!(["string", "null"]));
        assert_eq!(properties["other"]["type"], json!(["string", "null"]));
        assert_eq!(schema["patternProperties"]["^x-"]["type"], json!(["boolean", "null"]));
        assert_eq!(schema["$defs"]["examples"]["type"], json!(["number", "null"]));
    }
}
