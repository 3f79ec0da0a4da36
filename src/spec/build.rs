use super::dialect::normalize_schema;
use super::error::SpecLoadError;
use super::load::LoadedSpec;
use super::resolve::RefResolver;
use super::types::{media_type_essence, BodyContract, OperationContract, HTTP_METHODS};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Build one [`OperationContract`] per path template and method.
///
/// Each path item is `$ref`-expanded before extraction, so `requestBody` and
/// `responses` pulled in from `components` (or from sibling files) are
/// handled the same way as inline ones. Path-level entries without any
/// operation are skipped.
pub fn build_operations(spec: &LoadedSpec) -> Result<Vec<OperationContract>, SpecLoadError> {
    let mut resolver = RefResolver::new(&spec.path, spec.root.clone());
    let mut operations = Vec::new();

    let Some(paths) = spec.root.get("paths").and_then(Value::as_object) else {
        debug!(path = %spec.path.display(), "OpenAPI document has no paths");
        return Ok(operations);
    };

    for (template, item) in paths {
        let mut item = item.clone();
        resolver.expand(&spec.path, &mut item)?;
        let Some(item) = item.as_object() else {
            continue;
        };
        for method in HTTP_METHODS {
            if let Some(operation) = item.get(method) {
                operations.push(build_operation(template, method, operation));
            }
        }
    }

    debug!(
        path = %spec.path.display(),
        operations = operations.len(),
        "Built operation contracts"
    );
    Ok(operations)
}

fn build_operation(template: &str, method: &str, operation: &Value) -> OperationContract {
    let request_body = operation.get("requestBody").map(|body| BodyContract {
        required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
        content: extract_content(body.get("content")),
    });

    let responses = operation
        .get("responses")
        .and_then(Value::as_object)
        .map(|responses| {
            responses
                .iter()
                .map(|(status, response)| {
                    (
                        status.clone(),
                        BodyContract {
                            required: false,
                            content: extract_content(response.get("content")),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    OperationContract {
        path_template: template.to_string(),
        method: method.to_ascii_uppercase(),
        operation_id: operation
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_owned),
        request_body,
        responses,
    }
}

/// Media type -> normalized schema for a `content` object.
///
/// Keys are reduced to their essence, so `application/json; charset=utf-8`
/// is matched like `application/json`. The first spelling of a media type wins.
fn extract_content(content: Option<&Value>) -> BTreeMap<String, Option<Value>> {
    let mut extracted = BTreeMap::new();
    let Some(media_types) = content.and_then(Value::as_object) else {
        return extracted;
    };
    for (media_type, media) in media_types {
        let schema = media.get("schema").cloned().map(|mut schema| {
            normalize_schema(&mut schema);
            schema
        });
        extracted
            .entry(media_type_essence(media_type))
            .or_insert(schema);
    }
    extracted
}

/// Path prefixes declared by `servers[].url`, longest first.
///
/// Absolute URLs contribute their path, relative ones are used as-is.
/// A bare `/` is not a prefix.
pub fn extract_base_paths(root: &Value) -> Vec<String> {
    let mut bases: Vec<String> = root
        .get("servers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|server| server.get("url").and_then(Value::as_str))
        .filter_map(|raw| match url::Url::parse(raw) {
            Ok(parsed) => Some(parsed.path().to_string()),
            Err(_) if raw.starts_with('/') => Some(raw.to_string()),
            Err(_) => None,
        })
        .map(|path| path.trim_end_matches('/').to_string())
        .filter(|path| !path.is_empty())
        .collect();
    bases.sort_by_key(|b| std::cmp::Reverse(b.len()));
    bases.dedup();
    bases
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn loaded(root: Value) -> LoadedSpec {
        LoadedSpec {
            path: PathBuf::from("openapi.yaml"),
            title: "test".to_string(),
            root,
        }
    }

    #[test]
    fn test_build_operations_with_component_refs() {
        let spec = loaded(json!({
            "openapi": "3.0.3",
            "paths": {
                "/widgets": {
                    "post": {
                        "operationId": "create_widget",
                        "requestBody": {"$ref": "#/components/requestBodies/NewWidget"},
                        "responses": {
                            "201": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Widget"}}}},
                            "default": {"$ref": "#/components/responses/Error"}
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Widget": {"type": "object", "properties": {"id": {"type": "string"}, "note": {"type": "string", "nullable": true}}}
                },
                "requestBodies": {
                    "NewWidget": {"required": true, "content": {"Application/JSON": {"schema": {"$ref": "#/components/schemas/Widget"}}}}
                },
                "responses": {
                    "Error": {"description": "error", "content": {"application/problem+json": {"schema": {"type": "object"}}}}
                }
            }
        }));

        let ops = build_operations(&spec).unwrap();
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.method, "POST");
        assert_eq!(op.operation_id.as_deref(), Some("create_widget"));

        let request = op.request_body.as_ref().unwrap();
        assert!(request.required);
        let schema = request.content["application/json"].as_ref().unwrap();
        assert_eq!(schema["x-ref-name"], "Widget");
        assert_eq!(schema["properties"]["note"]["type"], json!(["string", "null"]));

        assert!(op.responses["default"].content.contains_key("application/problem+json"));
    }

    #[test]
    fn test_media_type_parameters_are_dropped() {
        let content = json!({
            "application/json; charset=utf-8": {"schema": {"type": "object"}},
            "Text/Plain; charset=us-ascii": {}
        });
        let extracted = extract_content(Some(&content));

        assert_eq!(
            extracted.keys().collect::<Vec<_>>(),
            vec!["application/json", "text/plain"]
        );
        assert_eq!(extracted["application/json"], Some(json!({"type": "object"})));
        assert_eq!(extracted["text/plain"], None);
    }

    #[test]
    fn test_build_operations_without_paths() {
        let ops = build_operations(&loaded(json!({"openapi": "3.1.0"}))).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn test_extract_base_paths() {
        let root = json!({"servers": [
            {"url": "https://api.example.com/v1/"},
            {"url": "/internal/v1"},
            {"url": "https://example.com"},
            {"url": "{scheme}://example.com/templated"}
        ]});
        assert_eq!(extract_base_paths(&root), vec!["/internal/v1".to_string(), "/v1".to_string()]);
    }
}
