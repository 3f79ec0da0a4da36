//! # Schema Validator Cache Module
//!
//! Thread-safe cache of compiled JSON Schema validators, owned by one
//! [`SpecValidator`](crate::validator::SpecValidator).
//!
//! ## Overview
//!
//! The operation contracts of a spec survive across processes through the
//! durable spec cache, but compiled `JSONSchema` values cannot be serialized.
//! They are compiled lazily on first use instead and kept here for the rest
//! of the process, so validating the same operation again costs a read lock
//! and a map lookup.
//!
//! ## Cache Key Structure
//!
//! Cache keys are formatted as: `{method}:{path_template}:{kind}:{status}:{media_type}`
//! - `method`: Upper-case HTTP method, e.g. `GET`
//! - `path_template`: The OpenAPI path template, e.g. `/widgets/{id}`
//! - `kind`: Either "request" or "response"
//! - `status`: The documented response key (`200`, `4XX`, `default`), empty for requests
//! - `media_type`: The documented media type the schema belongs to
//!
//! ## Thread Safety
//!
//! `Arc<RwLock<HashMap>>` with a double-checked insert: concurrent misses
//! on the same key may both compile, only the first insert is kept.

use crate::exchange::MessageKind;
use crate::spec::{is_json_media_type, OperationContract};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

/// Identifies one schema inside a spec.
#[derive(Debug, Clone, Copy)]
pub struct SchemaKey<'a> {
    pub method: &'a str,
    pub path_template: &'a str,
    pub kind: MessageKind,
    pub status: Option<&'a str>,
    pub media_type: &'a str,
}

impl SchemaKey<'_> {
    fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.method,
            self.path_template,
            self.kind,
            self.status.unwrap_or_default(),
            self.media_type
        )
    }
}

/// Thread-safe cache for compiled JSON Schema validators
#[derive(Clone)]
pub struct ValidatorCache {
    /// Internal cache storage: key -> Arc<JSONSchema>
    cache: Arc<RwLock<HashMap<String, Arc<JSONSchema>>>>,
    /// Whether compiled validators are kept between calls
    enabled: bool,
}

impl Default for ValidatorCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("enabled", &self.enabled)
            .field("size", &self.size())
            .finish()
    }
}

impl ValidatorCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    /// Get a cached validator or compile and cache a new one
    ///
    /// # Errors
    ///
    /// Returns the compiler's message when `schema` is not a valid JSON Schema.
    pub fn get_or_compile(&self, key: SchemaKey<'_>, schema: &Value) -> Result<Arc<JSONSchema>, String> {
        if !self.enabled {
            return compile(schema).map(Arc::new);
        }

        let cache_key = key.cache_key();

        // Fast path: read lock only
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(validator) = cache.get(&cache_key) {
                debug!(cache_key = %cache_key, "Schema validator cache hit");
                return Ok(Arc::clone(validator));
            }
        }

        match compile(schema) {
            Ok(compiled) => {
                let validator = Arc::new(compiled);
                let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);

                // Another thread might have compiled while we waited
                if let Some(existing) = cache.get(&cache_key) {
                    return Ok(Arc::clone(existing));
                }

                cache.insert(cache_key.clone(), Arc::clone(&validator));
                debug!(
                    cache_key = %cache_key,
                    cache_size = cache.len(),
                    "Schema validator compiled and cached"
                );
                Ok(validator)
            }
            Err(e) => {
                error!(cache_key = %cache_key, error = %e, "Failed to compile JSON Schema");
                Err(e)
            }
        }
    }

    /// Number of validators currently cached
    pub fn size(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Compile every JSON body schema of `operations` up front.
    ///
    /// Returns the number of schemas compiled and the labels of schemas that
    /// failed to compile. Does not stop at the first failure.
    pub fn precompile(&self, operations: &[OperationContract]) -> (usize, Vec<String>) {
        let mut compiled = 0;
        let mut failures = Vec::new();

        for op in operations {
            let bodies = op
                .request_body
                .iter()
                .map(|body| (MessageKind::Request, None, body))
                .chain(
                    op.responses
                        .iter()
                        .map(|(status, body)| (MessageKind::Response, Some(status.as_str()), body)),
                );

            for (kind, status, body) in bodies {
                for (media_type, schema) in &body.content {
                    let Some(schema) = schema.as_ref().filter(|_| is_json_media_type(media_type)) else {
                        continue;
                    };
                    let key = SchemaKey {
                        method: &op.method,
                        path_template: &op.path_template,
                        kind,
                        status,
                        media_type,
                    };
                    match self.get_or_compile(key, schema) {
                        Ok(_) => compiled += 1,
                        Err(e) => failures.push(format!("{} {}: {e}", op.label(), key.cache_key())),
                    }
                }
            }
        }

        info!(
            compiled_count = compiled,
            failed_count = failures.len(),
            cache_size = self.size(),
            operations_count = operations.len(),
            "Precompiled body schemas"
        );
        (compiled, failures)
    }
}

fn compile(schema: &Value) -> Result<JSONSchema, String> {
    JSONSchema::compile(schema).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::BodyContract;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn key<'a>(path_template: &'a str, kind: MessageKind, status: Option<&'a str>) -> SchemaKey<'a> {
        SchemaKey {
            method: "GET",
            path_template,
            kind,
            status,
            media_type: "application/json",
        }
    }

    #[test]
    fn test_cache_enabled() {
        let cache = ValidatorCache::new(true);
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});

        let validator1 = cache
            .get_or_compile(key("/widgets", MessageKind::Request, None), &schema)
            .unwrap();
        assert_eq!(cache.size(), 1);

        let validator2 = cache
            .get_or_compile(key("/widgets", MessageKind::Request, None), &schema)
            .unwrap();
        assert_eq!(cache.size(), 1);

        // Validators should be the same Arc (same pointer)
        assert!(Arc::ptr_eq(&validator1, &validator2));
    }

    #[test]
    fn test_cache_disabled() {
        let cache = ValidatorCache::new(false);
        let schema = json!({"type": "object"});

        let validator1 = cache
            .get_or_compile(key("/widgets", MessageKind::Request, None), &schema)
            .unwrap();
        let validator2 = cache
            .get_or_compile(key("/widgets", MessageKind::Request, None), &schema)
            .unwrap();
        assert_eq!(cache.size(), 0);
        assert!(!Arc::ptr_eq(&validator1, &validator2));
    }

    #[test]
    fn test_distinct_keys() {
        let cache = ValidatorCache::default();
        let schema = json!({"type": "object"});

        cache.get_or_compile(key("/a", MessageKind::Request, None), &schema).unwrap();
        cache.get_or_compile(key("/b", MessageKind::Request, None), &schema).unwrap();
        cache.get_or_compile(key("/a", MessageKind::Response, Some("200")), &schema).unwrap();
        cache.get_or_compile(key("/a", MessageKind::Response, Some("404")), &schema).unwrap();

        assert_eq!(cache.size(), 4);
        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            key("/widgets/{id}", MessageKind::Response, Some("200")).cache_key(),
            "GET:/widgets/{id}:response:200:application/json"
        );
        assert_eq!(
            key("/widgets", MessageKind::Request, None).cache_key(),
            "GET:/widgets:request::application/json"
        );
    }

    #[test]
    fn test_invalid_schema() {
        let cache = ValidatorCache::new(true);
        let invalid_schema = json!({"type": "invalid_type"});

        let result = cache.get_or_compile(key("/x", MessageKind::Request, None), &invalid_schema);
        assert!(result.is_err());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_precompile_reports_failures() {
        let cache = ValidatorCache::new(true);
        let content = |schema: Value| BodyContract {
            required: false,
            content: BTreeMap::from([
                ("application/json".to_string(), Some(schema)),
                ("text/plain".to_string(), Some(json!({"type": "string"}))),
            ]),
        };
        let op = OperationContract {
            path_template: "/widgets".to_string(),
            method: "POST".to_string(),
            operation_id: None,
            request_body: Some(content(json!({"type": "object"}))),
            responses: BTreeMap::from([
                ("201".to_string(), content(json!({"type": "object"}))),
                ("400".to_string(), content(json!({"type": "invalid_type"}))),
            ]),
        };

        let (compiled, failures) = cache.precompile(&[op]);
        assert_eq!(compiled, 2, "text/plain schemas are not compiled");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("response:400"));
    }
}
