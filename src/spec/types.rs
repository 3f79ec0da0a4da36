use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Operation keys recognised inside an OpenAPI path item.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "options", "head", "trace",
];

/// Body contract for one operation at one path template and method.
///
/// Built once from the spec document and serialized as part of the durable
/// validator cache entry, so every schema in here is fully `$ref`-expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationContract {
    /// OpenAPI path template, e.g. `/widgets/{id}`
    pub path_template: String,
    /// Upper-case HTTP method, e.g. `GET`
    pub method: String,
    pub operation_id: Option<String>,
    /// `requestBody` of the operation, if documented
    pub request_body: Option<BodyContract>,
    /// Responses keyed by status (`200`, `4XX`, `default`)
    pub responses: BTreeMap<String, BodyContract>,
}

impl OperationContract {
    /// Find the documented response for a concrete status code.
    ///
    /// Lookup order follows OpenAPI precedence: exact status, then the
    /// `NXX` range, then `default`. Returns the matched key with the body.
    pub fn response_for(&self, status: u16) -> Option<(&str, &BodyContract)> {
        let exact = status.to_string();
        let range = format!("{}XX", status / 100);
        for key in [exact.as_str(), range.as_str(), "default"] {
            if let Some((k, body)) = self
                .responses
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
            {
                return Some((k.as_str(), body));
            }
        }
        None
    }

    /// `"GET /widgets/{id}"`, used in logs and CLI output.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }
}

/// Content map of a request body or a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyContract {
    /// `requestBody.required`; always `false` for responses
    pub required: bool,
    /// Lower-cased media type -> normalized JSON Schema (if any)
    pub content: BTreeMap<String, Option<Value>>,
}

impl BodyContract {
    /// Select the documented media type for a message's `content-type`.
    ///
    /// With no content type on the message, the first JSON-like media type
    /// wins, falling back to the first documented one. Returns `None` when the
    /// message carries a content type the operation does not document.
    pub fn media_type_for(&self, content_type: Option<&str>) -> Option<(&str, Option<&Value>)> {
        let entry = |key: &str| {
            self.content
                .get_key_value(key)
                .map(|(k, schema)| (k.as_str(), schema.as_ref()))
        };

        let Some(content_type) = content_type else {
            return self
                .content
                .iter()
                .find(|(k, _)| is_json_media_type(k))
                .or_else(|| self.content.iter().next())
                .map(|(k, schema)| (k.as_str(), schema.as_ref()));
        };

        let content_type = content_type.to_ascii_lowercase();
        if let Some(found) = entry(&content_type) {
            return Some(found);
        }
        if let Some((major, _)) = content_type.split_once('/') {
            if let Some(found) = entry(&format!("{major}/*")) {
                return Some(found);
            }
        }
        entry("*/*")
    }
}

/// Lower-cased media type without parameters: `Application/JSON; charset=utf-8`
/// becomes `application/json`.
pub fn media_type_essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `application/json`, `application/problem+json` and friends.
///
/// Wildcards are not JSON: a `*/*` body may be anything.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type_essence(media_type);
    essence == "application/json" || essence.ends_with("+json")
}
