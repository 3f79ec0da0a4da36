use super::{header_value, media_type_of};
use http::Method;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// An executed HTTP request as seen by contract validation.
///
/// `route_template` carries the template the application's router matched
/// (`widgets/{id}`, leading slash optional), when the caller knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request URI including query string
    pub uri: String,
    /// Template of the matched application route, if any
    pub route_template: Option<String>,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl ContractRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            route_template: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_route_template(mut self, template: impl Into<String>) -> Self {
        self.route_template = Some(template.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body and set `content-type: application/json`.
    pub fn with_json(self, value: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    /// URI path without the query string.
    pub fn path(&self) -> &str {
        self.uri.split(['?', '#']).next().unwrap_or(&self.uri)
    }

    /// Parsed query string parameters
    pub fn query_params(&self) -> HashMap<String, String> {
        match self.uri.split_once('?') {
            Some((_, query)) => {
                let query = query.split('#').next().unwrap_or_default();
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }
            None => HashMap::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Media type of the body without parameters, lower-cased.
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type").map(media_type_of)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
