use super::{header_value, media_type_of};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// The response produced for a [`ContractRequest`](super::ContractRequest).
#[derive(Debug, Clone, PartialEq)]
pub struct ContractResponse {
    pub status: u16,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ContractResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Build a response the way a handler would write it: strings go out as
    /// `text/plain`, everything else as JSON.
    pub fn from_value(status: u16, body: Value) -> Self {
        match body {
            Value::String(s) => Self::new(status)
                .with_header("content-type", "text/plain")
                .with_body(s),
            other => Self::new(status).with_json(&other),
        }
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

    pub fn with_json(self, value: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<String> {
        self.header("content-type").map(media_type_of)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
