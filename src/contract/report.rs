use crate::exchange::MessageKind;
use crate::validator::ValidationError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fmt;

/// Human-readable description of a contract mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Side of the exchange that failed
    pub kind: MessageKind,
    /// Path template the exchange was validated against
    pub path_template: String,
    /// Full message: the validation error plus any enrichment
    pub message: String,
    /// Body of the failing message, as text
    pub content: String,
    /// The underlying validation error
    pub error: ValidationError,
}

impl FailureReport {
    /// Build the report for `error`, raised while validating `body`.
    ///
    /// When the cause chain holds a keyword mismatch the message gains the
    /// breadcrumb, the mismatch message and, if `body` parses as JSON, the
    /// body pretty-printed. Enrichment never fails.
    pub fn new(kind: MessageKind, path_template: &str, error: ValidationError, body: &[u8]) -> Self {
        let content = String::from_utf8_lossy(body).into_owned();
        let mut message = error.message().to_string();

        if let Some(mismatch) = error.keyword_mismatch() {
            message.push_str(&format!(
                "\nKey: {}\nError: {}\n",
                mismatch.breadcrumb_chain(),
                mismatch.message
            ));
            if let Some(pretty) = pretty_json(body) {
                message.push_str(&format!("Content: \n{pretty}\n"));
            }
        }

        Self {
            kind,
            path_template: path_template.to_string(),
            message,
            content,
            error,
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Four-space indented JSON with non-ASCII characters left as they are.
fn pretty_json(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(out).ok()
}

/// Receives contract failures on behalf of the test framework.
pub trait AssertionSink {
    /// Record a failure. Implementations normally end the test here.
    fn fail(&mut self, message: &str, content: &str);
}

/// Fails the current test by panicking with the report message.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicSink;

impl AssertionSink for PanicSink {
    #[allow(clippy::panic)]
    fn fail(&mut self, message: &str, _content: &str) {
        panic!("{message}");
    }
}

/// Keeps every failure, for harnesses that report after the fact.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub failures: Vec<(String, String)>,
}

impl AssertionSink for RecordingSink {
    fn fail(&mut self, message: &str, content: &str) {
        self.failures.push((message.to_string(), content.to_string()));
    }
}
